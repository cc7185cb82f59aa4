//! Shared fixtures for the integration tests

use std::fs;
use std::path::Path;

/// Write `lines` (each newline-terminated) to `dir/name` and return its path
pub fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> String {
    let path = dir.join(name);
    let contents: String = lines.iter().map(|l| format!("{l}\n")).collect();
    fs::write(&path, contents).expect("write fixture");
    path.to_str().expect("utf-8 temp path").to_string()
}

/// Mapping used by the main-repo and other-repo scenarios
pub const REPO_MAPPING: &[&str] = &[
    ",config.json,config.json~1.2.3",
    ",my_module,_main",
    ",my_protobuf,protobuf~3.19.2",
    ",my_workspace,_main",
    "protobuf~3.19.2,config.json,config.json~1.2.3",
    "protobuf~3.19.2,protobuf,protobuf~3.19.2",
];
