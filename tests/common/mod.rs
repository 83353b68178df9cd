use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a config file into a fresh temporary directory
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Preference store path inside a fresh temporary directory
#[allow(dead_code)]
pub fn temp_store_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join("preferences.json");
    (temp_dir, path)
}
