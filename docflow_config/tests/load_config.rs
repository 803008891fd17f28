use docflow_config::Config;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("docflow-config-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_create_then_load() {
    let dir = scratch_dir("create");
    let path = dir.join("config.json");

    Config::create_config_at(&path).unwrap();
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.store.host, "localhost");
    assert_eq!(config.extraction.preview_chars, 100);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_create_refuses_to_overwrite() {
    let dir = scratch_dir("overwrite");
    let path = dir.join("config.json");
    std::fs::write(&path, "{}").unwrap();

    let err = Config::create_config_at(&path).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_file_points_to_init() {
    let dir = scratch_dir("missing");
    let err = Config::load_from(&dir.join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("docflow init"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_malformed_file_names_path() {
    let dir = scratch_dir("malformed");
    let path = dir.join("config.json");
    std::fs::write(&path, "{\"provider\": ").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config file"));

    std::fs::remove_dir_all(&dir).unwrap();
}
