use std::env;
use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::Settings;
use super::{load_config, load_config_from};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.pool.max_size, 1000);
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("missing");
    temp_env::with_vars_unset(["POPBUS_POOL__MAX_SIZE", "POPBUS_LOGGING__LEVEL"], || {
        let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
        assert_eq!(cfg, Settings::default());
    });
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // Create a temporary directory and set it as current dir so load_config
    // will pick up config/default.toml from there.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [pool]
        max_size = 16
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = temp_env::with_vars_unset(["POPBUS_POOL__MAX_SIZE", "POPBUS_LOGGING__LEVEL"], || {
        load_config()
    });

    // restore cwd before asserting so a failure does not leak into other tests
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.pool.max_size, 16);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn load_config_env_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let file = tmp.path().join("bus.toml");
    fs::write(
        &file,
        r#"
        [pool]
        max_size = 16

        [logging]
        level = "warn"
        "#,
    )
    .expect("write config file");

    temp_env::with_vars(
        [
            ("POPBUS_POOL__MAX_SIZE", Some("64")),
            ("POPBUS_LOGGING__LEVEL", None),
        ],
        || {
            let cfg = load_config_from(file.to_str().unwrap()).expect("load_config failed");
            assert_eq!(cfg.pool.max_size, 64);
            assert_eq!(cfg.logging.level, "warn");
        },
    );
}
