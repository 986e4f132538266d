//! Configuration loading tests
//!
//! `figment::Jail` isolates the working directory and environment of each
//! test, so file discovery and `SVB__` variables do not leak between tests.

use figment::Jail;
use svb_domain::value_objects::{BindingOverride, Filter, UpdateStrategy};
use svb_infrastructure::config::loader::validate_app_config;
use svb_infrastructure::config::{AppConfig, ConfigLoader, ManagerConfig};
use svb_infrastructure::constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_LOG_LEVEL};

fn load() -> figment::error::Result<AppConfig> {
    ConfigLoader::new().load().map_err(|e| e.to_string().into())
}

#[test]
fn test_defaults_without_sources() {
    Jail::expect_with(|_jail| {
        let config = load()?;
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
        assert!(config.managers.is_empty());
        Ok(())
    });
}

#[test]
fn test_discovers_config_file_in_working_directory() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "svb.toml",
            r#"
                [logging]
                level = "debug"

                [events]
                capacity = 16

                [managers.billing.bindings.db]
                update_strategy = "eager"
                filter = "(region=eu)"
            "#,
        )?;

        let config = load()?;
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.events.capacity, 16);

        let db = config
            .manager("billing")
            .and_then(|m| m.binding("db"))
            .expect("override for billing.db");
        assert_eq!(db.update_strategy, Some(UpdateStrategy::Eager));
        assert_eq!(db.filter, Some(Filter::equal("region", "eu")));
        assert!(db.binding_strategy.is_none());
        Ok(())
    });
}

#[test]
fn test_environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("svb.toml", "[logging]\nlevel = \"debug\"\n")?;
        jail.set_env("SVB__LOGGING__LEVEL", "warn");
        jail.set_env("SVB__LOGGING__JSON_FORMAT", "true");
        jail.set_env("SVB__EVENTS__CAPACITY", "32");

        let config = load()?;
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json_format);
        assert_eq!(config.events.capacity, 32);
        Ok(())
    });
}

#[test]
fn test_explicit_path_wins_over_discovery() {
    Jail::expect_with(|jail| {
        jail.create_file("svb.toml", "[logging]\nlevel = \"debug\"\n")?;
        jail.create_file("custom.toml", "[logging]\nlevel = \"error\"\n")?;

        let config = ConfigLoader::new()
            .with_config_path(jail.directory().join("custom.toml"))
            .load()
            .map_err(|e| e.to_string())?;
        assert_eq!(config.logging.level, "error");
        Ok(())
    });
}

#[test]
fn test_missing_explicit_path_falls_back_to_defaults() {
    Jail::expect_with(|jail| {
        let loader = ConfigLoader::new().with_config_path(jail.directory().join("absent.toml"));
        let config = loader.load().map_err(|e| e.to_string())?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    });
}

#[test]
fn test_invalid_filter_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "svb.toml",
            "[managers.billing.bindings.db]\nfilter = \"(region=eu\"\n",
        )?;
        assert!(ConfigLoader::new().load().is_err());
        Ok(())
    });
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.logging.level = "loud".into();
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.events.capacity = 0;
    assert!(validate_app_config(&config).is_err());

    let mut config = AppConfig::default();
    config.managers.insert(" ".into(), ManagerConfig::default());
    assert!(validate_app_config(&config).is_err());

    assert!(validate_app_config(&AppConfig::default()).is_ok());
}

#[test]
fn test_save_and_reload() {
    Jail::expect_with(|jail| {
        let path = jail.directory().join("saved.toml");

        let mut config = AppConfig::default();
        config.logging.level = "trace".into();
        config.events.capacity = 8;
        let mut billing = ManagerConfig::default();
        billing.bindings.insert(
            "db".into(),
            BindingOverride {
                filter: Some(Filter::present("zone")),
                update_strategy: Some(UpdateStrategy::Static),
                binding_strategy: None,
            },
        );
        config.managers.insert("billing".into(), billing);

        let loader = ConfigLoader::new().with_config_path(&path);
        loader
            .save_to_file(&config, &path)
            .map_err(|e| e.to_string())?;
        assert_eq!(loader.config_path(), Some(path.as_path()));

        let reloaded = loader.load().map_err(|e| e.to_string())?;
        assert_eq!(reloaded, config);
        Ok(())
    });
}

#[test]
fn test_save_to_unwritable_path_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("missing").join("svb.toml");
    let result = ConfigLoader::new().save_to_file(&AppConfig::default(), &path);
    assert!(matches!(result, Err(svb_domain::Error::Io { .. })));
}
