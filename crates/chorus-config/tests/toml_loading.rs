//! Configuration layering tests.
//!
//! Uses `figment::Jail` for sandboxed cwd and env var manipulation.

use chorus_config::{ChorusConfig, ConfigError, HistoryFormat};
use pretty_assertions::assert_eq;
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};

#[test]
fn loads_sections_from_project_toml() {
    Jail::expect_with(|jail| {
        std::fs::create_dir(".chorus").map_err(|e| e.to_string())?;
        jail.create_file(
            ".chorus/config.toml",
            r#"
[database]
path = "catalog.db"

[history]
default_format = "csv"

[export]
output_dir = "archives"

[log]
level = "info"
"#,
        )?;

        let config = ChorusConfig::load().expect("config loads");
        assert_eq!(config.database.path, "catalog.db");
        assert_eq!(config.history.default_format, HistoryFormat::Csv);
        assert_eq!(config.export.output_dir, "archives");
        assert_eq!(config.log.level, "info");
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        std::fs::create_dir(".chorus").map_err(|e| e.to_string())?;
        jail.create_file(
            ".chorus/config.toml",
            r#"
[database]
path = "from_toml.db"
"#,
        )?;
        jail.set_env("CHORUS_DATABASE__PATH", "from_env.db");

        let config = ChorusConfig::load().expect("config loads");
        assert_eq!(config.database.path, "from_env.db");
        Ok(())
    });
}

#[test]
fn explicit_file_layers_under_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[database]
path = "custom.db"

[history]
default_format = "table"
"#,
        )?;
        jail.set_env("CHORUS_HISTORY__DEFAULT_FORMAT", "json");

        let config = ChorusConfig::load_from(std::path::Path::new("custom.toml"))
            .expect("config loads");
        assert_eq!(config.database.path, "custom.db");
        assert_eq!(config.history.default_format, HistoryFormat::Json);
        Ok(())
    });
}

#[test]
fn unknown_format_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[history]
default_format = "xml"
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(ChorusConfig::default()))
            .merge(Toml::file("config.toml"));
        assert!(matches!(
            ChorusConfig::from_figment(&figment),
            Err(ConfigError::Figment(_))
        ));
        Ok(())
    });
}
