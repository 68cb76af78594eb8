//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use std::path::PathBuf;

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use nexus_config::NexusConfig;
use pretty_assertions::assert_eq;

fn from_file(path: &str) -> figment::Result<NexusConfig> {
    Figment::from(Serialized::defaults(NexusConfig::default()))
        .merge(Toml::file(path))
        .extract()
}

#[test]
fn loads_mysql_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[mysql]
host = "db.lab.internal"
port = 3307
user = "nexus"
password = "secret"
database = "taxonomia"
max_connections = 2
"#,
        )?;

        let config = from_file("config.toml")?;
        assert_eq!(config.mysql.host, "db.lab.internal");
        assert_eq!(config.mysql.port, 3307);
        assert_eq!(config.mysql.user, "nexus");
        assert_eq!(config.mysql.password, "secret");
        assert_eq!(config.mysql.database, "taxonomia");
        assert_eq!(config.mysql.max_connections, 2);
        assert_eq!(config.mysql.connect_timeout_secs, 10);
        Ok(())
    });
}

#[test]
fn loads_openai_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[openai]
api_key_file = "keys/openai"
endpoint = "http://localhost:11434/v1"
model = "llama3"
temperature = 0.2
max_attempts = 5
"#,
        )?;

        let config = from_file("config.toml")?;
        assert_eq!(config.openai.api_key_file, Some(PathBuf::from("keys/openai")));
        assert_eq!(config.openai.endpoint, "http://localhost:11434/v1");
        assert_eq!(config.openai.model, "llama3");
        assert!((config.openai.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.openai.max_attempts, 5);
        assert_eq!(config.openai.retry_delay_secs, 2);
        Ok(())
    });
}

#[test]
fn loads_full_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[mysql]
database = "lab"

[openai]
api_key = "sk-test"

[media]
image_base_url = ""
placeholder_width = 200
placeholder_height = 150
top_k = 5

[general]
script_path = "sql/schema.sql"
data_dir = "seed"
default_rows = 4
random_rows = 2
"#,
        )?;

        let config = from_file("config.toml")?;
        assert_eq!(config.mysql.database, "lab");
        assert!(config.openai.is_configured());
        assert!(!config.media.has_image_source());
        assert_eq!(config.media.placeholder_width, 200);
        assert_eq!(config.media.top_k, 5);
        assert_eq!(config.general.script_path, PathBuf::from("sql/schema.sql"));
        assert_eq!(config.general.data_dir, PathBuf::from("seed"));
        assert_eq!(config.general.default_rows, 4);
        assert_eq!(config.general.random_rows, 2);
        assert_eq!(config.general.default_species, 20);
        Ok(())
    });
}

#[test]
fn env_var_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("NEXUS_MYSQL__HOST", "from-env");
        jail.create_file(
            "config.toml",
            r#"
[mysql]
host = "from-toml"
user = "toml-user"
"#,
        )?;

        let config: NexusConfig = Figment::from(Serialized::defaults(NexusConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("NEXUS_").split("__"))
            .extract()?;

        assert_eq!(config.mysql.host, "from-env");
        assert_eq!(config.mysql.user, "toml-user");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".nexus")?;
        jail.create_file(
            ".nexus/config.toml",
            r#"
[general]
max_display_rows = 50
"#,
        )?;

        let config: NexusConfig = NexusConfig::figment().extract()?;
        assert_eq!(config.general.max_display_rows, 50);
        Ok(())
    });
}

/// Typo'd env keys are silently ignored by figment; the CLI warns about them.
#[test]
fn typo_env_var_silently_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("NEXUS_MYSQL__HOTS", "typo-host");

        let config: NexusConfig = NexusConfig::figment().extract()?;
        assert_eq!(config.mysql.host, "localhost");
        Ok(())
    });
}

#[test]
fn invalid_type_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[mysql]
port = "not-a-port"
"#,
        )?;

        assert!(from_file("config.toml").is_err());
        Ok(())
    });
}
