use clap::Parser;
use std::path::PathBuf;

use crate::config::StorageBackend;

/// Declarative mock REST server
#[derive(Parser, Debug, Clone)]
#[command(name = "restmock", version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, env = "RESTMOCK_CONFIG", default_value = "restmock.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "RESTMOCK_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "RESTMOCK_PORT")]
    pub port: Option<u16>,

    /// JSON or YAML file holding an array of endpoint declarations
    #[arg(short, long, env = "RESTMOCK_DEFINITIONS")]
    pub definitions: Option<PathBuf>,

    /// Record storage backend
    ///
    /// Env names must not collide with a settings table such as `RESTMOCK_STORAGE`.
    #[arg(long, env = "RESTMOCK_STORAGE_BACKEND", value_parser = parse_backend)]
    pub storage: Option<StorageBackend>,

    /// Database URL for the sqlite backend (e.g. sqlite://restmock.db)
    #[arg(long, env = "RESTMOCK_DATABASE_URL")]
    pub database_url: Option<String>,
}

fn parse_backend(value: &str) -> Result<StorageBackend, String> {
    match value.to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "sqlite" => Ok(StorageBackend::Sqlite),
        other => Err(format!("unknown storage backend '{}' (memory, sqlite)", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["restmock"]);
        assert_eq!(cli.config, PathBuf::from("restmock.toml"));
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.definitions.is_none());
        assert!(cli.storage.is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "restmock",
            "--config",
            "custom.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
            "--definitions",
            "default.json",
            "--storage",
            "sqlite",
            "--database-url",
            "sqlite::memory:",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.definitions, Some(PathBuf::from("default.json")));
        assert_eq!(cli.storage, Some(StorageBackend::Sqlite));
        assert_eq!(cli.database_url, Some("sqlite::memory:".to_string()));
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["restmock", "--storage", "redis"]).is_err());
    }
}
