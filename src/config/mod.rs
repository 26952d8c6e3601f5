use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;

/// Environment variable prefix, e.g. `RESTMOCK_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "RESTMOCK";

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    /// Declaration file whose root is an array of endpoint declarations.
    #[serde(default)]
    pub definitions: Option<PathBuf>,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Connection URL for the sqlite backend (`sqlite://restmock.db`, `sqlite::memory:`)
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Clear stored records before seeding
    #[serde(default = "default_reset_on_startup")]
    pub reset_on_startup: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: default_max_connections(),
            reset_on_startup: default_reset_on_startup(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_reset_on_startup() -> bool {
    true
}

/// One raw endpoint declaration, as written by the user.
///
/// ```json
/// {
///   "name": "Users",
///   "endpoint": "users",
///   "methods": "GET,POST",
///   "fields": { "name": "string", "age": "integer" },
///   "count": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub name: String,
    pub endpoint: String,
    /// Comma-separated verbs or `all`
    pub methods: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub count: i64,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, env vars, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let root = cli
            .config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut settings = Self::build(cli.config.clone())?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.load_external_configs(&root)?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        let mut settings = Self::build(root.join("restmock"))?;

        settings.load_external_configs(root)?;
        settings.validate()?;

        Ok(settings)
    }

    fn build(config_path: PathBuf) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(definitions) = &cli.definitions {
            self.definitions = Some(definitions.clone());
        }
        if let Some(backend) = cli.storage {
            self.storage.backend = backend;
        }
        if let Some(url) = &cli.database_url {
            self.storage.url = Some(url.clone());
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Appends declarations from `config/endpoints/` and from the declaration file.
    fn load_external_configs(&mut self, root: &Path) -> Result<(), anyhow::Error> {
        self.load_endpoints_from_dir(&root.join("config").join("endpoints"))?;
        if let Some(path) = self.definitions.clone() {
            let path = if path.is_relative() { root.join(path) } else { path };
            let declarations = load_declaration_file(&path)?;
            tracing::info!(
                "Loaded {} endpoint declarations from {}",
                declarations.len(),
                path.display()
            );
            self.endpoints.extend(declarations);
        }
        Ok(())
    }

    fn load_endpoints_from_dir(&mut self, path: &Path) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", path.display());
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                        if matches!(ext, "json" | "yaml" | "yml" | "toml") {
                            let content = std::fs::read_to_string(&path)?;
                            let endpoint: EndpointConfig = match ext {
                                "json" => serde_json::from_str(&content)?,
                                "toml" => toml::from_str(&content)?,
                                _ => serde_yaml::from_str(&content)?,
                            };
                            tracing::debug!("Loaded endpoint declaration from {}", path.display());
                            self.endpoints.push(endpoint);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(())
    }
}

/// Reads a JSON or YAML document whose root is an array of declarations.
pub fn load_declaration_file(path: &Path) -> Result<Vec<EndpointConfig>, anyhow::Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Error reading declaration file {}: {}", path.display(), e)
    })?;

    let declarations = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    Ok(declarations)
}
