use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Full connection string. When unset, an SQLite file inside `data_dir` is used.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    http_addr: Option<String>,
    database_url: Option<String>,
    data_dir: Option<String>,
    log_dir: Option<String>,
    max_db_connections: Option<u32>,
}

fn default_http_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_db_connections() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        merge(PartialServerConfig::default(), PartialServerConfig::default())
    }
}

// Environment overrides file.
fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> ServerConfig {
    ServerConfig {
        http_addr: env_config
            .http_addr
            .or(file_config.http_addr)
            .unwrap_or_else(default_http_addr),
        database_url: env_config
            .database_url
            .or(file_config.database_url)
            .filter(|url| !url.trim().is_empty()),
        data_dir: env_config
            .data_dir
            .or(file_config.data_dir)
            .unwrap_or_else(default_data_dir),
        log_dir: env_config
            .log_dir
            .or(file_config.log_dir)
            .unwrap_or_else(default_log_dir),
        max_db_connections: env_config
            .max_db_connections
            .or(file_config.max_db_connections)
            .unwrap_or_else(default_max_db_connections),
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path.map(Path::new) {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        Ok(merge(env_config, file_config))
    }

    /// The configured connection string, or the embedded SQLite database file.
    pub fn resolved_database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => {
                let path = Path::new(&self.data_dir).join("inventory.db");
                format!("sqlite://{}?mode=rwc", path.display())
            }
        }
    }

    pub fn uses_sqlite(&self) -> bool {
        self.resolved_database_url().starts_with("sqlite:")
    }
}
