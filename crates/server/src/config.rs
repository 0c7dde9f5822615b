use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// JSON file holding the registry
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Optional YAML file with seed abbreviations for a fresh data file
    #[serde(default)]
    pub registry_config: Option<PathBuf>,

    /// Directory served for every non-API path
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Reject requests without a valid `API_KEY` query parameter
    #[serde(default)]
    pub require_api_key: bool,

    /// Accepted API keys
    #[serde(default = "default_api_keys")]
    pub api_keys: HashSet<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            data_file: default_data_file(),
            registry_config: None,
            static_dir: default_static_dir(),
            require_api_key: false,
            api_keys: default_api_keys(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server` config file and
    /// `ABKVERZ_SERVER__*` environment variables (highest precedence).
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(
                config::Environment::with_prefix("ABKVERZ_SERVER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("api_keys")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        if config.require_api_key && config.api_keys.is_empty() {
            anyhow::bail!("require_api_key is set but no api_keys are configured");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_data_file() -> PathBuf {
    PathBuf::from("db.json")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_api_keys() -> HashSet<String> {
    ["abc-123", "xyz-123", "abc-789", "xyz-789"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}
