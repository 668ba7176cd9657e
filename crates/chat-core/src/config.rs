use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_CHUNK_CHARS: usize = 50;
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 3;
pub const DEFAULT_NO_MATCH_PLACEHOLDER: &str = "No relevant content found in the PDF.";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_env_overrides(&self) -> Self {
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.port);
        Self {
            port,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` / `postgresql://` for Postgres, `memory://` for the in-memory store.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn with_env_overrides(&self) -> Self {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone());
        Self { url }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Paragraphs shorter than this (trimmed, in characters) are dropped as noise.
    pub min_chunk_chars: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_chunk_chars: DEFAULT_MIN_CHUNK_CHARS,
            allowed_extensions: vec!["pdf".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub no_match_placeholder: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_RETRIEVAL_LIMIT,
            no_match_placeholder: DEFAULT_NO_MATCH_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn with_env_overrides(&self) -> Self {
        let upload_dir = env::var("UPLOAD_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| self.upload_dir.clone());
        Self { upload_dir }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        Self::load(Path::new(&config_path))
    }

    pub fn default_config_path() -> String {
        "./config.toml".to_string()
    }

    /// Applies `DATABASE_URL`, `SERVER_PORT` and `UPLOAD_DIR` on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        Self {
            server: self.server.with_env_overrides(),
            database: self.database.with_env_overrides(),
            storage: self.storage.with_env_overrides(),
            ..self
        }
    }
}
