pub mod config;

pub use config::{
    Config, DatabaseConfig, IngestConfig, LoggingConfig, RetrievalConfig, ServerConfig,
    StorageConfig,
};
