pub mod config;
pub mod error;
pub mod templates;

pub use config::{Config, RepositoryConfig};
pub use error::ConfigError;
