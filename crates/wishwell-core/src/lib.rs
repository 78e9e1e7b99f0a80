pub mod app_config;
pub mod config;
pub mod gift;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{hash_password, load_app_config, load_app_config_from_env};
pub use gift::{validate_gift_payload, GiftPayload, GiftPayloadInput, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
