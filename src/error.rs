//! Error types for the push client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("App is not registered, call register() with the credentials first")]
    NotRegistered,

    #[error("Required field \"{0}\" missing, provide it when registering the app")]
    MissingField(&'static str),

    #[error("API error: {0}")]
    Api(String),

    #[error("Deep link action received but no deep link handler is configured")]
    MissingDeepLinkHandler,

    #[error("Presentation error: {0}")]
    Presentation(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PushError>;
