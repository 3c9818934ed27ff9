//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
///
/// Raised while loading the config file or while building mirrors from it.
/// Every variant is fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Invalid filter type: {value}")]
    InvalidFilterType { value: String },

    #[error("Invalid filter location: {value}")]
    InvalidFilterLocation { value: String },

    #[error("Invalid replacement location: {value}")]
    InvalidReplacementLocation { value: String },

    #[error("Invalid replacement pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(
        "Invalid color in your config (only hex is supported). Replace \"{value}\" with a valid hex color (e.g. #3463D9) to fix this error."
    )]
    InvalidColor { value: String },
}

/// Failure while rewriting a message with a mirror's replacements.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(
        "Invalid color in your config (only hex is supported). Replace \"{value}\" with a valid hex color (e.g. #3463D9) to fix this error."
    )]
    InvalidColor { value: String },

    #[error("Replacement '{pattern}' failed: {message}")]
    Regex { pattern: String, message: String },
}

/// Failure while delivering one payload to one sink.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No webhook resolved for sink {url}")]
    UnknownSink { url: String },

    #[error("Failed to fetch attachment '{filename}': {source}")]
    Attachment {
        filename: String,
        #[source]
        source: serenity::Error,
    },

    #[error("Webhook execution failed: {0}")]
    Send(#[from] serenity::Error),
}

/// Result type alias for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for message transforms.
pub type TransformResult<T> = std::result::Result<T, TransformError>;
