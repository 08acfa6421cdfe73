//! Build helper error types.

use thiserror::Error;

/// Errors from the build helpers.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Reading or writing a file failed.
    #[error("io error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A strain file could not be parsed or serialized.
    #[error("yaml error on '{path}': {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    /// A strain file's root is not a mapping.
    #[error("'{path}' is not a YAML mapping")]
    NotAMapping { path: String },

    /// No image key is registered for the service.
    #[error("unknown service '{service}' (known: {known})")]
    UnknownService { service: String, known: String },

    /// The strain does not set the requested key to a string.
    #[error("'{key}' is not set to a string in the strain")]
    MissingKey { key: String },

    /// An image reference could not be parsed.
    #[error("invalid image reference '{image}': {reason}")]
    InvalidImage { image: String, reason: String },

    /// A tag timestamp format has an unknown or malformed specifier.
    #[error("invalid timestamp format '{format}'")]
    InvalidTimestampFormat { format: String },

    /// A log pattern is not a valid regex.
    #[error("invalid log pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    /// An environment variable name is not exportable.
    #[error("invalid environment variable name '{key}'")]
    InvalidEnvKey { key: String },
}
