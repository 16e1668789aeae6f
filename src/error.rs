use thiserror::Error;

/// Failures of the persisted key-value namespace.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("snapshot under `{key}` is not valid JSON: {source}")]
    Codec {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value under `{0}` is not valid UTF-8")]
    Utf8(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Field-level rejections raised by the form-validation layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("{field} must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },
    #[error("Date joined must be a YYYY-MM-DD date")]
    InvalidDate,
}
