use thiserror::Error;

#[derive(Debug, Error)]
pub enum LottoError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("draw source returned status {status:?} for {what}")]
    Source { status: String, what: String },

    #[error("draw source listing is empty")]
    EmptyListing,

    #[error("invalid configuration for {key}: {message}")]
    Config { key: &'static str, message: String },
}

pub type Result<T, E = LottoError> = std::result::Result<T, E>;
