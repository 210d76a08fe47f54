use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
