use thiserror::Error;

#[derive(Debug, Error)]
pub enum TalonError {
    #[error("extract error: {0}")]
    Extract(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("sink error: {0}")]
    Sink(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TalonResult<T> = Result<T, TalonError>;
