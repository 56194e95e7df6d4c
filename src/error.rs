use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogwardenError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogwardenError>;
