use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AmModemError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input length: expected {expected} samples, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, AmModemError>;
