use thiserror::Error;

//errors raised by the backtest core
//all of them are caller-input errors, there is no transient class
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, BacktestError>;
