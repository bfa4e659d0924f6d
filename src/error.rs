use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("bitfield size cannot be negative: {0}")]
    NegativeSize(i64),
    #[error("growth ceiling cannot be negative: {0}")]
    NegativeGrowth(f64),
    #[error("growth ceiling must be a whole number of bits: {0}")]
    NonIntegerGrowth(f64),
    #[error("invalid growth policy: {0:?}")]
    InvalidGrowth(String),
}

pub type Result<T> = std::result::Result<T, Error>;
