use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbError {
    #[error("invalid distribution parameters: {0}")]
    InvalidParameters(String),

    #[error("sample is empty")]
    EmptySample,

    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },

    #[error("probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("invalid histogram bins: {0}")]
    InvalidBins(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ProbError>;

/// Fails with the index of the first non-finite value.
pub(crate) fn check_finite(data: &[f64]) -> Result<()> {
    match data.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(ProbError::NonFiniteValue { index }),
        None => Ok(()),
    }
}
