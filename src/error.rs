use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Layer-size list unusable at construction: fewer than two entries,
    /// a zero width, or explicit parameters whose shapes disagree with it.
    InvalidArchitecture(String),

    /// Non-positive epochs, mini-batch size, or learning rate.
    InvalidConfig(String),

    /// An input or target vector whose length disagrees with the network.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkError::InvalidArchitecture(msg) => {
                write!(f, "invalid architecture: {}", msg)
            }
            NetworkError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            NetworkError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch: {} has length {}, expected {}",
                what, found, expected
            ),
        }
    }
}

impl Error for NetworkError {}

pub type Result<T> = std::result::Result<T, NetworkError>;
