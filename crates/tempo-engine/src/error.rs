use std::fmt;
use tempo_core::EngineError as CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Core(CoreError),
    Configuration(String),
    InvalidState(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Core(err) => write!(f, "Engine error: {}", err),
            EngineError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        EngineError::Core(err)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
