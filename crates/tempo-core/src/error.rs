#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    IllegalMove(String),
    InvalidFen(String),
    ParseError(String),
    BookLoad(String),
    TablebaseLoad(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            EngineError::InvalidFen(msg) => write!(f, "Invalid FEN: {}", msg),
            EngineError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            EngineError::BookLoad(msg) => write!(f, "Opening book load failed: {}", msg),
            EngineError::TablebaseLoad(msg) => write!(f, "Tablebase load failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
