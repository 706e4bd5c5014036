pub mod builder;
pub mod engine;
pub mod error;
pub mod progress;

pub use tempo_core::{
    Board, Color, DepthSummary, Move, Role, SearchConfig, SearchOutcome, SearchStats, Square,
};

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use progress::{CollectingProgressHandler, ProgressHandler, StderrProgressHandler};
