use crate::{Engine, EngineError, ProgressHandler, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempo_core::SearchConfig;

/// Fluent construction of an [`Engine`] with validated configuration.
pub struct EngineBuilder {
    config: SearchConfig,
    fen: Option<String>,
    progress_handler: Option<Arc<Mutex<dyn ProgressHandler>>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        EngineBuilder {
            config: SearchConfig::default(),
            fen: None,
            progress_handler: None,
        }
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.config.max_depth = depth.clamp(1, 20);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = budget;
        self
    }

    pub fn with_quiescence_depth(mut self, depth: u8) -> Self {
        self.config.qs_max_depth = depth;
        self
    }

    /// `None` disables null-move pruning entirely.
    pub fn with_null_move_pruning(mut self, min_depth: Option<u8>) -> Self {
        self.config.nmr_min_depth = min_depth;
        self
    }

    pub fn with_late_move_reductions(mut self, enabled: bool) -> Self {
        self.config.lmr_enabled = enabled;
        self
    }

    pub fn with_transposition_capacity(mut self, capacity: usize) -> Self {
        self.config.tt_capacity = capacity;
        self
    }

    pub fn with_aspiration_delta(mut self, delta: i32) -> Self {
        self.config.aspiration_initial_delta = delta;
        self
    }

    pub fn with_opening_book(mut self, path: PathBuf) -> Self {
        self.config.book_path = Some(path);
        self
    }

    pub fn with_tablebase(mut self, path: PathBuf) -> Self {
        self.config.tablebase_path = Some(path);
        self
    }

    pub fn from_fen(mut self, fen: &str) -> Self {
        self.fen = Some(fen.to_string());
        self
    }

    pub fn with_progress_handler(mut self, handler: Arc<Mutex<dyn ProgressHandler>>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<Engine> {
        if self.config.time_budget.is_zero() {
            return Err(EngineError::Configuration(
                "time budget must be positive".to_string(),
            ));
        }
        if self.config.aspiration_initial_delta <= 0 {
            return Err(EngineError::Configuration(
                "aspiration delta must be positive".to_string(),
            ));
        }
        if self.config.tt_capacity == 0 {
            return Err(EngineError::Configuration(
                "transposition table needs at least one entry".to_string(),
            ));
        }

        let mut engine = Engine::with_config(self.config);
        if let Some(fen) = &self.fen {
            engine.load_fen(fen)?;
        }
        if let Some(handler) = self.progress_handler {
            engine.set_progress_handler(handler);
        }
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::Color;

    #[test]
    fn test_builder_defaults() {
        let engine = EngineBuilder::new().build().unwrap();
        assert_eq!(engine.config().max_depth, 11);
        assert_eq!(engine.side_to_move(), Color::White);
    }

    #[test]
    fn test_builder_clamps_depth() {
        let engine = EngineBuilder::new().with_max_depth(0).build().unwrap();
        assert_eq!(engine.config().max_depth, 1);

        let engine = EngineBuilder::new().with_max_depth(99).build().unwrap();
        assert_eq!(engine.config().max_depth, 20);
    }

    #[test]
    fn test_builder_from_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let engine = EngineBuilder::new().from_fen(fen).build().unwrap();
        assert_eq!(engine.side_to_move(), Color::Black);
    }

    #[test]
    fn test_builder_rejects_zero_budget() {
        let result = EngineBuilder::new()
            .with_time_budget(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_empty_transposition_table() {
        let result = EngineBuilder::new().with_transposition_capacity(0).build();
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_builder_search_options_are_applied() {
        let engine = EngineBuilder::new()
            .with_max_depth(6)
            .with_time_budget(Duration::from_secs(3))
            .with_quiescence_depth(2)
            .with_null_move_pruning(None)
            .with_late_move_reductions(false)
            .with_aspiration_delta(25)
            .build()
            .unwrap();

        let config = engine.config();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.time_budget, Duration::from_secs(3));
        assert_eq!(config.qs_max_depth, 2);
        assert_eq!(config.nmr_min_depth, None);
        assert!(!config.lmr_enabled);
        assert_eq!(config.aspiration_initial_delta, 25);
    }
}
