use crate::{EngineError, ProgressHandler, Result};
use std::sync::{Arc, Mutex};
use tempo_core::{Board, Color, Move, SearchConfig, SearchDriver, SearchOutcome, SearchStats};

/// Facade over a position and a search driver: load a position, play moves,
/// ask for the best move. Moves cross this boundary as UCI coordinate
/// strings; an input move the position cannot make is surfaced as an error
/// and nothing is searched.
pub struct Engine {
    board: Board,
    driver: SearchDriver,
    progress_handler: Option<Arc<Mutex<dyn ProgressHandler>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Engine {
            board: Board::new(),
            driver: SearchDriver::new(config),
            progress_handler: None,
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut engine = Self::new();
        engine.load_fen(fen)?;
        Ok(engine)
    }

    pub fn set_progress_handler(&mut self, handler: Arc<Mutex<dyn ProgressHandler>>) {
        self.progress_handler = Some(handler);
    }

    pub fn config(&self) -> &SearchConfig {
        self.driver.config()
    }

    pub fn load_fen(&mut self, fen: &str) -> Result<()> {
        self.board = Board::from_fen(fen)?;
        Ok(())
    }

    pub fn fen(&self) -> String {
        self.board.fen()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.turn()
    }

    pub fn legal_moves(&self) -> Vec<String> {
        self.board
            .legal_moves()
            .into_iter()
            .map(|m| m.to_string())
            .collect()
    }

    /// Plays a move given in coordinate notation.
    pub fn make_move(&mut self, uci: &str) -> Result<()> {
        let mv: Move = uci.parse().map_err(EngineError::from)?;
        self.board.push(mv).map_err(EngineError::from)
    }

    pub fn undo_move(&mut self) -> Result<()> {
        self.board.pop().map_err(EngineError::from)
    }

    pub fn is_game_over(&self) -> bool {
        !self.board.has_legal_moves() || self.board.is_draw()
    }

    /// Static evaluation of the current position, White-relative centipawns.
    pub fn evaluate(&mut self) -> i32 {
        self.driver.evaluate(&self.board)
    }

    /// Runs the full driver (book, tablebase, iterative deepening) and
    /// returns the chosen move as a UCI string, or `None` when the side to
    /// move has no legal moves.
    pub fn find_best_move(&mut self) -> Result<Option<String>> {
        let outcome = self.search()?;
        Ok(outcome.best_move.map(|m| m.to_string()))
    }

    /// Like [`find_best_move`](Self::find_best_move) but exposing the score,
    /// per-depth summaries and node statistics.
    pub fn search(&mut self) -> Result<SearchOutcome> {
        let outcome = self.driver.search(&mut self.board)?;

        if let Some(handler) = &self.progress_handler {
            if let Ok(mut handler) = handler.try_lock() {
                for summary in &outcome.depth_summaries {
                    handler.on_depth_completed(summary);
                }
            }
        }

        Ok(outcome)
    }

    pub fn last_search_stats(&self) -> SearchStats {
        self.driver.stats()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_starts_at_the_initial_position() {
        let engine = Engine::new();
        assert_eq!(engine.side_to_move(), Color::White);
        assert_eq!(engine.legal_moves().len(), 20);
        assert!(!engine.is_game_over());
    }

    #[test]
    fn test_from_fen_round_trips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let engine = Engine::from_fen(fen).unwrap();
        assert_eq!(engine.fen(), fen);
    }

    #[test]
    fn test_make_move_flips_turn_and_undo_restores() {
        let mut engine = Engine::new();
        let fen_before = engine.fen();

        engine.make_move("e2e4").unwrap();
        assert_eq!(engine.side_to_move(), Color::Black);

        engine.undo_move().unwrap();
        assert_eq!(engine.fen(), fen_before);
    }

    #[test]
    fn test_illegal_move_input_is_surfaced() {
        let mut engine = Engine::new();
        assert!(engine.make_move("e2e5").is_err());
        assert!(engine.make_move("not a move").is_err());
        // The position is untouched.
        assert_eq!(engine.side_to_move(), Color::White);
    }

    #[test]
    fn test_game_over_detection() {
        let engine =
            Engine::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(engine.is_game_over());
    }
}
