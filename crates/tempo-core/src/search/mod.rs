pub mod driver;
pub mod engine;
pub mod ordering;
pub mod tt;

pub use driver::{DepthSummary, SearchDriver, SearchOutcome};
pub use engine::SearchEngine;
pub use ordering::MoveOrderer;
pub use tt::{Bound, TranspositionTable, TtEntry, TtProbe};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Window bound well outside any achievable evaluation; also the score of a
/// checkmated side-to-move inside the search.
pub const INFINITY_SCORE: i32 = 100_000;

/// Deepest ply the killer table covers.
pub const MAX_SEARCH_DEPTH: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub time_budget: Duration,
    pub qs_max_depth: u8,
    /// Null-move pruning applies strictly above this depth; `None` disables it.
    pub nmr_min_depth: Option<u8>,
    pub nmr_reduction: u8,
    pub lmr_enabled: bool,
    /// Futility margins indexed by remaining depth; the list length bounds
    /// the depths at which futility pruning applies.
    pub futility_margins: Vec<i32>,
    pub aspiration_initial_delta: i32,
    /// Widening steps after an aspiration miss; `None` means a full-width
    /// re-search.
    pub aspiration_widening: Vec<Option<i32>>,
    pub tt_capacity: usize,
    pub book_path: Option<PathBuf>,
    pub tablebase_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: 11,
            time_budget: Duration::from_secs(7),
            qs_max_depth: 3,
            nmr_min_depth: Some(3),
            nmr_reduction: 2,
            lmr_enabled: true,
            futility_margins: vec![0, 200, 300],
            aspiration_initial_delta: 50,
            aspiration_widening: vec![Some(100), None],
            tt_capacity: 1_000_000,
            book_path: None,
            tablebase_path: None,
        }
    }
}

/// Reporting-only counters; they never influence the search result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth: u8,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_depth, 11);
        assert_eq!(config.time_budget, Duration::from_secs(7));
        assert_eq!(config.qs_max_depth, 3);
        assert_eq!(config.nmr_min_depth, Some(3));
        assert_eq!(config.futility_margins, vec![0, 200, 300]);
        assert!(config.lmr_enabled);
        assert!(config.book_path.is_none());
    }
}
