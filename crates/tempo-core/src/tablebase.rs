use crate::board::Board;
use crate::error::{EngineError, Result};
use shakmaty::Chess;
use shakmaty_syzygy::Tablebase;
use std::path::Path;

/// Probing is only meaningful for positions the tables cover.
pub const MAX_TABLEBASE_PIECES: usize = 5;

/// A Syzygy WDL/DTZ tablebase directory.
pub struct EndgameTablebase {
    inner: Tablebase<Chess>,
}

impl EndgameTablebase {
    pub fn open(path: &Path) -> Result<Self> {
        let mut inner = Tablebase::new();
        let table_count = inner
            .add_directory(path)
            .map_err(|e| EngineError::TablebaseLoad(format!("{}: {}", path.display(), e)))?;
        if table_count == 0 {
            return Err(EngineError::TablebaseLoad(format!(
                "{}: directory contains no table files",
                path.display()
            )));
        }
        Ok(EndgameTablebase { inner })
    }

    /// Distance to zero from the side to move's viewpoint: positive when the
    /// side to move is winning, negative when losing, zero for a draw.
    /// `None` when the position is not covered by the loaded tables.
    pub fn probe_dtz(&self, board: &Board) -> Option<i32> {
        if board.piece_count() > MAX_TABLEBASE_PIECES {
            return None;
        }
        self.inner
            .probe_dtz(board.as_rules())
            .ok()
            .map(|dtz| dtz.ignore_rounding().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_directory_fails() {
        let result = EndgameTablebase::open(Path::new("/nonexistent/syzygy"));
        assert!(matches!(result, Err(EngineError::TablebaseLoad(_))));
    }
}
