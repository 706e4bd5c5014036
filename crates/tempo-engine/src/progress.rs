use tempo_core::DepthSummary;

/// Receives one callback per completed iterative-deepening depth after a
/// search finishes.
pub trait ProgressHandler: Send + Sync {
    fn on_depth_completed(&mut self, summary: &DepthSummary);
}

/// Collects the summaries for later inspection.
pub struct CollectingProgressHandler {
    summaries: Vec<DepthSummary>,
}

impl CollectingProgressHandler {
    pub fn new() -> Self {
        CollectingProgressHandler {
            summaries: Vec::new(),
        }
    }

    pub fn summaries(&self) -> &[DepthSummary] {
        &self.summaries
    }

    pub fn clear(&mut self) {
        self.summaries.clear();
    }
}

impl ProgressHandler for CollectingProgressHandler {
    fn on_depth_completed(&mut self, summary: &DepthSummary) {
        self.summaries.push(*summary);
    }
}

impl Default for CollectingProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the conventional progress lines to stderr.
pub struct StderrProgressHandler;

impl ProgressHandler for StderrProgressHandler {
    fn on_depth_completed(&mut self, summary: &DepthSummary) {
        eprintln!(
            "Depth {} completed. Best move: {}, Value: {}",
            summary.depth, summary.best_move, summary.score
        );
    }
}
