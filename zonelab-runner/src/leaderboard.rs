//! Leaderboard — bounded, deduplicated, sorted by the ranking metric.
//!
//! Dedup key is the content-addressed run id: the same configuration can
//! only hold one slot, and only a better score replaces it.

use crate::rank::RankMetric;
use crate::search::CompletedRun;

/// Outcome of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Replaced an existing entry with the same run id.
    Replaced,
    /// Duplicate with a worse score, a non-finite score, or a full board.
    Skipped,
}

#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<CompletedRun>,
    max_size: usize,
    metric: RankMetric,
}

impl Leaderboard {
    pub fn new(max_size: usize, metric: RankMetric) -> Self {
        Self {
            entries: Vec::with_capacity(max_size.min(1024)),
            max_size,
            metric,
        }
    }

    /// Entries sorted best-first.
    pub fn entries(&self) -> &[CompletedRun] {
        &self.entries
    }

    pub fn insert(&mut self, run: CompletedRun) -> InsertOutcome {
        if !run.score.is_finite() {
            return InsertOutcome::Skipped;
        }

        if let Some(idx) = self.entries.iter().position(|e| e.run_id == run.run_id) {
            if self.metric.is_better(run.score, self.entries[idx].score) {
                self.entries[idx] = run;
                self.sort();
                return InsertOutcome::Replaced;
            }
            return InsertOutcome::Skipped;
        }

        if self.entries.len() < self.max_size {
            self.entries.push(run);
            self.sort();
            return InsertOutcome::Inserted;
        }

        match self.entries.last() {
            Some(worst) if self.metric.is_better(run.score, worst.score) => {
                let last = self.entries.len() - 1;
                self.entries[last] = run;
                self.sort();
                InsertOutcome::Inserted
            }
            _ => InsertOutcome::Skipped,
        }
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
}
