use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::dataset::Dataset;
use crate::domain::DEFAULT_BATCH_SIZE;
use crate::record::Record;

/// Row counters shown next to the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub total: usize,
    pub shown: usize,
    pub matched: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.shown >= self.matched
    }

    pub fn total_line(&self) -> String {
        format!("Total Rows: {}", self.total)
    }

    pub fn showing_line(&self) -> String {
        let still = if self.is_complete() {
            String::new()
        } else {
            format!(" (rendering… {}/{})", self.shown, self.matched)
        };
        format!(
            "Showing {} of {}{}",
            self.shown.min(self.matched),
            self.matched,
            still
        )
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.total_line(), self.showing_line())
    }
}

/// Anything rows can be painted into: an HTML document, a terminal table, a
/// test recorder.
pub trait RenderTarget {
    /// A new pass starts; rows painted by earlier passes are discarded.
    fn begin(&mut self, dataset: &Dataset, matched: usize);

    fn paint_row(&mut self, dataset: &Dataset, idx: usize, record: &Record);

    fn progress(&mut self, progress: Progress);

    /// Replaces the whole body with a single message row.
    fn error_row(&mut self, message: &str);

    fn finish(&mut self, _progress: Progress) {}
}

/// Permission to paint one batch of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTicket {
    generation: u64,
    start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// A batch was painted; the ticket continues the pass.
    Painted(BatchTicket),
    Done,
    /// The ticket belongs to an abandoned pass and painted nothing.
    Stale,
}

/// Paints the active rows in bounded batches. Every `restart` starts a new
/// generation; tickets from older generations are refused, so the last
/// restart always wins.
#[derive(Debug)]
pub struct IncrementalRenderer {
    rows: Arc<Vec<usize>>,
    generation: u64,
    batch_size: usize,
    painted: usize,
}

impl Default for IncrementalRenderer {
    fn default() -> Self {
        IncrementalRenderer::new(DEFAULT_BATCH_SIZE)
    }
}

impl IncrementalRenderer {
    pub fn new(batch_size: usize) -> Self {
        IncrementalRenderer {
            rows: Arc::new(Vec::new()),
            generation: 0,
            batch_size: batch_size.max(1),
            painted: 0,
        }
    }

    pub fn progress(&self, dataset: &Dataset) -> Progress {
        Progress {
            total: dataset.len(),
            shown: self.painted,
            matched: self.rows.len(),
        }
    }

    /// Abandon the current pass and prepare one over `rows`.
    pub fn restart(&mut self, rows: Vec<usize>) -> BatchTicket {
        self.generation += 1;
        self.rows = Arc::new(rows);
        self.painted = 0;
        debug!(
            "Render pass {} over {} rows",
            self.generation,
            self.rows.len()
        );
        BatchTicket {
            generation: self.generation,
            start: 0,
        }
    }

    pub fn paint_batch(
        &mut self,
        ticket: BatchTicket,
        dataset: &Dataset,
        target: &mut dyn RenderTarget,
    ) -> BatchOutcome {
        if ticket.generation != self.generation {
            trace!(
                "Refusing batch of pass {} (current {})",
                ticket.generation, self.generation
            );
            return BatchOutcome::Stale;
        }
        if ticket.start == 0 {
            target.begin(dataset, self.rows.len());
        }

        let end = (ticket.start + self.batch_size).min(self.rows.len());
        for &idx in self.rows.get(ticket.start..end).unwrap_or_default() {
            if let Some(record) = dataset.get(idx) {
                target.paint_row(dataset, idx, record);
            }
        }
        self.painted = end.max(self.painted);

        let progress = self.progress(dataset);
        target.progress(progress);
        if end >= self.rows.len() {
            target.finish(progress);
            BatchOutcome::Done
        } else {
            BatchOutcome::Painted(BatchTicket {
                generation: self.generation,
                start: end,
            })
        }
    }

    /// Paint a whole pass without yielding.
    pub fn run_to_completion(
        &mut self,
        rows: Vec<usize>,
        dataset: &Dataset,
        target: &mut dyn RenderTarget,
    ) -> Progress {
        let mut ticket = self.restart(rows);
        while let BatchOutcome::Painted(next) = self.paint_batch(ticket, dataset, target) {
            ticket = next;
        }
        self.progress(dataset)
    }

    /// Abandon any pass and show `message` instead of rows.
    pub fn show_error(&mut self, message: &str, dataset: &Dataset, target: &mut dyn RenderTarget) {
        self.restart(Vec::new());
        target.begin(dataset, 0);
        target.error_row(message);
        let progress = Progress::default();
        target.progress(progress);
        target.finish(progress);
    }
}

/// Pending batches waiting for an idle moment.
#[derive(Debug, Default)]
pub struct BatchQueue {
    pending: VecDeque<BatchTicket>,
}

impl BatchQueue {
    pub fn schedule(&mut self, ticket: BatchTicket) {
        self.pending.push_back(ticket);
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Paint at most one batch. Stale tickets are dropped on the way.
    /// Returns true when something was painted.
    pub fn tick(
        &mut self,
        renderer: &mut IncrementalRenderer,
        dataset: &Dataset,
        target: &mut dyn RenderTarget,
    ) -> bool {
        while let Some(ticket) = self.pending.pop_front() {
            match renderer.paint_batch(ticket, dataset, target) {
                BatchOutcome::Stale => continue,
                BatchOutcome::Painted(next) => {
                    self.pending.push_back(next);
                    return true;
                }
                BatchOutcome::Done => return true,
            }
        }
        false
    }
}
