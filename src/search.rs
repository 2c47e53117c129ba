use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::dataset::Dataset;

/// One search result: dataset index and its score (0 = exact, 1 = nothing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub idx: usize,
    pub score: f64,
}

/// Fuzzy index over the searchable text fields of a dataset. Built once per
/// load; the text is pre-lowered so queries only pay for matching.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<Vec<Vec<char>>>,
    threshold: f64,
}

impl SearchIndex {
    pub fn build(dataset: &Dataset, threshold: f64) -> Self {
        let start_time = Instant::now();
        let fields = dataset.kind().search_fields();
        let entries: Vec<Vec<Vec<char>>> = dataset
            .records()
            .par_iter()
            .map(|record| {
                fields
                    .iter()
                    .map(|f| record.text(*f).to_lowercase().chars().collect::<Vec<char>>())
                    .filter(|text| !text.is_empty())
                    .collect()
            })
            .collect();
        debug!(
            "Indexing {} records over {} fields took {}ms ...",
            entries.len(),
            fields.len(),
            start_time.elapsed().as_millis()
        );
        SearchIndex { entries, threshold }
    }

    /// Hits within the threshold, best first. Ties keep dataset order.
    pub fn search_scored(&self, query: &str) -> Vec<SearchHit> {
        let pattern: Vec<char> = query.trim().to_lowercase().chars().collect();
        if pattern.is_empty() {
            return (0..self.entries.len())
                .map(|idx| SearchHit { idx, score: 0.0 })
                .collect();
        }

        let start_time = Instant::now();
        let mut hits: Vec<SearchHit> = self
            .entries
            .par_iter()
            .enumerate()
            .filter_map(|(idx, fields)| {
                let score = fields
                    .iter()
                    .map(|text| match_score(&pattern, text))
                    .fold(1.0_f64, f64::min);
                (score <= self.threshold).then_some(SearchHit { idx, score })
            })
            .collect();
        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        trace!(
            "Search \"{}\" found {} hits in {}ms",
            query,
            hits.len(),
            start_time.elapsed().as_millis()
        );
        hits
    }

    /// Dataset indices in relevance order. An empty query is the identity set.
    pub fn search(&self, query: &str) -> Vec<usize> {
        self.search_scored(query).into_iter().map(|h| h.idx).collect()
    }
}

/// Fewest edits needed to match `pattern` against any substring of `text`,
/// divided by the pattern length. Where the match sits in the text does not
/// matter.
pub fn match_score(pattern: &[char], text: &[char]) -> f64 {
    let m = pattern.len();
    if m == 0 {
        return 0.0;
    }
    if text.is_empty() {
        return 1.0;
    }

    // Column-wise over the text: prev[i] is the cost of matching the first i
    // pattern chars ending at the previous text position. Row 0 is free so a
    // match can start anywhere.
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut best = prev[m];
    let mut curr = vec![0usize; m + 1];
    for &tc in text {
        curr[0] = 0;
        for i in 1..=m {
            let substitution = prev[i - 1] + usize::from(pattern[i - 1] != tc);
            let insertion = prev[i] + 1;
            let deletion = curr[i - 1] + 1;
            curr[i] = substitution.min(insertion).min(deletion);
        }
        best = best.min(curr[m]);
        if best == 0 {
            break;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best as f64 / m as f64).min(1.0)
}
