use std::cmp::Ordering;
use std::time::Instant;

use tracing::trace;

use crate::dataset::{Dataset, DatasetKind, FEATURED_CATEGORY};
use crate::record::{Field, Record, compare_field};
use crate::search::SearchIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: Field,
    pub direction: SortDirection,
}

impl SortState {
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.direction {
            SortDirection::Asc => compare_field(self.field, a, b),
            SortDirection::Desc => compare_field(self.field, b, a),
        }
    }
}

/// Everything the user has asked for. The visible rows are always a pure
/// function of the dataset, the search index and this state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub query: String,
    pub min_views: i64,
    pub min_secondary: i64,
    pub category: Option<String>,
    pub sort: Option<SortState>,
}

impl ViewState {
    /// Same field flips the direction; a new field starts ascending.
    pub fn toggle_sort(&mut self, field: Field) {
        self.sort = match self.sort {
            Some(SortState { field: f, direction }) if f == field => Some(SortState {
                field,
                direction: match direction {
                    SortDirection::Asc => SortDirection::Desc,
                    SortDirection::Desc => SortDirection::Asc,
                },
            }),
            _ => Some(SortState {
                field,
                direction: SortDirection::Asc,
            }),
        };
    }

    /// Step through `options`, wrapping back to "all".
    pub fn cycle_category(&mut self, options: &[String]) {
        self.category = match &self.category {
            None => options.first().cloned(),
            Some(current) => options
                .iter()
                .position(|o| o == current)
                .and_then(|i| options.get(i + 1))
                .cloned(),
        };
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    fn accepts(&self, kind: DatasetKind, record: &Record) -> bool {
        if let Some(field) = kind.views_field()
            && record.number(field) < self.min_views
        {
            return false;
        }
        if let Some(field) = kind.secondary_field()
            && record.number(field) < self.min_secondary
        {
            return false;
        }
        match (&self.category, kind.category_field()) {
            (Some(category), _) if kind == DatasetKind::Artwork && category == FEATURED_CATEGORY => {
                record.flag(Field::Featured)
            }
            (Some(category), Some(field)) => record.text(field).trim() == category,
            _ => true,
        }
    }

    /// Indices of the records to show, in display order.
    pub fn active_rows(&self, dataset: &Dataset, index: &SearchIndex) -> Vec<usize> {
        let start_time = Instant::now();
        let candidates = if self.has_query() {
            index.search(&self.query)
        } else {
            (0..dataset.len()).collect()
        };

        let kind = dataset.kind();
        let records = dataset.records();
        let mut rows: Vec<usize> = candidates
            .into_iter()
            .filter(|&idx| records.get(idx).is_some_and(|r| self.accepts(kind, r)))
            .collect();

        if let Some(sort) = &self.sort {
            rows.sort_by(|&a, &b| sort.compare(&records[a], &records[b]));
        }
        trace!(
            "Filtering {} -> {} rows took {}ms",
            dataset.len(),
            rows.len(),
            start_time.elapsed().as_millis()
        );
        rows
    }
}
