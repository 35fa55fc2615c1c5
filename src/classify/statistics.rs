//! Font size statistics for adaptive thresholds.

use std::collections::BTreeMap;

use crate::model::TextRun;

/// Body size assumed when a document has no usable runs.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Character-weighted histogram of font sizes.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Size in tenths of a point → number of characters set at that size
    size_histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    /// Build statistics from a set of runs.
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> Self {
        let mut stats = Self::default();
        for run in runs {
            stats.add_run(run);
        }
        stats
    }

    /// Record one run, weighted by its visible character count.
    pub fn add_run(&mut self, run: &TextRun) {
        self.add_size(run.font_size(), run.char_count().max(1));
    }

    /// Add a font size observation with a weight.
    pub fn add_size(&mut self, size: f32, weight: usize) {
        if !size.is_finite() || size <= 0.0 {
            return;
        }
        let key = (size * 10.0).round() as i32; // Round to 0.1 precision
        *self.size_histogram.entry(key).or_insert(0) += weight;
    }

    /// Whether any size was recorded.
    pub fn is_empty(&self) -> bool {
        self.size_histogram.is_empty()
    }

    /// The most common size (body text). Ties go to the smaller size.
    pub fn body_size(&self) -> f32 {
        self.size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .map(|(key, _)| *key as f32 / 10.0)
            .unwrap_or(DEFAULT_BODY_SIZE)
    }
}
