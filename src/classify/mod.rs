//! Font-style classification.
//!
//! Maps a run's font size and weight to a [`Role`] using a band table.
//! Classification looks at one run at a time; surrounding runs never
//! change the outcome.

mod statistics;
mod thresholds;

pub use statistics::{FontStatistics, DEFAULT_BODY_SIZE};
pub use thresholds::{ThresholdStrategy, Thresholds};

use crate::error::ClassificationConfigError;
use crate::model::{Role, TextRun};

/// Classify a run.
///
/// Sizes that are not positive finite numbers yield [`Role::Unknown`].
/// Band lower bounds are inclusive, so a size exactly on a boundary gets
/// the more senior level.
pub fn classify(run: &TextRun, thresholds: &Thresholds) -> Role {
    classify_style(run.font_size(), run.is_bold(), thresholds)
}

/// Classify a bare (size, bold) pair.
pub fn classify_style(size: f32, bold: bool, thresholds: &Thresholds) -> Role {
    if !size.is_finite() || size <= 0.0 {
        return Role::Unknown;
    }

    if size >= thresholds.heading1_min_size {
        Role::Heading1
    } else if size >= thresholds.heading2_min_size {
        Role::Heading2
    } else if size >= thresholds.heading3_min_size {
        Role::Heading3
    } else if thresholds.bold_implies_heading && bold {
        Role::Emphasis
    } else {
        Role::Paragraph
    }
}

/// A classifier bound to a validated threshold table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontStyleClassifier {
    thresholds: Thresholds,
}

impl FontStyleClassifier {
    /// Validate the table and build a classifier.
    pub fn new(thresholds: Thresholds) -> Result<Self, ClassificationConfigError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Resolve a strategy against a set of runs and build a classifier.
    pub fn for_runs(strategy: &ThresholdStrategy, runs: &[TextRun]) -> Result<Self, ClassificationConfigError> {
        let stats = if strategy.needs_statistics() {
            let stats = FontStatistics::from_runs(runs);
            log::debug!("Body font size: {:.1}pt", stats.body_size());
            stats
        } else {
            FontStatistics::default()
        };
        Self::new(strategy.resolve(&stats)?)
    }

    /// The table in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify one run.
    pub fn classify(&self, run: &TextRun) -> Role {
        classify(run, &self.thresholds)
    }
}
