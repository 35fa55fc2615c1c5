//! Threshold table and threshold strategies.

use serde::{Deserialize, Serialize};

use super::statistics::FontStatistics;
use crate::error::ClassificationConfigError;

type Result<T> = std::result::Result<T, ClassificationConfigError>;

/// Font-size bands that separate heading levels from body text.
///
/// Each value is an inclusive lower bound in points. A valid table has
/// `heading1_min_size > heading2_min_size > heading3_min_size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Smallest size classified as a level-1 heading
    pub heading1_min_size: f32,
    /// Smallest size classified as a level-2 heading
    pub heading2_min_size: f32,
    /// Smallest size classified as a level-3 heading
    pub heading3_min_size: f32,
    /// Promote bold body-sized runs to emphasis
    pub bold_implies_heading: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            heading1_min_size: 24.0,
            heading2_min_size: 18.0,
            heading3_min_size: 14.0,
            bold_implies_heading: false,
        }
    }
}

impl Thresholds {
    /// Create a threshold table (unvalidated; see [`Thresholds::validate`]).
    pub fn new(heading1_min_size: f32, heading2_min_size: f32, heading3_min_size: f32) -> Self {
        Self {
            heading1_min_size,
            heading2_min_size,
            heading3_min_size,
            bold_implies_heading: false,
        }
    }

    /// Set whether bold body text becomes emphasis.
    pub fn with_bold_implies_heading(mut self, enabled: bool) -> Self {
        self.bold_implies_heading = enabled;
        self
    }

    /// Parse a (possibly partial) table from JSON and validate it.
    ///
    /// Missing keys take their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let thresholds: Thresholds = serde_json::from_str(json)
            .map_err(|e| ClassificationConfigError::Parse(e.to_string()))?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that every band is a positive finite size and that the bands
    /// strictly descend.
    pub fn validate(&self) -> Result<()> {
        let bands = [
            ("heading1_min_size", self.heading1_min_size),
            ("heading2_min_size", self.heading2_min_size),
            ("heading3_min_size", self.heading3_min_size),
        ];

        for (name, value) in bands {
            if !value.is_finite() {
                return Err(ClassificationConfigError::NotFinite { name });
            }
            if value <= 0.0 {
                return Err(ClassificationConfigError::NonPositive { name, value });
            }
        }

        for pair in bands.windows(2) {
            let (upper, upper_value) = pair[0];
            let (lower, lower_value) = pair[1];
            if lower_value >= upper_value {
                return Err(ClassificationConfigError::InvertedBands {
                    upper,
                    upper_value,
                    lower,
                    lower_value,
                });
            }
        }

        Ok(())
    }
}

/// How the threshold table for a conversion is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ThresholdStrategy {
    /// A caller-supplied table.
    Fixed(Thresholds),
    /// Bands derived from the document's body size.
    ///
    /// The body size is the most common font size, weighted by character
    /// count; each band is `body_size * ratio`.
    Adaptive {
        h1_ratio: f32,
        h2_ratio: f32,
        h3_ratio: f32,
        bold_implies_heading: bool,
    },
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        ThresholdStrategy::Fixed(Thresholds::default())
    }
}

impl From<Thresholds> for ThresholdStrategy {
    fn from(thresholds: Thresholds) -> Self {
        ThresholdStrategy::Fixed(thresholds)
    }
}

impl ThresholdStrategy {
    /// Adaptive strategy with the default ratios (1.5 / 1.3 / 1.15).
    pub fn adaptive() -> Self {
        ThresholdStrategy::Adaptive {
            h1_ratio: 1.5,
            h2_ratio: 1.3,
            h3_ratio: 1.15,
            bold_implies_heading: false,
        }
    }

    /// Whether the strategy needs a statistics pass over the runs.
    pub fn needs_statistics(&self) -> bool {
        matches!(self, ThresholdStrategy::Adaptive { .. })
    }

    /// Validate everything that can be checked without looking at a document.
    pub fn validate(&self) -> Result<()> {
        match self {
            ThresholdStrategy::Fixed(thresholds) => thresholds.validate(),
            ThresholdStrategy::Adaptive {
                h1_ratio,
                h2_ratio,
                h3_ratio,
                ..
            } => {
                for (name, value) in [
                    ("h1_ratio", *h1_ratio),
                    ("h2_ratio", *h2_ratio),
                    ("h3_ratio", *h3_ratio),
                ] {
                    if !value.is_finite() || value <= 1.0 {
                        return Err(ClassificationConfigError::InvalidRatio { name, value });
                    }
                }
                // Same ordering rule as a fixed table, on a unit body size
                Thresholds::new(*h1_ratio, *h2_ratio, *h3_ratio).validate()
            }
        }
    }

    /// Produce the concrete table for a document.
    pub fn resolve(&self, stats: &FontStatistics) -> Result<Thresholds> {
        let thresholds = match *self {
            ThresholdStrategy::Fixed(thresholds) => thresholds,
            ThresholdStrategy::Adaptive {
                h1_ratio,
                h2_ratio,
                h3_ratio,
                bold_implies_heading,
            } => {
                let body = stats.body_size();
                Thresholds {
                    heading1_min_size: body * h1_ratio,
                    heading2_min_size: body * h2_ratio,
                    heading3_min_size: body * h3_ratio,
                    bold_implies_heading,
                }
            }
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Set whether bold body text becomes emphasis.
    pub fn with_bold_implies_heading(self, enabled: bool) -> Self {
        match self {
            ThresholdStrategy::Fixed(t) => ThresholdStrategy::Fixed(t.with_bold_implies_heading(enabled)),
            ThresholdStrategy::Adaptive {
                h1_ratio,
                h2_ratio,
                h3_ratio,
                ..
            } => ThresholdStrategy::Adaptive {
                h1_ratio,
                h2_ratio,
                h3_ratio,
                bold_implies_heading: enabled,
            },
        }
    }
}
