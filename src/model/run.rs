//! Text runs produced by extraction.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Font style flags that drive classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontStyle {
    /// Bold (or heavier) weight
    pub bold: bool,
    /// Italic or oblique
    pub italic: bool,
}

impl FontStyle {
    /// Regular (non-bold, non-italic) style.
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
    };

    /// Bold style.
    pub const BOLD: FontStyle = FontStyle {
        bold: true,
        italic: false,
    };

    /// Infer bold/italic flags from a PostScript font name such as
    /// `ABCDEF+Helvetica-BoldOblique`.
    pub fn from_font_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let bold = ["bold", "black", "heavy", "semibold", "demi"]
            .iter()
            .any(|w| lower.contains(w));
        let italic = lower.contains("italic") || lower.contains("oblique");
        Self { bold, italic }
    }

    /// Combine two sources of style evidence.
    pub fn union(self, other: FontStyle) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
        }
    }
}

/// Where a run sits in the document's reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunPosition {
    /// Page index (0-based)
    pub page: usize,
    /// Text object (BT/ET) index within the page
    pub block: usize,
    /// Line index within the text object
    pub line: usize,
    /// Document-wide insertion sequence; unique per run
    pub sequence: u64,
}

/// A maximal span of text sharing one font and style.
///
/// Runs are immutable once extracted; fields are only reachable through
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    text: String,
    font_size: f32,
    font_name: String,
    style: FontStyle,
    position: RunPosition,
    /// Origin in user space (x, y); used for geometric reading order only.
    origin: (f32, f32),
}

impl TextRun {
    /// Create a run.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        style: FontStyle,
        position: RunPosition,
        origin: (f32, f32),
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
            style,
            position,
            origin,
        }
    }

    /// Convenience constructor for runs that did not come from a PDF page,
    /// e.g. when feeding the classifier or builder directly.
    pub fn synthetic(text: impl Into<String>, font_size: f32, bold: bool, sequence: u64) -> Self {
        Self::new(
            text,
            font_size,
            "",
            FontStyle {
                bold,
                italic: false,
            },
            RunPosition {
                page: 0,
                block: 0,
                line: 0,
                sequence,
            },
            (0.0, 0.0),
        )
    }

    /// The run's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Effective font size in points.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Base font name as declared by the PDF.
    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    /// Style flags.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Whether the run is set in a bold face.
    pub fn is_bold(&self) -> bool {
        self.style.bold
    }

    /// Whether the run is set in an italic face.
    pub fn is_italic(&self) -> bool {
        self.style.italic
    }

    /// Position in reading order.
    pub fn position(&self) -> RunPosition {
        self.position
    }

    /// Page index (0-based).
    pub fn page_index(&self) -> usize {
        self.position.page
    }

    /// Document-wide sequence number.
    pub fn sequence(&self) -> u64 {
        self.position.sequence
    }

    /// Origin in PDF user space.
    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    /// Total order key: page first, then insertion sequence.
    pub fn order_key(&self) -> (usize, u64) {
        (self.position.page, self.position.sequence)
    }

    /// Compare two runs by reading order.
    pub fn cmp_order(&self, other: &TextRun) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }

    /// Character count, used to weight font statistics.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Return a copy with a new sequence number.
    pub(crate) fn with_sequence(mut self, sequence: u64) -> Self {
        self.position.sequence = sequence;
        self
    }
}
