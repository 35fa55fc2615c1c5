//! Semantic roles assigned to runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic classification of a run.
///
/// Roles are derived, never stored on a run: they can always be recomputed
/// from the run and the threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Most senior heading level
    Heading1,
    /// Second heading level
    Heading2,
    /// Third heading level
    Heading3,
    /// Body text
    Paragraph,
    /// Bold body-sized text promoted out of the paragraph flow
    Emphasis,
    /// Text whose font metrics are unusable
    Unknown,
}

impl Role {
    /// Heading level (1-3), or `None` for non-heading roles.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Role::Heading1 => Some(1),
            Role::Heading2 => Some(2),
            Role::Heading3 => Some(3),
            _ => None,
        }
    }

    /// Role for a heading level; levels outside 1-3 yield `None`.
    pub fn from_heading_level(level: u8) -> Option<Role> {
        match level {
            1 => Some(Role::Heading1),
            2 => Some(Role::Heading2),
            3 => Some(Role::Heading3),
            _ => None,
        }
    }

    /// Check if this is a heading role.
    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    /// Rank used for monotonicity checks: higher means more senior.
    ///
    /// Emphasis, paragraph and unknown text all rank below every heading.
    pub fn rank(self) -> u8 {
        match self {
            Role::Heading1 => 3,
            Role::Heading2 => 2,
            Role::Heading3 => 1,
            Role::Paragraph | Role::Emphasis | Role::Unknown => 0,
        }
    }

    /// Stable lowercase tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Heading1 => "heading1",
            Role::Heading2 => "heading2",
            Role::Heading3 => "heading3",
            Role::Paragraph => "paragraph",
            Role::Emphasis => "emphasis",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
