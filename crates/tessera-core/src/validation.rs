//! Accumulator for validation failures.
//!
//! Validation failures are data, not control flow: every check appends a
//! human-readable line and the caller decides when to turn the accumulated
//! text into an error.

use std::fmt;

/// An ordered collection of validation failure messages.
///
/// Each pushed message becomes one line of the rendered report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    lines: Vec<String>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one failure message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.lines.push(message.into());
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of recorded messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns an iterator over the recorded messages.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Joins the recorded messages with `separator`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.lines.join(separator)
    }

    /// Moves every message of `other` to the end of this collection.
    pub fn merge(&mut self, other: Self) {
        self.lines.extend(other.lines);
    }

    /// Returns `Ok(())` when empty, otherwise the newline-joined report.
    ///
    /// # Errors
    ///
    /// Returns the full report if at least one message was recorded.
    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_string())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("\n"))
    }
}

impl IntoIterator for ValidationErrors {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl FromIterator<String> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Returns true if `value` is empty or contains only whitespace.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
