//! Structural validation for stage payloads
//!
//! Every payload a stage consumes or produces implements [`Validate`]. The
//! pipeline runner validates the pipeline input before the first stage runs
//! and every stage output before it is forwarded.

use thiserror::Error;

/// A payload did not match its declared shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Path of the offending field (e.g. `[0].pets[1].name`)
    pub field: String,
    /// Human readable reason
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for a required field that is absent or blank
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }

    /// Prefix the field path with its parent
    pub fn within(mut self, parent: impl AsRef<str>) -> Self {
        let parent = parent.as_ref();
        self.field = if self.field.starts_with('[') || parent.is_empty() {
            format!("{}{}", parent, self.field)
        } else {
            format!("{}.{}", parent, self.field)
        };
        self
    }
}

/// Structural validation of a payload
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        for (idx, item) in self.iter().enumerate() {
            item.validate()
                .map_err(|e| e.within(format!("[{}]", idx)))?;
        }
        Ok(())
    }
}

/// Require a non-blank string field
pub fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

/// Count whitespace separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
