//! Company description payloads
//!
//! The company pipeline enriches one payload per stage:
//! `CompanyCreated` → `CompanyDraft` → `CompanyDescription`.

use serde::{Deserialize, Serialize};

use crate::validate::{Validate, ValidationError, require_text, word_count};

/// Upper bound on the polished description length, in words
pub const MAX_DESCRIPTION_WORDS: usize = 120;

/// A company record that needs a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreated {
    /// Record id of the company in the record store
    pub airtable_record_id: String,
    pub name: String,
}

/// Research output: a verbose draft gathered from web search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDraft {
    pub airtable_record_id: String,
    pub name: String,
    pub draft: String,
}

/// Polished, anonymized description ready to be written back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDescription {
    pub airtable_record_id: String,
    pub description: String,
}

impl Validate for CompanyCreated {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("airtableRecordId", &self.airtable_record_id)?;
        require_text("name", &self.name)
    }
}

impl Validate for CompanyDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("airtableRecordId", &self.airtable_record_id)?;
        require_text("draft", &self.draft)
    }
}

impl Validate for CompanyDescription {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("airtableRecordId", &self.airtable_record_id)?;
        require_text("description", &self.description)?;

        let words = word_count(&self.description);
        if words > MAX_DESCRIPTION_WORDS {
            return Err(ValidationError::new(
                "description",
                format!(
                    "has {} words, at most {} allowed",
                    words, MAX_DESCRIPTION_WORDS
                ),
            ));
        }
        Ok(())
    }
}
