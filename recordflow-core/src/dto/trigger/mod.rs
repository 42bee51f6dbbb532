//! Trigger DTOs
//!
//! Webhook bodies are deserialized with every field optional so that a
//! missing field can be reported as a client error instead of a generic
//! deserialization failure.

use serde::{Deserialize, Serialize};

use crate::domain::company::CompanyCreated;
use crate::domain::person::PeopleDescription;

/// Body of `POST /airtable/company-created`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreatedPayload {
    #[serde(default)]
    pub airtable_record_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CompanyCreatedPayload {
    /// Returns the pipeline input, or `None` when a field is missing or blank
    pub fn into_input(self) -> Option<CompanyCreated> {
        let airtable_record_id = non_blank(self.airtable_record_id)?;
        let name = non_blank(self.name)?;
        Some(CompanyCreated {
            airtable_record_id,
            name,
        })
    }
}

/// Body of `POST /people/import`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeopleImportPayload {
    #[serde(default)]
    pub description: Option<String>,
}

impl PeopleImportPayload {
    pub fn into_input(self) -> Option<PeopleDescription> {
        non_blank(self.description).map(|description| PeopleDescription { description })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
