//! Company description stages

use std::sync::Arc;

use async_trait::async_trait;
use recordflow_agents::{Agent, GenerateRequest};
use recordflow_client::RecordStore;
use recordflow_client::tables::company_description_fields;
use recordflow_core::domain::company::{CompanyCreated, CompanyDescription, CompanyDraft};
use recordflow_core::{Stage, StageFailure};
use tracing::{debug, info};

use super::RECORD_STORE;
use crate::prompts;

/// Drafts a verbose description of a company from web search results
pub struct ResearchCompany {
    agent: Arc<dyn Agent>,
}

impl ResearchCompany {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Stage for ResearchCompany {
    type Input = CompanyCreated;
    type Output = CompanyDraft;

    fn id(&self) -> &'static str {
        "search-company-info"
    }

    async fn execute(&self, input: CompanyCreated) -> Result<CompanyDraft, StageFailure> {
        info!("Researching company '{}' with {}", input.name, self.agent.name());

        let request = GenerateRequest::new(prompts::RESEARCH_INSTRUCTIONS)
            .user(prompts::research_request(&input.name))
            .with_web_search();

        let draft = self
            .agent
            .generate(&request)
            .await
            .map_err(|e| StageFailure::collaborator("research agent", e))?;

        debug!("Draft for '{}' has {} characters", input.name, draft.len());

        Ok(CompanyDraft {
            airtable_record_id: input.airtable_record_id,
            name: input.name,
            draft: draft.trim().to_string(),
        })
    }
}

/// Compresses a draft into one short anonymized paragraph
pub struct PolishDescription {
    agent: Arc<dyn Agent>,
}

impl PolishDescription {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Stage for PolishDescription {
    type Input = CompanyDraft;
    type Output = CompanyDescription;

    fn id(&self) -> &'static str {
        "polish-description"
    }

    async fn execute(&self, input: CompanyDraft) -> Result<CompanyDescription, StageFailure> {
        let request = GenerateRequest::new(prompts::POLISH_INSTRUCTIONS)
            .user(prompts::polish_request(&input.draft));

        let description = self
            .agent
            .generate(&request)
            .await
            .map_err(|e| StageFailure::collaborator("polish agent", e))?;

        Ok(CompanyDescription {
            airtable_record_id: input.airtable_record_id,
            description: description.trim().to_string(),
        })
    }
}

/// Writes the polished description back and marks the company synchronized
pub struct UpdateCompanyRecord {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl UpdateCompanyRecord {
    pub fn new(store: Arc<dyn RecordStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl Stage for UpdateCompanyRecord {
    type Input = CompanyDescription;
    type Output = CompanyDescription;

    fn id(&self) -> &'static str {
        "update-company-record"
    }

    async fn execute(&self, input: CompanyDescription) -> Result<CompanyDescription, StageFailure> {
        info!(
            "Updating record {} in table {}",
            input.airtable_record_id, self.table
        );

        self.store
            .update(
                &self.table,
                &input.airtable_record_id,
                company_description_fields(&input.description),
            )
            .await
            .map_err(|e| StageFailure::collaborator(RECORD_STORE, e))?;

        Ok(input)
    }
}
