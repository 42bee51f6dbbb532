//! Pipeline assembly
//!
//! Wires stages to their collaborators. [`Collaborators::from_config`]
//! builds the production agents and Airtable client; tests and dry runs
//! swap in their own.

use std::sync::Arc;

use recordflow_agents::{Agent, GeminiAgent, OpenAiAgent};
use recordflow_client::tables::TableNames;
use recordflow_client::{AirtableClient, RecordStore};
use recordflow_core::Pipeline;
use recordflow_core::domain::company::{CompanyCreated, CompanyDescription};
use recordflow_core::domain::person::{PeopleDescription, PersonRecordIds};

use crate::config::Config;
use crate::stages::{
    CreatePeopleAndPets, ParseDescription, PolishDescription, ResearchCompany, UpdateCompanyRecord,
};

pub const COMPANY_PIPELINE_ID: &str = "company-google-description";
pub const PEOPLE_PIPELINE_ID: &str = "person-pet-to-airtable-workflow";

pub type CompanyPipeline = Pipeline<CompanyCreated, CompanyDescription>;
pub type PeoplePipeline = Pipeline<PeopleDescription, Vec<PersonRecordIds>>;

/// Research, polish and write back a company description
pub fn company_description_pipeline(
    research: Arc<dyn Agent>,
    polish: Arc<dyn Agent>,
    store: Arc<dyn RecordStore>,
    tables: &TableNames,
) -> CompanyPipeline {
    Pipeline::new(COMPANY_PIPELINE_ID, ResearchCompany::new(research))
        .then(PolishDescription::new(polish))
        .then(UpdateCompanyRecord::new(store, tables.companies.clone()))
}

/// Extract people and pets from text and create their records
pub fn people_import_pipeline(
    extractor: Arc<dyn Agent>,
    store: Arc<dyn RecordStore>,
    tables: &TableNames,
) -> PeoplePipeline {
    Pipeline::new(PEOPLE_PIPELINE_ID, ParseDescription::new(extractor))
        .then(CreatePeopleAndPets::new(store, tables.clone()))
}

/// Everything the pipelines call out to
#[derive(Clone)]
pub struct Collaborators {
    /// Search-enabled agent drafting company descriptions
    pub research: Arc<dyn Agent>,
    pub polish: Arc<dyn Agent>,
    pub extractor: Arc<dyn Agent>,
    pub store: Arc<dyn RecordStore>,
    pub tables: TableNames,
}

impl Collaborators {
    /// Gemini for research, OpenAI for polishing and extraction, Airtable
    /// for records
    pub fn from_config(config: &Config) -> Self {
        let openai: Arc<dyn Agent> = Arc::new(OpenAiAgent::new(config.openai_config()));

        Self {
            research: Arc::new(GeminiAgent::new(config.gemini_config())),
            polish: openai.clone(),
            extractor: openai,
            store: Arc::new(AirtableClient::new(config.airtable_config())),
            tables: config.tables.clone(),
        }
    }

    /// Replaces the record store
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    pub fn company_pipeline(&self) -> CompanyPipeline {
        company_description_pipeline(
            self.research.clone(),
            self.polish.clone(),
            self.store.clone(),
            &self.tables,
        )
    }

    pub fn people_pipeline(&self) -> PeoplePipeline {
        people_import_pipeline(self.extractor.clone(), self.store.clone(), &self.tables)
    }
}
