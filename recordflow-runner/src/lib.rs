//! RecordFlow Runner
//!
//! The concrete pipelines: stages, agent prompts and the configuration
//! needed to wire them to real collaborators.
//!
//! Architecture:
//! - Configuration: credentials, endpoints and call limits
//! - Stages: one type per transformation step
//! - Workflows: stage composition into the company description and people
//!   import pipelines
//!
//! The orchestrator runs these pipelines in the background when a trigger
//! arrives; the CLI runs them in the foreground.

pub mod config;
pub mod prompts;
pub mod stages;
pub mod workflows;

pub use config::Config;
pub use workflows::{
    COMPANY_PIPELINE_ID, Collaborators, CompanyPipeline, PEOPLE_PIPELINE_ID, PeoplePipeline,
    company_description_pipeline, people_import_pipeline,
};
