//! RecordFlow Core
//!
//! Core types and abstractions for the RecordFlow pipelines.
//!
//! This crate contains:
//! - Domain types: runs, company description payloads, people and pets
//! - DTOs: request and response bodies shared by the orchestrator and the CLI
//! - Pipeline: the stage contract and the sequential pipeline runner
//! - Retry: bounded retry with backoff and per-call deadlines for collaborator calls

pub mod domain;
pub mod dto;
pub mod pipeline;
pub mod retry;
pub mod validate;

pub use pipeline::{Pipeline, PipelineError, RunObserver, Stage, StageFailure};
pub use validate::{Validate, ValidationError};
