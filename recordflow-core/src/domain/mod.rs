//! Core domain types
//!
//! This module contains the payloads that flow between pipeline stages and
//! the run record the runner maintains while a pipeline executes. They are
//! shared between the orchestrator (tracks runs), the runner (executes
//! stages) and the CLI (displays results).

pub mod company;
pub mod person;
pub mod run;
