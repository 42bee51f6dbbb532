//! Data Transfer Objects for inter-service communication
//!
//! This module contains DTOs exchanged between the orchestrator and its
//! callers (the record store webhook and the CLI). They are kept separate
//! from domain types because trigger payloads arrive loosely typed and are
//! validated before becoming stage inputs.

pub mod run;
pub mod trigger;
