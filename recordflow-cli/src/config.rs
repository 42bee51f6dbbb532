//! Configuration module
//!
//! Settings shared by every command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service, for remote commands
    pub orchestrator_url: String,
}
