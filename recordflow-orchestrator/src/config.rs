//! Server configuration

/// HTTP server and dispatch settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub bind_addr: String,

    /// Runs that may wait in the queue before triggers are rejected
    pub queue_capacity: usize,

    /// Runs executing at the same time
    pub max_concurrent_runs: usize,

    /// Runs kept in the status registry
    pub run_history: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            queue_capacity: 64,
            max_concurrent_runs: 4,
            run_history: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates configuration from environment variables
    ///
    /// - ORCHESTRATOR_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - RECORDFLOW_QUEUE_CAPACITY (optional, default: 64)
    /// - RECORDFLOW_MAX_CONCURRENT_RUNS (optional, default: 4)
    /// - RECORDFLOW_RUN_HISTORY (optional, default: 1000)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = std::env::var("ORCHESTRATOR_BIND_ADDR").unwrap_or(defaults.bind_addr);

        Ok(Self {
            bind_addr,
            queue_capacity: parse_env("RECORDFLOW_QUEUE_CAPACITY", defaults.queue_capacity)?,
            max_concurrent_runs: parse_env(
                "RECORDFLOW_MAX_CONCURRENT_RUNS",
                defaults.max_concurrent_runs,
            )?,
            run_history: parse_env("RECORDFLOW_RUN_HISTORY", defaults.run_history)?,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }
        if self.queue_capacity == 0 {
            anyhow::bail!("queue_capacity must be greater than 0");
        }
        if self.max_concurrent_runs == 0 {
            anyhow::bail!("max_concurrent_runs must be greater than 0");
        }
        if self.run_history == 0 {
            anyhow::bail!("run_history must be greater than 0");
        }
        Ok(())
    }
}

fn parse_env(name: &str, default: usize) -> anyhow::Result<usize> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer, got '{}'", name, value)),
        Err(_) => Ok(default),
    }
}
