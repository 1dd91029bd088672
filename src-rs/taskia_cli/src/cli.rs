use clap::Parser;
use taskia_rs::{ClientConfig, ConfigError};

/// Terminal client for the task service.
#[derive(Debug, Parser)]
#[command(name = "taskia", version, about = "Tasks, subtasks and AI summaries from the terminal")]
pub struct Args {
    /// API base URL (overrides taskia.toml and TASKIA_API_URL)
    #[arg(long)]
    pub base: Option<String>,

    /// Request timeout in seconds; 0 disables it
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Debug logging (TASKIA_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Layered config with the command-line flags applied last.
    pub fn config(&self) -> Result<ClientConfig, ConfigError> {
        let mut cfg = ClientConfig::load_with_dotenv()?;
        if let Some(timeout) = self.timeout {
            cfg.timeout_secs = (timeout > 0).then_some(timeout);
        }
        match &self.base {
            Some(base) => cfg.with_api_url(base),
            None => Ok(cfg),
        }
    }
}
