use clap::Args;
use url::Url;

use crate::error::{Result, WebhookTriggerError};

pub const DEFAULT_OUTPUT_VARIABLE: &str = "RepoName";

/// Runtime configuration.
///
/// Every setting can come from the command line or, as is usual inside
/// Lambda, from the function's environment variables.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Name of the output variable that carries the repository name
    #[arg(long, global = true, env = "OUTPUT_VARIABLE_NAME", default_value = DEFAULT_OUTPUT_VARIABLE)]
    pub output_variable: String,

    /// Override for the CodePipeline API endpoint
    #[arg(long, global = true, env = "CODEPIPELINE_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region; the SDK default chain is used when unset
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_variable: DEFAULT_OUTPUT_VARIABLE.to_string(),
            endpoint_url: None,
            region: None,
        }
    }
}

impl Config {
    /// Checks settings that clap cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        if self.output_variable.trim().is_empty() {
            return Err(WebhookTriggerError::Config(
                "Output variable name must not be empty".to_string(),
            ));
        }

        self.endpoint()?;
        Ok(())
    }

    /// Parsed endpoint override, if one is configured.
    pub fn endpoint(&self) -> Result<Option<Url>> {
        self.endpoint_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw)
                    .map_err(|e| WebhookTriggerError::Config(format!("Invalid endpoint URL: {e}")))
            })
            .transpose()
    }
}
