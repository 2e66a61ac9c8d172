use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use log::info;

use crate::codepipeline::CodePipelineClient;
use crate::config::Config;
use crate::event::CodePipelineEvent;
use crate::handler::{JobOutcome, WebhookTriggerHandler};

#[derive(Parser)]
#[command(name = "webhook-trigger")]
#[command(author, version, about = "CodePipeline webhook trigger action", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: Config,
}

#[derive(Subcommand)]
enum Commands {
    /// Run inside the Lambda runtime (default)
    Serve,
    /// Handle a single CodePipeline job event read from a file
    Invoke {
        #[arg(short, long)]
        event: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,
    },
}

impl Cli {
    async fn build_handler(&self) -> Result<WebhookTriggerHandler> {
        self.config.validate()?;

        let client = CodePipelineClient::from_config(&self.config)
            .await
            .context("Failed to configure CodePipeline client")?;

        Ok(WebhookTriggerHandler::new(
            Arc::new(client),
            self.config.output_variable.clone(),
        ))
    }

    async fn serve(&self) -> Result<()> {
        let handler = self.build_handler().await?;
        let handler = &handler;

        info!("Waiting for CodePipeline job events");
        lambda_runtime::run(service_fn(
            move |event: LambdaEvent<CodePipelineEvent>| async move {
                handler
                    .handle(event.payload)
                    .await
                    .map_err(lambda_runtime::Error::from)
            },
        ))
        .await
        .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {e}"))
    }

    async fn invoke(&self, event_path: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
        let event = load_event(event_path)?;
        let handler = self.build_handler().await?;

        let result = handler.handle(event).await?;

        let json_output = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };

        if let Some(output_path) = output {
            std::fs::write(output_path, json_output)
                .with_context(|| format!("Failed to write result: {}", output_path.display()))?;
            info!("Result written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        if let JobOutcome::Failed(failure) = result {
            anyhow::bail!("Job {} failed: {}", failure.job_id, failure.error);
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            None | Some(Commands::Serve) => self.serve().await,
            Some(Commands::Invoke {
                event,
                output,
                pretty,
            }) => self.invoke(event, output.as_deref(), *pretty).await,
        }
    }
}

/// Reads a `CodePipeline.job` event from a JSON file.
fn load_event(path: &Path) -> Result<CodePipelineEvent> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse CodePipeline event: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_event_from_file() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let event = r#"{
  "CodePipeline.job": {
    "id": "job-1",
    "data": {
      "actionConfiguration": {
        "configuration": {
          "UserParameters": "{\"pipeline_name\": \"deploy\"}"
        }
      }
    }
  }
}"#;
        write!(temp_file, "{}", event).unwrap();

        let event = load_event(temp_file.path()).unwrap();
        assert_eq!(event.job.job_id().unwrap(), "job-1");
        assert_eq!(event.job.user_parameters().unwrap().pipeline_name, "deploy");
    }

    #[test]
    fn test_load_event_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{ not an event").unwrap();

        let err = load_event(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse CodePipeline event"));
    }

    #[test]
    fn test_load_event_missing_file() {
        let err = load_event(Path::new("does-not-exist.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read event file"));
    }

    #[test]
    fn test_parse_invoke_command() {
        let cli = Cli::try_parse_from([
            "webhook-trigger",
            "invoke",
            "--event",
            "event.json",
            "--pretty",
            "--output-variable",
            "Repository",
        ])
        .unwrap();

        assert_eq!(cli.config.output_variable, "Repository");
        match cli.command {
            Some(Commands::Invoke { event, pretty, output }) => {
                assert_eq!(event, PathBuf::from("event.json"));
                assert!(pretty);
                assert!(output.is_none());
            }
            _ => panic!("expected invoke command"),
        }
    }

    #[test]
    fn test_parse_defaults_to_serve() {
        let cli = Cli::try_parse_from(["webhook-trigger"]).unwrap();
        assert!(cli.command.is_none());
    }
}
