use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::codepipeline::PipelineApi;
use crate::error::{Result, WebhookTriggerError};
use crate::event::{CodePipelineEvent, Job};
use crate::trigger::{find_webhook_trigger, repo_name_from_detail, TriggerLookup};

/// Result returned to the Lambda runtime for a successful job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerOutput {
    pub job_id: String,
    pub pipeline_name: String,
    /// Webhook trigger detail of the running execution
    pub webhook: String,
    pub repo_name: String,
}

/// A job whose failure was already reported to CodePipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub job_id: String,
    /// Message sent as the failure details
    pub error: String,
}

/// Response of one invocation.
///
/// A reported failure is still a completed invocation: CodePipeline already
/// knows the job failed, so Lambda must not retry the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded(HandlerOutput),
    Failed(JobFailure),
}

/// Handles `CodePipeline.job` events for the webhook trigger action.
///
/// Holds the orchestration client for the lifetime of the process; each
/// event is processed independently.
pub struct WebhookTriggerHandler {
    api: Arc<dyn PipelineApi>,
    output_variable: String,
}

impl WebhookTriggerHandler {
    pub fn new(api: Arc<dyn PipelineApi>, output_variable: impl Into<String>) -> Self {
        Self {
            api,
            output_variable: output_variable.into(),
        }
    }

    /// Processes one job event.
    ///
    /// Any failure after the job id is known is reported to CodePipeline as
    /// a failed job and returned as `JobOutcome::Failed`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the outcome could not be reported: the
    /// event has no job id, or the failure report itself was rejected.
    pub async fn handle(&self, event: CodePipelineEvent) -> Result<JobOutcome> {
        let job_id = event.job.job_id()?.to_string();
        let settings = &event.job.data.action_configuration.configuration;
        info!(
            "Handling CodePipeline job {job_id} (account: {}, function: {})",
            event.job.account_id.as_deref().unwrap_or("unknown"),
            settings.function_name.as_deref().unwrap_or("unknown")
        );

        match self.process(&job_id, &event.job).await {
            Ok(output) => Ok(JobOutcome::Succeeded(output)),
            Err(err) => {
                error!("Job {job_id} failed: {err}");
                if let Err(report_err) = self.report_failure(&job_id, &err).await {
                    warn!("Could not report failure for job {job_id}: {report_err}");
                    return Err(err);
                }
                Ok(JobOutcome::Failed(JobFailure {
                    job_id,
                    error: err.to_string(),
                }))
            }
        }
    }

    async fn process(&self, job_id: &str, job: &Job) -> Result<HandlerOutput> {
        let params = job.user_parameters()?;
        if !params.extra.is_empty() {
            debug!("Ignoring extra UserParameters: {:?}", params.extra.keys().collect::<Vec<_>>());
        }
        let pipeline_name = params.pipeline_name;

        let lookup = find_webhook_trigger(self.api.as_ref(), &pipeline_name, job_id).await?;
        let webhook = match lookup {
            TriggerLookup::Webhook { detail } => detail,
            TriggerLookup::NoWebhook {
                status,
                trigger_type,
            } => {
                return Err(WebhookTriggerError::NoWebhookTrigger {
                    execution_id: job_id.to_string(),
                    status: status.to_string(),
                    trigger_type: trigger_type.map_or_else(|| "none".to_string(), |t| t.to_string()),
                });
            }
        };

        let repo_name = repo_name_from_detail(&webhook)?;
        self.report_success(job_id, &repo_name).await?;

        Ok(HandlerOutput {
            job_id: job_id.to_string(),
            pipeline_name,
            webhook,
            repo_name,
        })
    }

    /// Signals job success with the repository name as output variable.
    pub async fn report_success(&self, job_id: &str, repo_name: &str) -> Result<()> {
        let variables = HashMap::from([(self.output_variable.clone(), repo_name.to_string())]);
        self.api.put_job_success(job_id, variables).await?;

        info!(
            "Reported success for job {job_id} with {}={repo_name}",
            self.output_variable
        );
        Ok(())
    }

    /// Signals job failure with the error's message as failure details.
    pub async fn report_failure(&self, job_id: &str, err: &WebhookTriggerError) -> Result<()> {
        self.api.put_job_failure(job_id, &err.to_string()).await
    }
}
