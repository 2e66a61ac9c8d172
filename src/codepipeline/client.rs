use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_codepipeline::error::DisplayErrorContext;
use aws_sdk_codepipeline::types::{FailureDetails, FailureType, PipelineExecutionSummary};
use aws_sdk_codepipeline::Client;
use chrono::DateTime;
use log::debug;

use crate::config::Config;
use crate::error::{Result, WebhookTriggerError};
use crate::execution::{ExecutionStatus, ExecutionSummary, Trigger, TriggerType};

use super::PipelineApi;

/// Shown for statuses and trigger types CodePipeline left out.
const MISSING_VALUE: &str = "unknown";

/// CodePipeline rejects failure messages longer than this.
const MAX_FAILURE_MESSAGE_LEN: usize = 5000;

/// `PipelineApi` backed by the AWS SDK.
#[derive(Clone)]
pub struct CodePipelineClient {
    client: Client,
}

impl CodePipelineClient {
    /// Wraps an already configured SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default AWS credential and region chain,
    /// applying the region and endpoint overrides from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint override is not a valid URL.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(endpoint) = config.endpoint()? {
            loader = loader.endpoint_url(endpoint.as_str());
        }

        let shared = loader.load().await;
        Ok(Self::new(Client::new(&shared)))
    }
}

#[async_trait]
impl PipelineApi for CodePipelineClient {
    async fn list_executions(&self, pipeline_name: &str) -> Result<Vec<ExecutionSummary>> {
        let response = self
            .client
            .list_pipeline_executions()
            .pipeline_name(pipeline_name)
            .send()
            .await
            .map_err(|e| {
                WebhookTriggerError::Api(format!(
                    "ListPipelineExecutions for '{pipeline_name}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let summaries = response.pipeline_execution_summaries();
        debug!(
            "CodePipeline returned {} executions for {pipeline_name}",
            summaries.len()
        );

        Ok(summaries.iter().filter_map(convert_summary).collect())
    }

    async fn put_job_success(
        &self,
        job_id: &str,
        output_variables: HashMap<String, String>,
    ) -> Result<()> {
        self.client
            .put_job_success_result()
            .job_id(job_id)
            .set_output_variables(Some(output_variables))
            .send()
            .await
            .map_err(|e| {
                WebhookTriggerError::Api(format!(
                    "PutJobSuccessResult for job '{job_id}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn put_job_failure(&self, job_id: &str, message: &str) -> Result<()> {
        let message: String = message.chars().take(MAX_FAILURE_MESSAGE_LEN).collect();

        let details = FailureDetails::builder()
            .r#type(FailureType::JobFailed)
            .message(message)
            .build()
            .map_err(|e| WebhookTriggerError::Api(format!("Invalid failure details: {e}")))?;

        self.client
            .put_job_failure_result()
            .job_id(job_id)
            .failure_details(details)
            .send()
            .await
            .map_err(|e| {
                WebhookTriggerError::Api(format!(
                    "PutJobFailureResult for job '{job_id}': {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}

/// Converts an SDK summary into the domain snapshot.
///
/// Summaries without an execution id cannot be matched and are dropped.
pub(super) fn convert_summary(summary: &PipelineExecutionSummary) -> Option<ExecutionSummary> {
    let Some(id) = summary.pipeline_execution_id() else {
        debug!("Skipping execution summary without an id");
        return None;
    };

    let status = summary
        .status()
        .map_or_else(|| ExecutionStatus::Unknown(MISSING_VALUE.to_string()), |s| s.as_str().into());

    let start_time = summary
        .start_time()
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

    let trigger = summary.trigger().map(|t| Trigger {
        trigger_type: t
            .trigger_type()
            .map_or_else(|| TriggerType::Unknown(MISSING_VALUE.to_string()), |tt| tt.as_str().into()),
        detail: t.trigger_detail().map(str::to_string),
    });

    Some(ExecutionSummary {
        id: id.to_string(),
        status,
        start_time,
        trigger,
    })
}
