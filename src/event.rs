use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WebhookTriggerError};

/// Event delivered by CodePipeline to an Invoke action.
///
/// Only the fields the handler reads are modelled; everything else in the
/// payload (artifacts, credentials, continuation token) is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodePipelineEvent {
    #[serde(rename = "CodePipeline.job")]
    pub job: Job,
}

/// A unit of work handed to the custom action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job identifier, also used to match the pipeline execution
    #[serde(default)]
    pub id: Option<String>,
    /// AWS account that owns the pipeline
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub data: JobData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default)]
    pub action_configuration: ActionConfiguration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionConfiguration {
    #[serde(default)]
    pub configuration: ActionSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionSettings {
    #[serde(rename = "FunctionName", default)]
    pub function_name: Option<String>,
    /// JSON-encoded parameters supplied in the pipeline definition
    #[serde(rename = "UserParameters", default)]
    pub user_parameters: Option<String>,
}

/// Decoded `UserParameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserParameters {
    pub pipeline_name: String,
    /// Any additional keys the pipeline author passed along
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Returns the job id, failing when the event carries none.
    pub fn job_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(WebhookTriggerError::MissingJobId)
    }

    /// Decodes the JSON `UserParameters` string of this job.
    pub fn user_parameters(&self) -> Result<UserParameters> {
        user_parameters(&self.data)
    }
}

/// Locates and decodes the `UserParameters` field of the job data.
///
/// # Errors
///
/// Returns an error if:
/// - the field is absent
/// - the field is not a JSON object
/// - `pipeline_name` is missing, not a string, or empty
pub fn user_parameters(data: &JobData) -> Result<UserParameters> {
    let raw = data
        .action_configuration
        .configuration
        .user_parameters
        .as_deref()
        .ok_or(WebhookTriggerError::MissingUserParameters)?;

    let mut decoded: Map<String, Value> =
        serde_json::from_str(raw).map_err(WebhookTriggerError::InvalidUserParameters)?;

    let pipeline_name = match decoded.remove("pipeline_name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name,
        _ => return Err(WebhookTriggerError::MissingPipelineName),
    };

    Ok(UserParameters {
        pipeline_name,
        extra: decoded,
    })
}
