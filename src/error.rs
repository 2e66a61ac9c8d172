use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebhookTriggerError {
    #[error("Job event has no job id")]
    MissingJobId,

    #[error("UserParameters not found in action configuration")]
    MissingUserParameters,

    #[error("UserParameters could not be decoded from JSON configuration: {0}")]
    InvalidUserParameters(#[source] serde_json::Error),

    #[error("UserParameters must contain a non-empty 'pipeline_name'")]
    MissingPipelineName,

    #[error("No execution '{execution_id}' found for pipeline '{pipeline}'")]
    ExecutionNotFound {
        pipeline: String,
        execution_id: String,
    },

    #[error("Execution '{execution_id}' was not triggered by a webhook (status: {status}, trigger: {trigger_type})")]
    NoWebhookTrigger {
        execution_id: String,
        status: String,
        trigger_type: String,
    },

    #[error("Cannot derive a repository name from trigger detail '{0}'")]
    InvalidTriggerDetail(String),

    #[error("CodePipeline API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WebhookTriggerError>;
