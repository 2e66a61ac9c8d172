use std::fmt;

use chrono::{DateTime, Utc};

/// Snapshot of one pipeline execution as listed by CodePipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Pipeline execution identifier
    pub id: String,
    pub status: ExecutionStatus,
    pub start_time: Option<DateTime<Utc>>,
    /// What started the execution, if CodePipeline reported it
    pub trigger: Option<Trigger>,
}

/// Trigger descriptor of an execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub trigger_type: TriggerType,
    /// Opaque detail, e.g. the webhook ARN for webhook triggers
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Cancelled,
    InProgress,
    Stopped,
    Stopping,
    Succeeded,
    Superseded,
    Failed,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerType {
    CloudWatchEvent,
    CreatePipeline,
    PollForSourceChanges,
    PutActionRevision,
    StartPipelineExecution,
    Webhook,
    WebhookV2,
    Unknown(String),
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::InProgress => "InProgress",
            Self::Stopped => "Stopped",
            Self::Stopping => "Stopping",
            Self::Succeeded => "Succeeded",
            Self::Superseded => "Superseded",
            Self::Failed => "Failed",
            Self::Unknown(other) => other,
        }
    }
}

impl From<&str> for ExecutionStatus {
    fn from(value: &str) -> Self {
        match value {
            "Cancelled" => Self::Cancelled,
            "InProgress" => Self::InProgress,
            "Stopped" => Self::Stopped,
            "Stopping" => Self::Stopping,
            "Succeeded" => Self::Succeeded,
            "Superseded" => Self::Superseded,
            "Failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TriggerType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CloudWatchEvent => "CloudWatchEvent",
            Self::CreatePipeline => "CreatePipeline",
            Self::PollForSourceChanges => "PollForSourceChanges",
            Self::PutActionRevision => "PutActionRevision",
            Self::StartPipelineExecution => "StartPipelineExecution",
            Self::Webhook => "Webhook",
            Self::WebhookV2 => "WebhookV2",
            Self::Unknown(other) => other,
        }
    }

    /// Whether the execution was started by an inbound HTTP callback.
    pub fn is_webhook(&self) -> bool {
        matches!(self, Self::Webhook | Self::WebhookV2)
    }
}

impl From<&str> for TriggerType {
    fn from(value: &str) -> Self {
        match value {
            "CloudWatchEvent" => Self::CloudWatchEvent,
            "CreatePipeline" => Self::CreatePipeline,
            "PollForSourceChanges" => Self::PollForSourceChanges,
            "PutActionRevision" => Self::PutActionRevision,
            "StartPipelineExecution" => Self::StartPipelineExecution,
            "Webhook" => Self::Webhook,
            "WebhookV2" => Self::WebhookV2,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
