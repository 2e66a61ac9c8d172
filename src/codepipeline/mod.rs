mod client;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::execution::ExecutionSummary;

pub use client::CodePipelineClient;

/// Operations the handler needs from the pipeline orchestration service.
///
/// The handler receives an implementation at construction time, so tests can
/// substitute a recording fake for the AWS client.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Lists the most recent executions of `pipeline_name` (first page only).
    async fn list_executions(&self, pipeline_name: &str) -> Result<Vec<ExecutionSummary>>;

    /// Marks the job as succeeded and publishes `output_variables`.
    async fn put_job_success(
        &self,
        job_id: &str,
        output_variables: HashMap<String, String>,
    ) -> Result<()>;

    /// Marks the job as failed with a human-readable reason.
    async fn put_job_failure(&self, job_id: &str, message: &str) -> Result<()>;
}
