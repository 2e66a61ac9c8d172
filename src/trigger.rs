use log::{debug, info, warn};

use crate::codepipeline::PipelineApi;
use crate::error::{Result, WebhookTriggerError};
use crate::execution::{ExecutionStatus, ExecutionSummary, TriggerType};

/// Outcome of inspecting the execution that belongs to the current job.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerLookup {
    /// In-progress execution started by a webhook; `detail` is the trigger
    /// detail reported by CodePipeline (the webhook ARN).
    Webhook { detail: String },
    /// The execution exists but was not (or no longer is) a running
    /// webhook-triggered one.
    NoWebhook {
        status: ExecutionStatus,
        trigger_type: Option<TriggerType>,
    },
}

/// Fetches the executions of `pipeline_name` and inspects the one whose id
/// matches `execution_id`.
///
/// # Errors
///
/// Returns an error if the API call fails or no execution matches.
pub async fn find_webhook_trigger(
    api: &dyn PipelineApi,
    pipeline_name: &str,
    execution_id: &str,
) -> Result<TriggerLookup> {
    let executions = api.list_executions(pipeline_name).await?;
    let lookup = select_trigger(&executions, pipeline_name, execution_id)?;

    match &lookup {
        TriggerLookup::Webhook { detail } => {
            info!("Execution {execution_id} of {pipeline_name} was triggered by webhook {detail}");
        }
        TriggerLookup::NoWebhook {
            status,
            trigger_type,
        } => {
            info!(
                "Execution {execution_id} of {pipeline_name} has no webhook trigger (status: {status}, trigger: {})",
                trigger_type.as_ref().map_or("none", TriggerType::as_str)
            );
        }
    }

    Ok(lookup)
}

/// Picks the execution matching `execution_id` out of `executions`.
pub fn select_trigger(
    executions: &[ExecutionSummary],
    pipeline_name: &str,
    execution_id: &str,
) -> Result<TriggerLookup> {
    let mut matching = executions.iter().filter(|e| e.id == execution_id);

    let current = matching
        .next()
        .ok_or_else(|| WebhookTriggerError::ExecutionNotFound {
            pipeline: pipeline_name.to_string(),
            execution_id: execution_id.to_string(),
        })?;

    let duplicates = matching.count();
    if duplicates > 0 {
        warn!(
            "Found {} executions with id {execution_id} in {pipeline_name}, using the first",
            duplicates + 1
        );
    }

    if let Some(started) = current.start_time {
        debug!("Execution {execution_id} started at {started}");
    }

    let trigger = current.trigger.as_ref();
    let webhook_detail = trigger
        .filter(|t| current.status == ExecutionStatus::InProgress && t.trigger_type.is_webhook())
        .and_then(|t| t.detail.clone());

    Ok(match webhook_detail {
        Some(detail) => TriggerLookup::Webhook { detail },
        None => TriggerLookup::NoWebhook {
            status: current.status.clone(),
            trigger_type: trigger.map(|t| t.trigger_type.clone()),
        },
    })
}

/// Derives the repository name from a webhook trigger detail.
///
/// The name is the last `:`-delimited segment of the detail. ARN resource
/// paths such as `webhook/my-repo` contribute their last `/` segment.
///
/// # Errors
///
/// Returns an error if the derived name is empty.
pub fn repo_name_from_detail(detail: &str) -> Result<String> {
    let resource = detail.rsplit(':').next().unwrap_or_default();
    let name = resource.rsplit('/').next().unwrap_or_default().trim();

    if name.is_empty() {
        return Err(WebhookTriggerError::InvalidTriggerDetail(detail.to_string()));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Trigger;

    fn execution(id: &str, status: &str, trigger_type: &str, detail: Option<&str>) -> ExecutionSummary {
        ExecutionSummary {
            id: id.to_string(),
            status: status.into(),
            start_time: None,
            trigger: Some(Trigger {
                trigger_type: trigger_type.into(),
                detail: detail.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_select_webhook_trigger() {
        let executions = vec![
            execution("exec-2", "InProgress", "Webhook", Some("arn:aws:example:other")),
            execution("exec-1", "InProgress", "Webhook", Some("arn:aws:example:repo-42")),
        ];

        let lookup = select_trigger(&executions, "deploy", "exec-1").unwrap();
        assert_eq!(
            lookup,
            TriggerLookup::Webhook {
                detail: "arn:aws:example:repo-42".to_string()
            }
        );
    }

    #[test]
    fn test_select_execution_not_found() {
        let executions = vec![execution("exec-2", "InProgress", "Webhook", Some("arn:aws:example:x"))];

        let err = select_trigger(&executions, "deploy", "exec-1").unwrap_err();
        match err {
            WebhookTriggerError::ExecutionNotFound {
                pipeline,
                execution_id,
            } => {
                assert_eq!(pipeline, "deploy");
                assert_eq!(execution_id, "exec-1");
            }
            other => panic!("expected ExecutionNotFound, got {other:?}"),
        }

        assert!(select_trigger(&[], "deploy", "exec-1").is_err());
    }

    #[test]
    fn test_select_non_webhook_trigger_hides_detail() {
        let executions = vec![execution(
            "exec-1",
            "InProgress",
            "StartPipelineExecution",
            Some("arn:aws:iam::111111111111:user/alice"),
        )];

        let lookup = select_trigger(&executions, "deploy", "exec-1").unwrap();
        assert_eq!(
            lookup,
            TriggerLookup::NoWebhook {
                status: ExecutionStatus::InProgress,
                trigger_type: Some(TriggerType::StartPipelineExecution),
            }
        );
    }

    #[test]
    fn test_select_webhook_not_in_progress() {
        let executions = vec![execution("exec-1", "Succeeded", "Webhook", Some("arn:aws:example:repo-42"))];

        let lookup = select_trigger(&executions, "deploy", "exec-1").unwrap();
        assert!(matches!(
            lookup,
            TriggerLookup::NoWebhook {
                status: ExecutionStatus::Succeeded,
                ..
            }
        ));
    }

    #[test]
    fn test_select_webhook_without_detail_or_trigger() {
        let executions = vec![execution("exec-1", "InProgress", "WebhookV2", None)];
        let lookup = select_trigger(&executions, "deploy", "exec-1").unwrap();
        assert!(matches!(lookup, TriggerLookup::NoWebhook { .. }));

        let mut bare = execution("exec-1", "InProgress", "Webhook", None);
        bare.trigger = None;
        let lookup = select_trigger(&[bare], "deploy", "exec-1").unwrap();
        assert_eq!(
            lookup,
            TriggerLookup::NoWebhook {
                status: ExecutionStatus::InProgress,
                trigger_type: None,
            }
        );
    }

    #[test]
    fn test_select_duplicate_ids_uses_first() {
        let executions = vec![
            execution("exec-1", "InProgress", "Webhook", Some("arn:aws:example:first")),
            execution("exec-1", "InProgress", "Webhook", Some("arn:aws:example:second")),
        ];

        let lookup = select_trigger(&executions, "deploy", "exec-1").unwrap();
        assert_eq!(
            lookup,
            TriggerLookup::Webhook {
                detail: "arn:aws:example:first".to_string()
            }
        );
    }

    #[test]
    fn test_repo_name_from_detail() {
        assert_eq!(repo_name_from_detail("arn:aws:example:repo-42").unwrap(), "repo-42");
        assert_eq!(
            repo_name_from_detail("arn:aws:codepipeline:us-east-1:111111111111:webhook:my-repo").unwrap(),
            "my-repo"
        );
        assert_eq!(
            repo_name_from_detail("arn:aws:codepipeline:us-east-1:111111111111:webhook/my-repo").unwrap(),
            "my-repo"
        );
        assert_eq!(repo_name_from_detail("plain-name").unwrap(), "plain-name");
    }

    #[test]
    fn test_repo_name_from_invalid_detail() {
        for detail in ["", "arn:aws:example:", "arn:aws:example:webhook/", "arn: "] {
            assert!(
                matches!(
                    repo_name_from_detail(detail),
                    Err(WebhookTriggerError::InvalidTriggerDetail(_))
                ),
                "expected failure for {detail:?}"
            );
        }
    }
}
