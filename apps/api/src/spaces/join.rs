//! Joining a space by code through the BaaS join function.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::baas::models::{ExecutionStatus, User};
use crate::baas::FunctionExecutor;
use crate::errors::AppError;
use crate::spaces::join_code::validate_join_code;

/// How the join function's execution is polled.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    /// The function ran and reported failure (unknown code, already a member).
    Rejected,
    /// No terminal status within the poll budget.
    NoResponse,
}

impl JoinOutcome {
    pub fn message(self) -> &'static str {
        match self {
            JoinOutcome::Joined => "Joined successfully!",
            JoinOutcome::Rejected => "Failed to join space. Function execution failed.",
            JoinOutcome::NoResponse => "No response from server. Please try again.",
        }
    }
}

/// Validates `code`, starts the join function and polls it until it reaches
/// a terminal status or the attempts run out.
///
/// An invalid code fails before the executor is called.
pub async fn redeem_join_code(
    executor: &dyn FunctionExecutor,
    function_id: &str,
    code: &str,
    user: &User,
    policy: &PollPolicy,
) -> Result<JoinOutcome, AppError> {
    let code = validate_join_code(code)?;

    let body = json!({
        "joinCode": code,
        "userId": user.id,
        "userEmail": user.email,
    })
    .to_string();
    let execution = executor.create_execution(function_id, &body, false).await?;

    let mut status = None;
    for attempt in 1..=policy.max_attempts {
        let current = executor.get_execution(function_id, &execution.id).await?.status;
        status = Some(current);
        if current.is_terminal() {
            break;
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    let outcome = match status {
        Some(ExecutionStatus::Completed) => JoinOutcome::Joined,
        Some(ExecutionStatus::Failed) => JoinOutcome::Rejected,
        _ => JoinOutcome::NoResponse,
    };
    match outcome {
        JoinOutcome::Joined => info!("User {} joined a space with code {code}", user.id),
        other => warn!("Join with code {code} for user {} ended as {other:?}", user.id),
    }
    Ok(outcome)
}
