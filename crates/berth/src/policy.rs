//! Failure policy for provisioning steps.
//!
//! Every step of create and delete either aborts the request on failure or
//! is best-effort: the failure is logged and the request carries on.

use std::future::Future;
use std::time::Duration;

use berth_common::{BerthError, BerthResult};
use serde::Serialize;

/// The lifecycle action being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Provision a container.
    Create,
    /// Tear a container down.
    Delete,
}

/// Provisioning steps, in the order create and delete run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Resolve the runtime endpoint.
    ResolveEndpoint,
    /// Read the `source` image input.
    ResolveImage,
    /// Read the `domain` input.
    ResolveDomain,
    /// Create the container.
    Create,
    /// Start the container.
    Start,
    /// Inspect the container for its address.
    Inspect,
    /// Write the component record.
    Persist,
    /// Register the hostname.
    BindName,
    /// Read the recorded container ID.
    ResolveContainerId,
    /// Kill the container.
    Kill,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ResolveEndpoint => "resolve_endpoint",
            Self::ResolveImage => "resolve_image",
            Self::ResolveDomain => "resolve_domain",
            Self::Create => "create",
            Self::Start => "start",
            Self::Inspect => "inspect",
            Self::Persist => "persist",
            Self::BindName => "bind_name",
            Self::ResolveContainerId => "resolve_container_id",
            Self::Kill => "kill",
        };
        f.write_str(name)
    }
}

/// What happens when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The step's error becomes the request's error.
    Abort,
    /// The error is logged and the request continues.
    BestEffort,
}

impl FailurePolicy {
    /// The policy applied to `step` while performing `action`.
    #[must_use]
    pub const fn for_step(action: Action, step: Step) -> Self {
        match (action, step) {
            (Action::Create, Step::Persist | Step::BindName)
            | (Action::Delete, Step::ResolveEndpoint | Step::ResolveContainerId) => {
                Self::BestEffort
            }
            _ => Self::Abort,
        }
    }

    /// Returns true for [`FailurePolicy::BestEffort`].
    #[must_use]
    pub const fn is_best_effort(self) -> bool {
        matches!(self, Self::BestEffort)
    }
}

/// Keep the value of a best-effort step, logging and dropping its error.
///
/// Only steps whose [`FailurePolicy`] is best-effort for `action` may be
/// swallowed.
pub fn swallow<T>(action: Action, step: Step, result: BerthResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug_assert!(
                FailurePolicy::for_step(action, step).is_best_effort(),
                "{step} must not be swallowed during {action:?}"
            );
            tracing::warn!(?action, %step, error = %e, "Best-effort step failed, continuing");
            None
        }
    }
}

/// Run a step under a deadline.
///
/// # Errors
///
/// Returns the step's own error, or [`BerthError::Timeout`] if the deadline
/// passes first.
pub async fn within<T, F>(step: Step, deadline: Duration, fut: F) -> BerthResult<T>
where
    F: Future<Output = BerthResult<T>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| BerthError::Timeout {
            operation: step.to_string(),
            seconds: deadline.as_secs(),
        })?
}

/// Run a best-effort step under a deadline.
///
/// Returns `None` if the step failed or timed out; neither is propagated.
pub async fn best_effort<T, F>(
    action: Action,
    step: Step,
    deadline: Duration,
    fut: F,
) -> Option<T>
where
    F: Future<Output = BerthResult<T>>,
{
    swallow(action, step, within(step, deadline, fut).await)
}
