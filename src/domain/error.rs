//! Domain validation errors for core domain types.
//!
//! These errors are returned by constructors and transitions that enforce
//! domain invariants (probability ranges, status transitions, step order).

use thiserror::Error;

use super::proposal::ProposalStatus;
use super::workflow::StepName;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A value that must lie in a closed range fell outside it.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The provided value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// A proposal status transition that the lifecycle does not allow.
    #[error("cannot move proposal from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ProposalStatus,
        /// Requested status.
        to: ProposalStatus,
    },

    /// A proposal that already reached `created` was modified.
    #[error("proposal {0} is already created and cannot change")]
    Frozen(String),

    /// Workflow input arrived for a step that is not the current one.
    #[error("step {expected} is current, got input for {got}")]
    StepOutOfOrder {
        /// Step the session is waiting on.
        expected: StepName,
        /// Step the input was addressed to.
        got: StepName,
    },

    /// Workflow step already answered.
    #[error("step {0} was already answered")]
    StepAlreadyAnswered(StepName),

    /// The workflow has no open step.
    #[error("workflow is finished")]
    WorkflowFinished,
}
