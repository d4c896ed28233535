//! Request pipeline: ordered guards followed by one terminal operation.
//!
//! A [`Pipeline`] runs its [`Validator`]s strictly in sequence against a
//! [`RequestContext`]. The first failing guard's envelope becomes the
//! response and nothing after it runs, the facade operation included.

mod context;
mod operation;
mod validator;

pub use context::RequestContext;
pub use operation::Operation;
pub use validator::{ValidationOutcome, Validator};

use tracing::debug;

use super::state::HttpState;
use crate::domain::Envelope;

/// Guards plus the operation they protect.
///
/// # Examples
/// ```
/// use users_api::inbound::http::pipeline::{Operation, Pipeline, Validator};
///
/// let open = Pipeline::unguarded(Operation::ListAll);
/// assert!(open.validators().is_empty());
///
/// let guarded = Pipeline::new(Validator::PER_USER, Operation::GetById);
/// assert_eq!(guarded.validators().first(), Some(&Validator::Identifier));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    validators: Vec<Validator>,
    operation: Operation,
}

impl Pipeline {
    /// Pipeline running `validators` in the given order before `operation`.
    pub fn new(validators: impl Into<Vec<Validator>>, operation: Operation) -> Self {
        Self {
            validators: validators.into(),
            operation,
        }
    }

    /// Pipeline with no guards.
    pub fn unguarded(operation: Operation) -> Self {
        Self::new(Vec::new(), operation)
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// True when at least one guard must pass before the operation runs.
    pub fn is_guarded(&self) -> bool {
        !self.validators.is_empty()
    }

    /// Run guards then the operation, returning the envelope to emit.
    pub async fn run(&self, mut ctx: RequestContext, state: &HttpState) -> Envelope {
        for validator in &self.validators {
            if let ValidationOutcome::Fail(envelope) = validator.validate(&mut ctx, state).await {
                debug!(
                    validator = validator.name(),
                    operation = self.operation.name(),
                    status = envelope.status_code(),
                    "pipeline short-circuited"
                );
                return envelope;
            }
        }
        self.operation.invoke(&ctx, state).await
    }
}
