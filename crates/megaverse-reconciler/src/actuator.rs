//! Actuator — turns one planned edit into remote calls.
//!
//! One edit becomes zero or one HTTP mutations: trivial edits (creating
//! space) are no-ops, edits touching unknown cells are skipped and reported,
//! and everything else goes through a bounded retry loop. Rate limits and
//! transport faults back off exponentially before the next attempt; plain
//! rejections burn an attempt without extra sleep. Every outcome comes back
//! as a value — the actuator never aborts the pass.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{Attribute, CallError, Endpoint, MapService};
use crate::diff::{Edit, EditAction};
use crate::retry::{Pacer, PacingPolicy, RetryPolicy};

/// Structured outcome of actuating one edit.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// The remote call succeeded.
    Applied { attempts: u32 },
    /// Nothing to do (creating space).
    Noop,
    /// Not actionable: no typed endpoint routes this cell. Reported as a
    /// warning, never guessed at.
    Skipped { reason: String },
    /// The retry budget was exhausted.
    Failed { attempts: u32, error: CallError },
}

impl EditOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The single remote call an edit reduces to.
enum Call {
    Create {
        endpoint: Endpoint,
        attribute: Option<Attribute>,
    },
    Delete {
        endpoint: Endpoint,
    },
}

/// Applies edits against a [`MapService`] with retry, backoff, and pacing.
pub struct Actuator<S: MapService> {
    service: Arc<S>,
    retry: RetryPolicy,
    pacer: Pacer,
}

impl<S: MapService> Actuator<S> {
    pub fn new(service: Arc<S>, retry: RetryPolicy, pacing: PacingPolicy) -> Self {
        Self {
            service,
            retry,
            pacer: Pacer::new(pacing),
        }
    }

    /// Actuate one edit, returning its structured outcome.
    pub async fn apply(&mut self, edit: &Edit) -> EditOutcome {
        let call = match &edit.action {
            EditAction::Create(cell) if cell.is_space() => return EditOutcome::Noop,
            EditAction::Create(cell) => match Endpoint::for_cell(cell) {
                Some(endpoint) => Call::Create {
                    endpoint,
                    attribute: Attribute::for_cell(cell),
                },
                None => {
                    return EditOutcome::Skipped {
                        reason: format!("no endpoint can create {}", cell),
                    }
                }
            },
            EditAction::Delete(cell) if cell.is_space() => return EditOutcome::Noop,
            EditAction::Delete(cell) => match Endpoint::for_cell(cell) {
                Some(endpoint) => Call::Delete { endpoint },
                None => {
                    return EditOutcome::Skipped {
                        reason: format!("refusing to delete {} via a guessed endpoint", cell),
                    }
                }
            },
        };

        self.call_with_retry(edit, &call).await
    }

    async fn call_with_retry(&mut self, edit: &Edit, call: &Call) -> EditOutcome {
        let mut attempts = 0;
        loop {
            self.pacer.pace().await;
            attempts += 1;

            let result = match call {
                Call::Create {
                    endpoint,
                    attribute,
                } => {
                    self.service
                        .create(*endpoint, edit.row, edit.column, *attribute)
                        .await
                }
                Call::Delete { endpoint } => {
                    self.service.delete(*endpoint, edit.row, edit.column).await
                }
            };

            match result {
                Ok(()) => {
                    debug!(%edit, attempts, "applied");
                    return EditOutcome::Applied { attempts };
                }
                Err(error) => {
                    if attempts >= self.retry.max_attempts {
                        warn!(%edit, attempts, %error, "giving up");
                        return EditOutcome::Failed { attempts, error };
                    }
                    if error.wants_backoff() {
                        let delay = self.retry.delay_for(attempts);
                        debug!(%edit, attempts, %error, delay_ms = delay.as_millis() as u64, "backing off");
                        tokio::time::sleep(delay).await;
                    } else {
                        debug!(%edit, attempts, %error, "retrying");
                    }
                }
            }
        }
    }
}
