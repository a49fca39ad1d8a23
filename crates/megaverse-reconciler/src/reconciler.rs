//! Reconciliation driver: fetch, normalize, diff, actuate, summarize.
//!
//! One call to [`Reconciler::run`] performs exactly one pass. Fatal problems
//! (a failed fetch, mismatched grid dimensions) abort before any mutation;
//! per-edit failures are absorbed into the report and never stop the
//! remaining edits. A cancellation token is observed between edits, not
//! mid-retry, so stopping a long pass waits at most one attempt's backoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::actuator::Actuator;
use crate::api::{FetchError, MapService};
use crate::config::ReconcilerConfig;
use crate::diff::{self, DimensionMismatch};
use crate::grid::Grid;
use crate::normalize;
use crate::report::ReconcileReport;

/// Cooperative cancellation flag shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// Fatal pass failure: nothing was mutated after one of these.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("failed to fetch {which} map: {source}")]
    Fetch {
        which: &'static str,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Precondition(#[from] DimensionMismatch),
}

/// Owns one pass over the board: sequencing, pacing, and outcome
/// aggregation.
pub struct Reconciler<S: MapService> {
    service: Arc<S>,
    actuator: Actuator<S>,
    cancel: CancelToken,
}

impl<S: MapService> Reconciler<S> {
    pub fn new(service: Arc<S>, config: &ReconcilerConfig, cancel: CancelToken) -> Self {
        let actuator = Actuator::new(service.clone(), config.retry, config.pacing);
        Self {
            service,
            actuator,
            cancel,
        }
    }

    /// Fetch and normalize the current map.
    pub async fn fetch_current(&self) -> Result<Grid, PassError> {
        let rows = self
            .service
            .current_map()
            .await
            .map_err(|source| PassError::Fetch {
                which: "current",
                source,
            })?;
        normalize::current_grid(&rows).map_err(|e| PassError::Fetch {
            which: "current",
            source: FetchError::Malformed(e.to_string()),
        })
    }

    /// Fetch and normalize the goal map.
    pub async fn fetch_goal(&self) -> Result<Grid, PassError> {
        let rows = self
            .service
            .goal_map()
            .await
            .map_err(|source| PassError::Fetch {
                which: "goal",
                source,
            })?;
        normalize::goal_grid(&rows).map_err(|e| PassError::Fetch {
            which: "goal",
            source: FetchError::Malformed(e.to_string()),
        })
    }

    /// One full pass: converge the board onto the remote goal map.
    pub async fn run(&mut self) -> Result<ReconcileReport, PassError> {
        let current = self.fetch_current().await?;
        let goal = self.fetch_goal().await?;
        self.converge(current, goal).await
    }

    /// Converge the board onto an all-space goal, deleting every occupant.
    pub async fn run_clear(&mut self) -> Result<ReconcileReport, PassError> {
        let current = self.fetch_current().await?;
        let goal = Grid::empty(current.rows(), current.columns());
        self.converge(current, goal).await
    }

    async fn converge(&mut self, current: Grid, goal: Grid) -> Result<ReconcileReport, PassError> {
        info!(
            rows = current.rows(),
            columns = current.columns(),
            occupied = current.occupied(),
            goal_occupied = goal.occupied(),
            "comparing grids"
        );

        let edits = diff::plan(&current, &goal)?;
        info!(edits = edits.len(), "planned edits");

        let mut report = ReconcileReport::new(current.rows(), current.columns(), edits.len());

        for edit in &edits {
            if self.cancel.is_cancelled() {
                warn!(
                    remaining = edits.len() - report.processed,
                    "cancellation requested, stopping pass"
                );
                report.cancelled = true;
                break;
            }

            let outcome = self.actuator.apply(edit).await;
            if outcome.is_failure() {
                warn!(%edit, "edit failed after retries");
            }
            report.record(edit, &outcome);
        }

        report.finish();
        info!(
            applied = report.applied,
            failed = report.failed.len(),
            warnings = report.warnings.len(),
            "pass complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_roundtrip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
