//! Configuration for a reconciliation run.

use serde::Deserialize;

use crate::retry::{PacingPolicy, RetryPolicy};

/// Default base URL of the challenge API.
pub const DEFAULT_BASE_URL: &str = "https://challenge.crossmint.com/api";

/// Everything a pass needs to know about the remote service and its limits.
///
/// Passed explicitly to the client and reconciler at construction; nothing
/// here lives in globals.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Base URL of the remote API.
    pub base_url: String,

    /// Candidate identifier naming the grid/session to reconcile.
    pub candidate_id: String,

    /// Per-call retry and backoff budget.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Minimum gap between consecutive remote calls.
    #[serde(default)]
    pub pacing: PacingPolicy,
}

impl ReconcilerConfig {
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            candidate_id: candidate_id.into(),
            retry: RetryPolicy::default(),
            pacing: PacingPolicy::default(),
        }
    }
}
