//! Pass summary: what was planned, what happened, what went wrong where.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::actuator::EditOutcome;
use crate::diff::Edit;

/// One edit that exhausted its retry budget.
#[derive(Debug, Clone, Serialize)]
pub struct EditFailure {
    pub row: usize,
    pub column: usize,
    pub action: String,
    pub attempts: u32,
    pub reason: String,
}

/// One edit the actuator declined to act on (unknown cells).
#[derive(Debug, Clone, Serialize)]
pub struct EditWarning {
    pub row: usize,
    pub column: usize,
    pub reason: String,
}

/// Aggregated outcome of one reconciliation pass.
///
/// Partial completion is an expected steady state: failures are enumerated
/// per position rather than collapsing the pass into a single error.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Board dimensions this pass ran against.
    pub rows: usize,
    pub columns: usize,
    /// Edits the differ planned.
    pub planned: usize,
    /// Edits whose remote call succeeded.
    pub applied: usize,
    /// Edits that required no remote call.
    pub noops: usize,
    /// Edits attempted before the pass ended (equals `planned` unless
    /// cancelled).
    pub processed: usize,
    pub failed: Vec<EditFailure>,
    pub warnings: Vec<EditWarning>,
    /// True when a cancellation signal stopped the pass early.
    pub cancelled: bool,
}

impl ReconcileReport {
    pub fn new(rows: usize, columns: usize, planned: usize) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            ended_at: now,
            rows,
            columns,
            planned,
            applied: 0,
            noops: 0,
            processed: 0,
            failed: Vec::new(),
            warnings: Vec::new(),
            cancelled: false,
        }
    }

    /// Fold one actuation outcome into the tallies.
    pub fn record(&mut self, edit: &Edit, outcome: &EditOutcome) {
        self.processed += 1;
        match outcome {
            EditOutcome::Applied { .. } => self.applied += 1,
            EditOutcome::Noop => self.noops += 1,
            EditOutcome::Skipped { reason } => self.warnings.push(EditWarning {
                row: edit.row,
                column: edit.column,
                reason: reason.clone(),
            }),
            EditOutcome::Failed { attempts, error } => self.failed.push(EditFailure {
                row: edit.row,
                column: edit.column,
                action: edit.action.describe(),
                attempts: *attempts,
                reason: error.to_string(),
            }),
        }
    }

    pub fn finish(&mut self) {
        self.ended_at = Utc::now();
    }

    /// True when every planned edit was applied (or was a no-op).
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.failed.is_empty() && self.warnings.is_empty()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Reconciled {}x{} grid: {} edits planned, {} applied, {} no-ops, {} failed",
            self.rows,
            self.columns,
            self.planned,
            self.applied,
            self.noops,
            self.failed.len()
        )?;

        if self.cancelled {
            writeln!(
                f,
                "Cancelled early: {} of {} edits were not attempted",
                self.planned - self.processed,
                self.planned
            )?;
        }

        if !self.failed.is_empty() {
            writeln!(f, "Failed edits:")?;
            for failure in &self.failed {
                writeln!(
                    f,
                    "  ({}, {}): {} failed after {} attempts: {}",
                    failure.row, failure.column, failure.action, failure.attempts, failure.reason
                )?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f, "Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  ({}, {}): {}", warning.row, warning.column, warning.reason)?;
            }
        }

        Ok(())
    }
}
