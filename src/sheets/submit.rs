//! Mutation submitter: sequential multi-line writes with per-line outcomes.
//!
//! The store does not guarantee atomic multi-row writes, and concurrent
//! writes provoke its transient "busy" errors, so independent line items are
//! written strictly sequentially in array order with a fixed inter-request
//! delay. A failed line never aborts its siblings and successful lines are
//! never rolled back; the caller always receives every line's result.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::sheets::client::StoreClient;
use crate::sheets::retry::RetryPolicy;

/// Delay inserted before each line write to respect the store's concurrency
/// limits. Deliberate serialization, not an oversight.
pub const INTER_REQUEST_DELAY: Duration = Duration::from_millis(250);

/// One line row destined for a tab, with a human-readable label for the
/// partial-failure summary (typically the item name).
#[derive(Debug, Clone)]
pub struct LineRow {
    pub label: String,
    pub row: Vec<Value>,
}

/// Result of one line's submission.
#[derive(Debug, Clone, Serialize)]
pub struct LineOutcome {
    pub index: usize,
    pub label: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate of all line outcomes for one user-initiated submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub lines: Vec<LineOutcome>,
}

impl SubmitSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Human-readable recap of the failed lines, for surfacing to the user.
    pub fn failure_detail(&self) -> Option<String> {
        if self.failed == 0 {
            return None;
        }
        let detail = self
            .lines
            .iter()
            .filter(|l| !l.success)
            .map(|l| {
                format!(
                    "{}: {}",
                    l.label,
                    l.error.as_deref().unwrap_or("unknown error")
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        Some(detail)
    }

    fn from_outcomes(lines: Vec<LineOutcome>) -> Self {
        let succeeded = lines.iter().filter(|l| l.success).count();
        Self {
            succeeded,
            failed: lines.len() - succeeded,
            lines,
        }
    }
}

#[derive(Clone)]
pub struct Submitter {
    client: StoreClient,
    retry: RetryPolicy,
    delay: Duration,
}

impl Submitter {
    pub fn new(client: StoreClient, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            delay: INTER_REQUEST_DELAY,
        }
    }

    /// Overrides the inter-request delay; tests use this to run fast.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Writes every line to `tab`, sequentially, each wrapped in the retry
    /// policy. Never returns early on a line failure.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn submit_lines(&self, tab: &str, lines: Vec<LineRow>) -> SubmitSummary {
        let mut outcomes = Vec::with_capacity(lines.len());
        for (index, line) in lines.into_iter().enumerate() {
            tokio::time::sleep(self.delay).await;
            let result = self
                .retry
                .run(&line.label, || self.client.insert_row(tab, &line.row))
                .await;
            outcomes.push(match result {
                Ok(()) => LineOutcome {
                    index,
                    label: line.label,
                    success: true,
                    error: None,
                },
                Err(err) => LineOutcome {
                    index,
                    label: line.label,
                    success: false,
                    error: Some(err.to_string()),
                },
            });
        }
        let summary = SubmitSummary::from_outcomes(outcomes);
        info!(
            tab,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "line submission finished"
        );
        summary
    }

    /// Single-row append through the retry policy.
    pub async fn insert_row(&self, tab: &str, row: &[Value]) -> Result<(), ServiceError> {
        self.retry.run(tab, || self.client.insert_row(tab, row)).await
    }

    /// Batch append through the retry policy.
    pub async fn batch_insert(&self, tab: &str, rows: &[Vec<Value>]) -> Result<(), ServiceError> {
        self.retry
            .run(tab, || self.client.batch_insert(tab, rows))
            .await
    }

    /// Positional in-place update through the retry policy.
    pub async fn update_row(
        &self,
        action: &str,
        tab: &str,
        row_index: usize,
        row: &[Value],
        extra: &[(&str, &str)],
    ) -> Result<(), ServiceError> {
        self.retry
            .run(tab, || self.client.update_row(action, tab, row_index, row, extra))
            .await
    }
}
