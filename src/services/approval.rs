//! Approval stage: pending/history views over the planning ledger and the
//! append-only decision audit log.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::aggregate::{group_by_key, partition_pending, GroupedView};
use crate::calc;
use crate::errors::ServiceError;
use crate::models::{ApprovalDecision, ApprovalStatus, PlanningLine};
use crate::refresh::{map_in_chunks, Snapshot, ViewModel};
use crate::schema::{approval_log, indent};
use crate::sheets::{LineRow, StoreClient, SubmitSummary, Submitter};

/// One approval decision covering a whole planning request (or, when
/// `serial_numbers` is given, a subset of its lines).
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub planning_number: String,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub remarks: String,
    /// Restricts the decision to specific lines; empty means every line of
    /// the request.
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionResult {
    pub planning_number: String,
    pub status: ApprovalStatus,
    /// Lines that already carried the decided status and were not re-logged.
    pub skipped: usize,
    pub summary: SubmitSummary,
}

/// Pending and settled requests, each grouped by planning number.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalBoard {
    pub phase: crate::refresh::Phase,
    pub pending: Vec<GroupedView<PlanningLine>>,
    pub history: Vec<GroupedView<PlanningLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct ApprovalService {
    client: StoreClient,
    submitter: Submitter,
    view: ViewModel<PlanningLine>,
}

impl ApprovalService {
    pub fn new(client: StoreClient, submitter: Submitter) -> Self {
        Self {
            client,
            submitter,
            view: ViewModel::new(),
        }
    }

    async fn load(&self) -> Result<Vec<PlanningLine>, ServiceError> {
        let grid = self.client.fetch_grid(indent::TAB).await?;
        let body: Vec<_> = grid.into_iter().skip(indent::DATA_START_ROW).collect();
        Ok(map_in_chunks(body, |cells| PlanningLine::from_row(cells)).await)
    }

    /// Refreshes the ledger and splits it into the pending queue and the
    /// settled history on the actual-date column.
    #[instrument(skip(self))]
    pub async fn board(&self) -> ApprovalBoard {
        let snapshot: Snapshot<PlanningLine> = self.view.refresh(|| self.load()).await;
        let (pending, history) =
            partition_pending(snapshot.records, |l| l.actual_date.as_str());
        ApprovalBoard {
            phase: snapshot.phase,
            pending: group_by_key(pending, |l| l.planning_number.clone()),
            history: group_by_key(history, |l| l.planning_number.clone()),
            error: snapshot.error,
        }
    }

    /// Full decision history from the audit tab, newest rows last.
    #[instrument(skip(self))]
    pub async fn decision_log(&self) -> Result<Vec<ApprovalDecision>, ServiceError> {
        let grid = self.client.fetch_grid(approval_log::TAB).await?;
        let body: Vec<_> = grid
            .into_iter()
            .skip(approval_log::DATA_START_ROW)
            .collect();
        Ok(map_in_chunks(body, |cells| ApprovalDecision::from_row(cells)).await)
    }

    /// Records an approval decision: one audit row per affected line,
    /// written sequentially. Lines that already carry the decided status
    /// are skipped, so re-submitting the same decision is harmless.
    #[instrument(skip(self, request), fields(planning_number = %request.planning_number))]
    pub async fn decide(&self, request: DecisionRequest) -> Result<DecisionResult, ServiceError> {
        if request.planning_number.trim().is_empty() {
            return Err(ServiceError::Validation("planning number is required".into()));
        }
        if request.status == ApprovalStatus::Pending {
            return Err(ServiceError::Validation(
                "a decision must be Approved or Rejected".into(),
            ));
        }
        if request.status == ApprovalStatus::Rejected && request.remarks.trim().is_empty() {
            return Err(ServiceError::Validation(
                "remarks are required when rejecting".into(),
            ));
        }

        let ledger = self.load().await?;
        let mut matched = false;
        let mut skipped = 0usize;
        let mut targets: Vec<PlanningLine> = Vec::new();
        for line in ledger {
            if line.planning_number != request.planning_number {
                continue;
            }
            if !request.serial_numbers.is_empty()
                && !request.serial_numbers.contains(&line.serial_number)
            {
                continue;
            }
            matched = true;
            if line.approval_status == request.status {
                skipped += 1;
            } else {
                targets.push(line);
            }
        }
        if !matched {
            return Err(ServiceError::NotFound(format!(
                "planning request {} has no matching lines",
                request.planning_number
            )));
        }
        if targets.is_empty() {
            return Ok(DecisionResult {
                planning_number: request.planning_number,
                status: request.status,
                skipped,
                summary: SubmitSummary {
                    succeeded: 0,
                    failed: 0,
                    lines: Vec::new(),
                },
            });
        }

        let timestamp = calc::format_timestamp(Local::now().naive_local());
        let lines: Vec<LineRow> = targets
            .iter()
            .map(|line| {
                let decision = ApprovalDecision {
                    timestamp: timestamp.clone(),
                    planning_number: line.planning_number.clone(),
                    serial_number: line.serial_number.clone(),
                    status: request.status,
                    remarks: request.remarks.clone(),
                };
                LineRow {
                    label: format!("{} #{}", line.planning_number, line.serial_number),
                    row: decision.to_row(),
                }
            })
            .collect();

        let summary = self.submitter.submit_lines(approval_log::TAB, lines).await;
        Ok(DecisionResult {
            planning_number: request.planning_number,
            status: request.status,
            skipped,
            summary,
        })
    }
}
