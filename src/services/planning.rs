//! Planning requests: listing the INDENT ledger and submitting new
//! multi-line requests.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use validator::Validate;

use crate::aggregate::{group_by_key, GroupedView};
use crate::calc;
use crate::errors::ServiceError;
use crate::models::{ApprovalStatus, PlanningLine};
use crate::refresh::{map_in_chunks, Snapshot, ViewModel};
use crate::schema::indent;
use crate::sheets::{LineRow, StoreClient, SubmitSummary, Submitter};

/// Prefix and zero-padding of planning numbers (`PN-01`, `PN-02`, ...).
const PLANNING_PREFIX: &str = "PN";
const PLANNING_PAD: usize = 2;

/// One product line of a new planning request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlanningLine {
    #[validate(length(min = 1, message = "item name is required"))]
    pub item_name: String,
    #[validate(length(min = 1, message = "UOM is required"))]
    pub uom: String,
    pub qty: f64,
    /// Per-set quantity from the master catalog; only meaningful for BOS
    /// item types and forced to 1 otherwise.
    #[serde(default)]
    pub qty_set: Option<f64>,
    #[serde(default)]
    pub packing_detail: String,
    #[serde(default)]
    pub remarks: String,
}

/// A new planning request: shared header fields plus one or more lines.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlanningRequest {
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "requester name is required"))]
    pub requester_name: String,
    #[validate(length(min = 1, message = "project name is required"))]
    pub project_name: String,
    #[validate(length(min = 1, message = "firm name is required"))]
    pub firm_name: String,
    #[validate(length(min = 1, message = "vendor name is required"))]
    pub vendor_name: String,
    #[validate(length(min = 1, message = "item type is required"))]
    pub item_type: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    pub lines: Vec<NewPlanningLine>,
}

impl NewPlanningRequest {
    fn is_bos(&self) -> bool {
        self.item_type.trim().eq_ignore_ascii_case("bos")
    }

    fn validate_request(&self) -> Result<(), ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        if self.lines.is_empty() {
            return Err(ServiceError::Validation(
                "at least one product line is required".into(),
            ));
        }
        for (i, line) in self.lines.iter().enumerate() {
            line.validate()
                .map_err(|e| ServiceError::Validation(format!("line {}: {e}", i + 1)))?;
            if !(line.qty > 0.0) {
                return Err(ServiceError::Validation(format!(
                    "line {}: quantity must be positive",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one planning submission: the assigned number plus per-line
/// results, partial failures included.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningSubmitResult {
    pub planning_number: String,
    pub summary: SubmitSummary,
}

pub struct PlanningService {
    client: StoreClient,
    submitter: Submitter,
    /// Spreadsheet id for the cheaper column-scoped read; empty means the
    /// deployment only supports whole-grid reads.
    master_sheet_id: String,
    view: ViewModel<PlanningLine>,
}

impl PlanningService {
    pub fn new(client: StoreClient, submitter: Submitter, master_sheet_id: String) -> Self {
        Self {
            client,
            submitter,
            master_sheet_id,
            view: ViewModel::new(),
        }
    }

    /// Refreshes and returns the full planning list. On a fetch failure the
    /// snapshot keeps the last good record set with the error alongside.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Snapshot<PlanningLine> {
        self.view.refresh(|| self.load()).await
    }

    /// Planning lines grouped by planning number, for the summary table.
    pub async fn list_grouped(&self) -> (Snapshot<PlanningLine>, Vec<GroupedView<PlanningLine>>) {
        let snapshot = self.list().await;
        let groups = group_by_key(snapshot.records.clone(), |l| l.planning_number.clone());
        (snapshot, groups)
    }

    async fn load(&self) -> Result<Vec<PlanningLine>, ServiceError> {
        let grid = self.client.fetch_grid(indent::TAB).await?;
        let body: Vec<_> = grid.into_iter().skip(indent::DATA_START_ROW).collect();
        Ok(map_in_chunks(body, |cells| PlanningLine::from_row(cells)).await)
    }

    /// Derives the next planning number from every code in the ledger's
    /// planning-number column. Header rows and legacy formats are ignored.
    #[instrument(skip(self))]
    pub async fn next_planning_number(&self) -> Result<String, ServiceError> {
        let codes: Vec<String> = if self.master_sheet_id.is_empty() {
            let grid = self.client.fetch_grid(indent::TAB).await?;
            grid.iter()
                .skip(1)
                .map(|cells| crate::sheets::RowReader::new(cells).text(indent::PLANNING_NO))
                .collect()
        } else {
            self.client
                .fetch_column(&self.master_sheet_id, indent::TAB, "B")
                .await?
        };
        Ok(calc::next_sequence_number(&codes, PLANNING_PREFIX, PLANNING_PAD))
    }

    /// Submits a planning request: one ledger row per product line, all
    /// sharing one freshly assigned planning number, written sequentially.
    /// Per-line failures are reported, never rolled back.
    #[instrument(skip(self, request))]
    pub async fn submit(
        &self,
        request: NewPlanningRequest,
    ) -> Result<PlanningSubmitResult, ServiceError> {
        request.validate_request()?;

        // A failed number fetch falls back to the start of the sequence
        // rather than blocking the submission.
        let planning_number = match self.next_planning_number().await {
            Ok(pn) => pn,
            Err(err) => {
                warn!(error = %err, "planning number derivation failed, using fallback");
                format!("{PLANNING_PREFIX}-01")
            }
        };

        let timestamp = calc::format_timestamp(Local::now().naive_local());
        let is_bos = request.is_bos();
        let starting_serial = 1usize;

        let lines: Vec<LineRow> = request
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let qty_set = if is_bos {
                    line.qty_set.unwrap_or(1.0)
                } else {
                    1.0
                };
                let record = PlanningLine {
                    planning_number: planning_number.clone(),
                    serial_number: (starting_serial + i).to_string(),
                    date: request.date.clone(),
                    requester_name: request.requester_name.clone(),
                    project_name: request.project_name.clone(),
                    firm_name: request.firm_name.clone(),
                    vendor_name: request.vendor_name.clone(),
                    item_type: request.item_type.clone(),
                    packing_detail: line.packing_detail.clone(),
                    item_name: line.item_name.clone(),
                    uom: line.uom.clone(),
                    qty: line.qty,
                    qty_set,
                    total_qty: calc::total_qty(line.qty, qty_set, is_bos),
                    remarks: line.remarks.clone(),
                    state: request.state.clone(),
                    department: request.department.clone(),
                    actual_date: String::new(),
                    approval_status: ApprovalStatus::Pending,
                };
                LineRow {
                    label: line.item_name.clone(),
                    row: record.to_row(&timestamp),
                }
            })
            .collect();

        let summary = self.submitter.submit_lines(indent::TAB, lines).await;
        Ok(PlanningSubmitResult {
            planning_number,
            summary,
        })
    }
}
