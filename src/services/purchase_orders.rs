//! Purchase-order stage: listing the PO ledger, generating PO lines in bulk
//! from an approved planning request, and the in-place status decision.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::aggregate::{group_by_key, merge_names, partition_pending, GroupedView};
use crate::calc;
use crate::errors::ServiceError;
use crate::models::{status_update_row, NewPoRow, PlanningLine, PurchaseOrderLine};
use crate::refresh::{map_in_chunks, Snapshot, ViewModel};
use crate::schema::{indent, po};
use crate::sheets::{StoreClient, Submitter};

const PO_PREFIX: &str = "PO";
const PO_PAD: usize = 2;

/// One priced line of a PO to be generated.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePoLine {
    pub item_name: String,
    pub qty: f64,
    pub rate: f64,
    #[serde(default)]
    pub gst_pct: f64,
    #[serde(default)]
    pub discount_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePoRequest {
    pub planning_number: String,
    /// Explicit PO number; derived from the ledger sequence when absent.
    #[serde(default)]
    pub po_number: Option<String>,
    pub po_date: String,
    #[serde(default)]
    pub quotation_number: String,
    pub vendor_name: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub po_copy_url: String,
    pub lines: Vec<GeneratePoLine>,
}

/// Money summary of a priced line set: discounted base, GST on top of it,
/// and the GST-inclusive total.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PoTotals {
    pub subtotal: f64,
    pub gst_amount: f64,
    pub grand_total: f64,
}

pub fn po_totals(lines: &[GeneratePoLine]) -> PoTotals {
    let mut subtotal = 0.0;
    let mut grand_total = 0.0;
    for line in lines {
        let base = line.rate * line.qty;
        let discounted = base - base * line.discount_pct / 100.0;
        subtotal += discounted;
        grand_total += calc::line_amount(line.rate, line.qty, line.discount_pct, line.gst_pct);
    }
    PoTotals {
        subtotal,
        gst_amount: grand_total - subtotal,
        grand_total,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratePoResult {
    pub planning_number: String,
    pub po_number: String,
    pub line_count: usize,
    pub totals: PoTotals,
}

/// One planning number's PO lines with the item and vendor names of the
/// whole line set merged into display summaries.
#[derive(Debug, Clone, Serialize)]
pub struct PoBoardGroup {
    pub item_names: String,
    pub vendor_names: String,
    #[serde(flatten)]
    pub group: GroupedView<PurchaseOrderLine>,
}

/// PO groups split on the status column: groups whose lines carry no
/// decision yet versus the decided history.
#[derive(Debug, Clone, Serialize)]
pub struct PoBoard {
    pub pending: Vec<PoBoardGroup>,
    pub history: Vec<PoBoardGroup>,
}

fn board_groups(lines: Vec<PurchaseOrderLine>) -> Vec<PoBoardGroup> {
    group_by_key(lines, |l| l.planning_number.clone())
        .into_iter()
        .map(|group| PoBoardGroup {
            item_names: merge_names(group.items.iter().map(|l| l.item_name.as_str())),
            vendor_names: merge_names(group.items.iter().map(|l| l.vendor_name.as_str())),
            group,
        })
        .collect()
}

/// Status decision on every line of one PO, applied positionally.
#[derive(Debug, Clone, Deserialize)]
pub struct PoStatusRequest {
    pub planning_number: String,
    pub status: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub signature_url: String,
    /// Absolute 1-based sheet rows of the lines to update.
    pub sheet_rows: Vec<usize>,
}

pub struct PurchaseOrderService {
    client: StoreClient,
    submitter: Submitter,
    view: ViewModel<PurchaseOrderLine>,
}

impl PurchaseOrderService {
    pub fn new(client: StoreClient, submitter: Submitter) -> Self {
        Self {
            client,
            submitter,
            view: ViewModel::new(),
        }
    }

    pub(crate) async fn load(&self) -> Result<Vec<PurchaseOrderLine>, ServiceError> {
        let grid = self.client.fetch_grid(po::TAB).await?;
        let numbered: Vec<(usize, Vec<serde_json::Value>)> = grid
            .into_iter()
            .enumerate()
            .skip(po::DATA_START_ROW)
            // 0-based grid index to the sheet's absolute 1-based row number.
            .map(|(i, cells)| (i + 1, cells))
            .collect();
        Ok(map_in_chunks(numbered, |(sheet_row, cells)| {
            PurchaseOrderLine::from_row(*sheet_row, cells)
        })
        .await)
    }

    /// Refreshes and returns the full PO ledger.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Snapshot<PurchaseOrderLine> {
        self.view.refresh(|| self.load()).await
    }

    /// PO lines grouped by planning number and split on the status column:
    /// an empty status means the group still awaits a decision. Each group
    /// carries merged item/vendor summaries for the board tables.
    #[instrument(skip(self))]
    pub async fn board(&self) -> Result<PoBoard, ServiceError> {
        let lines = self.load().await?;
        let (pending, decided) = partition_pending(lines, |l| l.po_status.as_str());
        Ok(PoBoard {
            pending: board_groups(pending),
            history: board_groups(decided),
        })
    }

    /// Approved planning lines of one request, in serial order, as the
    /// starting point for PO pricing.
    #[instrument(skip(self))]
    pub async fn load_indent_lines(
        &self,
        planning_number: &str,
    ) -> Result<Vec<PlanningLine>, ServiceError> {
        let grid = self.client.fetch_grid(indent::TAB).await?;
        let body: Vec<_> = grid.into_iter().skip(indent::DATA_START_ROW).collect();
        let mut lines: Vec<PlanningLine> = map_in_chunks(body, |cells| {
            PlanningLine::from_row(cells)
                .filter(|l| l.planning_number == planning_number)
        })
        .await;
        lines.sort_by_key(|l| l.serial_number.parse::<u64>().unwrap_or(u64::MAX));
        Ok(lines)
    }

    async fn next_po_number(&self) -> Result<String, ServiceError> {
        let grid = self.client.fetch_grid(po::TAB).await?;
        let codes: Vec<String> = grid
            .iter()
            .skip(1)
            .map(|cells| crate::sheets::RowReader::new(cells).text(po::PO_NO))
            .collect();
        Ok(calc::next_sequence_number(&codes, PO_PREFIX, PO_PAD))
    }

    /// Generates a PO: one ledger row per priced line, appended in a single
    /// batch so the line set lands contiguously.
    #[instrument(skip(self, request), fields(planning_number = %request.planning_number))]
    pub async fn generate(
        &self,
        request: GeneratePoRequest,
    ) -> Result<GeneratePoResult, ServiceError> {
        if request.planning_number.trim().is_empty() {
            return Err(ServiceError::Validation("planning number is required".into()));
        }
        if request.vendor_name.trim().is_empty() {
            return Err(ServiceError::Validation("vendor name is required".into()));
        }
        if request.lines.is_empty() {
            return Err(ServiceError::Validation(
                "at least one priced line is required".into(),
            ));
        }
        for (i, line) in request.lines.iter().enumerate() {
            if line.item_name.trim().is_empty() {
                return Err(ServiceError::Validation(format!(
                    "line {}: item name is required",
                    i + 1
                )));
            }
            if !(line.qty > 0.0) || line.rate < 0.0 {
                return Err(ServiceError::Validation(format!(
                    "line {}: quantity must be positive and rate non-negative",
                    i + 1
                )));
            }
        }

        let po_number = match request.po_number.as_deref().map(str::trim) {
            Some(pn) if !pn.is_empty() => pn.to_string(),
            _ => match self.next_po_number().await {
                Ok(pn) => pn,
                // Never block generation on the number fetch; a timestamped
                // code keeps the ledger unambiguous.
                Err(err) => {
                    warn!(error = %err, "PO number derivation failed, using fallback");
                    format!("AUTO-{}", Utc::now().timestamp_millis())
                }
            },
        };

        let timestamp = calc::format_timestamp(Local::now().naive_local());
        let rows: Vec<Vec<serde_json::Value>> = request
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                NewPoRow {
                    timestamp: &timestamp,
                    planning_number: &request.planning_number,
                    serial_number: i + 1,
                    po_number: &po_number,
                    po_date: &request.po_date,
                    quotation_number: &request.quotation_number,
                    vendor_name: &request.vendor_name,
                    item_name: &line.item_name,
                    qty: line.qty,
                    rate: line.rate,
                    gst_pct: line.gst_pct,
                    discount_pct: line.discount_pct,
                    po_copy_url: &request.po_copy_url,
                    project_name: &request.project_name,
                }
                .to_row()
            })
            .collect();

        self.submitter.batch_insert(po::TAB, &rows).await?;
        Ok(GeneratePoResult {
            planning_number: request.planning_number,
            po_number,
            line_count: rows.len(),
            totals: po_totals(&request.lines),
        })
    }

    /// Applies a status decision to every targeted line, positionally, one
    /// update per sheet row.
    #[instrument(skip(self, request), fields(planning_number = %request.planning_number))]
    pub async fn update_status(&self, request: PoStatusRequest) -> Result<usize, ServiceError> {
        if request.status.trim().is_empty() {
            return Err(ServiceError::Validation("status is required".into()));
        }
        if request.sheet_rows.is_empty() {
            return Err(ServiceError::Validation(
                "at least one sheet row is required".into(),
            ));
        }
        if request.status.trim().eq_ignore_ascii_case("rejected")
            && request.remarks.trim().is_empty()
        {
            return Err(ServiceError::Validation(
                "remarks are required when rejecting".into(),
            ));
        }

        let row = status_update_row(&request.status, &request.remarks, &request.signature_url);
        for &sheet_row in &request.sheet_rows {
            self.submitter
                .update_row(
                    "POupdate",
                    po::TAB,
                    sheet_row,
                    &row,
                    &[("poNo", &request.planning_number)],
                )
                .await?;
        }
        Ok(request.sheet_rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_split_discounted_base_and_gst() {
        let lines = vec![GeneratePoLine {
            item_name: "Inverter".into(),
            qty: 10.0,
            rate: 100.0,
            gst_pct: 18.0,
            discount_pct: 10.0,
        }];
        let totals = po_totals(&lines);
        assert_eq!(totals.subtotal, 900.0);
        assert_eq!(totals.grand_total, 1062.0);
        assert!((totals.gst_amount - 162.0).abs() < 1e-9);
    }

    #[test]
    fn totals_sum_across_lines() {
        let lines = vec![
            GeneratePoLine {
                item_name: "a".into(),
                qty: 2.0,
                rate: 50.0,
                gst_pct: 0.0,
                discount_pct: 0.0,
            },
            GeneratePoLine {
                item_name: "b".into(),
                qty: 1.0,
                rate: 100.0,
                gst_pct: 0.0,
                discount_pct: 0.0,
            },
        ];
        assert_eq!(po_totals(&lines).grand_total, 200.0);
    }
}
