use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::approval::ApprovalStatus;
use crate::schema::indent as col;
use crate::sheets::row::{RowBuilder, RowReader};

/// One product line of a planning request in the `INDENT` ledger. Lines of
/// one request share a planning number; the serial number orders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningLine {
    pub planning_number: String,
    pub serial_number: String,
    pub date: String,
    pub requester_name: String,
    pub project_name: String,
    pub firm_name: String,
    pub vendor_name: String,
    pub item_type: String,
    pub packing_detail: String,
    pub item_name: String,
    pub uom: String,
    pub qty: f64,
    pub qty_set: f64,
    pub total_qty: f64,
    pub remarks: String,
    pub state: String,
    pub department: String,
    /// Actual-date column; emptiness drives the pending/history partition.
    pub actual_date: String,
    pub approval_status: ApprovalStatus,
}

impl PlanningLine {
    /// BOS ("Balance of System") item types use the qty × qty/set rule.
    pub fn is_bos(&self) -> bool {
        self.item_type.trim().eq_ignore_ascii_case("bos")
    }

    /// Maps a raw ledger row; fully blank rows (sheet formatting artifacts)
    /// map to `None`.
    pub fn from_row(cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        if row.is_blank() {
            return None;
        }
        Some(Self {
            planning_number: row.text(col::PLANNING_NO),
            serial_number: row.text(col::SERIAL_NO),
            date: row.text(col::DATE),
            requester_name: row.text(col::REQUESTER_NAME),
            project_name: row.text(col::PROJECT_NAME),
            firm_name: row.text(col::FIRM_NAME),
            vendor_name: row.text(col::VENDOR_NAME),
            item_type: row.text(col::ITEM_TYPE),
            packing_detail: row.text(col::PACKING_DETAIL),
            item_name: row.text(col::ITEM_NAME),
            uom: row.text(col::UOM),
            qty: row.number(col::QTY),
            qty_set: row.number(col::QTY_SET),
            total_qty: row.number(col::TOTAL_QTY),
            remarks: row.text(col::REMARKS),
            state: row.text(col::STATE),
            department: row.text(col::DEPARTMENT),
            actual_date: row.text(col::ACTUAL),
            approval_status: ApprovalStatus::from_cell(&row.text(col::APPROVAL_STATUS)),
        })
    }

    /// Serializes to the ledger's fixed write width. The status column is
    /// left empty so the store's script does not stamp a default.
    pub fn to_row(&self, timestamp: &str) -> Vec<Value> {
        RowBuilder::new(col::ROW_WIDTH)
            .set(col::TIMESTAMP, timestamp)
            .set(col::PLANNING_NO, &self.planning_number)
            .set(col::SERIAL_NO, &self.serial_number)
            .set(col::DATE, &self.date)
            .set(col::REQUESTER_NAME, &self.requester_name)
            .set(col::PROJECT_NAME, &self.project_name)
            .set(col::FIRM_NAME, &self.firm_name)
            .set(col::VENDOR_NAME, &self.vendor_name)
            .set(col::ITEM_TYPE, &self.item_type)
            .set(col::PACKING_DETAIL, &self.packing_detail)
            .set(col::ITEM_NAME, &self.item_name)
            .set(col::UOM, &self.uom)
            .set(col::QTY, fmt_qty(self.qty))
            .set(col::QTY_SET, fmt_qty(self.qty_set))
            .set(col::TOTAL_QTY, fmt_qty(self.total_qty))
            .set(col::REMARKS, &self.remarks)
            .set(col::STATE, &self.state)
            .set(col::DEPARTMENT, &self.department)
            .build()
    }
}

/// Quantities are written as plain strings, whole numbers without a
/// fractional part.
fn fmt_qty(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
