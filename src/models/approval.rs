use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::approval_log as col;
use crate::sheets::row::{RowBuilder, RowReader};

/// Approval state of a planning line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Parses the status cell; anything unrecognized (including the sheet's
    /// "Pending Review" default) reads as pending.
    pub fn from_cell(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

/// One append-only audit row in the `Approval` tab, keyed by
/// (planning number, serial number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub timestamp: String,
    pub planning_number: String,
    pub serial_number: String,
    pub status: ApprovalStatus,
    pub remarks: String,
}

impl ApprovalDecision {
    pub fn from_row(cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        if row.is_blank() {
            return None;
        }
        Some(Self {
            timestamp: row.text(col::TIMESTAMP),
            planning_number: row.text(col::PLANNING_NO),
            serial_number: row.text(col::SERIAL_NO),
            status: ApprovalStatus::from_cell(&row.text(col::STATUS)),
            remarks: row.text(col::REMARKS),
        })
    }

    /// Serializes to the audit tab's padded width; the store's insert path
    /// validates a minimum column count, so short rows are rejected.
    pub fn to_row(&self) -> Vec<Value> {
        RowBuilder::new(col::ROW_WIDTH)
            .set(col::TIMESTAMP, &self.timestamp)
            .set(col::PLANNING_NO, &self.planning_number)
            .set(col::SERIAL_NO, &self.serial_number)
            .set(col::STATUS, self.status.as_str())
            .set(col::REMARKS, &self.remarks)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parsing_defaults_to_pending() {
        assert_eq!(ApprovalStatus::from_cell("Approved"), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from_cell("REJECTED"), ApprovalStatus::Rejected);
        assert_eq!(ApprovalStatus::from_cell("Pending Review"), ApprovalStatus::Pending);
        assert_eq!(ApprovalStatus::from_cell(""), ApprovalStatus::Pending);
    }

    #[test]
    fn audit_row_is_padded_to_full_width() {
        let decision = ApprovalDecision {
            timestamp: "15/01/2024 09:00:00".into(),
            planning_number: "PN-04".into(),
            serial_number: "2".into(),
            status: ApprovalStatus::Approved,
            remarks: "ok".into(),
        };
        let row = decision.to_row();
        assert_eq!(row.len(), 22);
        assert_eq!(row[1], json!("PN-04"));
        assert_eq!(row[3], json!("Approved"));
        assert_eq!(row[5], json!(""));
        assert_eq!(row[21], json!(""));
    }

    #[test]
    fn audit_row_round_trips() {
        let decision = ApprovalDecision {
            timestamp: "15/01/2024 09:00:00".into(),
            planning_number: "PN-04".into(),
            serial_number: "2".into(),
            status: ApprovalStatus::Rejected,
            remarks: "wrong vendor".into(),
        };
        let parsed = ApprovalDecision::from_row(&decision.to_row()).expect("row maps");
        assert_eq!(parsed.planning_number, "PN-04");
        assert_eq!(parsed.status, ApprovalStatus::Rejected);
        assert_eq!(parsed.remarks, "wrong vendor");
    }
}
