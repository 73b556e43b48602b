use serde::Serialize;
use serde_json::Value;

use crate::schema::vendors as col;
use crate::sheets::row::RowReader;

/// One row of the `Vendors` roll-up tab. The totals are maintained by sheet
/// formulas and pass through as text.
#[derive(Debug, Clone, Serialize)]
pub struct VendorSummary {
    pub serial_number: String,
    pub vendor_name: String,
    pub total_qty: String,
    pub total_po_qty: String,
    pub total_received_qty: String,
}

impl VendorSummary {
    /// Maps a raw vendor row. Rows missing either the serial number or the
    /// vendor name are formula padding and are discarded.
    pub fn from_row(cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        let serial_number = row.text(col::SERIAL_NO);
        let vendor_name = row.text(col::VENDOR_NAME);
        if serial_number.is_empty() || vendor_name.is_empty() {
            return None;
        }
        Some(Self {
            serial_number,
            vendor_name,
            total_qty: row.text(col::TOTAL_QTY),
            total_po_qty: row.text(col::TOTAL_PO_QTY),
            total_received_qty: row.text(col::TOTAL_RECEIVED_QTY),
        })
    }
}
