use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calc;
use crate::schema::po as col;
use crate::sheets::row::{RowBuilder, RowReader};

/// One line of the `PO` ledger. Created in bulk by PO generation, then
/// mutated in place by approval, receiving, and payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// Absolute 1-based row number in the sheet, required for positional
    /// in-place updates.
    pub sheet_row: usize,
    pub planning_number: String,
    pub serial_number: String,
    pub po_number: String,
    pub po_date: String,
    pub quotation_number: String,
    pub vendor_name: String,
    pub item_name: String,
    pub qty: f64,
    pub rate: f64,
    pub gst_pct: f64,
    pub discount_pct: f64,
    pub grand_total_amount: f64,
    pub po_copy_url: String,
    pub project_name: String,
    pub firm_name: String,
    pub po_status: String,
    pub po_remarks: String,
    pub receiving_qty: f64,
    pub receiving_status: String,
    /// Actual-date column; emptiness drives the pending/history partition.
    pub actual_date: String,
    pub bill_type: String,
    pub bill_no: String,
    pub bill_date: String,
    pub bill_amount: f64,
    pub discount_amount: f64,
    pub bill_image_url: String,
    pub transporter_name: String,
    pub lr_no: String,
    pub payment_status: String,
    pub payment_mode: String,
    pub payment_done: f64,
    pub payment_reason: String,
    pub payment_ref_no: String,
}

impl PurchaseOrderLine {
    /// Maps a raw PO row. Besides the all-blank discard, a PO row needs its
    /// two load-bearing fields: a planning number and at least one of
    /// vendor or item name; merged/trailing formatting rows fail that.
    pub fn from_row(sheet_row: usize, cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        if row.is_blank() {
            return None;
        }
        let planning_number = row.text(col::PLANNING_NO);
        let vendor_name = row.text(col::VENDOR_NAME);
        let item_name = row.text(col::ITEM_NAME);
        if planning_number.is_empty() || (vendor_name.is_empty() && item_name.is_empty()) {
            return None;
        }
        Some(Self {
            sheet_row,
            planning_number,
            serial_number: row.text(col::SERIAL_NO),
            po_number: row.text(col::PO_NO),
            po_date: row.text(col::PO_DATE),
            quotation_number: row.text(col::QUOTATION_NO),
            vendor_name,
            item_name,
            qty: row.number(col::QTY),
            rate: row.number(col::RATE),
            gst_pct: row.number(col::GST_PCT),
            discount_pct: row.number(col::DISCOUNT_PCT),
            grand_total_amount: row.number(col::GRAND_TOTAL),
            po_copy_url: row.text(col::PO_COPY_URL),
            project_name: row.text(col::PROJECT_NAME),
            firm_name: row.text(col::FIRM_NAME),
            po_status: row.text(col::PO_STATUS),
            po_remarks: row.text(col::PO_REMARKS),
            receiving_qty: row.number(col::RECEIVING_QTY),
            receiving_status: row.text(col::RECEIVING_STATUS),
            actual_date: row.text(col::ACTUAL),
            bill_type: row.text(col::BILL_TYPE),
            bill_no: row.text(col::BILL_NO),
            bill_date: row.text(col::BILL_DATE),
            bill_amount: row.number(col::BILL_AMOUNT),
            discount_amount: row.number(col::DISCOUNT_AMOUNT),
            bill_image_url: row.text(col::BILL_IMAGE_URL),
            transporter_name: row.text(col::TRANSPORTER_NAME),
            lr_no: row.text(col::LR_NO),
            payment_status: row.text(col::PAYMENT_STATUS),
            payment_mode: row.text(col::PAYMENT_MODE),
            payment_done: row.number(col::PAYMENT_DONE),
            payment_reason: row.text(col::PAYMENT_REASON),
            payment_ref_no: row.text(col::PAYMENT_REF_NO),
        })
    }

    /// GST-inclusive line total recomputed from the editable inputs.
    pub fn line_amount(&self) -> f64 {
        calc::line_amount(self.rate, self.qty, self.discount_pct, self.gst_pct)
    }

    /// Outstanding balance on this line's bill.
    pub fn pending_amount(&self) -> f64 {
        calc::pending_amount(self.bill_amount, self.payment_done)
    }
}

/// Row shape written by PO generation (columns A-O).
#[derive(Debug, Clone)]
pub struct NewPoRow<'a> {
    pub timestamp: &'a str,
    pub planning_number: &'a str,
    pub serial_number: usize,
    pub po_number: &'a str,
    pub po_date: &'a str,
    pub quotation_number: &'a str,
    pub vendor_name: &'a str,
    pub item_name: &'a str,
    pub qty: f64,
    pub rate: f64,
    pub gst_pct: f64,
    pub discount_pct: f64,
    pub po_copy_url: &'a str,
    pub project_name: &'a str,
}

impl NewPoRow<'_> {
    pub fn to_row(&self) -> Vec<Value> {
        let grand_total = calc::line_amount(self.rate, self.qty, self.discount_pct, self.gst_pct);
        RowBuilder::new(col::INSERT_WIDTH)
            .set(col::TIMESTAMP, self.timestamp)
            .set(col::PLANNING_NO, self.planning_number)
            .set(col::SERIAL_NO, self.serial_number.to_string())
            .set(col::PO_NO, self.po_number)
            .set(col::PO_DATE, self.po_date)
            .set(col::QUOTATION_NO, self.quotation_number)
            .set(col::VENDOR_NAME, self.vendor_name)
            .set(col::ITEM_NAME, self.item_name)
            .set(col::QTY, self.qty.to_string())
            .set(col::RATE, self.rate.to_string())
            .set(col::GST_PCT, self.gst_pct.to_string())
            .set(col::DISCOUNT_PCT, self.discount_pct.to_string())
            .set(col::GRAND_TOTAL, format!("{}", grand_total.round() as i64))
            .set(col::PO_COPY_URL, self.po_copy_url)
            .set(col::PROJECT_NAME, self.project_name)
            .build()
    }
}

/// Positional update row for the PO-approval decision (status, remarks,
/// signature URL); every other column goes out empty and is ignored by the
/// store's update-variant action.
pub fn status_update_row(status: &str, remarks: &str, signature_url: &str) -> Vec<Value> {
    RowBuilder::new(col::UPDATE_WIDTH)
        .set(col::PO_STATUS, status)
        .set(col::PO_REMARKS, remarks)
        .set(col::PO_SIGNATURE_URL, signature_url)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_cells() -> Vec<Value> {
        let mut cells = vec![json!(""); 45];
        cells[1] = json!("PN-05");
        cells[2] = json!("1");
        cells[3] = json!("PO-12");
        cells[6] = json!("Acme Solar");
        cells[7] = json!("Inverter");
        cells[8] = json!(4);
        cells[9] = json!(2500);
        cells[10] = json!(18);
        cells[11] = json!(0);
        cells[16] = json!("Approved");
        cells[28] = json!(11800);
        cells[38] = json!("On Time");
        cells[40] = json!(5000);
        cells[43] = json!("Pending");
        cells
    }

    #[test]
    fn maps_po_row_by_offset() {
        let line = PurchaseOrderLine::from_row(7, &sample_cells()).expect("row maps");
        assert_eq!(line.sheet_row, 7);
        assert_eq!(line.po_number, "PO-12");
        assert_eq!(line.qty, 4.0);
        assert_eq!(line.rate, 2500.0);
        assert_eq!(line.po_status, "Approved");
        assert_eq!(line.pending_amount(), 6800.0);
        assert_eq!(line.line_amount(), 11800.0);
        // Column 43 is the payment state; column 38 holds the timer status.
        assert_eq!(line.payment_status, "Pending");
    }

    #[test]
    fn rows_without_load_bearing_fields_are_discarded() {
        // Planning number but neither vendor nor item: formatting artifact.
        let mut cells = vec![json!(""); 45];
        cells[1] = json!("PN-05");
        cells[12] = json!("999");
        assert!(PurchaseOrderLine::from_row(7, &cells).is_none());

        // Vendor but no planning number.
        let mut cells = vec![json!(""); 45];
        cells[6] = json!("Acme Solar");
        assert!(PurchaseOrderLine::from_row(7, &cells).is_none());
    }

    #[test]
    fn new_po_row_derives_rounded_grand_total() {
        let row = NewPoRow {
            timestamp: "15/01/2024 09:00:00",
            planning_number: "PN-05",
            serial_number: 1,
            po_number: "PO-12",
            po_date: "2024-01-15",
            quotation_number: "Q-9",
            vendor_name: "Acme Solar",
            item_name: "Inverter",
            qty: 10.0,
            rate: 100.0,
            gst_pct: 18.0,
            discount_pct: 10.0,
            po_copy_url: "https://files/po12.pdf",
            project_name: "Plant A",
        }
        .to_row();
        assert_eq!(row.len(), 15);
        assert_eq!(row[12], json!("1062"));
        assert_eq!(row[13], json!("https://files/po12.pdf"));
    }

    #[test]
    fn status_update_touches_only_decision_columns() {
        let row = status_update_row("Approved", "ok", "https://files/sig.png");
        assert_eq!(row.len(), 47);
        assert_eq!(row[16], json!("Approved"));
        assert_eq!(row[17], json!("ok"));
        assert_eq!(row[18], json!("https://files/sig.png"));
        assert_eq!(row[0], json!(""));
        assert_eq!(row[46], json!(""));
    }
}
