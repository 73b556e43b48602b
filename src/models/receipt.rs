use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::received_history as col;
use crate::sheets::row::{RowBuilder, RowReader};

/// One append-only row in `Received History`, written once per dirty line
/// of a receiving submission batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub timestamp: String,
    pub planning_number: String,
    pub serial_number: String,
    pub bill_type: String,
    pub received_qty: f64,
    pub bill_no: String,
    pub bill_date: String,
    pub bill_amount: f64,
    pub discount_amount: f64,
    pub bill_image_url: String,
    pub transporter_name: String,
    pub lr_no: String,
    pub po_number: String,
    pub firm_name: String,
    pub vendor_name: String,
    pub transport_charge: f64,
}

impl ReceiptRecord {
    pub fn from_row(cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        if row.is_blank() {
            return None;
        }
        Some(Self {
            timestamp: row.text(col::TIMESTAMP),
            planning_number: row.text(col::PLANNING_NO),
            serial_number: row.text(col::SERIAL_NO),
            bill_type: row.text(col::BILL_TYPE),
            received_qty: row.number(col::RECEIVED_QTY),
            bill_no: row.text(col::BILL_NO),
            bill_date: row.text(col::BILL_DATE),
            bill_amount: row.number(col::BILL_AMOUNT),
            discount_amount: row.number(col::DISCOUNT_AMOUNT),
            bill_image_url: row.text(col::BILL_IMAGE_URL),
            transporter_name: row.text(col::TRANSPORTER_NAME),
            lr_no: row.text(col::LR_NO),
            po_number: row.text(col::PO_NO),
            firm_name: row.text(col::FIRM_NAME),
            vendor_name: row.text(col::VENDOR_NAME),
            transport_charge: row.number(col::TRANSPORT_CHARGE),
        })
    }

    pub fn to_row(&self) -> Vec<Value> {
        RowBuilder::new(col::ROW_WIDTH)
            .set(col::TIMESTAMP, &self.timestamp)
            .set(col::PLANNING_NO, &self.planning_number)
            .set(col::SERIAL_NO, &self.serial_number)
            .set(col::BILL_TYPE, &self.bill_type)
            .set_number(col::RECEIVED_QTY, self.received_qty)
            .set(col::BILL_NO, &self.bill_no)
            .set(col::BILL_DATE, &self.bill_date)
            .set_number(col::BILL_AMOUNT, self.bill_amount)
            .set_number(col::DISCOUNT_AMOUNT, self.discount_amount)
            .set(col::BILL_IMAGE_URL, &self.bill_image_url)
            .set(col::TRANSPORTER_NAME, &self.transporter_name)
            .set(col::LR_NO, &self.lr_no)
            .set_number(col::TRANSPORT_CHARGE, self.transport_charge)
            .build()
    }
}
