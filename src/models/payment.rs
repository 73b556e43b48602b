use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::payment_history as col;
use crate::sheets::row::{RowBuilder, RowReader};

/// One append-only row in `Payment History`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub timestamp: String,
    pub planning_number: String,
    pub serial_number: String,
    pub payment_mode: String,
    pub amount: f64,
    pub reason: String,
    pub reference_no: String,
    pub deduction: f64,
    pub vendor_name: String,
    pub bill_no: String,
}

impl PaymentRecord {
    pub fn from_row(cells: &[Value]) -> Option<Self> {
        let row = RowReader::new(cells);
        if row.is_blank() {
            return None;
        }
        Some(Self {
            timestamp: row.text(col::TIMESTAMP),
            planning_number: row.text(col::PLANNING_NO),
            serial_number: row.text(col::SERIAL_NO),
            payment_mode: row.text(col::PAYMENT_MODE),
            amount: row.number(col::AMOUNT),
            reason: row.text(col::REASON),
            reference_no: row.text(col::REFERENCE_NO),
            deduction: row.number(col::DEDUCTION),
            vendor_name: row.text(col::VENDOR_NAME),
            bill_no: row.text(col::BILL_NO),
        })
    }

    pub fn to_row(&self) -> Vec<Value> {
        RowBuilder::new(col::ROW_WIDTH)
            .set(col::TIMESTAMP, &self.timestamp)
            .set(col::PLANNING_NO, &self.planning_number)
            .set(col::SERIAL_NO, &self.serial_number)
            .set(col::PAYMENT_MODE, &self.payment_mode)
            .set_number(col::AMOUNT, self.amount)
            .set(col::REASON, &self.reason)
            .set(col::REFERENCE_NO, &self.reference_no)
            .set_number(col::DEDUCTION, self.deduction)
            .set(col::VENDOR_NAME, &self.vendor_name)
            .set(col::BILL_NO, &self.bill_no)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_row_round_trips() {
        let record = PaymentRecord {
            timestamp: "15/01/2024 09:00:00".into(),
            planning_number: "PN-05".into(),
            serial_number: "1".into(),
            payment_mode: "NEFT".into(),
            amount: 5000.0,
            reason: "advance".into(),
            reference_no: "UTR-123".into(),
            deduction: 0.0,
            vendor_name: "Acme Solar".into(),
            bill_no: "B-77".into(),
        };
        let row = record.to_row();
        assert_eq!(row.len(), 10);
        assert_eq!(row[4], json!(5000.0));
        let parsed = PaymentRecord::from_row(&row).expect("row maps");
        assert_eq!(parsed.reference_no, "UTR-123");
        assert_eq!(parsed.vendor_name, "Acme Solar");
    }
}
