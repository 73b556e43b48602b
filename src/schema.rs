//! Column-offset tables for every tab of the remote spreadsheet.
//!
//! The store enforces no schema; each tab's layout is a positional contract.
//! Offsets are 0-indexed into the raw row arrays returned by the store. The
//! data-start row is fixed per tab (the primary ledgers carry six rows of
//! header/metadata, the append-only logs a single header row) and is never
//! inferred at runtime.

use crate::errors::ServiceError;

/// `INDENT` — the planning-request ledger. One row per requested product
/// line; lines of one request share a planning number.
pub mod indent {
    pub const TAB: &str = "INDENT";
    pub const DATA_START_ROW: usize = 6;
    /// Fixed write width (columns A-V). Trailing reserved columns are sent
    /// as empty strings so positional writes cannot shift.
    pub const ROW_WIDTH: usize = 22;

    pub const TIMESTAMP: usize = 0;
    pub const PLANNING_NO: usize = 1;
    pub const SERIAL_NO: usize = 2;
    pub const DATE: usize = 3;
    pub const REQUESTER_NAME: usize = 4;
    pub const PROJECT_NAME: usize = 5;
    pub const FIRM_NAME: usize = 6;
    pub const VENDOR_NAME: usize = 7;
    pub const ITEM_TYPE: usize = 8;
    pub const PACKING_DETAIL: usize = 9;
    pub const ITEM_NAME: usize = 10;
    pub const UOM: usize = 11;
    pub const QTY: usize = 12;
    pub const QTY_SET: usize = 13;
    pub const TOTAL_QTY: usize = 14;
    pub const REMARKS: usize = 15;
    pub const STATE: usize = 16;
    pub const DEPARTMENT: usize = 17;
    /// Actual-date column; emptiness drives the pending/history partition.
    pub const ACTUAL: usize = 19;
    pub const APPROVAL_STATUS: usize = 21;
}

/// `Approval` — append-only audit log of approval decisions, keyed by
/// (planning number, serial number). Rows are padded to the INDENT width
/// because the store's insert path validates a minimum column count.
pub mod approval_log {
    pub const TAB: &str = "Approval";
    pub const DATA_START_ROW: usize = 1;
    pub const ROW_WIDTH: usize = 22;

    pub const TIMESTAMP: usize = 0;
    pub const PLANNING_NO: usize = 1;
    pub const SERIAL_NO: usize = 2;
    pub const STATUS: usize = 3;
    pub const REMARKS: usize = 4;
}

/// `PO` — the purchase-order ledger. Created in bulk by PO generation
/// (columns A-O), then mutated in place by receiving and payment, which is
/// why the read width is far larger than the insert width.
pub mod po {
    pub const TAB: &str = "PO";
    pub const HEADER_ROW: usize = 5;
    pub const DATA_START_ROW: usize = 6;
    /// Width of a freshly generated PO line (columns A-O).
    pub const INSERT_WIDTH: usize = 15;
    /// Width of a positional in-place update (columns A-AU).
    pub const UPDATE_WIDTH: usize = 47;

    pub const TIMESTAMP: usize = 0;
    pub const PLANNING_NO: usize = 1;
    pub const SERIAL_NO: usize = 2;
    pub const PO_NO: usize = 3;
    pub const PO_DATE: usize = 4;
    pub const QUOTATION_NO: usize = 5;
    pub const VENDOR_NAME: usize = 6;
    pub const ITEM_NAME: usize = 7;
    pub const QTY: usize = 8;
    pub const RATE: usize = 9;
    pub const GST_PCT: usize = 10;
    pub const DISCOUNT_PCT: usize = 11;
    pub const GRAND_TOTAL: usize = 12;
    pub const PO_COPY_URL: usize = 13;
    pub const PROJECT_NAME: usize = 14;
    pub const FIRM_NAME: usize = 15;
    pub const PO_STATUS: usize = 16;
    pub const PO_REMARKS: usize = 17;
    pub const PO_SIGNATURE_URL: usize = 18;
    pub const RECEIVING_QTY: usize = 19;
    pub const BALANCE: usize = 20;
    pub const RECEIVING_STATUS: usize = 21;
    pub const PLANNED: usize = 22;
    pub const ACTUAL: usize = 23;
    pub const DELAY: usize = 24;
    pub const BILL_TYPE: usize = 25;
    pub const BILL_NO: usize = 26;
    pub const BILL_DATE: usize = 27;
    pub const BILL_AMOUNT: usize = 28;
    pub const DISCOUNT_AMOUNT: usize = 29;
    pub const BILL_IMAGE_URL: usize = 30;
    pub const TRANSPORTER_NAME: usize = 31;
    pub const LR_NO: usize = 32;
    pub const STATUS2: usize = 33;
    pub const REMARKS2: usize = 34;
    pub const PLANNED2: usize = 35;
    pub const ACTUAL2: usize = 36;
    pub const TIMER_DELAY: usize = 37;
    /// Timer status, not the payment state; the payment queue keys off
    /// [`PAYMENT_STATUS`] further right.
    pub const TIMER_STATUS: usize = 38;
    pub const PAYMENT_MODE: usize = 39;
    pub const PAYMENT_DONE: usize = 40;
    pub const PAYMENT_REASON: usize = 41;
    pub const PAYMENT_REF_NO: usize = 42;
    pub const PAYMENT_STATUS: usize = 43;
    pub const PENDING_AMOUNT: usize = 44;
}

/// `Received History` — append-only receiving log, one row per dirty line
/// per receiving submission.
pub mod received_history {
    pub const TAB: &str = "Received History";
    pub const DATA_START_ROW: usize = 1;
    pub const ROW_WIDTH: usize = 16;

    pub const TIMESTAMP: usize = 0;
    pub const PLANNING_NO: usize = 1;
    pub const SERIAL_NO: usize = 2;
    pub const BILL_TYPE: usize = 3;
    pub const RECEIVED_QTY: usize = 4;
    pub const BILL_NO: usize = 5;
    pub const BILL_DATE: usize = 6;
    pub const BILL_AMOUNT: usize = 7;
    pub const DISCOUNT_AMOUNT: usize = 8;
    pub const BILL_IMAGE_URL: usize = 9;
    pub const TRANSPORTER_NAME: usize = 10;
    pub const LR_NO: usize = 11;
    pub const PO_NO: usize = 12;
    pub const FIRM_NAME: usize = 13;
    pub const VENDOR_NAME: usize = 14;
    pub const TRANSPORT_CHARGE: usize = 15;
}

/// `Payment History` — append-only payment log.
pub mod payment_history {
    pub const TAB: &str = "Payment History";
    pub const DATA_START_ROW: usize = 1;
    pub const ROW_WIDTH: usize = 10;

    pub const TIMESTAMP: usize = 0;
    pub const PLANNING_NO: usize = 1;
    pub const SERIAL_NO: usize = 2;
    pub const PAYMENT_MODE: usize = 3;
    pub const AMOUNT: usize = 4;
    pub const REASON: usize = 5;
    pub const REFERENCE_NO: usize = 6;
    pub const DEDUCTION: usize = 7;
    pub const VENDOR_NAME: usize = 8;
    pub const BILL_NO: usize = 9;
}

/// `Vendors` — read-only vendor roll-up maintained by sheet formulas.
pub mod vendors {
    pub const TAB: &str = "Vendors";
    pub const DATA_START_ROW: usize = 1;

    pub const SERIAL_NO: usize = 0;
    pub const VENDOR_NAME: usize = 1;
    pub const TOTAL_QTY: usize = 2;
    pub const TOTAL_PO_QTY: usize = 3;
    pub const TOTAL_RECEIVED_QTY: usize = 4;
}

/// `LOGIN` — read-only user list for authentication.
pub mod login {
    pub const TAB: &str = "LOGIN";
    pub const DATA_START_ROW: usize = 1;

    pub const USERNAME: usize = 0;
    pub const PASSWORD: usize = 1;
    pub const ROLE: usize = 2;
    pub const PAGES: usize = 3;
}

/// Startup assertion that every offset table fits inside its tab's declared
/// width. Catches a mis-edited offset before the first write corrupts a row.
pub fn validate_row_widths() -> Result<(), ServiceError> {
    let checks: [(&str, usize, usize); 5] = [
        (indent::TAB, indent::APPROVAL_STATUS, indent::ROW_WIDTH),
        (
            approval_log::TAB,
            approval_log::REMARKS,
            approval_log::ROW_WIDTH,
        ),
        (po::TAB, po::PENDING_AMOUNT, po::UPDATE_WIDTH),
        (
            received_history::TAB,
            received_history::TRANSPORT_CHARGE,
            received_history::ROW_WIDTH,
        ),
        (
            payment_history::TAB,
            payment_history::BILL_NO,
            payment_history::ROW_WIDTH,
        ),
    ];
    for (tab, max_offset, width) in checks {
        if max_offset >= width {
            return Err(ServiceError::Internal(format!(
                "schema for tab '{tab}' places offset {max_offset} outside its row width {width}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_widths_are_consistent() {
        validate_row_widths().expect("schema widths must hold");
    }

    // The offsets below are a contract with the external sheet layout; any
    // drift here silently corrupts reads and positional writes.
    #[test]
    fn indent_offsets_are_pinned() {
        assert_eq!(indent::PLANNING_NO, 1);
        assert_eq!(indent::SERIAL_NO, 2);
        assert_eq!(indent::ITEM_NAME, 10);
        assert_eq!(indent::QTY, 12);
        assert_eq!(indent::QTY_SET, 13);
        assert_eq!(indent::TOTAL_QTY, 14);
        assert_eq!(indent::DEPARTMENT, 17);
        assert_eq!(indent::ACTUAL, 19);
        assert_eq!(indent::APPROVAL_STATUS, 21);
        assert_eq!(indent::DATA_START_ROW, 6);
        assert_eq!(indent::ROW_WIDTH, 22);
    }

    #[test]
    fn po_offsets_are_pinned() {
        assert_eq!(po::PO_NO, 3);
        assert_eq!(po::ITEM_NAME, 7);
        assert_eq!(po::RATE, 9);
        assert_eq!(po::GRAND_TOTAL, 12);
        assert_eq!(po::PO_STATUS, 16);
        assert_eq!(po::RECEIVING_QTY, 19);
        assert_eq!(po::RECEIVING_STATUS, 21);
        assert_eq!(po::BILL_TYPE, 25);
        assert_eq!(po::BILL_AMOUNT, 28);
        assert_eq!(po::TIMER_STATUS, 38);
        assert_eq!(po::PAYMENT_DONE, 40);
        assert_eq!(po::PAYMENT_STATUS, 43);
        assert_eq!(po::PENDING_AMOUNT, 44);
        assert_eq!(po::HEADER_ROW, 5);
        assert_eq!(po::DATA_START_ROW, 6);
    }

    #[test]
    fn log_tab_offsets_are_pinned() {
        assert_eq!(approval_log::STATUS, 3);
        assert_eq!(received_history::RECEIVED_QTY, 4);
        assert_eq!(received_history::TRANSPORT_CHARGE, 15);
        assert_eq!(payment_history::DEDUCTION, 7);
        assert_eq!(vendors::VENDOR_NAME, 1);
        assert_eq!(vendors::TOTAL_RECEIVED_QTY, 4);
        assert_eq!(vendors::DATA_START_ROW, 1);
        assert_eq!(login::PAGES, 3);
    }
}
