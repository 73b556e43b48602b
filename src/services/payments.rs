//! Payment stage: pending/settled views over billed PO lines and the
//! append-only payment log.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::aggregate::{group_by_key, GroupedView};
use crate::calc;
use crate::errors::ServiceError;
use crate::models::{PaymentRecord, PurchaseOrderLine};
use crate::refresh::map_in_chunks;
use crate::schema::payment_history;
use crate::sheets::{StoreClient, Submitter};

use super::purchase_orders::PurchaseOrderService;

/// Billed lines split into the payment queue and the settled history,
/// grouped by planning number.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentBoard {
    pub pending: Vec<GroupedView<PurchaseOrderLine>>,
    pub settled: Vec<GroupedView<PurchaseOrderLine>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentRequest {
    pub planning_number: String,
    pub serial_number: String,
    pub payment_mode: String,
    pub amount: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub reference_no: String,
    #[serde(default)]
    pub deduction: f64,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub bill_no: String,
}

pub struct PaymentService {
    client: StoreClient,
    submitter: Submitter,
    purchase_orders: Arc<PurchaseOrderService>,
}

impl PaymentService {
    pub fn new(
        client: StoreClient,
        submitter: Submitter,
        purchase_orders: Arc<PurchaseOrderService>,
    ) -> Self {
        Self {
            client,
            submitter,
            purchase_orders,
        }
    }

    /// Billed PO lines partitioned on the payment-status column: a line
    /// marked `Pending` there is awaiting payment, anything else (including
    /// blank) is settled history. The timer-status column further left is
    /// never consulted.
    #[instrument(skip(self))]
    pub async fn board(&self) -> Result<PaymentBoard, ServiceError> {
        let lines = self.purchase_orders.load().await?;
        let billed: Vec<PurchaseOrderLine> = lines
            .into_iter()
            .filter(|l| !l.bill_no.trim().is_empty() || l.bill_amount > 0.0)
            .collect();
        let (pending, settled): (Vec<_>, Vec<_>) = billed
            .into_iter()
            .partition(|l| l.payment_status.trim() == "Pending");
        Ok(PaymentBoard {
            pending: group_by_key(pending, |l| l.planning_number.clone()),
            settled: group_by_key(settled, |l| l.planning_number.clone()),
        })
    }

    /// Records one payment as a single append to the payment log.
    #[instrument(skip(self, request), fields(planning_number = %request.planning_number))]
    pub async fn record(&self, request: NewPaymentRequest) -> Result<PaymentRecord, ServiceError> {
        if request.planning_number.trim().is_empty() {
            return Err(ServiceError::Validation("planning number is required".into()));
        }
        if request.payment_mode.trim().is_empty() {
            return Err(ServiceError::Validation("payment mode is required".into()));
        }
        if !(request.amount > 0.0) {
            return Err(ServiceError::Validation(
                "payment amount must be positive".into(),
            ));
        }
        if request.deduction < 0.0 {
            return Err(ServiceError::Validation(
                "deduction cannot be negative".into(),
            ));
        }

        let record = PaymentRecord {
            timestamp: calc::format_timestamp(Local::now().naive_local()),
            planning_number: request.planning_number,
            serial_number: request.serial_number,
            payment_mode: request.payment_mode,
            amount: request.amount,
            reason: request.reason,
            reference_no: request.reference_no,
            deduction: request.deduction,
            vendor_name: request.vendor_name,
            bill_no: request.bill_no,
        };
        self.submitter
            .insert_row(payment_history::TAB, &record.to_row())
            .await?;
        Ok(record)
    }

    /// Full payment history from the append-only log.
    #[instrument(skip(self))]
    pub async fn history(&self) -> Result<Vec<PaymentRecord>, ServiceError> {
        let grid = self.client.fetch_grid(payment_history::TAB).await?;
        let body: Vec<_> = grid
            .into_iter()
            .skip(payment_history::DATA_START_ROW)
            .collect();
        Ok(map_in_chunks(body, |cells| PaymentRecord::from_row(cells)).await)
    }
}
