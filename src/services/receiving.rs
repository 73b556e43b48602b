//! Receiving stage: the receivable queue over approved PO lines and the
//! batch goods-receipt submission with its append-only history.

use std::sync::Arc;

use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::aggregate::{group_by_key, GroupedView};
use crate::calc;
use crate::errors::ServiceError;
use crate::models::{PurchaseOrderLine, ReceiptRecord};
use crate::refresh::map_in_chunks;
use crate::schema::received_history;
use crate::sheets::{FileUpload, LineRow, StoreClient, SubmitSummary, Submitter};

use super::purchase_orders::PurchaseOrderService;

const RECEIVING_COMPLETE: &str = "Complete";
const PO_APPROVED: &str = "Approved";

/// Bill image attached to a receipt batch, uploaded before the rows are
/// written so every row can carry the hosted URL.
#[derive(Debug, Clone, Deserialize)]
pub struct BillImage {
    pub base64_data: String,
    pub file_name: String,
    pub mime_type: String,
}

/// One line entry of a receipt batch; lines with a zero received quantity
/// are untouched and never logged.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveLine {
    pub serial_number: String,
    pub received_qty: f64,
    #[serde(default)]
    pub transport_charge: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveBatchRequest {
    pub planning_number: String,
    pub bill_type: String,
    pub bill_no: String,
    pub bill_date: String,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub transporter_name: String,
    #[serde(default)]
    pub lr_no: String,
    #[serde(default)]
    pub bill_image: Option<BillImage>,
    pub lines: Vec<ReceiveLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiveBatchResult {
    pub planning_number: String,
    pub bill_no: String,
    /// GST-inclusive bill total derived from the received lines.
    pub bill_amount: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bill_image_url: String,
    pub summary: SubmitSummary,
}

pub struct ReceivingService {
    client: StoreClient,
    submitter: Submitter,
    purchase_orders: Arc<PurchaseOrderService>,
    upload_folder_id: String,
}

impl ReceivingService {
    pub fn new(
        client: StoreClient,
        submitter: Submitter,
        purchase_orders: Arc<PurchaseOrderService>,
        upload_folder_id: String,
    ) -> Self {
        Self {
            client,
            submitter,
            purchase_orders,
            upload_folder_id,
        }
    }

    /// Approved PO lines still awaiting goods, grouped by planning number.
    #[instrument(skip(self))]
    pub async fn receivable(&self) -> Result<Vec<GroupedView<PurchaseOrderLine>>, ServiceError> {
        let lines = self.purchase_orders.load().await?;
        let open: Vec<PurchaseOrderLine> = lines
            .into_iter()
            .filter(|l| {
                l.po_status.eq_ignore_ascii_case(PO_APPROVED)
                    && !l.receiving_status.eq_ignore_ascii_case(RECEIVING_COMPLETE)
            })
            .collect();
        Ok(group_by_key(open, |l| l.planning_number.clone()))
    }

    /// Full receipt history from the append-only log.
    #[instrument(skip(self))]
    pub async fn history(&self) -> Result<Vec<ReceiptRecord>, ServiceError> {
        let grid = self.client.fetch_grid(received_history::TAB).await?;
        let body: Vec<_> = grid
            .into_iter()
            .skip(received_history::DATA_START_ROW)
            .collect();
        Ok(map_in_chunks(body, |cells| ReceiptRecord::from_row(cells)).await)
    }

    /// Submits one receipt batch: only lines with a positive received
    /// quantity are logged, one history row per line, written sequentially.
    /// The bill image (if any) is uploaded first so a failed upload aborts
    /// the batch before any row lands.
    #[instrument(skip(self, request), fields(planning_number = %request.planning_number))]
    pub async fn submit_batch(
        &self,
        request: ReceiveBatchRequest,
    ) -> Result<ReceiveBatchResult, ServiceError> {
        if request.planning_number.trim().is_empty() {
            return Err(ServiceError::Validation("planning number is required".into()));
        }
        for (field, label) in [
            (&request.bill_type, "bill type"),
            (&request.bill_no, "bill number"),
            (&request.bill_date, "bill date"),
        ] {
            if field.trim().is_empty() {
                return Err(ServiceError::Validation(format!("{label} is required")));
            }
        }

        let dirty: Vec<&ReceiveLine> = request
            .lines
            .iter()
            .filter(|l| l.received_qty > 0.0)
            .collect();
        if dirty.is_empty() {
            return Err(ServiceError::Validation(
                "No changes detected to save.".into(),
            ));
        }

        let po_lines = self.purchase_orders.load().await?;
        let order_lines: Vec<&PurchaseOrderLine> = po_lines
            .iter()
            .filter(|l| l.planning_number == request.planning_number)
            .collect();
        if order_lines.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no PO lines found for {}",
                request.planning_number
            )));
        }

        let mut matched: Vec<(&ReceiveLine, &PurchaseOrderLine)> = Vec::new();
        for entry in &dirty {
            let po_line = order_lines
                .iter()
                .find(|l| l.serial_number == entry.serial_number)
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "{} has no line with serial {}",
                        request.planning_number, entry.serial_number
                    ))
                })?;
            matched.push((entry, po_line));
        }

        let bill_image_url = match &request.bill_image {
            Some(image) => {
                // Reject a corrupt payload here instead of letting the store
                // write a broken file and answer with an opaque error.
                if image.file_name.trim().is_empty() {
                    return Err(ServiceError::Validation("bill image needs a file name".into()));
                }
                base64::engine::general_purpose::STANDARD
                    .decode(image.base64_data.trim())
                    .map_err(|e| {
                        ServiceError::Validation(format!("bill image is not valid base64: {e}"))
                    })?;
                self.client
                    .upload_file(&FileUpload {
                        base64_data: image.base64_data.clone(),
                        file_name: image.file_name.clone(),
                        mime_type: image.mime_type.clone(),
                        folder_id: self.upload_folder_id.clone(),
                    })
                    .await?
            }
            None => String::new(),
        };

        let bill_amount = round2(
            matched
                .iter()
                .map(|(entry, po_line)| {
                    calc::receiving_line_total(
                        entry.received_qty,
                        po_line.rate,
                        po_line.gst_pct,
                        entry.transport_charge,
                    )
                })
                .sum(),
        );

        let timestamp = calc::format_timestamp(Local::now().naive_local());
        let lines: Vec<LineRow> = matched
            .iter()
            .map(|(entry, po_line)| {
                let record = ReceiptRecord {
                    timestamp: timestamp.clone(),
                    planning_number: request.planning_number.clone(),
                    serial_number: entry.serial_number.clone(),
                    bill_type: request.bill_type.clone(),
                    received_qty: entry.received_qty,
                    bill_no: request.bill_no.clone(),
                    bill_date: request.bill_date.clone(),
                    bill_amount,
                    discount_amount: request.discount_amount,
                    bill_image_url: bill_image_url.clone(),
                    transporter_name: request.transporter_name.clone(),
                    lr_no: request.lr_no.clone(),
                    po_number: po_line.po_number.clone(),
                    firm_name: po_line.firm_name.clone(),
                    vendor_name: po_line.vendor_name.clone(),
                    transport_charge: entry.transport_charge,
                };
                LineRow {
                    label: po_line.item_name.clone(),
                    row: record.to_row(),
                }
            })
            .collect();

        let summary = self
            .submitter
            .submit_lines(received_history::TAB, lines)
            .await;
        Ok(ReceiveBatchResult {
            planning_number: request.planning_number,
            bill_no: request.bill_no,
            bill_amount,
            bill_image_url,
            summary,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
