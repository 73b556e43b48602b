//! Workflow services: one per procurement stage, all sharing the store
//! client and the sequential submitter.

pub mod approval;
pub mod auth;
pub mod payments;
pub mod planning;
pub mod purchase_orders;
pub mod receiving;
pub mod reporting;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::sheets::{StoreClient, Submitter};

/// Aggregate of the services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub planning: Arc<planning::PlanningService>,
    pub approval: Arc<approval::ApprovalService>,
    pub purchase_orders: Arc<purchase_orders::PurchaseOrderService>,
    pub receiving: Arc<receiving::ReceivingService>,
    pub payments: Arc<payments::PaymentService>,
    pub reporting: Arc<reporting::ReportingService>,
    pub auth: Arc<auth::AuthService>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let endpoint = config
            .store_endpoint_url()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let client = StoreClient::new(endpoint, config.request_timeout())?;
        let submitter = Submitter::new(client.clone(), config.retry_policy())
            .with_delay(config.submit_delay());
        Ok(Self::new(
            client,
            submitter,
            config.master_sheet_id.clone(),
            config.upload_folder_id.clone(),
        ))
    }

    pub fn new(
        client: StoreClient,
        submitter: Submitter,
        master_sheet_id: String,
        upload_folder_id: String,
    ) -> Self {
        let planning = Arc::new(planning::PlanningService::new(
            client.clone(),
            submitter.clone(),
            master_sheet_id,
        ));
        let approval = Arc::new(approval::ApprovalService::new(
            client.clone(),
            submitter.clone(),
        ));
        let purchase_orders = Arc::new(purchase_orders::PurchaseOrderService::new(
            client.clone(),
            submitter.clone(),
        ));
        let receiving = Arc::new(receiving::ReceivingService::new(
            client.clone(),
            submitter.clone(),
            purchase_orders.clone(),
            upload_folder_id,
        ));
        let payments = Arc::new(payments::PaymentService::new(
            client.clone(),
            submitter,
            purchase_orders.clone(),
        ));
        let reporting = Arc::new(reporting::ReportingService::new(client.clone()));
        let auth = Arc::new(auth::AuthService::new(client));
        Self {
            planning,
            approval,
            purchase_orders,
            receiving,
            payments,
            reporting,
            auth,
        }
    }
}
