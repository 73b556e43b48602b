//! Typed domain records, each a view over raw rows of one store tab.

pub mod approval;
pub mod payment;
pub mod planning;
pub mod purchase_order;
pub mod receipt;
pub mod vendor;

pub use approval::{ApprovalDecision, ApprovalStatus};
pub use payment::PaymentRecord;
pub use planning::PlanningLine;
pub use purchase_order::{status_update_row, NewPoRow, PurchaseOrderLine};
pub use receipt::ReceiptRecord;
pub use vendor::VendorSummary;
