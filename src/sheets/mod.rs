//! Remote tabular store access: HTTP client, raw-row primitives, retry
//! policy, and the sequential mutation submitter.

pub mod client;
pub mod retry;
pub mod row;
pub mod submit;

pub use client::{FileUpload, StoreClient};
pub use retry::RetryPolicy;
pub use row::{RowBuilder, RowReader};
pub use submit::{LineOutcome, LineRow, SubmitSummary, Submitter};
