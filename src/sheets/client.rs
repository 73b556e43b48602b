//! HTTP client for the remote tabular store.
//!
//! The store is a spreadsheet fronted by a script endpoint: reads return the
//! full 2-D grid of a tab, writes are form-encoded actions that append or
//! positionally overwrite rows. Responses are JSON in practice but the
//! content-type header is unreliable, so every body is parsed defensively.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::ServiceError;
use crate::sheets::retry::is_transient_message;

/// Classifies a store-provided error message into the retryable or the
/// permanent side of the taxonomy.
fn store_error(message: impl Into<String>) -> ServiceError {
    let message = message.into();
    if is_transient_message(&message) {
        ServiceError::Transient(message)
    } else {
        ServiceError::Store(message)
    }
}

/// File payload for the store's Drive-backed upload action.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub base64_data: String,
    pub file_name: String,
    pub mime_type: String,
    pub folder_id: String,
}

#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl StoreClient {
    /// Builds a client with an explicit request timeout, separate from the
    /// submitter's retry/backoff policy.
    pub fn new(endpoint: Url, request_timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoint })
    }

    /// Fetches the complete grid of one tab, header/metadata rows included.
    /// Offsets into this grid are the per-tab contract in [`crate::schema`].
    #[instrument(skip(self))]
    pub async fn fetch_grid(&self, tab: &str) -> Result<Vec<Vec<Value>>, ServiceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("sheet", tab);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(store_error(format!("HTTP {status}: {body}")));
        }

        let json = parse_body(&body)?;
        if let Some(err) = json.get("error").and_then(Value::as_str) {
            return Err(store_error(err.to_string()));
        }
        let grid: Vec<Vec<Value>> = json
            .get("data")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.as_array().cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        debug!(tab, rows = grid.len(), "fetched grid");
        Ok(grid)
    }

    /// Column-scoped read. The store answers with either a `values` or a
    /// `data` key depending on deployment; both are accepted.
    #[instrument(skip(self))]
    pub async fn fetch_column(
        &self,
        sheet_id: &str,
        tab: &str,
        col: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("sheetId", sheet_id)
            .append_pair("tab", tab)
            .append_pair("col", col);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(store_error(format!("HTTP {status}: {body}")));
        }

        let json = parse_body(&body)?;
        let values: Vec<String> = json
            .get("values")
            .or_else(|| json.get("data"))
            .and_then(Value::as_array)
            .map(|vals| {
                vals.iter()
                    .map(|v| match v {
                        Value::String(s) => s.trim().to_string(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(values)
    }

    /// Appends one row to a tab.
    #[instrument(skip(self, row))]
    pub async fn insert_row(&self, tab: &str, row: &[Value]) -> Result<(), ServiceError> {
        let row_json = serde_json::to_string(row)
            .map_err(|e| ServiceError::Internal(format!("row serialization failed: {e}")))?;
        self.post_action(&[
            ("action", "insert"),
            ("sheetName", tab),
            ("rowData", &row_json),
        ])
        .await
    }

    /// Appends many rows in one call.
    #[instrument(skip(self, rows))]
    pub async fn batch_insert(&self, tab: &str, rows: &[Vec<Value>]) -> Result<(), ServiceError> {
        let rows_json = serde_json::to_string(rows)
            .map_err(|e| ServiceError::Internal(format!("rows serialization failed: {e}")))?;
        self.post_action(&[
            ("action", "batch_insert"),
            ("sheetName", tab),
            ("rowsData", &rows_json),
        ])
        .await
    }

    /// Positionally overwrites one row. `row_index` is the 1-based absolute
    /// row number in the sheet, header rows included.
    #[instrument(skip(self, row, extra))]
    pub async fn update_row(
        &self,
        action: &str,
        tab: &str,
        row_index: usize,
        row: &[Value],
        extra: &[(&str, &str)],
    ) -> Result<(), ServiceError> {
        let row_json = serde_json::to_string(row)
            .map_err(|e| ServiceError::Internal(format!("row serialization failed: {e}")))?;
        let index = row_index.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("action", action),
            ("sheetName", tab),
            ("rowIndex", &index),
            ("rowData", &row_json),
        ];
        params.extend_from_slice(extra);
        self.post_action(&params).await
    }

    /// Uploads a file through the store and returns the hosted URL.
    #[instrument(skip(self, file))]
    pub async fn upload_file(&self, file: &FileUpload) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[
                ("action", "uploadFile"),
                ("base64Data", &file.base64_data),
                ("fileName", &file.file_name),
                ("mimeType", &file.mime_type),
                ("folderId", &file.folder_id),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(store_error(format!("HTTP {status}: {body}")));
        }
        let json = parse_body(&body)?;
        if json.get("success").and_then(Value::as_bool) == Some(false) {
            let msg = json
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("file upload rejected");
            return Err(store_error(msg.to_string()));
        }
        json.get("fileUrl")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Store("upload response carried no fileUrl".into()))
    }

    async fn post_action(&self, params: &[(&str, &str)]) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(params)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(store_error(format!("HTTP {status}: {body}")));
        }
        check_write_body(&body)
    }
}

/// Attempts a JSON parse regardless of content-type; a non-JSON body is the
/// store's way of reporting an error.
fn parse_body(body: &str) -> Result<Value, ServiceError> {
    let trimmed = body.trim();
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        return Err(store_error(format!(
            "expected JSON but got: {}",
            &trimmed.chars().take(80).collect::<String>()
        )));
    }
    serde_json::from_str(trimmed).map_err(|_| store_error(format!("malformed response: {trimmed}")))
}

/// Write responses are `{ success, error? }`, but the store is known to
/// answer an empty body on success.
fn check_write_body(body: &str) -> Result<(), ServiceError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let json = parse_body(trimmed)?;
    if json.get("success").and_then(Value::as_bool) == Some(false) {
        let msg = json
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| json.get("message").and_then(Value::as_str))
            .unwrap_or("server rejected the write");
        return Err(store_error(msg.to_string()));
    }
    Ok(())
}
