//! Shared fixtures for the integration tests: a store client pointed at a
//! wiremock server, with instant retries and no inter-request delay.
#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use url::Url;
use wiremock::MockServer;

use procure_api::sheets::{RetryPolicy, StoreClient, Submitter};

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        max_jitter: Duration::from_millis(1),
    }
}

pub fn store_client(server: &MockServer) -> StoreClient {
    let endpoint = Url::parse(&server.uri()).expect("mock server URI is a valid URL");
    StoreClient::new(endpoint, Duration::from_secs(5)).expect("client builds")
}

pub fn submitter(server: &MockServer) -> Submitter {
    Submitter::new(store_client(server), fast_retry()).with_delay(Duration::ZERO)
}

/// Builds a grid body with `filler` blank rows before the data rows, the
/// way the primary ledgers carry header/metadata rows.
pub fn grid_body(filler: usize, rows: Vec<Vec<Value>>) -> Value {
    let mut data: Vec<Value> = (0..filler).map(|_| json!([])).collect();
    data.extend(rows.into_iter().map(Value::Array));
    json!({ "data": data })
}

/// A 22-wide INDENT row with the load-bearing columns filled.
pub fn indent_row(pn: &str, serial: &str, item: &str, status: &str, actual: &str) -> Vec<Value> {
    let mut cells = vec![json!(""); 22];
    cells[1] = json!(pn);
    cells[2] = json!(serial);
    cells[8] = json!("Electrical");
    cells[10] = json!(item);
    cells[11] = json!("Pieces");
    cells[12] = json!("2");
    cells[19] = json!(actual);
    cells[21] = json!(status);
    cells
}

/// A 45-wide PO row with pricing and status columns filled.
pub fn po_row(
    pn: &str,
    serial: &str,
    item: &str,
    qty: f64,
    rate: f64,
    gst: f64,
    po_status: &str,
    receiving_status: &str,
) -> Vec<Value> {
    let mut cells = vec![json!(""); 45];
    cells[1] = json!(pn);
    cells[2] = json!(serial);
    cells[3] = json!("PO-09");
    cells[6] = json!("Acme Solar");
    cells[7] = json!(item);
    cells[8] = json!(qty);
    cells[9] = json!(rate);
    cells[10] = json!(gst);
    cells[16] = json!(po_status);
    cells[21] = json!(receiving_status);
    cells
}
