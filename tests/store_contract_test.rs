//! Wire-level contract with the spreadsheet store: read shapes, write
//! actions, retry bounds, and partial-failure reporting.

mod common;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use procure_api::errors::ServiceError;
use procure_api::sheets::LineRow;

#[tokio::test]
async fn fetch_grid_returns_raw_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("sheet", "INDENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [["Header"], ["", "PN-01", "1"], []]
        })))
        .mount(&server)
        .await;

    let grid = common::store_client(&server)
        .fetch_grid("INDENT")
        .await
        .expect("grid fetches");
    assert_eq!(grid.len(), 3);
    assert_eq!(grid[1][1], json!("PN-01"));
    assert!(grid[2].is_empty());
}

#[tokio::test]
async fn fetch_column_accepts_both_answer_keys() {
    // Deployments answer column reads with either `values` or `data`.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("tab", "INDENT"))
        .and(query_param("col", "B"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "values": [" PN-01 ", null, 7] })),
        )
        .mount(&server)
        .await;

    let values = common::store_client(&server)
        .fetch_column("sheet-id", "INDENT", "B")
        .await
        .expect("column fetches");
    assert_eq!(values, vec!["PN-01".to_string(), String::new(), "7".into()]);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": ["PO-12"] })))
        .mount(&server)
        .await;
    let values = common::store_client(&server)
        .fetch_column("sheet-id", "PO", "D")
        .await
        .expect("column fetches");
    assert_eq!(values, vec!["PO-12".to_string()]);
}

#[tokio::test]
async fn store_error_payload_surfaces_as_store_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "Sheet not found" })),
        )
        .mount(&server)
        .await;

    let err = common::store_client(&server)
        .fetch_grid("MISSING")
        .await
        .expect_err("error payload must fail the fetch");
    assert_matches!(err, ServiceError::Store(msg) if msg == "Sheet not found");
}

#[tokio::test]
async fn non_json_body_is_an_error_not_a_panic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = common::store_client(&server)
        .fetch_grid("INDENT")
        .await
        .expect_err("HTML body must fail the fetch");
    assert_matches!(err, ServiceError::Store(_));
}

#[tokio::test]
async fn insert_posts_form_encoded_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("action=insert"))
        .and(body_string_contains("sheetName=INDENT"))
        .and(body_string_contains("rowData="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    common::store_client(&server)
        .insert_row("INDENT", &[json!("x"), json!("PN-01")])
        .await
        .expect("insert succeeds");
}

#[tokio::test]
async fn empty_write_body_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    common::store_client(&server)
        .insert_row("INDENT", &[json!("x")])
        .await
        .expect("empty body is success");
}

#[tokio::test]
async fn transient_rejection_is_retried_exactly_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "System busy" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = common::submitter(&server)
        .insert_row("INDENT", &[json!("x")])
        .await
        .expect_err("exhausted retries must fail");
    assert!(err.is_transient());
}

#[tokio::test]
async fn permanent_rejection_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "Invalid field" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = common::submitter(&server)
        .insert_row("INDENT", &[json!("x")])
        .await
        .expect_err("permanent rejection must fail");
    assert_matches!(err, ServiceError::Store(msg) if msg == "Invalid field");
}

#[tokio::test]
async fn one_failed_line_never_aborts_its_siblings() {
    let server = MockServer::start().await;
    // The middle line is rejected outright; its siblings must still land.
    Mock::given(method("POST"))
        .and(body_string_contains("WIDGET_B"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "Invalid field" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(2)
        .mount(&server)
        .await;

    let lines = vec![
        LineRow {
            label: "WIDGET_A".into(),
            row: vec![json!("WIDGET_A")],
        },
        LineRow {
            label: "WIDGET_B".into(),
            row: vec![json!("WIDGET_B")],
        },
        LineRow {
            label: "WIDGET_C".into(),
            row: vec![json!("WIDGET_C")],
        },
    ];
    let summary = common::submitter(&server).submit_lines("INDENT", lines).await;

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.all_succeeded());
    assert!(summary.lines[0].success);
    assert!(!summary.lines[1].success);
    assert!(summary.lines[2].success);
    let detail = summary.failure_detail().expect("failure detail present");
    assert!(detail.contains("WIDGET_B"));
    assert!(detail.contains("Invalid field"));
}

#[tokio::test]
async fn positional_update_sends_absolute_row_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=POupdate"))
        .and(body_string_contains("rowIndex=9"))
        .and(body_string_contains("poNo=PN-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    common::store_client(&server)
        .update_row("POupdate", "PO", 9, &[json!("")], &[("poNo", "PN-05")])
        .await
        .expect("update succeeds");
}
