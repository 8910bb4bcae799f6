//! HTTPクライアントの統合テスト（wiremock）

use box_inventory::api::HttpInventoryApi;
use box_inventory_common::{
    CellValue, Error, InventoryApi, InventorySession, NewRecord, RecordFields, RowKey,
    SessionOptions, TimeDisplay,
};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record_json(id: &str, box_number: &str, pallet: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "boxNumber": box_number,
        "boxBarcode": format!("BX-{}", box_number),
        "palletBarcode": pallet,
        "time": "2024-05-01T09:30:00.000Z",
        "status": "loaded",
        "location": null,
        "__v": 0
    })
}

fn client(server: &MockServer) -> HttpInventoryApi {
    HttpInventoryApi::new(server.uri(), None, Duration::from_secs(5)).unwrap()
}

// ── fetch_all ────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_all_parses_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            record_json("a1", "B1", "PL-1"),
            record_json("a2", "B2", "PL-1"),
        ])))
        .mount(&server)
        .await;

    let records = client(&server).fetch_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id.as_deref(), Some("a1"));
    assert_eq!(records[1].box_barcode, "BX-B2");
    assert_eq!(records[0].location, "");
}

#[tokio::test]
async fn fetch_all_accepts_numeric_barcodes() {
    let server = MockServer::start().await;
    let mut imported = record_json("a2", "B2", "PL-1");
    imported["boxBarcode"] = serde_json::json!(4901234567894u64);
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            record_json("a1", "B1", "PL-1"),
            imported,
        ])))
        .mount(&server)
        .await;

    let records = client(&server).fetch_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].box_barcode, "4901234567894");
}

#[tokio::test]
async fn fetch_all_server_error_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_all().await.unwrap_err();
    match err {
        Error::Network(message) => assert_eq!(message, "HTTP 500: db down"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let api = HttpInventoryApi::new(server.uri(), Some("secret".into()), Duration::from_secs(5)).unwrap();
    assert!(api.fetch_all().await.unwrap().is_empty());
}

// ── lookup_by_barcode ────────────────────────────────────────────────

#[tokio::test]
async fn lookup_returns_all_matches_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/barcode/PL-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            record_json("a1", "B1", "PL-7"),
            record_json("a3", "B3", "PL-7"),
        ])))
        .mount(&server)
        .await;

    let matches = client(&server).lookup_by_barcode("PL-7").await.unwrap();
    let numbers: Vec<&str> = matches.iter().map(|r| r.box_number.as_str()).collect();
    assert_eq!(numbers, vec!["B1", "B3"]);
}

#[tokio::test]
async fn lookup_404_is_zero_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/barcode/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let matches = client(&server).lookup_by_barcode("NOPE").await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn lookup_accepts_single_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory/barcode/BX-B1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_json("a1", "B1", "PL-1")))
        .mount(&server)
        .await;

    let matches = client(&server).lookup_by_barcode("BX-B1").await.unwrap();
    assert_eq!(matches.len(), 1);
}

// ── create / update ──────────────────────────────────────────────────

#[tokio::test]
async fn create_posts_cells_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .and(body_json(serde_json::json!({
            "boxNumber": 17.0,
            "location": "",
            "status": "loaded"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut record = NewRecord::new();
    record.insert("boxNumber".into(), CellValue::Number(17.0));
    record.insert("location".into(), CellValue::from(""));
    record.insert("status".into(), CellValue::from("loaded"));

    client(&server).create(&record).await.unwrap();
}

#[tokio::test]
async fn create_rejection_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(400).set_body_string("boxNumber is required"))
        .mount(&server)
        .await;

    let err = client(&server).create(&NewRecord::new()).await.unwrap_err();
    assert!(err.to_string().contains("boxNumber is required"));
}

#[tokio::test]
async fn update_puts_full_field_set() {
    let server = MockServer::start().await;
    let fields = RecordFields {
        box_number: "B1".into(),
        box_barcode: "BX-B1".into(),
        pallet_barcode: "PL-1".into(),
        time: "2024-05-01T09:30:00.000Z".into(),
        status: "issue".into(),
        location: "Dock 2".into(),
    };
    Mock::given(method("PUT"))
        .and(path("/api/inventory/a1"))
        .and(body_json(&fields))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).update("a1", &fields).await.unwrap();
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/inventory/zz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).update("zz", &RecordFields::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

// ── session over HTTP ────────────────────────────────────────────────

#[tokio::test]
async fn session_commit_row_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            record_json("a1", "B1", "PL-1"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/inventory/a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let options = SessionOptions {
        time_display: TimeDisplay::utc(),
        ..Default::default()
    };
    let mut session = InventorySession::new(client(&server), options);
    assert!(session.refresh().await);

    let key = RowKey::Server("a1".into());
    session
        .set_field(&key, box_inventory_common::Field::Location, "Dock 9")
        .unwrap();
    assert!(session.commit_row(&key).await);
    assert!(!session.existing().is_in_flight(&key));
}
