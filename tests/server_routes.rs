//! # Server Route Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`. Printers
//! are in-memory fakes so no print system is needed.

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use cardlabel::{
    CardLabelError,
    dispatch::PrinterInfo,
    server::{AppState, RawPrinter, ServerConfig, router},
    store::MemoryLayoutStore,
};

/// Accepts every job for "Bench"; fails every job number listed in `fail_on`.
#[derive(Default)]
struct FakePrinter {
    jobs: Mutex<Vec<Vec<u8>>>,
    calls: AtomicUsize,
    fail_on: Vec<usize>,
    list_calls: AtomicUsize,
}

#[async_trait]
impl RawPrinter for FakePrinter {
    async fn list(&self) -> Result<Vec<PrinterInfo>, CardLabelError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            PrinterInfo {
                id: None,
                name: "Bench".into(),
                status: "idle".into(),
                is_default: true,
            },
            PrinterInfo {
                id: None,
                name: "Office".into(),
                status: "disabled".into(),
                is_default: false,
            },
        ])
    }

    async fn send(&self, printer: &str, data: &[u8]) -> Result<(), CardLabelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if printer != "Bench" {
            return Err(CardLabelError::NotFound(format!("printer {}", printer)));
        }
        if self.fail_on.contains(&call) {
            return Err(CardLabelError::Dispatch("out of labels".into()));
        }
        self.jobs.lock().unwrap().push(data.to_vec());
        Ok(())
    }
}

fn app_with(printer: Arc<FakePrinter>) -> Router {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".into(),
        default_printer: None,
        printer_cache_ttl: Duration::from_secs(60),
    };
    let state = AppState::new(config, printer, Arc::new(MemoryLayoutStore::new()));
    router(Arc::new(state))
}

fn app() -> (Router, Arc<FakePrinter>) {
    let printer = Arc::new(FakePrinter::default());
    (app_with(printer.clone()), printer)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// ============================================================================
// BRIDGE PROTOCOL
// ============================================================================

#[tokio::test]
async fn printers_are_listed_and_cached() {
    let (app, printer) = app();

    let (status, body) = send(&app, get("/printers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!([
            {"name": "Bench", "status": "idle", "isDefault": true},
            {"name": "Office", "status": "disabled", "isDefault": false}
        ])
    );

    send(&app, get("/printers")).await;
    assert_eq!(printer.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn print_sends_one_job_per_copy() {
    let (app, printer) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/print?printerName=Bench&copies=3")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from("SIZE 2,1\nCLS\nPRINT 1\n"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let reply = json_body(&body);
    assert_eq!(reply["success"], true);
    assert_eq!(reply["jobsSent"], 3);
    assert_eq!(printer.jobs.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn print_uses_default_printer_when_unnamed() {
    let (app, printer) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/print")
        .body(Body::from("PRINT 1\n"))
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(printer.jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_failure_is_207() {
    let printer = Arc::new(FakePrinter {
        fail_on: vec![2],
        ..Default::default()
    });
    let app = app_with(printer.clone());
    let request = Request::builder()
        .method("POST")
        .uri("/print?printerName=Bench&copies=3")
        .body(Body::from("PRINT 1\n"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::MULTI_STATUS);
    let reply = json_body(&body);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["jobsSent"], 2);
    assert_eq!(reply["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn total_failure_is_500() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/print?printerName=Nowhere&copies=2")
        .body(Body::from("PRINT 1\n"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["jobsSent"], 0);
}

#[tokio::test]
async fn zero_copies_is_rejected() {
    let (app, printer) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/print?printerName=Bench&copies=0")
        .body(Body::from("PRINT 1\n"))
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(printer.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn excessive_copies_are_rejected() {
    let (app, printer) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/print?printerName=Bench&copies=4294967295")
        .body(Body::from("PRINT 1\n"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut label = label_body();
    label["printer"] = json!("Bench");
    label["copies"] = json!(1000);
    let (status, _) = send(&app, post_json("/api/label/print", label)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(printer.jobs.lock().unwrap().is_empty());
}

// ============================================================================
// LABEL API
// ============================================================================

fn label_body() -> Value {
    json!({
        "data": {"title": "Gyarados", "sku": "PKM-130", "price": "45", "condition": "LP"}
    })
}

#[tokio::test]
async fn tspl_endpoint_returns_program() {
    let (app, _) = app();
    let (status, body) = send(&app, post_json("/api/label/tspl", label_body())).await;
    assert_eq!(status, StatusCode::OK);

    let program = String::from_utf8(body).unwrap();
    assert!(program.starts_with("SIZE 2,1\n"));
    assert!(program.ends_with("PRINT 1\n"));
    assert!(program.contains("PKM-130"));
}

#[tokio::test]
async fn preview_endpoint_returns_png() {
    let (app, _) = app();
    let (status, body) = send(&app, post_json("/api/label/preview", label_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(&[0x89, b'P', b'N', b'G']));

    let mut editor = label_body();
    editor["editor"] = json!(true);
    editor["zoom"] = json!(2.0);
    let (status, body) = send(&app, post_json("/api/label/preview", editor)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn pdf_endpoint_returns_pdf() {
    let (app, _) = app();
    let (status, body) = send(&app, post_json("/api/label/pdf", label_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn bad_dpi_is_rejected() {
    let (app, _) = app();
    let mut request = label_body();
    request["dpi"] = json!(0);
    let (status, _) = send(&app, post_json("/api/label/pdf", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_zoom_is_rejected() {
    let (app, _) = app();
    for zoom in [1.0e30, 0.0, -2.0, 9.0] {
        let mut request = label_body();
        request["editor"] = json!(true);
        request["zoom"] = json!(zoom);
        let (status, body) = send(&app, post_json("/api/label/preview", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "zoom {}", zoom);
        assert!(String::from_utf8_lossy(&body).contains("zoom"));
    }
}

#[tokio::test]
async fn label_print_sends_tspl() {
    let (app, printer) = app();
    let mut request = label_body();
    request["printer"] = json!("Bench");
    request["copies"] = json!(2);

    let (status, _) = send(&app, post_json("/api/label/print", request)).await;
    assert_eq!(status, StatusCode::OK);

    let jobs = printer.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs[0].starts_with(b"SIZE 2,1\n"));
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[tokio::test]
async fn template_render_adds_size_guard() {
    let (app, _) = app();
    let request = post_json(
        "/api/template/render",
        json!({"body": "CLS\nTEXT 10,10,\"3\",0,1,1,\"{{sku}}\"\nPRINT 1", "engine": "tspl", "values": {"sku": "PKM-007"}}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let reply = json_body(&body);
    assert_eq!(
        reply["rendered"],
        "SIZE 2,1\nCLS\nTEXT 10,10,\"3\",0,1,1,\"PKM-007\"\nPRINT 1"
    );
    assert_eq!(reply["requiredFields"], json!(["sku"]));
}

#[tokio::test]
async fn template_missing_value_is_400() {
    let (app, _) = app();
    let request = post_json(
        "/api/template/render",
        json!({"body": "^FD{{grade}}^FS", "engine": "zpl", "values": {}}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("grade"));
}

// ============================================================================
// LAYOUTS
// ============================================================================

#[tokio::test]
async fn layout_crud_and_default() {
    let (app, _) = app();

    let (status, body) = send(&app, post_json("/api/layouts", json!({"name": "Singles", "category": "raw"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let first = json_body(&body);
    let first_id = first["id"].as_str().unwrap().to_string();
    assert_eq!(first["isDefault"], false);

    let (_, body) = send(&app, post_json("/api/layouts", json!({"name": "Bulk", "category": "raw"}))).await;
    let second_id = json_body(&body)["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, post_json(&format!("/api/layouts/{}/default", second_id), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["isDefault"], true);

    let (_, body) = send(&app, get("/api/layouts?category=raw")).await;
    let listed = json_body(&body);
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["id"], second_id.as_str());

    let mut layout = json_body(&body)[1]["layout"].clone();
    layout["price"]["visible"] = json!(false);
    let update = Request::builder()
        .method("PUT")
        .uri(format!("/api/layouts/{}", first_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"name": "Singles v2", "layout": layout}).to_string()))
        .unwrap();
    let (status, body) = send(&app, update).await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_body(&body);
    assert_eq!(updated["name"], "Singles v2");
    assert_eq!(updated["layout"]["price"]["visible"], false);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/layouts/{}", first_id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/layouts/{}", first_id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_layout_drives_label_rendering() {
    let (app, _) = app();

    let mut layout = serde_json::to_value(cardlabel::LabelLayout::default()).unwrap();
    layout["barcode"]["mode"] = json!("none");
    let (_, body) = send(&app, post_json("/api/layouts", json!({"name": "No QR", "layout": layout}))).await;
    let id = json_body(&body)["id"].clone();

    let mut request = label_body();
    request["layoutId"] = id;
    let (status, body) = send(&app, post_json("/api/label/tspl", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!String::from_utf8(body).unwrap().contains("QRCODE"));
}
