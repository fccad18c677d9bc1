use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fulfillment::{
    Alert, AlertError, AlertNotifier, Autopilot, LookupKey, OrderLedger, OrderRecord, RuleTable,
    StoreError, Vendor, VendorCredentials,
};
use handlers::{AlertRecipients, FulfillmentService};
use listener::Server;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sheets::{MemoryRowStore, SheetOrderLedger, SheetSettingsStore};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Alert>>,
}

#[async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), AlertError> {
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

struct OfflineLedger;

#[async_trait]
impl OrderLedger for OfflineLedger {
    async fn append_order(&self, _record: &OrderRecord) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn find_order(&self, _id: &LookupKey) -> Result<Option<OrderRecord>, StoreError> {
        Err(offline())
    }

    async fn mark_shipped(
        &self,
        _id: &LookupKey,
        _tracking_number: Option<&str>,
        _courier: Option<&str>,
    ) -> Result<bool, StoreError> {
        Err(offline())
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Err(offline())
    }
}

fn offline() -> StoreError {
    StoreError::Unavailable {
        message: "sheet offline".into(),
    }
}

struct TestApp {
    server: Server,
    http: reqwest::Client,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.server.addr(), path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.http.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

async fn start(ledger: Option<Arc<dyn OrderLedger>>) -> TestApp {
    let rows = Arc::new(MemoryRowStore::new());
    let ledger = ledger
        .unwrap_or_else(|| Arc::new(SheetOrderLedger::new(rows.clone(), "Orders")) as Arc<dyn OrderLedger>);
    let notifier = Arc::new(RecordingNotifier::default());
    let service = FulfillmentService::new(
        ledger,
        Arc::new(SheetSettingsStore::new(rows, "Settings")),
        notifier.clone(),
        Autopilot::new(
            RuleTable::default(),
            VendorCredentials::none().with(Vendor::CustomCat),
        ),
        AlertRecipients::default(),
    );
    let server = Server::start(loopback(), service).await.unwrap();
    TestApp {
        server,
        http: reqwest::Client::new(),
        notifier,
    }
}

fn checkout(token: &str) -> Value {
    json!({
        "eventName": "order.completed",
        "content": {
            "token": token,
            "completionDate": "2024-06-01T12:00:00Z",
            "invoiceNumber": "SNIP-7",
            "finalGrandTotal": 60.0,
            "user": { "email": "sam@example.com" },
            "shippingAddress": { "fullName": "Sam Park" },
            "items": [
                { "name": "Keepsake Pillow", "quantity": 2, "shippable": true },
                { "name": "Urn", "quantity": 1, "shippable": true }
            ]
        }
    })
}

#[tokio::test]
async fn health_and_liveness_routes_answer() {
    let app = start(None).await;

    let resp = app.http.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let (status, body) = app.get("/pod-webhook").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "POD Webhook Listener Active");
}

#[tokio::test]
async fn full_order_lifecycle_over_http() {
    let app = start(None).await;

    for (key, value) in [
        ("AUTOPILOT_GLOBAL", "ON"),
        ("AUTOPILOT_PILLOW", "ON"),
        ("AUTOPILOT_URN", "ON"),
    ] {
        let (status, body) = app
            .post("/manage-settings", json!({ "key": key, "value": value }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Updated");
    }

    let (status, body) = app.post("/new-order", checkout("ord-100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order logged & routed");
    assert_eq!(body["router"]["action"], "processed");
    assert_eq!(body["router"]["details"][0]["type"], "API_SUCCESS");
    assert_eq!(body["router"]["details"][1]["type"], "MANUAL_REQUIRED");
    assert_eq!(app.notifier.sent.lock().unwrap().len(), 1);

    let (status, body) = app
        .get("/track-order?id=ORD-100&email=Sam@Example.com")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], true);
    assert_eq!(body["orderId"], "ord-100");
    assert_eq!(body["status"], "⚠️ ACTION REQUIRED");
    assert_eq!(body["isRush"], false);

    let (status, body) = app
        .post(
            "/pod-webhook",
            json!({
                "topic": "order:shipment:created",
                "resource": {
                    "order": { "external_id": "ord-100" },
                    "tracking_number": "9400111",
                    "carrier": "USPS"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Updated order ord-100");

    let (_, body) = app
        .get("/track-order?id=ord-100&email=sam@example.com")
        .await;
    assert_eq!(body["status"], "Shipped");
    assert_eq!(body["trackingNumber"], "9400111");
    assert_eq!(body["courier"], "USPS");

    let (status, body) = app.get("/get-stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orderCount"], 1);
    assert_eq!(body["totalRevenue"], "60.00");
    assert_eq!(body["recentOrders"][0]["id"], "ord-100");
}

#[tokio::test]
async fn ignored_events_are_acknowledged() {
    let app = start(None).await;

    let (status, body) = app
        .post("/new-order", json!({ "eventName": "order.refund.created" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ignored event");
    assert!(body.get("router").is_none());
}

#[tokio::test]
async fn settings_default_global_off() {
    let app = start(None).await;

    let (status, body) = app.get("/manage-settings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "AUTOPILOT_GLOBAL": "OFF" }));
}

#[tokio::test]
async fn client_errors_are_reported_as_json() {
    let app = start(None).await;

    let (status, body) = app.get("/track-order?id=ord-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing Order ID or Email");

    let (status, body) = app.get("/track-order?id=nope&email=a@b.c").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "found": false, "error": "Order not found" }));

    let (status, body) = app
        .post("/manage-settings", json!({ "key": "AUTOPILOT_MUG" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let resp = app
        .http
        .post(app.url("/pod-webhook"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_is_rejected() {
    let app = start(None).await;

    let (status, body) = app.get("/new-order").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method Not Allowed" }));

    let (status, body) = app.post("/get-stats", json!({})).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");

    let (status, body) = app.get("/no-such-route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn malformed_query_strings_are_reported_as_json() {
    let app = start(None).await;

    let resp = app
        .http
        .get(app.url("/track-order?id=a&id=b&email=x@y.z"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let content_type = resp.headers()[reqwest::header::CONTENT_TYPE].clone();
    assert_eq!(content_type, "application/json");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid query string");
    assert!(body["details"].as_str().unwrap().contains("duplicate field `id`"));
}

#[tokio::test]
async fn store_failures_become_server_errors() {
    let app = start(Some(Arc::new(OfflineLedger))).await;

    let (status, body) = app.post("/new-order", checkout("ord-200")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to log order");
    assert!(body["details"].as_str().unwrap().contains("sheet offline"));
    let alerts = app.notifier.sent.lock().unwrap().clone();
    assert!(alerts
        .iter()
        .any(|a| a.email == handlers::DEFAULT_EMERGENCY_EMAIL));

    let (status, body) = app.get("/track-order?id=ord-200&email=a@b.c").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch order");

    let (status, body) = app.get("/get-stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch financial stats");

    let (status, _) = app
        .post(
            "/pod-webhook",
            json!({ "ReferenceID": "ord-200", "TrackingNumber": "T" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
