//! Integration tests using wiremock to simulate the Puxbay API.

use puxbay::metadata::RequestMetadata;
use puxbay::models::{OpenCashDrawer, Product, ReceivedItem};
use puxbay::{Client, Config, ConfigBuilder, DateRange, Error, ErrorKind, ListParams};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "pb_test_1234567890";

fn config_for(server: &MockServer) -> ConfigBuilder {
    Config::builder(API_KEY)
        .base_url(server.uri())
        .backoff_base(Duration::from_millis(5))
}

fn client_for(server: &MockServer) -> Client {
    Client::new(config_for(server).build().unwrap()).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_get_product_sends_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/p1/"))
        .and(header("x-api-key", API_KEY))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "p1", "name": "Widget", "price": "9.99"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let product = client.products().get("p1").await.unwrap();

    assert_eq!(product.id.as_deref(), Some("p1"));
    assert_eq!(product.name, "Widget");
    assert_eq!(product.price, Some(9.99));

    let requests = mock_server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert_eq!(headers.get("accept-encoding").unwrap(), "gzip, deflate");
    assert!(headers
        .get("user-agent")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("puxbay-rust/"));
    assert!(headers.get("content-length").is_none());
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let mock_server = MockServer::start().await;

    let cases = [
        (401, ErrorKind::Authentication),
        (429, ErrorKind::RateLimited),
        (400, ErrorKind::Validation),
        (404, ErrorKind::NotFound),
        (409, ErrorKind::Unknown),
        (500, ErrorKind::Server),
        (503, ErrorKind::Server),
    ];

    for (code, _) in cases {
        Mock::given(method("GET"))
            .and(path(format!("/products/s{code}/")))
            .respond_with(
                ResponseTemplate::new(code).set_body_json(json!({"detail": format!("status {code}")})),
            )
            .mount(&mock_server)
            .await;
    }

    let client = Client::new(config_for(&mock_server).max_retries(0).build().unwrap()).unwrap();

    for (code, kind) in cases {
        let err = client
            .products()
            .get(&format!("s{code}"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(kind), "status {code}");
        assert_eq!(err.status_code(), code);
        assert_eq!(err.message(), format!("status {code}"));
    }

    assert_eq!(request_count(&mock_server).await, cases.len());
}

#[tokio::test]
async fn test_error_message_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/customers/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Name is required"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/customers/c1/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>denied</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client
        .customers()
        .create(&Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(err.message(), "Name is required");

    let err = client.customers().get("c1").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Authentication));
    assert_eq!(err.message(), "Unknown error");
    assert_eq!(err.raw_response(), Some("<html>denied</html>"));
}

#[tokio::test]
async fn test_retryable_statuses_make_max_retries_plus_one_attempts() {
    for code in [429, 500, 502, 503] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orders/o1/"))
            .respond_with(ResponseTemplate::new(code).set_body_json(json!({"detail": "try later"})))
            .expect(4)
            .mount(&mock_server)
            .await;

        let client = Client::new(config_for(&mock_server).max_retries(3).build().unwrap()).unwrap();
        let err = client.orders().get("o1").await.unwrap_err();

        assert_eq!(err.status_code(), code);
        assert!(err.is_retryable());
        assert_eq!(request_count(&mock_server).await, 4, "status {code}");
    }
}

#[tokio::test]
async fn test_rate_limited_twice_then_success() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/products/p1/"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "1")
                    .set_body_json(json!({"detail": "Request was throttled."}))
            } else {
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"id":"p1","name":"Widget","price":9.99}"#)
            }
        })
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server)
        .max_retries(2)
        .backoff_base(Duration::from_millis(20))
        .build()
        .unwrap();
    let client = Client::new(config).unwrap();

    let response = client.get::<Product>("products/p1/").await.unwrap();

    assert_eq!(response.id.as_deref(), Some("p1"));
    assert_eq!(response.name, "Widget");
    assert_eq!(response.price, Some(9.99));
    assert_eq!(response.attempts, 3);
    assert!(response.was_retried());
    // 20ms + 40ms of backoff
    assert!(response.latency >= Duration::from_millis(60));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/p404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Product not found"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.products().get("p404").await;

    match result {
        Err(e @ Error::NotFound { .. }) => {
            assert_eq!(e.message(), "Product not found");
            assert_eq!(e.status_code(), 404);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_empty_bodies_are_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/products/p1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/empty/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    client.products().delete("p1").await.unwrap();

    let maybe = client.get::<Option<Product>>("products/empty/").await.unwrap();
    assert_eq!(maybe.data, None);

    let err = client.products().get("empty").await.unwrap_err();
    assert!(matches!(err, Error::DeserializationFailed { .. }));
    assert_eq!(err.kind(), None);
}

#[tokio::test]
async fn test_delete_ignores_response_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/customers/c1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    client.customers().delete("c1").await.unwrap();

    let response = client.delete("customers/c1/").await.unwrap();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.raw_body, r#"{"status":"deleted"}"#);
}

#[tokio::test]
async fn test_oversized_rate_limit_reset_still_maps_to_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/p1/"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-ratelimit-reset", "18446744073709551615")
                .insert_header("retry-after", "7")
                .set_body_json(json!({"detail": "Request was throttled."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new(config_for(&mock_server).max_retries(0).build().unwrap()).unwrap();
    let err = client.products().get("p1").await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::RateLimited));
    let info = err.rate_limit_info().unwrap();
    assert_eq!(info.reset_at, None);
    assert_eq!(info.retry_after, Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn test_deserialization_failure_keeps_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/branches/b1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    match client.branches().get("b1").await {
        Err(Error::DeserializationFailed {
            raw_response,
            status,
            ..
        }) => {
            assert_eq!(raw_response, "<!doctype html>");
            assert_eq!(status.as_u16(), 200);
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_without_body_sends_empty_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders/o1/cancel/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "o1", "status": "cancelled"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let order = client.orders().cancel("o1").await.unwrap();
    assert_eq!(order.status.as_deref(), Some("cancelled"));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    assert_eq!(requests[0].headers.get("content-length").unwrap(), "0");
}

#[tokio::test]
async fn test_list_sends_page_and_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "25"))
        .and(query_param("search", "blue widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 26,
            "next": null,
            "previous": "http://localhost/products/?page=1",
            "results": [{"id": "p26", "name": "Blue Widget"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let page = client
        .products()
        .list(&ListParams::page(2).page_size(25).search("blue widget"))
        .await
        .unwrap();

    assert_eq!(page.count, 26);
    assert!(!page.has_next());
    assert_eq!(page.results[0].name, "Blue Widget");
}

#[tokio::test]
async fn test_entity_actions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/p1/stock-adjustment/"))
        .and(body_json(json!({"adjustment": -3, "reason": "Breakage"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Stock adjusted", "new_quantity": 7})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customers/c1/adjust-store-credit/"))
        .and(body_json(json!({"amount": 15.5, "reference": "Refund #12"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "Store credit adjusted", "new_balance": 40.5})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gift-cards/check-balance/"))
        .and(query_param("code", "GC-100 A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": "25.00"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/purchase-orders/po1/receive/"))
        .and(body_json(json!({"items": [{"item": "poi1", "quantity_received": 12}]})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "po1", "status": "received"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cash-drawers/"))
        .and(body_json(json!({"branch": "b1", "starting_balance": 100.0})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "cd1", "status": "open"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cash-drawers/cd1/close/"))
        .and(body_json(json!({"actual_cash": 240.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": "cd1", "status": "closed", "difference": "-2.50"}),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications/mark-all-read/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "marked all as read"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/webhook-logs/"))
        .and(query_param("webhook", "wh1"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "results": [{"id": "we1", "event_type": "order.created", "status_code": 200}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let adjusted = client
        .products()
        .adjust_stock("p1", -3, "Breakage")
        .await
        .unwrap();
    assert_eq!(adjusted.new_quantity, 7);

    let credit = client
        .customers()
        .adjust_store_credit("c1", 15.5, "Refund #12")
        .await
        .unwrap();
    assert_eq!(credit.new_balance, 40.5);

    let balance = client.gift_cards().check_balance("GC-100 A").await.unwrap();
    assert_eq!(balance.balance, 25.0);

    let po = client
        .purchase_orders()
        .receive("po1", &[ReceivedItem::new("poi1", 12)])
        .await
        .unwrap();
    assert_eq!(po.status.as_deref(), Some("received"));

    let drawer = client
        .cash_drawers()
        .open(&OpenCashDrawer::new("b1", 100.0))
        .await
        .unwrap();
    assert_eq!(drawer.id.as_deref(), Some("cd1"));

    let closed = client.cash_drawers().close("cd1", 240.0).await.unwrap();
    assert_eq!(closed.difference, Some(-2.5));

    client.notifications().mark_all_read().await.unwrap();

    let events = client.webhooks().list_events("wh1", 3).await.unwrap();
    assert_eq!(events.results[0].event_type.as_deref(), Some("order.created"));
}

#[tokio::test]
async fn test_inventory_and_reports() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory/stock-levels/"))
        .and(query_param("branch", "b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [
                {"product": "p1", "stock_quantity": 4},
                {"product": "p2", "stock_quantity": 0}
            ]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/financial-summary/"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_revenue": 1200.0,
            "total_orders": 30,
            "avg_order_value": 40.0,
            "period": {"start": "2024-01-01", "end": "2024-01-31"}
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/top-products/"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"product__id": "p1", "product__name": "Widget", "quantity_sold": 12, "revenue": 119.88}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/low-stock/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let levels = client.inventory().stock_levels("b1").await.unwrap();
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[1].stock_quantity, Some(0));

    let summary = client
        .reports()
        .financial_summary(&DateRange::new("2024-01-01", "2024-01-31"))
        .await
        .unwrap();
    assert_eq!(summary.total_orders, 30);

    let top = client.reports().top_products(5).await.unwrap();
    assert_eq!(top[0].product_id, "p1");

    assert!(client.reports().low_stock().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_call_with_metadata_returns_response_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/staff/"))
        .and(query_param("role", "manager"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-77")
                .set_body_json(json!({"count": 0, "results": []})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let metadata = RequestMetadata::new(http::Method::GET, "staff/").with_query_param("role", "manager");

    let response = client
        .call::<(), serde_json::Value>(metadata, None)
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.request_id(), Some("req-77"));
    assert_eq!(response.attempts, 1);
    assert_eq!(response.data["count"], 0);
}

#[tokio::test]
async fn test_shutdown_interrupts_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/p1/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server)
        .backoff_base(Duration::from_secs(30))
        .build()
        .unwrap();
    let client = Client::new(config).unwrap();

    let task_client = client.clone();
    let call = tokio::spawn(async move { task_client.products().get("p1").await });

    while request_count(&mock_server).await < 1 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    client.shutdown();

    let err = tokio::time::timeout(Duration::from_secs(5), call)
        .await
        .expect("shutdown should wake the backoff sleep")
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, Error::Interrupted(_)));
    assert_eq!(err.kind(), Some(ErrorKind::Network));
    assert_eq!(err.status_code(), 0);

    // Later calls fail without reaching the server
    let err = client.products().get("p1").await.unwrap_err();
    assert!(matches!(err, Error::Interrupted(_)));
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let config = Config::builder(API_KEY)
        .base_url("http://127.0.0.1:9")
        .max_retries(2)
        .backoff_base(Duration::from_millis(50))
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let client = Client::new(config).unwrap();

    let start = Instant::now();
    let err = client.products().get("p1").await.unwrap_err();

    // both retries backed off: 50ms + 100ms
    assert!(start.elapsed() >= Duration::from_millis(150));

    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.kind(), Some(ErrorKind::Network));
    assert_eq!(err.status_code(), 0);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_invalid_api_key_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    let result = Config::builder("sk_live_123")
        .base_url(mock_server.uri())
        .build();

    assert!(matches!(result, Err(Error::InvalidApiKey)));
    assert!(matches!(Client::from_api_key("live_123"), Err(Error::InvalidApiKey)));
    assert_eq!(request_count(&mock_server).await, 0);
}
