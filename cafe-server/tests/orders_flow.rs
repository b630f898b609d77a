//! 订单生命周期集成测试: 下单、迁移、权限、读取分区

mod common;

use cafe_client::{ClientError, HttpTransport};
use common::*;
use rust_decimal::Decimal;
use shared::ErrorCode;
use shared::client::HistoryQuery;
use shared::order::{OrderEvent, OrderStatus};

fn code<T: std::fmt::Debug>(result: Result<T, ClientError>) -> Option<ErrorCode> {
    result.unwrap_err().code()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start();
    let data = server
        .transport()
        .execute(http::Method::GET, "/health", None, None)
        .await
        .unwrap();
    assert_eq!(data["status"], "healthy");
    assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_public_venue_and_table_verification() {
    let server = TestServer::start();
    let customer = server.customer();

    let venue = customer.venue().await.unwrap();
    assert_eq!(venue.radius_m, Some(50.0));

    let table = customer.verify_table(1).await.unwrap();
    assert_eq!(table.label.as_deref(), Some("Window"));
    assert_eq!(code(customer.verify_table(9).await), Some(ErrorCode::TableNotFound));
    assert_eq!(code(customer.verify_table(404).await), Some(ErrorCode::TableNotFound));
}

#[tokio::test]
async fn test_order_requires_granted_gate() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = cafe_client::GeofenceGate::new(
        std::sync::Arc::new(FixedLocation(shared::geo::Coordinate::new(1.0, 1.0))),
        cafe_client::GateConfig::default(),
    );
    gate.configure(&customer.venue().await.unwrap());
    gate.request_access().await;

    let result = customer
        .place_order(&gate, &order_request(1, "600111222", &[(ESPRESSO, 1)]))
        .await;
    assert!(matches!(result, Err(ClientError::AdmissionRequired)));
    assert!(server.state.storage.active_orders().unwrap().is_empty());
}

#[tokio::test]
async fn test_total_is_computed_by_server() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;

    // a client-supplied total is not even part of the request shape
    let mut body = serde_json::to_value(order_request(1, "600111222", &[(ESPRESSO, 2), (CROISSANT, 1)])).unwrap();
    body["total"] = serde_json::json!(0.01);
    let data = server
        .transport()
        .execute(http::Method::POST, "/api/orders", None, Some(body))
        .await
        .unwrap();
    assert_eq!(data["total"], serde_json::json!(5.85));

    let view = customer
        .place_order(&gate, &order_request(2, "600111222", &[(CROISSANT, 3)]))
        .await
        .unwrap();
    assert_eq!(view.order.status, OrderStatus::Pending);
    assert_eq!(view.order.total, Decimal::new(675, 2));
    assert_eq!(view.order.items[0].name, "Croissant");
    assert_eq!(
        view.allowed_events,
        vec![OrderEvent::StartPreparing, OrderEvent::Cancel]
    );
}

#[tokio::test]
async fn test_placement_errors() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;

    let cases = [
        (order_request(1, "600", &[]), ErrorCode::EmptyOrder),
        (order_request(1, "600", &[(ESPRESSO, 0)]), ErrorCode::InvalidQuantity),
        (order_request(9, "600", &[(ESPRESSO, 1)]), ErrorCode::TableNotFound),
        (order_request(1, "600", &[(999, 1)]), ErrorCode::MenuItemNotFound),
        (order_request(1, "600", &[(SOLD_OUT, 1)]), ErrorCode::MenuItemUnavailable),
    ];
    for (req, expected) in cases {
        assert_eq!(code(customer.place_order(&gate, &req).await), Some(expected));
    }
}

#[tokio::test]
async fn test_full_lifecycle_with_roles() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;
    let order = customer
        .place_order(&gate, &order_request(1, "600111222", &[(ESPRESSO, 1)]))
        .await
        .unwrap()
        .order;

    let staff = server.staff(STAFF).await;
    let chef = server.staff(CHEF).await;

    // staff cannot start preparing; authorization is checked first
    assert_eq!(code(staff.start_preparing(order.id).await), Some(ErrorCode::PermissionDenied));
    assert_eq!(code(staff.start_preparing(424242).await), Some(ErrorCode::PermissionDenied));
    // pending -> paid is not a legal transition
    assert_eq!(code(staff.pay(order.id).await), Some(ErrorCode::InvalidTransition));

    let preparing = chef.start_preparing(order.id).await.unwrap();
    assert_eq!(preparing.order.status, OrderStatus::Preparing);
    assert!(preparing.order.status_changed_at >= order.created_at);

    let completed = chef.complete(order.id).await.unwrap();
    assert_eq!(completed.allowed_events, vec![OrderEvent::MarkPaid]);

    let paid = staff.pay(order.id).await.unwrap();
    assert_eq!(paid.order.status, OrderStatus::Paid);
    assert!(paid.allowed_events.is_empty());

    let admin = server.staff(ADMIN).await;
    assert_eq!(code(admin.cancel(order.id).await), Some(ErrorCode::InvalidTransition));
    assert_eq!(code(admin.get_order(424242).await), Some(ErrorCode::OrderNotFound));
}

#[tokio::test]
async fn test_cancel_is_admin_only() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;
    let order = customer
        .place_order(&gate, &order_request(1, "600111222", &[(ESPRESSO, 1)]))
        .await
        .unwrap()
        .order;

    let chef = server.staff(CHEF).await;
    assert_eq!(code(chef.cancel(order.id).await), Some(ErrorCode::PermissionDenied));

    let admin = server.staff(ADMIN).await;
    let cancelled = admin.cancel(order.id).await.unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(code(chef.start_preparing(order.id).await), Some(ErrorCode::InvalidTransition));
}

#[tokio::test]
async fn test_stale_device_loses_race() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;
    let order = customer
        .place_order(&gate, &order_request(1, "600111222", &[(ESPRESSO, 1)]))
        .await
        .unwrap()
        .order;

    let chef = server.staff(CHEF).await;
    let admin = server.staff(ADMIN).await;
    chef.start_preparing(order.id).await.unwrap();

    // both devices act on the preparing order
    let (complete, cancel) = tokio::join!(chef.complete(order.id), admin.cancel(order.id));
    let succeeded = [complete.is_ok(), cancel.is_ok()];
    assert_eq!(succeeded.iter().filter(|ok| **ok).count(), 1);

    let loser = if complete.is_ok() { cancel.unwrap_err() } else { complete.unwrap_err() };
    assert!(matches!(
        loser.code(),
        Some(ErrorCode::StaleState) | Some(ErrorCode::InvalidTransition)
    ));

    let final_status = admin.get_order(order.id).await.unwrap().order.status;
    assert!(matches!(final_status, OrderStatus::Completed | OrderStatus::Cancelled));
}

#[tokio::test]
async fn test_read_partitions() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;

    let mut ids = Vec::new();
    for table in [1, 2, 1] {
        let view = customer
            .place_order(&gate, &order_request(table, "600111222", &[(ESPRESSO, 1)]))
            .await
            .unwrap();
        ids.push(view.order.id);
    }

    let chef = server.staff(CHEF).await;
    let admin = server.staff(ADMIN).await;
    chef.start_preparing(ids[0]).await.unwrap();
    chef.complete(ids[0]).await.unwrap();
    admin.cancel(ids[1]).await.unwrap();

    let pending: Vec<i64> = chef.pending_queue().await.unwrap().iter().map(|v| v.order.id).collect();
    assert_eq!(pending, vec![ids[2]]);

    let unpaid: Vec<i64> = chef.unpaid().await.unwrap().iter().map(|v| v.order.id).collect();
    assert_eq!(unpaid, vec![ids[0]]);

    let history = chef.history(&HistoryQuery::default()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].order.status, OrderStatus::Cancelled);

    let bad_range = HistoryQuery {
        from: Some(10),
        to: Some(5),
    };
    assert_eq!(code(chef.history(&bad_range).await), Some(ErrorCode::ValidationFailed));

    assert_eq!(chef.todays_orders().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_customer_sees_only_own_orders() {
    let server = TestServer::start();
    let customer = server.customer();
    let gate = granted_gate(&customer).await;

    customer
        .place_order(&gate, &order_request(1, "+34 600 111 222", &[(ESPRESSO, 1)]))
        .await
        .unwrap();
    customer
        .place_order(&gate, &order_request(1, "699000000", &[(CROISSANT, 1)]))
        .await
        .unwrap();
    customer
        .place_order(&gate, &order_request(2, "+34600111222", &[(CROISSANT, 1)]))
        .await
        .unwrap();

    let mine = customer.table_orders(1, "+34600111222").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order.items[0].menu_item_id, ESPRESSO);

    assert!(customer.table_orders(2, "699000000").await.unwrap().is_empty());
}
