use topup_engine::{
    checkout_objects::{StockPolicy, SyncOutcome},
    db_types::{Transaction, TransactionStatus},
    events::EventProducers,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{new_test_database, tear_down},
    },
    CheckoutApi,
    ErrorKind,
    ReconcileApi,
    ReconcileError,
    SqliteDatabase,
    TransactionStore,
};

mod support;
use support::{request_for, seed_product};

fn reconcile_api(db: &SqliteDatabase, gateway: &FakeGateway) -> ReconcileApi<SqliteDatabase, FakeGateway> {
    ReconcileApi::new(db.clone(), gateway.clone(), EventProducers::default())
}

/// Runs a successful checkout and returns the pending, linked transaction.
async fn checked_out(db: &SqliteDatabase, gateway: &FakeGateway, sku: &str) -> Transaction {
    let product = seed_product(db, sku, 5).await;
    let api = CheckoutApi::new(db.clone(), gateway.clone(), EventProducers::default())
        .with_stock_policy(StockPolicy::ReserveBeforeOrder);
    api.process_checkout(request_for(&product)).await.expect("checkout should succeed")
}

#[tokio::test]
async fn provider_success_finalises_the_transaction() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let tx = checked_out(&db, &gateway, "ML-86").await;
    let vip_order_id = tx.vip_order_id.clone().expect("order is linked");
    gateway.set_status(&vip_order_id, "success");
    let api = reconcile_api(&db, &gateway);

    let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
    let SyncOutcome::Updated { transaction, old_status } = outcome else {
        panic!("Expected an update, got {outcome:?}");
    };
    assert_eq!(old_status, TransactionStatus::Pending);
    assert_eq!(transaction.status, TransactionStatus::Success);
    assert_eq!(transaction.amount, tx.amount);
    assert_eq!(transaction.invoice, tx.invoice);
    assert_eq!(transaction.vip_order_id, tx.vip_order_id);
    assert_eq!(gateway.status_query_count(), 1);

    // A second sync is a no-op that never reaches the provider
    let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
    assert!(matches!(outcome, SyncOutcome::AlreadyFinal { .. }));
    assert_eq!(outcome.transaction().status, TransactionStatus::Success);
    assert_eq!(gateway.status_query_count(), 1);

    // Even if the provider changes its mind, a terminal status is never rewritten
    gateway.set_status(&vip_order_id, "failed");
    let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
    assert_eq!(outcome.transaction().status, TransactionStatus::Success);
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Success);
    tear_down(db).await;
}

#[tokio::test]
async fn provider_failure_status_finalises_as_failed() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let tx = checked_out(&db, &gateway, "ML-86").await;
    gateway.set_status(tx.vip_order_id.as_deref().unwrap(), "failed");
    let api = reconcile_api(&db, &gateway);

    let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
    assert!(outcome.is_updated());
    assert_eq!(outcome.transaction().status, TransactionStatus::Failed);
    tear_down(db).await;
}

#[tokio::test]
async fn unknown_provider_statuses_leave_the_transaction_pending() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let tx = checked_out(&db, &gateway, "ML-86").await;
    let vip_order_id = tx.vip_order_id.clone().unwrap();
    let api = reconcile_api(&db, &gateway);

    for status in ["pending", "processing", "waiting", "SUCCESS", ""] {
        gateway.set_status(&vip_order_id, status);
        let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
        assert!(matches!(outcome, SyncOutcome::Unchanged { .. }), "status '{status}' gave {outcome:?}");
    }
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
    assert_eq!(stored.updated_at, tx.updated_at);
    tear_down(db).await;
}

#[tokio::test]
async fn unreachable_provider_leaves_the_transaction_untouched() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let tx = checked_out(&db, &gateway, "ML-86").await;
    gateway.make_status_unavailable(true);
    let api = reconcile_api(&db, &gateway);

    let err = api.sync_status(tx.invoice.as_str()).await.expect_err("sync should fail");
    assert!(matches!(err, ReconcileError::Gateway(_)));
    assert_eq!(err.kind(), ErrorKind::Gateway);
    let stored = db.fetch_transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored, tx);

    // Retrying once the provider is back works as normal
    gateway.make_status_unavailable(false);
    gateway.set_status(tx.vip_order_id.as_deref().unwrap(), "success");
    let outcome = api.sync_status(tx.invoice.as_str()).await.expect("sync should succeed");
    assert_eq!(outcome.transaction().status, TransactionStatus::Success);
    tear_down(db).await;
}

#[tokio::test]
async fn unlinked_and_unknown_transactions() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    gateway.reject_orders(true);
    let product = seed_product(&db, "ML-86", 5).await;
    let checkout = CheckoutApi::new(db.clone(), gateway.clone(), EventProducers::default());
    let _ = checkout.process_checkout(request_for(&product)).await.expect_err("order is rejected");
    let api = reconcile_api(&db, &gateway);

    // The rejected checkout is already failed, so the provider is not asked about it
    let all = db.search_transactions(Default::default()).await.unwrap();
    let outcome = api.sync_status(all[0].invoice.as_str()).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::AlreadyFinal { .. }));

    let err = api.sync_status("INV/00000000000000/000000").await.expect_err("unknown invoice");
    assert_eq!(err, ReconcileError::TransactionNotFound("INV/00000000000000/000000".to_string()));
    let err = api.sync_status("   ").await.expect_err("blank invoice");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(gateway.status_query_count(), 0);
    tear_down(db).await;
}

#[tokio::test]
async fn pending_transaction_without_an_order_is_awaiting() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let product = seed_product(&db, "ML-86", 5).await;
    let tx = db
        .insert_transaction(topup_engine::db_types::NewTransaction {
            user_id: Some(3),
            product_id: product.id,
            method: topup_engine::db_types::PaymentMethod::CreditCard,
            invoice: "INV/20240601000000/000042".into(),
            amount: product.price,
            game_id: "1".to_string(),
            game_server: "1".to_string(),
        })
        .await
        .unwrap();
    let api = reconcile_api(&db, &gateway);

    let outcome = api.sync_status(tx.invoice.as_str()).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::AwaitingExternalOrder { .. }));
    assert_eq!(gateway.status_query_count(), 0);
    tear_down(db).await;
}

#[tokio::test]
async fn reconcile_sweep_reports_each_transaction() {
    let db = new_test_database().await;
    let gateway = FakeGateway::new();
    let done = checked_out(&db, &gateway, "ML-86").await;
    let waiting = checked_out(&db, &gateway, "ML-172").await;
    let stuck = checked_out(&db, &gateway, "ML-344").await;
    gateway.set_status(done.vip_order_id.as_deref().unwrap(), "success");
    let api = reconcile_api(&db, &gateway);

    let err = api.reconcile_pending(0).await.expect_err("limit must be positive");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let report = api.reconcile_pending(10).await.expect("sweep should succeed");
    assert_eq!(report.total_count(), 3);
    assert_eq!(report.updated, vec![done.invoice.clone()]);
    assert!(report.unchanged.contains(&waiting.invoice));
    assert!(report.unchanged.contains(&stuck.invoice));
    assert!(report.failed.is_empty());

    // Only the still-pending transactions are swept the second time around
    gateway.make_status_unavailable(true);
    let report = api.reconcile_pending(10).await.expect("sweep should succeed");
    assert!(report.updated.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|f| f.reason.contains("operation timed out")));

    let report = api.reconcile_pending(1).await.expect("sweep should succeed");
    assert_eq!(report.total_count(), 1);
    assert_eq!(report.failed[0].invoice, waiting.invoice);
    tear_down(db).await;
}
