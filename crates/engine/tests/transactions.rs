use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CreateItemCmd, DistributionCmd, DistributionReason, DonationCmd, Engine, EngineError, Item,
    MoneyCents, PurchaseCmd, ReasonCode, TransactionKind, TransactionListFilter, TxMeta, VoidCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn new_item(engine: &Engine, sku: &str) -> Item {
    engine
        .create_item(CreateItemCmd::new(sku, format!("Item {sku}")))
        .await
        .unwrap()
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

#[tokio::test]
async fn purchase_donation_distribution_and_void() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "CAN-001").await;

    let (item_after, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 100.0, cents(100)).supplier("ACME Foods"))
        .await
        .unwrap();
    assert_eq!(item_after.quantity_on_hand, 100.0);
    assert_eq!(item_after.total_cost_basis, cents(10_000));
    assert_eq!(purchase.kind, TransactionKind::Purchase);
    assert_eq!(purchase.unit_cost, cents(100));
    assert_eq!(purchase.total_financial_impact, MoneyCents::ZERO);
    assert_eq!(purchase.supplier.as_deref(), Some("ACME Foods"));

    let (item_after, donation) = engine
        .process_donation(DonationCmd::new(item.id, 100.0, cents(150)).donor("Anonymous"))
        .await
        .unwrap();
    assert_eq!(item_after.quantity_on_hand, 200.0);
    assert_eq!(item_after.total_cost_basis, cents(10_000));
    assert_eq!(item_after.current_unit_cost().unwrap(), cents(50));
    assert_eq!(donation.fair_market_value, cents(15_000));
    assert_eq!(donation.unit_cost, MoneyCents::ZERO);

    let (item_after, distribution) = engine
        .process_distribution(DistributionCmd::new(item.id, 50.0, DistributionReason::Client))
        .await
        .unwrap();
    assert_eq!(item_after.quantity_on_hand, 150.0);
    assert_eq!(item_after.total_cost_basis, cents(7_500));
    assert_eq!(distribution.quantity_change, -50.0);
    assert_eq!(distribution.unit_cost, cents(50));
    assert_eq!(distribution.total_financial_impact, cents(2_500));
    assert_eq!(distribution.reason_code, Some(ReasonCode::Client));

    let outcome = engine
        .void_transaction(VoidCmd::new(distribution.id, "entered twice"))
        .await
        .unwrap();
    assert_eq!(outcome.item.quantity_on_hand, 200.0);
    assert_eq!(outcome.item.total_cost_basis, cents(10_000));
    assert!(outcome.voided.is_voided);

    let stored = engine.item(item.id).await.unwrap();
    assert_eq!(stored.quantity_on_hand, outcome.item.quantity_on_hand);
    assert_eq!(stored.total_cost_basis, outcome.item.total_cost_basis);
}

#[tokio::test]
async fn distribution_beyond_stock_changes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "DRY-001").await;
    engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(200)))
        .await
        .unwrap();

    let err = engine
        .process_distribution(DistributionCmd::new(item.id, 999.0, DistributionReason::Client))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientInventory(_)));

    let stored = engine.item(item.id).await.unwrap();
    assert_eq!(stored.quantity_on_hand, 10.0);
    assert_eq!(stored.total_cost_basis, cents(2_000));
    assert_eq!(engine.transactions_for_item(item.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn void_purchase_already_distributed_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "FRS-001").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(200)))
        .await
        .unwrap();
    engine
        .process_distribution(DistributionCmd::new(item.id, 10.0, DistributionReason::Client))
        .await
        .unwrap();

    let err = engine
        .void_transaction(VoidCmd::new(purchase.id, "wrong supplier"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStockForVoid(_)));

    let stored = engine.item(item.id).await.unwrap();
    assert_eq!(stored.quantity_on_hand, 0.0);
    assert_eq!(stored.total_cost_basis, MoneyCents::ZERO);
    let purchase = engine.transaction(purchase.id).await.unwrap();
    assert!(!purchase.is_voided);
    assert_eq!(engine.transactions_for_item(item.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn void_purchase_restores_empty_item() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "CAN-002").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(200)))
        .await
        .unwrap();

    let outcome = engine
        .void_transaction(VoidCmd::new(purchase.id, "duplicate entry").created_by("alice"))
        .await
        .unwrap();
    assert_eq!(outcome.item.quantity_on_hand, 0.0);
    assert_eq!(outcome.item.total_cost_basis, MoneyCents::ZERO);

    let correction = outcome.correction;
    assert_eq!(correction.kind, TransactionKind::Correction);
    assert_eq!(correction.quantity_change, -10.0);
    assert_eq!(correction.total_financial_impact, cents(-2_000));
    assert_eq!(correction.reason_code, Some(ReasonCode::Void));
    assert_eq!(correction.notes.as_deref(), Some("duplicate entry"));
    assert_eq!(correction.created_by, "alice");
    assert_eq!(correction.ref_transaction_id, Some(purchase.id));
    assert!(!correction.is_voided);

    let stored = engine.transaction(purchase.id).await.unwrap();
    assert!(stored.is_voided);
}

#[tokio::test]
async fn void_donation_keeps_cost_basis() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "HYG-001").await;
    engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(300)))
        .await
        .unwrap();
    let (_, donation) = engine
        .process_donation(DonationCmd::new(item.id, 5.0, cents(250)))
        .await
        .unwrap();

    let outcome = engine
        .void_transaction(VoidCmd::new(donation.id, "never arrived"))
        .await
        .unwrap();
    assert_eq!(outcome.item.quantity_on_hand, 10.0);
    assert_eq!(outcome.item.total_cost_basis, cents(3_000));
    assert_eq!(outcome.correction.total_financial_impact, MoneyCents::ZERO);
    assert_eq!(outcome.correction.quantity_change, -5.0);
}

#[tokio::test]
async fn second_void_is_rejected_without_new_rows() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "PAP-001").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 4.0, cents(125)))
        .await
        .unwrap();
    engine
        .void_transaction(VoidCmd::new(purchase.id, "typo"))
        .await
        .unwrap();

    let err = engine
        .void_transaction(VoidCmd::new(purchase.id, "typo again"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyVoided(_)));

    let history = engine.transactions_for_item(item.id).await.unwrap();
    let corrections = history
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Correction)
        .count();
    assert_eq!(corrections, 1);
}

#[tokio::test]
async fn corrections_cannot_be_voided() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "CLN-001").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 6.0, cents(100)))
        .await
        .unwrap();
    let outcome = engine
        .void_transaction(VoidCmd::new(purchase.id, "wrong item"))
        .await
        .unwrap();

    let err = engine
        .void_transaction(VoidCmd::new(outcome.correction.id, "undo the undo"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedVoidType(_)));
}

#[tokio::test]
async fn void_requires_a_reason() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "FRZ-001").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 6.0, cents(100)))
        .await
        .unwrap();

    let err = engine
        .void_transaction(VoidCmd::new(purchase.id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert!(!engine.transaction(purchase.id).await.unwrap().is_voided);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let missing = Uuid::now_v7();

    let err = engine
        .void_transaction(VoidCmd::new(missing, "gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .process_purchase(PurchaseCmd::new(missing, 1.0, cents(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.transaction(missing).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.transactions_for_item(missing).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn invalid_quantities_are_rejected_before_writing() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "DRY-002").await;

    for quantity in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let err = engine
            .process_purchase(PurchaseCmd::new(item.id, quantity, cents(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
    let err = engine
        .process_purchase(PurchaseCmd::new(item.id, 1.0, cents(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    assert!(engine.transactions_for_item(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn amounts_too_large_for_cents_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "DRY-003").await;
    engine
        .process_purchase(PurchaseCmd::new(item.id, 4.0, cents(125)))
        .await
        .unwrap();

    // 1e18 units at $1.00 is 1e20 cents, past i64.
    let err = engine
        .process_purchase(PurchaseCmd::new(item.id, 1e18, cents(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .process_donation(DonationCmd::new(item.id, 1e18, cents(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let stored = engine.item(item.id).await.unwrap();
    assert_eq!(stored.quantity_on_hand, 4.0);
    assert_eq!(stored.total_cost_basis, cents(500));
    assert_eq!(engine.transactions_for_item(item.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn void_purchase_restores_prior_fractional_stock() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "FRS-002").await;

    // 7.5 * 133 = 997.5, rounds to the even 998.
    let (item_after, _) = engine
        .process_purchase(PurchaseCmd::new(item.id, 7.5, cents(133)))
        .await
        .unwrap();
    assert_eq!(item_after.total_cost_basis, cents(998));
    let (before, _) = engine
        .process_donation(DonationCmd::new(item.id, 1.25, cents(40)))
        .await
        .unwrap();
    assert_eq!(before.quantity_on_hand, 8.75);
    assert_eq!(before.total_cost_basis, cents(998));

    // 2.25 * 111 = 249.75, rounds to 250.
    let (item_after, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 2.25, cents(111)))
        .await
        .unwrap();
    assert_eq!(item_after.quantity_on_hand, 11.0);
    assert_eq!(item_after.total_cost_basis, cents(1_248));

    let outcome = engine
        .void_transaction(VoidCmd::new(purchase.id, "keyed twice"))
        .await
        .unwrap();
    assert_eq!(outcome.item.quantity_on_hand, before.quantity_on_hand);
    assert_eq!(outcome.item.total_cost_basis, before.total_cost_basis);
    assert_eq!(outcome.correction.quantity_change, -2.25);
    assert_eq!(outcome.correction.total_financial_impact, cents(-250));

    let stored = engine.item(item.id).await.unwrap();
    assert_eq!(stored.quantity_on_hand, 8.75);
    assert_eq!(stored.total_cost_basis, cents(998));
}

#[tokio::test]
async fn deactivated_items_refuse_movements_but_allow_voids() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "DRY-006").await;
    let (_, purchase) = engine
        .process_purchase(PurchaseCmd::new(item.id, 8.0, cents(250)))
        .await
        .unwrap();
    engine.deactivate_item(item.id).await.unwrap();

    let err = engine
        .process_donation(DonationCmd::new(item.id, 1.0, cents(100)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let outcome = engine
        .void_transaction(VoidCmd::new(purchase.id, "recalled"))
        .await
        .unwrap();
    assert_eq!(outcome.item.quantity_on_hand, 0.0);
    assert!(!outcome.item.is_active);
}

#[tokio::test]
async fn history_is_newest_first_and_filterable() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "CAN-004").await;

    let (_, first) = engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(100)).meta(TxMeta::new(at(1))))
        .await
        .unwrap();
    let (_, second) = engine
        .process_distribution(
            DistributionCmd::new(item.id, 2.0, DistributionReason::Spoilage)
                .meta(TxMeta::new(at(3)).notes("dented cans")),
        )
        .await
        .unwrap();
    // Same date as `second`: ties fall back to insertion order.
    let (_, third) = engine
        .process_donation(DonationCmd::new(item.id, 4.0, cents(90)).meta(TxMeta::new(at(3))))
        .await
        .unwrap();

    let history = engine.transactions_for_item(item.id).await.unwrap();
    let ids: Vec<Uuid> = history.iter().map(|tx| tx.id).collect();
    assert_eq!(ids, [third.id, second.id, first.id]);
    assert_eq!(second.notes.as_deref(), Some("dented cans"));

    let limited = engine
        .list_transactions_for_item(
            item.id,
            &TransactionListFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, history[0].id);
}

#[tokio::test]
async fn voided_rows_can_be_hidden() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "CAN-005").await;
    let (_, kept) = engine
        .process_purchase(PurchaseCmd::new(item.id, 10.0, cents(100)).meta(TxMeta::new(at(1))))
        .await
        .unwrap();
    let (_, dropped) = engine
        .process_purchase(PurchaseCmd::new(item.id, 5.0, cents(120)).meta(TxMeta::new(at(2))))
        .await
        .unwrap();
    let outcome = engine
        .void_transaction(VoidCmd::new(dropped.id, "double count").voided_at(at(4)))
        .await
        .unwrap();

    let all = engine.transactions_for_item(item.id).await.unwrap();
    let all_ids: Vec<Uuid> = all.iter().map(|tx| tx.id).collect();
    assert_eq!(all_ids, [outcome.correction.id, dropped.id, kept.id]);

    let visible = engine
        .list_transactions_for_item(
            item.id,
            &TransactionListFilter {
                include_voided: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let visible_ids: Vec<Uuid> = visible.iter().map(|tx| tx.id).collect();
    assert_eq!(visible_ids, [outcome.correction.id, kept.id]);

    let purchases = engine
        .list_transactions_for_item(
            item.id,
            &TransactionListFilter {
                kinds: Some(vec![TransactionKind::Purchase]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(purchases.len(), 2);

    let err = engine
        .list_transactions_for_item(
            item.id,
            &TransactionListFilter {
                limit: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn default_metadata_is_recorded() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "HYG-002").await;
    let before = Utc::now() - Duration::seconds(1);

    let (_, tx) = engine
        .process_purchase(PurchaseCmd::new(item.id, 1.0, cents(99)).notes("  "))
        .await
        .unwrap();
    assert_eq!(tx.created_by, engine::SYSTEM_USER);
    assert_eq!(tx.notes, None);
    assert!(tx.transaction_date >= before);
    assert!(!tx.is_voided);
    assert_eq!(tx.ref_transaction_id, None);
}

#[tokio::test]
async fn basis_never_goes_negative_after_rounding() {
    let (engine, _db) = engine_with_db().await;
    let item = new_item(&engine, "FRS-004").await;
    engine
        .process_purchase(PurchaseCmd::new(item.id, 3.0, cents(1)))
        .await
        .unwrap();
    engine
        .process_donation(DonationCmd::new(item.id, 1.0, MoneyCents::ZERO))
        .await
        .unwrap();

    // 4 units worth 3 cents; per-unit COGS rounds to 1, 1, 0, 1.
    let mut last = None;
    for _ in 0..4 {
        let (item, _) = engine
            .process_distribution(DistributionCmd::new(item.id, 1.0, DistributionReason::Client))
            .await
            .unwrap();
        assert!(!item.total_cost_basis.is_negative());
        last = Some(item);
    }
    let last = last.unwrap();
    assert_eq!(last.quantity_on_hand, 0.0);
    assert_eq!(last.total_cost_basis, MoneyCents::ZERO);
}
