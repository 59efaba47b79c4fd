//! Sample data for a fresh database.
//!
//! Everything goes through the public engine API, so the ledger and the item
//! aggregates stay consistent exactly as they would with real use.
use chrono::{Duration, Utc};
use engine::{
    CreateItemCmd, DistributionCmd, DistributionReason, DonationCmd, Engine, EngineError,
    MoneyCents, PurchaseCmd, TxMeta,
};

use super::ResultApp;

const CATEGORIES: &[&str] = &[
    "Canned Goods",
    "Dry Goods",
    "Fresh Produce",
    "Frozen",
    "Hygiene",
    "Cleaning",
    "Paper Products",
];

/// `(sku, name, category index, reorder threshold)`
const ITEMS: &[(&str, &str, usize, f64)] = &[
    ("CAN-001", "Canned Corn", 0, 25.0),
    ("CAN-002", "Canned Green Beans", 0, 25.0),
    ("CAN-004", "Canned Tuna", 0, 15.0),
    ("CAN-005", "Canned Soup - Chicken Noodle", 0, 30.0),
    ("DRY-001", "Rice - White 2lb", 1, 30.0),
    ("DRY-002", "Pasta - Spaghetti", 1, 25.0),
    ("DRY-006", "Peanut Butter 16oz", 1, 15.0),
    ("DRY-009", "Beans - Dried Black", 1, 30.0),
    ("FRS-001", "Apples - Red Delicious", 2, 10.0),
    ("FRS-004", "Potatoes - Russet 5lb", 2, 15.0),
    ("FRZ-001", "Frozen Vegetables - Mixed", 3, 20.0),
    ("FRZ-002", "Frozen Chicken Breast", 3, 10.0),
    ("HYG-001", "Toothpaste", 4, 25.0),
    ("HYG-002", "Soap Bars - Pack of 4", 4, 20.0),
    ("CLN-001", "Dish Soap", 5, 25.0),
    ("PAP-001", "Toilet Paper 4-pack", 6, 20.0),
];

const SUPPLIERS: &[&str] = &["ACME Foods", "Sysco", "US Foods", "Local Grocery Co"];
const DONORS: &[&str] = &["First Baptist Church", "Community Foundation", "Anonymous"];

pub async fn seed(engine: &Engine, operator: &str) -> ResultApp<()> {
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let id = match engine.create_category(name, None, None).await {
            Ok(category) => category.id,
            Err(EngineError::ExistingKey(_)) => {
                let existing = engine.list_categories().await?;
                existing
                    .into_iter()
                    .find(|category| category.name.eq_ignore_ascii_case(name))
                    .map(|category| category.id)
                    .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))?
            }
            Err(err) => return Err(err.into()),
        };
        category_ids.push(id);
    }

    let now = Utc::now();
    let mut movements = 0usize;
    for (n, &(sku, name, category, threshold)) in ITEMS.iter().enumerate() {
        let cmd = CreateItemCmd::new(sku, name)
            .category_id(category_ids[category])
            .reorder_threshold(threshold);
        let item = match engine.create_item(cmd).await {
            Ok(item) => item,
            Err(EngineError::ExistingKey(_)) => {
                tracing::info!(sku, "demo item already present, skipping");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        // Deterministic spread: two or three intakes, then one or two distributions.
        let step = n as i64;
        let meta = |days_ago: i64| {
            TxMeta::new(now - Duration::days(days_ago) - Duration::minutes(step)).created_by(operator)
        };

        let quantity = (20 + (n * 7) % 30) as f64;
        let unit_cost = MoneyCents::new(75 + ((n as i64) * 37) % 425);
        engine
            .process_purchase(
                PurchaseCmd::new(item.id, quantity, unit_cost)
                    .supplier(SUPPLIERS[n % SUPPLIERS.len()])
                    .meta(meta(55)),
            )
            .await?;
        movements += 1;

        let donated = (5 + (n * 3) % 25) as f64;
        engine
            .process_donation(
                DonationCmd::new(item.id, donated, MoneyCents::new(100 + step * 13))
                    .donor(DONORS[n % DONORS.len()])
                    .meta(meta(40)),
            )
            .await?;
        movements += 1;

        if n % 2 == 0 {
            engine
                .process_purchase(
                    PurchaseCmd::new(item.id, 12.0, unit_cost + MoneyCents::new(25))
                        .supplier(SUPPLIERS[(n + 1) % SUPPLIERS.len()])
                        .meta(meta(30)),
                )
                .await?;
            movements += 1;
        }

        engine
            .process_distribution(
                DistributionCmd::new(item.id, quantity.min(25.0), DistributionReason::Client)
                    .meta(meta(14)),
            )
            .await?;
        movements += 1;

        if n % 5 == 3 {
            engine
                .process_distribution(
                    DistributionCmd::new(item.id, 2.0, DistributionReason::Spoilage).meta(meta(3)),
                )
                .await?;
            movements += 1;
        }
    }

    let items = engine.list_items(true).await?;
    let total_value = items
        .iter()
        .fold(MoneyCents::ZERO, |acc, item| acc + item.total_inventory_value());
    tracing::info!(items = items.len(), movements, "demo data seeded");
    println!("Active items:  {}", items.len());
    println!("Transactions:  {movements}");
    println!("Total value:   {total_value}");
    Ok(())
}
