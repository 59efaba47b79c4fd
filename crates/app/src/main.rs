use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{
    CreateItemCmd, DistributionCmd, DistributionReason, DonationCmd, Engine, Item, MoneyCents,
    PurchaseCmd, Transaction, TransactionListFilter, TxMeta, UpdateItemCmd, VoidCmd,
};
use migration::{Migrator, MigratorTrait};
use settings::Database;
use uuid::Uuid;

mod demo;
mod settings;

type ResultApp<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "pantry")]
#[command(about = "Inventory ledger for a food pantry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Category(Category),
    Item(ItemArgs),
    /// Record bought stock.
    Purchase(PurchaseArgs),
    /// Record donated stock.
    Donate(DonateArgs),
    /// Record stock leaving the pantry.
    Distribute(DistributeArgs),
    /// Reverse a transaction with a correction.
    Void(VoidArgs),
    /// Show an item's ledger, newest first.
    History(HistoryArgs),
    /// List active items below their reorder threshold.
    LowStock,
    /// Populate the database with sample categories, items and movements.
    SeedDemo,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create(CategoryCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct CategoryCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    parent: Option<Uuid>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct ItemArgs {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Create(ItemCreateArgs),
    List(ItemListArgs),
    Show(SkuArg),
    Update(ItemUpdateArgs),
    Deactivate(SkuArg),
}

#[derive(Args, Debug)]
struct ItemCreateArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: Option<Uuid>,
    #[arg(long, default_value_t = CreateItemCmd::DEFAULT_REORDER_THRESHOLD)]
    threshold: f64,
}

#[derive(Args, Debug)]
struct ItemListArgs {
    /// Include deactivated items.
    #[arg(long)]
    all: bool,
}

#[derive(Args, Debug)]
struct SkuArg {
    #[arg(long)]
    sku: String,
}

#[derive(Args, Debug)]
struct ItemUpdateArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<Uuid>,
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Args, Debug)]
struct PurchaseArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    quantity: f64,
    /// Cost per unit, e.g. `2.50` or `$2.50`.
    #[arg(long, value_parser = parse_money)]
    unit_cost: MoneyCents,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct DonateArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    quantity: f64,
    /// Fair market value per unit.
    #[arg(long, value_parser = parse_money, default_value = "0")]
    fmv: MoneyCents,
    #[arg(long)]
    donor: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct DistributeArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    quantity: f64,
    /// One of `client`, `spoilage`, `internal`.
    #[arg(long, value_parser = parse_reason, default_value = "client")]
    reason: DistributionReason,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct VoidArgs {
    #[arg(long)]
    transaction: Uuid,
    #[arg(long)]
    reason: String,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    #[arg(long)]
    sku: String,
    #[arg(long)]
    limit: Option<u64>,
    /// Hide voided transactions.
    #[arg(long)]
    hide_voided: bool,
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn parse_reason(raw: &str) -> Result<DistributionReason, String> {
    DistributionReason::try_from(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> ResultApp<()> {
    let settings = settings::Settings::new()?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pantry={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database.database()).await?;
    let engine = Engine::builder().database(db).build().await?;

    run(&engine, cli.command, &settings.app.operator).await
}

async fn parse_database(config: &Database) -> ResultApp<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn meta(operator: &str, notes: Option<String>) -> TxMeta {
    let meta = TxMeta::default().created_by(operator);
    match notes {
        Some(notes) => meta.notes(notes),
        None => meta,
    }
}

async fn run(engine: &Engine, command: Command, operator: &str) -> ResultApp<()> {
    match command {
        Command::Category(category) => match category.command {
            CategoryCommand::Create(args) => {
                let category = engine
                    .create_category(&args.name, args.parent, args.description.as_deref())
                    .await?;
                println!("{}  {}", category.id, category.name);
            }
            CategoryCommand::List => {
                for category in engine.list_categories().await? {
                    println!("{}  {}", category.id, category.name);
                }
            }
        },
        Command::Item(item) => match item.command {
            ItemCommand::Create(args) => {
                let mut cmd = CreateItemCmd::new(args.sku, args.name)
                    .reorder_threshold(args.threshold);
                if let Some(category) = args.category {
                    cmd = cmd.category_id(category);
                }
                print_item(&engine.create_item(cmd).await?);
            }
            ItemCommand::List(args) => {
                for item in engine.list_items(!args.all).await? {
                    print_item(&item);
                }
            }
            ItemCommand::Show(args) => print_item(&engine.item_by_sku(&args.sku).await?),
            ItemCommand::Update(args) => {
                let item = engine.item_by_sku(&args.sku).await?;
                let mut cmd = UpdateItemCmd::default();
                if let Some(name) = args.name {
                    cmd = cmd.name(name);
                }
                if let Some(category) = args.category {
                    cmd = cmd.category_id(category);
                }
                if let Some(threshold) = args.threshold {
                    cmd = cmd.reorder_threshold(threshold);
                }
                print_item(&engine.update_item(item.id, cmd).await?);
            }
            ItemCommand::Deactivate(args) => {
                let item = engine.item_by_sku(&args.sku).await?;
                print_item(&engine.deactivate_item(item.id).await?);
            }
        },
        Command::Purchase(args) => {
            let item = engine.item_by_sku(&args.sku).await?;
            let mut cmd = PurchaseCmd::new(item.id, args.quantity, args.unit_cost)
                .meta(meta(operator, args.notes));
            if let Some(supplier) = args.supplier {
                cmd = cmd.supplier(supplier);
            }
            let (item, tx) = engine.process_purchase(cmd).await?;
            print_transaction(&tx);
            print_item(&item);
        }
        Command::Donate(args) => {
            let item = engine.item_by_sku(&args.sku).await?;
            let mut cmd =
                DonationCmd::new(item.id, args.quantity, args.fmv).meta(meta(operator, args.notes));
            if let Some(donor) = args.donor {
                cmd = cmd.donor(donor);
            }
            let (item, tx) = engine.process_donation(cmd).await?;
            print_transaction(&tx);
            print_item(&item);
        }
        Command::Distribute(args) => {
            let item = engine.item_by_sku(&args.sku).await?;
            let cmd = DistributionCmd::new(item.id, args.quantity, args.reason)
                .meta(meta(operator, args.notes));
            let (item, tx) = engine.process_distribution(cmd).await?;
            print_transaction(&tx);
            print_item(&item);
        }
        Command::Void(args) => {
            let outcome = engine
                .void_transaction(VoidCmd::new(args.transaction, args.reason).created_by(operator))
                .await?;
            print_transaction(&outcome.correction);
            print_item(&outcome.item);
        }
        Command::History(args) => {
            let item = engine.item_by_sku(&args.sku).await?;
            let filter = TransactionListFilter {
                limit: args.limit,
                include_voided: !args.hide_voided,
                ..Default::default()
            };
            for tx in engine.list_transactions_for_item(item.id, &filter).await? {
                print_transaction(&tx);
            }
        }
        Command::LowStock => {
            for item in engine.items_below_threshold().await? {
                print_item(&item);
            }
        }
        Command::SeedDemo => demo::seed(engine, operator).await?,
    }
    Ok(())
}

fn print_item(item: &Item) {
    println!(
        "{:<12} {:<28} qty {:>10} basis {:>12} unit {:>10}{}",
        item.sku,
        item.name,
        item.quantity_on_hand,
        item.total_cost_basis.to_string(),
        item.current_unit_cost()
            .map(|unit| unit.to_string())
            .unwrap_or_else(|_| String::from("n/a")),
        if item.is_active { "" } else { "  (inactive)" }
    );
}

fn print_transaction(tx: &Transaction) {
    println!(
        "{}  {}  {:<12} {:>10} unit {:>10} impact {:>10}{}{}",
        tx.id,
        tx.transaction_date.format("%Y-%m-%d %H:%M"),
        tx.kind.as_str(),
        tx.quantity_change,
        tx.unit_cost.to_string(),
        tx.total_financial_impact.to_string(),
        tx.reason_code
            .map(|reason| format!("  {}", reason.as_str()))
            .unwrap_or_default(),
        if tx.is_voided { "  [voided]" } else { "" }
    );
}
