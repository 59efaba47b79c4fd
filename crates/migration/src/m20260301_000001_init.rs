//! Initial schema for the pantry ledger.
//!
//! - `categories`: optional grouping of items
//! - `items`: one row per SKU, holding the running quantity and cost basis
//! - `transactions`: the append-only ledger

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    ParentId,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Sku,
    Name,
    CategoryId,
    QuantityOnHand,
    TotalCostBasisCents,
    ReorderThreshold,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ItemId,
    Kind,
    QuantityChange,
    UnitCostCents,
    FairMarketValueCents,
    TotalFinancialImpactCents,
    ReasonCode,
    Supplier,
    Donor,
    Notes,
    TransactionDate,
    CreatedBy,
    IsVoided,
    RefTransactionId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).blob())
                    .col(ColumnDef::new(Categories::Description).string())
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Items::Sku).string().not_null())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::CategoryId).blob())
                    .col(
                        ColumnDef::new(Items::QuantityOnHand)
                            .double()
                            .not_null()
                            .default(0.0)
                            .check(Expr::col(Items::QuantityOnHand).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Items::TotalCostBasisCents)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Items::TotalCostBasisCents).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Items::ReorderThreshold)
                            .double()
                            .not_null()
                            .default(10.0),
                    )
                    .col(
                        ColumnDef::new(Items::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Items::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-category_id")
                            .from(Items::Table, Items::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-sku-unique")
                    .table(Items::Table)
                    .col(Items::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-name")
                    .table(Items::Table)
                    .col(Items::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::ItemId).blob().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::QuantityChange)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UnitCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Transactions::FairMarketValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Transactions::TotalFinancialImpactCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Transactions::ReasonCode).string())
                    .col(ColumnDef::new(Transactions::Supplier).string())
                    .col(ColumnDef::new(Transactions::Donor).string())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(
                        ColumnDef::new(Transactions::TransactionDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::IsVoided)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Transactions::RefTransactionId).blob())
                    // Sign of the quantity follows the kind.
                    .check(Expr::cust(
                        "(kind IN ('PURCHASE', 'DONATION') AND quantity_change > 0) \
                         OR (kind = 'DISTRIBUTION' AND quantity_change < 0) \
                         OR (kind = 'CORRECTION' AND quantity_change <> 0)",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-item_id")
                            .from(Transactions::Table, Transactions::ItemId)
                            .to(Items::Table, Items::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-ref_transaction_id")
                            .from(Transactions::Table, Transactions::RefTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-item_id-transaction_date")
                    .table(Transactions::Table)
                    .col(Transactions::ItemId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-kind")
                    .table(Transactions::Table)
                    .col(Transactions::Kind)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-ref_transaction_id")
                    .table(Transactions::Table)
                    .col(Transactions::RefTransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
