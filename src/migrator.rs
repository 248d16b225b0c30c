use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_inventory_table::Migration)]
    }
}

mod m20250101_000001_create_inventory_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::Name).string().not_null())
                        .col(
                            ColumnDef::new(Inventory::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Inventory::Quantity).gte(0)),
                        )
                        .col(ColumnDef::new(Inventory::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Inventory::Expiry).date().not_null())
                        .col(ColumnDef::new(Inventory::Cost).string().not_null())
                        .col(ColumnDef::new(Inventory::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Inventory::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            // The name is the natural key for insert-or-merge
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_name")
                        .table(Inventory::Table)
                        .col(Inventory::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        Name,
        Quantity,
        Status,
        Expiry,
        Cost,
        CreatedAt,
        UpdatedAt,
    }
}
