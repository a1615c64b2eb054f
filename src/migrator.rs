use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_orders_table::Migration),
            Box::new(m20240101_000002_create_order_logs_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::TechnicianId).uuid().not_null())
                        .col(ColumnDef::new(Orders::Quantity).integer().not_null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Orders::DoubleDip)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().not_null())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            // Duplicate probe: (order_number, technician_id) newest-first
            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_duplicate_probe")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .col(Orders::TechnicianId)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            // Productivity probe: technician's completed-today scan
            manager
                .create_index(
                    Index::create()
                        .name("idx_orders_productivity")
                        .table(Orders::Table)
                        .col(Orders::TechnicianId)
                        .col(Orders::Status)
                        .col(Orders::UpdatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        TechnicianId,
        Quantity,
        Notes,
        Status,
        DoubleDip,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240101_000002_create_order_logs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_order_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLogs::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLogs::Action).string_len(16).not_null())
                        .col(ColumnDef::new(OrderLogs::TechnicianId).uuid().not_null())
                        .col(ColumnDef::new(OrderLogs::Notes).string().null())
                        .col(ColumnDef::new(OrderLogs::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_logs_order_id")
                        .table(OrderLogs::Table)
                        .col(OrderLogs::OrderId)
                        .col(OrderLogs::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLogs {
        Table,
        Id,
        OrderId,
        Action,
        TechnicianId,
        Notes,
        CreatedAt,
    }
}
