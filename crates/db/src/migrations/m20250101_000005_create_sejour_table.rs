//! Create sejour table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sejour::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sejour::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sejour::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Sejour::TenantId).string_len(32).not_null())
                    .col(ColumnDef::new(Sejour::OfferId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Sejour::ApplicationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sejour::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Sejour::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sejour::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Sejour::OwnerFeedbackGiven)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sejour::TenantFeedbackGiven)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sejour::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sejour_owner")
                            .from(Sejour::Table, Sejour::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sejour_tenant")
                            .from(Sejour::Table, Sejour::TenantId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sejour_offer")
                            .from(Sejour::Table, Sejour::OfferId)
                            .to(Offer::Table, Offer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sejour_application")
                            .from(Sejour::Table, Sejour::ApplicationId)
                            .to(Application::Table, Application::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: tenant_id (for a tenant's stay history)
        manager
            .create_index(
                Index::create()
                    .name("idx_sejour_tenant_id")
                    .table(Sejour::Table)
                    .col(Sejour::TenantId)
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for an owner's stay history)
        manager
            .create_index(
                Index::create()
                    .name("idx_sejour_owner_id")
                    .table(Sejour::Table)
                    .col(Sejour::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Partial unique indexes backing the lifecycle invariants: at most
        // one active sejour per tenant and per offer. The application-level
        // precondition checks cannot fully close the read-then-write race
        // window on their own; sea-query's index builder has no partial
        // index support, so these two statements are raw SQL.
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_sejour_active_tenant \
             ON sejour (tenant_id) WHERE status = 'active'",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_sejour_active_offer \
             ON sejour (offer_id) WHERE status = 'active'",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sejour::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sejour {
    Table,
    Id,
    OwnerId,
    TenantId,
    OfferId,
    ApplicationId,
    Status,
    StartDate,
    EndDate,
    OwnerFeedbackGiven,
    TenantFeedbackGiven,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Offer {
    Table,
    Id,
}

#[derive(Iden)]
enum Application {
    Table,
    Id,
}
