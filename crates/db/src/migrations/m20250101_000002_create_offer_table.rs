//! Create offer table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Offer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Offer::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Offer::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Offer::Description).text().not_null())
                    .col(ColumnDef::new(Offer::Price).integer().not_null())
                    .col(ColumnDef::new(Offer::City).string_len(128).not_null())
                    .col(ColumnDef::new(Offer::Address).string_len(512).not_null())
                    .col(
                        ColumnDef::new(Offer::PostalCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Offer::SurfaceM2).integer())
                    .col(ColumnDef::new(Offer::Rooms).integer())
                    .col(
                        ColumnDef::new(Offer::Furnished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::Wifi)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::WashingMachine)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::Parking)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::SmokingAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::PetsAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::VisitorsAllowed)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Offer::PartyAllowed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Offer::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Offer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Offer::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer_owner")
                            .from(Offer::Table, Offer::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: owner_id (for listing an owner's offers)
        manager
            .create_index(
                Index::create()
                    .name("idx_offer_owner_id")
                    .table(Offer::Table)
                    .col(Offer::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: (status, city) - search queries filter on both
        manager
            .create_index(
                Index::create()
                    .name("idx_offer_status_city")
                    .table(Offer::Table)
                    .col(Offer::Status)
                    .col(Offer::City)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for newest-first sorting)
        manager
            .create_index(
                Index::create()
                    .name("idx_offer_created_at")
                    .table(Offer::Table)
                    .col(Offer::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Offer {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    Price,
    City,
    Address,
    PostalCode,
    SurfaceM2,
    Rooms,
    Furnished,
    Wifi,
    WashingMachine,
    Parking,
    SmokingAllowed,
    PetsAllowed,
    VisitorsAllowed,
    PartyAllowed,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
