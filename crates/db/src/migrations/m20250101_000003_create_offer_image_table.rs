//! Create offer image table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfferImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfferImage::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OfferImage::OfferId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OfferImage::Url).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(OfferImage::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OfferImage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer_image_offer")
                            .from(OfferImage::Table, OfferImage::OfferId)
                            .to(Offer::Table, Offer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: offer_id (for loading an offer's gallery)
        manager
            .create_index(
                Index::create()
                    .name("idx_offer_image_offer_id")
                    .table(OfferImage::Table)
                    .col(OfferImage::OfferId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OfferImage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OfferImage {
    Table,
    Id,
    OfferId,
    Url,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum Offer {
    Table,
    Id,
}
