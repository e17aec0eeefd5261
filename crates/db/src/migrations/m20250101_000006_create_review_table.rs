//! Create review table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Review::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Review::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::SejourId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Review::TargetId).string_len(32).not_null())
                    .col(ColumnDef::new(Review::Rating).small_integer().not_null())
                    .col(ColumnDef::new(Review::Comment).string_len(2048))
                    .col(
                        ColumnDef::new(Review::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_author")
                            .from(Review::Table, Review::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_sejour")
                            .from(Review::Table, Review::SejourId)
                            .to(Sejour::Table, Sejour::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (sejour_id, author_id, kind) - one review of each
        // kind per author and stay
        manager
            .create_index(
                Index::create()
                    .name("idx_review_sejour_author_kind")
                    .table(Review::Table)
                    .col(Review::SejourId)
                    .col(Review::AuthorId)
                    .col(Review::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: target_id (for aggregating a user's or offer's ratings)
        manager
            .create_index(
                Index::create()
                    .name("idx_review_target_id")
                    .table(Review::Table)
                    .col(Review::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Review {
    Table,
    Id,
    AuthorId,
    SejourId,
    Kind,
    TargetId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Sejour {
    Table,
    Id,
}
