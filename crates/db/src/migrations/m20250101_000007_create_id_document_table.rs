//! Create id document table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IdDocument::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdDocument::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdDocument::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdDocument::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(IdDocument::FileUrl)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdDocument::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IdDocument::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_id_document_user")
                            .from(IdDocument::Table, IdDocument::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's documents)
        manager
            .create_index(
                Index::create()
                    .name("idx_id_document_user_id")
                    .table(IdDocument::Table)
                    .col(IdDocument::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdDocument::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IdDocument {
    Table,
    Id,
    UserId,
    Kind,
    FileUrl,
    Verified,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
