//! Create application table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Application::OfferId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Application::ApplicantId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Application::Message).text().not_null())
                    .col(
                        ColumnDef::new(Application::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Application::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Application::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_offer")
                            .from(Application::Table, Application::OfferId)
                            .to(Offer::Table, Offer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_applicant")
                            .from(Application::Table, Application::ApplicantId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (offer_id, applicant_id) - prevent duplicate applications
        manager
            .create_index(
                Index::create()
                    .name("idx_application_offer_applicant")
                    .table(Application::Table)
                    .col(Application::OfferId)
                    .col(Application::ApplicantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: applicant_id (for listing a tenant's applications)
        manager
            .create_index(
                Index::create()
                    .name("idx_application_applicant_id")
                    .table(Application::Table)
                    .col(Application::ApplicantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Application {
    Table,
    Id,
    OfferId,
    ApplicantId,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Offer {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
