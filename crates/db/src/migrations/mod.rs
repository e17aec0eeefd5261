//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_offer_table;
mod m20250101_000003_create_offer_image_table;
mod m20250101_000004_create_application_table;
mod m20250101_000005_create_sejour_table;
mod m20250101_000006_create_review_table;
mod m20250101_000007_create_id_document_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_offer_table::Migration),
            Box::new(m20250101_000003_create_offer_image_table::Migration),
            Box::new(m20250101_000004_create_application_table::Migration),
            Box::new(m20250101_000005_create_sejour_table::Migration),
            Box::new(m20250101_000006_create_review_table::Migration),
            Box::new(m20250101_000007_create_id_document_table::Migration),
        ]
    }
}
