//! Identity document repository.

use std::sync::Arc;

use crate::entities::{IdDocument, id_document};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Identity document repository for database operations.
#[derive(Clone)]
pub struct IdDocumentRepository {
    db: Arc<DatabaseConnection>,
}

impl IdDocumentRepository {
    /// Create a new identity document repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a document by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<id_document::Model>> {
        IdDocument::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a document by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<id_document::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {id}")))
    }

    /// Get a user's documents (newest first).
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<id_document::Model>> {
        IdDocument::find()
            .filter(id_document::Column::UserId.eq(user_id))
            .order_by_desc(id_document::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new document record.
    pub async fn create(&self, model: id_document::ActiveModel) -> AppResult<id_document::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a document record.
    pub async fn update(&self, model: id_document::ActiveModel) -> AppResult<id_document::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
