//! Offer image repository.

use std::sync::Arc;

use crate::entities::{OfferImage, offer_image};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

/// Offer image repository for database operations.
#[derive(Clone)]
pub struct OfferImageRepository {
    db: Arc<DatabaseConnection>,
}

impl OfferImageRepository {
    /// Create a new offer image repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an image by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<offer_image::Model>> {
        OfferImage::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an offer's images in gallery order.
    pub async fn find_by_offer(&self, offer_id: &str) -> AppResult<Vec<offer_image::Model>> {
        OfferImage::find()
            .filter(offer_image::Column::OfferId.eq(offer_id))
            .order_by_asc(offer_image::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new image record.
    pub async fn create(&self, model: offer_image::ActiveModel) -> AppResult<offer_image::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an image record (gallery position).
    pub async fn update(&self, model: offer_image::ActiveModel) -> AppResult<offer_image::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an image record.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let image = self.find_by_id(id).await?;
        if let Some(i) = image {
            i.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
