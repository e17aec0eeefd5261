//! Offer repository.

use std::sync::Arc;

use crate::entities::{Offer, offer, offer::OfferStatus};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Sort order for offer searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OfferSort {
    /// Newest listings first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

/// Filters for searching published offers.
#[derive(Debug, Clone, Default)]
pub struct OfferSearchFilter {
    pub city: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub furnished: Option<bool>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub sort: OfferSort,
}

/// Offer repository for database operations.
#[derive(Clone)]
pub struct OfferRepository {
    db: Arc<DatabaseConnection>,
}

impl OfferRepository {
    /// Create a new offer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an offer by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<offer::Model>> {
        Offer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an offer by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<offer::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::OfferNotFound(id.to_string()))
    }

    /// Create a new offer.
    pub async fn create(&self, model: offer::ActiveModel) -> AppResult<offer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an offer.
    pub async fn update(&self, model: offer::ActiveModel) -> AppResult<offer::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an offer.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let offer = self.find_by_id(id).await?;
        if let Some(o) = offer {
            o.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get an owner's offers (newest first).
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<offer::Model>> {
        Offer::find()
            .filter(offer::Column::OwnerId.eq(owner_id))
            .order_by_desc(offer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search published (`Active`) offers with filters and pagination.
    pub async fn search(
        &self,
        filter: &OfferSearchFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<offer::Model>> {
        let mut query = Offer::find().filter(offer::Column::Status.eq(OfferStatus::Active));

        if let Some(ref city) = filter.city {
            query = query.filter(offer::Column::City.eq(city.as_str()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(offer::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(offer::Column::Price.lte(max));
        }
        if let Some(furnished) = filter.furnished {
            query = query.filter(offer::Column::Furnished.eq(furnished));
        }
        if let Some(wifi) = filter.wifi {
            query = query.filter(offer::Column::Wifi.eq(wifi));
        }
        if let Some(parking) = filter.parking {
            query = query.filter(offer::Column::Parking.eq(parking));
        }
        if let Some(smoking) = filter.smoking_allowed {
            query = query.filter(offer::Column::SmokingAllowed.eq(smoking));
        }
        if let Some(pets) = filter.pets_allowed {
            query = query.filter(offer::Column::PetsAllowed.eq(pets));
        }

        query = match filter.sort {
            OfferSort::Newest => query.order_by_desc(offer::Column::CreatedAt),
            OfferSort::PriceAsc => query.order_by_asc(offer::Column::Price),
            OfferSort::PriceDesc => query.order_by_desc(offer::Column::Price),
        };

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get offers awaiting moderation (oldest first, paginated).
    pub async fn find_pending(&self, limit: u64, offset: u64) -> AppResult<Vec<offer::Model>> {
        Offer::find()
            .filter(offer::Column::Status.eq(OfferStatus::Pending))
            .order_by_asc(offer::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

}
