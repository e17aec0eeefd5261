//! Sejour repository.

use std::sync::Arc;

use crate::entities::{Sejour, sejour, sejour::SejourStatus};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Sejour repository for database operations.
///
/// The `status = active` filtered lookups back the lifecycle preconditions;
/// the partial unique indexes on the table are the last line of defense.
#[derive(Clone)]
pub struct SejourRepository {
    db: Arc<DatabaseConnection>,
}

impl SejourRepository {
    /// Create a new sejour repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a sejour by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<sejour::Model>> {
        Sejour::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a sejour by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<sejour::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SejourNotFound(id.to_string()))
    }

    /// Count a tenant's active sejours.
    pub async fn count_active_by_tenant(&self, tenant_id: &str) -> AppResult<u64> {
        Sejour::find()
            .filter(sejour::Column::TenantId.eq(tenant_id))
            .filter(sejour::Column::Status.eq(SejourStatus::Active))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the active sejour for an exact (offer, tenant) pair.
    pub async fn find_active_by_pair(
        &self,
        offer_id: &str,
        tenant_id: &str,
    ) -> AppResult<Option<sejour::Model>> {
        Sejour::find()
            .filter(sejour::Column::OfferId.eq(offer_id))
            .filter(sejour::Column::TenantId.eq(tenant_id))
            .filter(sejour::Column::Status.eq(SejourStatus::Active))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the active sejour occupying an offer, whoever the tenant is.
    pub async fn find_active_by_offer(&self, offer_id: &str) -> AppResult<Option<sejour::Model>> {
        Sejour::find()
            .filter(sejour::Column::OfferId.eq(offer_id))
            .filter(sejour::Column::Status.eq(SejourStatus::Active))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the sejours a user participates in, as owner or tenant.
    pub async fn find_by_participant(&self, user_id: &str) -> AppResult<Vec<sejour::Model>> {
        Sejour::find()
            .filter(
                Condition::any()
                    .add(sejour::Column::OwnerId.eq(user_id))
                    .add(sejour::Column::TenantId.eq(user_id)),
            )
            .order_by_desc(sejour::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a sejour outside the lifecycle transaction (feedback flags).
    pub async fn update(&self, model: sejour::ActiveModel) -> AppResult<sejour::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_sejour(id: &str, tenant_id: &str, offer_id: &str) -> sejour::Model {
        sejour::Model {
            id: id.to_string(),
            owner_id: "owner1".to_string(),
            tenant_id: tenant_id.to_string(),
            offer_id: offer_id.to_string(),
            application_id: "app1".to_string(),
            status: SejourStatus::Active,
            start_date: Utc::now().into(),
            end_date: None,
            owner_feedback_given: false,
            tenant_feedback_given: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_count_active_by_tenant() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1)),
                }]])
                .into_connection(),
        );

        let repo = SejourRepository::new(db);
        let count = repo.count_active_by_tenant("t1").await.unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_find_active_by_pair_found() {
        let sejour = create_test_sejour("s1", "t1", "o1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour.clone()]])
                .into_connection(),
        );

        let repo = SejourRepository::new(db);
        let result = repo.find_active_by_pair("o1", "t1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "s1");
    }

    #[tokio::test]
    async fn test_find_active_by_offer_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<sejour::Model>::new()])
                .into_connection(),
        );

        let repo = SejourRepository::new(db);
        let result = repo.find_active_by_offer("o1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<sejour::Model>::new()])
                .into_connection(),
        );

        let repo = SejourRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::SejourNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_participant() {
        let s1 = create_test_sejour("s1", "t1", "o1");
        let s2 = create_test_sejour("s2", "t1", "o2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = SejourRepository::new(db);
        let result = repo.find_by_participant("t1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
