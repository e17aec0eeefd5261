//! Application repository.

use std::sync::Arc;

use crate::entities::{Application, application, application::ApplicationStatus, offer};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Application repository for database operations.
#[derive(Clone)]
pub struct ApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl ApplicationRepository {
    /// Create a new application repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an application by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<application::Model>> {
        Application::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an application by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<application::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id}")))
    }

    /// Find an application by (offer, applicant) pair.
    pub async fn find_by_pair(
        &self,
        offer_id: &str,
        applicant_id: &str,
    ) -> AppResult<Option<application::Model>> {
        Application::find()
            .filter(application::Column::OfferId.eq(offer_id))
            .filter(application::Column::ApplicantId.eq(applicant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a tenant already applied to an offer.
    pub async fn exists_for_pair(&self, offer_id: &str, applicant_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(offer_id, applicant_id).await?.is_some())
    }

    /// Create a new application.
    pub async fn create(&self, model: application::ActiveModel) -> AppResult<application::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an application.
    pub async fn update(&self, model: application::ActiveModel) -> AppResult<application::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an application.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let application = self.find_by_id(id).await?;
        if let Some(a) = application {
            a.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get a tenant's applications (newest first).
    pub async fn find_by_applicant(&self, applicant_id: &str) -> AppResult<Vec<application::Model>> {
        Application::find()
            .filter(application::Column::ApplicantId.eq(applicant_id))
            .order_by_desc(application::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the applications for an offer, optionally restricted to a status.
    pub async fn find_by_offer(
        &self,
        offer_id: &str,
        status: Option<ApplicationStatus>,
    ) -> AppResult<Vec<application::Model>> {
        let mut query = Application::find()
            .filter(application::Column::OfferId.eq(offer_id))
            .order_by_desc(application::Column::Id);

        if let Some(status) = status {
            query = query.filter(application::Column::Status.eq(status));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending applications across all of an owner's offers.
    pub async fn find_pending_for_owner(&self, owner_id: &str) -> AppResult<Vec<application::Model>> {
        Application::find()
            .join(JoinType::InnerJoin, application::Relation::Offer.def())
            .filter(offer::Column::OwnerId.eq(owner_id))
            .filter(application::Column::Status.eq(ApplicationStatus::Pending))
            .order_by_desc(application::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_application(
        id: &str,
        offer_id: &str,
        applicant_id: &str,
        status: ApplicationStatus,
    ) -> application::Model {
        application::Model {
            id: id.to_string(),
            offer_id: offer_id.to_string(),
            applicant_id: applicant_id.to_string(),
            message: "I would love to join the flat".to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_pair_found() {
        let application = create_test_application("a1", "o1", "t1", ApplicationStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[application.clone()]])
                .into_connection(),
        );

        let repo = ApplicationRepository::new(db);
        let result = repo.find_by_pair("o1", "t1").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_exists_for_pair_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<application::Model>::new()])
                .into_connection(),
        );

        let repo = ApplicationRepository::new(db);
        let result = repo.exists_for_pair("o1", "t2").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_find_by_offer_with_status() {
        let a1 = create_test_application("a1", "o1", "t1", ApplicationStatus::Pending);
        let a2 = create_test_application("a2", "o1", "t2", ApplicationStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1, a2]])
                .into_connection(),
        );

        let repo = ApplicationRepository::new(db);
        let result = repo
            .find_by_offer("o1", Some(ApplicationStatus::Pending))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
