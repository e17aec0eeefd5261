//! Review repository.

use std::sync::Arc;

use crate::entities::{Review, review};
use findcoloc_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Review repository for database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    db: Arc<DatabaseConnection>,
}

impl ReviewRepository {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new review.
    pub async fn create(&self, model: review::ActiveModel) -> AppResult<review::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get every review for a sejour.
    pub async fn find_by_sejour(&self, sejour_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::SejourId.eq(sejour_id))
            .order_by_asc(review::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the reviews an author submitted for a sejour.
    ///
    /// Used to compute the tenant's feedback-completion flag from history
    /// instead of maintaining a counter.
    pub async fn find_by_sejour_and_author(
        &self,
        sejour_id: &str,
        author_id: &str,
    ) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::SejourId.eq(sejour_id))
            .filter(review::Column::AuthorId.eq(author_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the reviews targeting a user or an offer (newest first).
    pub async fn find_by_target(&self, target_id: &str) -> AppResult<Vec<review::Model>> {
        Review::find()
            .filter(review::Column::TargetId.eq(target_id))
            .order_by_desc(review::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::review::ReviewKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_review(id: &str, kind: ReviewKind) -> review::Model {
        review::Model {
            id: id.to_string(),
            author_id: "t1".to_string(),
            sejour_id: "s1".to_string(),
            kind,
            target_id: "o1".to_string(),
            rating: 5,
            comment: Some("Great place".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_target() {
        let review = create_test_review("r1", ReviewKind::Property);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[review.clone()]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo.find_by_target("o1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].target_id, "o1");
    }

    #[tokio::test]
    async fn test_find_by_sejour_and_author() {
        let r1 = create_test_review("r1", ReviewKind::Property);
        let r2 = create_test_review("r2", ReviewKind::Owner);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = ReviewRepository::new(db);
        let result = repo.find_by_sejour_and_author("s1", "t1").await.unwrap();

        assert_eq!(result.len(), 2);
    }
}
