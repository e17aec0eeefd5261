//! Review service (post-stay feedback).
//!
//! Governs the feedback-completion flags on the sejour: the owner has one
//! obligation (rate the tenant), the tenant has two (rate the property and
//! the owner), so the tenant's flag is a conjunction computed from review
//! history rather than a stored counter.

use chrono::Utc;
use findcoloc_common::{AppError, AppResult, IdGenerator};
use sea_orm::Set;
use validator::Validate;

use findcoloc_db::{
    entities::{
        review,
        review::ReviewKind,
        sejour,
        sejour::SejourStatus,
    },
    repositories::{ReviewRepository, SejourRepository},
};

/// Input for creating feedback.
#[derive(Debug, Validate)]
pub struct CreateFeedbackInput {
    pub sejour_id: String,
    pub kind: ReviewKind,
    pub target_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2048))]
    pub comment: Option<String>,
}

/// Review service for business logic.
#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    sejour_repo: SejourRepository,
    /// Whether the stay must be ended before feedback is accepted.
    /// Relaxed outside production so fixtures can review active stays;
    /// an intentional exception, not ambient behavior.
    require_ended_stay: bool,
    id_gen: IdGenerator,
}

impl ReviewService {
    /// Create a new review service.
    #[must_use]
    pub const fn new(
        review_repo: ReviewRepository,
        sejour_repo: SejourRepository,
        require_ended_stay: bool,
    ) -> Self {
        Self {
            review_repo,
            sejour_repo,
            require_ended_stay,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit feedback for a stay.
    ///
    /// The author must be the stay's owner or tenant. An owner may only
    /// submit `Tenant` reviews; a tenant may submit `Property` and `Owner`
    /// reviews and never `Tenant`. The target must match the entity the
    /// kind implies.
    pub async fn create_feedback(
        &self,
        author_id: &str,
        input: CreateFeedbackInput,
    ) -> AppResult<review::Model> {
        input.validate()?;

        let sejour = self.sejour_repo.get_by_id(&input.sejour_id).await?;

        let is_owner = sejour.owner_id == author_id;
        let is_tenant = sejour.tenant_id == author_id;
        if !is_owner && !is_tenant {
            return Err(AppError::Forbidden(
                "Only stay participants can submit feedback".to_string(),
            ));
        }

        if self.require_ended_stay && sejour.status != SejourStatus::Ended {
            return Err(AppError::BadRequest(
                "Feedback can only be submitted for an ended stay".to_string(),
            ));
        }

        // Role/kind compatibility.
        if is_owner && input.kind != ReviewKind::Tenant {
            return Err(AppError::Forbidden(
                "Owners may only review their tenant".to_string(),
            ));
        }
        if is_tenant && input.kind == ReviewKind::Tenant {
            return Err(AppError::Forbidden(
                "Tenants cannot submit tenant reviews".to_string(),
            ));
        }

        // The target must be the entity the kind implies.
        let expected_target = match input.kind {
            ReviewKind::Property => &sejour.offer_id,
            ReviewKind::Owner => &sejour.owner_id,
            ReviewKind::Tenant => &sejour.tenant_id,
        };
        if input.target_id != *expected_target {
            return Err(AppError::InvalidTarget(format!(
                "Expected target {expected_target} for a {:?} review",
                input.kind
            )));
        }

        if is_owner {
            // Owners submit exactly one review kind; the flag is the record.
            if sejour.owner_feedback_given {
                return Err(AppError::AlreadyReviewed);
            }

            let created = self.insert_review(author_id, &input).await?;
            self.set_owner_feedback_given(&sejour).await?;
            return Ok(created);
        }

        // Tenant path: detect duplicates from history, then union the
        // just-submitted kind with the existing kinds to decide completion.
        let existing = self
            .review_repo
            .find_by_sejour_and_author(&input.sejour_id, author_id)
            .await?;
        if existing.iter().any(|r| r.kind == input.kind) {
            return Err(AppError::AlreadyReviewed);
        }

        let created = self.insert_review(author_id, &input).await?;

        let mut has_property = input.kind == ReviewKind::Property;
        let mut has_owner = input.kind == ReviewKind::Owner;
        for r in &existing {
            match r.kind {
                ReviewKind::Property => has_property = true,
                ReviewKind::Owner => has_owner = true,
                ReviewKind::Tenant => {}
            }
        }
        if has_property && has_owner {
            self.set_tenant_feedback_given(&sejour).await?;
        }

        Ok(created)
    }

    async fn insert_review(
        &self,
        author_id: &str,
        input: &CreateFeedbackInput,
    ) -> AppResult<review::Model> {
        let model = review::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            sejour_id: Set(input.sejour_id.clone()),
            kind: Set(input.kind),
            target_id: Set(input.target_id.clone()),
            rating: Set(input.rating),
            comment: Set(input.comment.clone()),
            created_at: Set(Utc::now().into()),
        };
        self.review_repo.create(model).await
    }

    async fn set_owner_feedback_given(&self, sejour: &sejour::Model) -> AppResult<()> {
        let mut model: sejour::ActiveModel = sejour.clone().into();
        model.owner_feedback_given = Set(true);
        self.sejour_repo.update(model).await?;
        Ok(())
    }

    async fn set_tenant_feedback_given(&self, sejour: &sejour::Model) -> AppResult<()> {
        let mut model: sejour::ActiveModel = sejour.clone().into();
        model.tenant_feedback_given = Set(true);
        self.sejour_repo.update(model).await?;
        Ok(())
    }

    /// Get every review for a sejour, restricted to its participants.
    pub async fn get_reviews_for_sejour(
        &self,
        sejour_id: &str,
        requesting_user_id: &str,
    ) -> AppResult<Vec<review::Model>> {
        let sejour = self.sejour_repo.get_by_id(sejour_id).await?;
        if sejour.owner_id != requesting_user_id && sejour.tenant_id != requesting_user_id {
            return Err(AppError::Forbidden(
                "Only stay participants can view a stay's reviews".to_string(),
            ));
        }
        self.review_repo.find_by_sejour(sejour_id).await
    }

    /// Get the public reviews targeting a user or an offer.
    pub async fn get_reviews_for_target(&self, target_id: &str) -> AppResult<Vec<review::Model>> {
        self.review_repo.find_by_target(target_id).await
    }

    /// Average rating for a target, if it has any reviews.
    pub async fn average_rating(&self, target_id: &str) -> AppResult<Option<f64>> {
        let reviews = self.review_repo.find_by_target(target_id).await?;
        if reviews.is_empty() {
            return Ok(None);
        }
        #[allow(clippy::cast_precision_loss)]
        let avg =
            f64::from(reviews.iter().map(|r| i32::from(r.rating)).sum::<i32>()) / reviews.len() as f64;
        Ok(Some(avg))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn test_sejour(status: SejourStatus) -> sejour::Model {
        sejour::Model {
            id: "s1".to_string(),
            owner_id: "owner1".to_string(),
            tenant_id: "tenant1".to_string(),
            offer_id: "offer1".to_string(),
            application_id: "app1".to_string(),
            status,
            start_date: Utc::now().into(),
            end_date: None,
            owner_feedback_given: false,
            tenant_feedback_given: false,
            created_at: Utc::now().into(),
        }
    }

    fn test_review(id: &str, author_id: &str, kind: ReviewKind, target_id: &str) -> review::Model {
        review::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            sejour_id: "s1".to_string(),
            kind,
            target_id: target_id.to_string(),
            rating: 4,
            comment: None,
            created_at: Utc::now().into(),
        }
    }

    fn feedback(kind: ReviewKind, target_id: &str, rating: i16) -> CreateFeedbackInput {
        CreateFeedbackInput {
            sejour_id: "s1".to_string(),
            kind,
            target_id: target_id.to_string(),
            rating,
            comment: None,
        }
    }

    fn service(
        review_db: Arc<DatabaseConnection>,
        sejour_db: Arc<DatabaseConnection>,
    ) -> ReviewService {
        ReviewService::new(
            ReviewRepository::new(review_db),
            SejourRepository::new(sejour_db),
            true,
        )
    }

    fn empty_mock() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn sejour_mock(sejour: sejour::Model) -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour]])
                .into_connection(),
        )
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected() {
        let service = service(empty_mock(), empty_mock());

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "offer1", 6))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stranger_cannot_review() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("stranger", feedback(ReviewKind::Property, "offer1", 4))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_active_stay_rejected_when_required_ended() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Active)));

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "offer1", 4))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_review_property() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("owner1", feedback(ReviewKind::Property, "offer1", 4))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_review_owner() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("owner1", feedback(ReviewKind::Owner, "owner1", 4))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_tenant_cannot_review_tenant() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Tenant, "tenant1", 4))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_mismatched_target_rejected() {
        let service = service(empty_mock(), sejour_mock(test_sejour(SejourStatus::Ended)));

        // Property review must target the stay's offer, not the owner.
        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "owner1", 4))
            .await;

        assert!(matches!(result, Err(AppError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn test_first_tenant_review_leaves_flag_unset() {
        // No prior reviews; a single property review must not set the
        // tenant flag, so no sejour update query is issued (the mock would
        // fail on an unseeded update).
        let created = test_review("r1", "tenant1", ReviewKind::Property, "offer1");
        let review_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<review::Model>::new()])
                .append_query_results([[created.clone()]])
                .into_connection(),
        );
        let service = service(review_db, sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "offer1", 5))
            .await
            .unwrap();

        assert_eq!(result.kind, ReviewKind::Property);
    }

    #[tokio::test]
    async fn test_second_tenant_review_completes_feedback() {
        // A property review already exists; submitting the owner review
        // must set tenant_feedback_given.
        let existing = test_review("r1", "tenant1", ReviewKind::Property, "offer1");
        let created = test_review("r2", "tenant1", ReviewKind::Owner, "owner1");
        let review_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let mut completed = test_sejour(SejourStatus::Ended);
        completed.tenant_feedback_given = true;
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_sejour(SejourStatus::Ended)]])
                .append_query_results([[completed]])
                .into_connection(),
        );

        let service = service(review_db, sejour_db);
        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Owner, "owner1", 4))
            .await
            .unwrap();

        assert_eq!(result.kind, ReviewKind::Owner);
    }

    #[tokio::test]
    async fn test_duplicate_tenant_review_rejected() {
        let existing = test_review("r1", "tenant1", ReviewKind::Property, "offer1");
        let review_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = service(review_db, sejour_mock(test_sejour(SejourStatus::Ended)));

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "offer1", 3))
            .await;

        assert!(matches!(result, Err(AppError::AlreadyReviewed)));
    }

    #[tokio::test]
    async fn test_owner_review_sets_flag_immediately() {
        let created = test_review("r1", "owner1", ReviewKind::Tenant, "tenant1");
        let review_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let mut flagged = test_sejour(SejourStatus::Ended);
        flagged.owner_feedback_given = true;
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_sejour(SejourStatus::Ended)]])
                .append_query_results([[flagged]])
                .into_connection(),
        );

        let service = service(review_db, sejour_db);
        let result = service
            .create_feedback("owner1", feedback(ReviewKind::Tenant, "tenant1", 3))
            .await
            .unwrap();

        assert_eq!(result.kind, ReviewKind::Tenant);
    }

    #[tokio::test]
    async fn test_owner_cannot_review_twice() {
        let mut sejour = test_sejour(SejourStatus::Ended);
        sejour.owner_feedback_given = true;
        let service = service(empty_mock(), sejour_mock(sejour));

        let result = service
            .create_feedback("owner1", feedback(ReviewKind::Tenant, "tenant1", 3))
            .await;

        assert!(matches!(result, Err(AppError::AlreadyReviewed)));
    }

    #[tokio::test]
    async fn test_relaxed_check_allows_active_stay() {
        let created = test_review("r1", "tenant1", ReviewKind::Property, "offer1");
        let review_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<review::Model>::new()])
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = ReviewService::new(
            ReviewRepository::new(review_db),
            SejourRepository::new(sejour_mock(test_sejour(SejourStatus::Active))),
            false,
        );

        let result = service
            .create_feedback("tenant1", feedback(ReviewKind::Property, "offer1", 5))
            .await;

        assert!(result.is_ok());
    }
}
