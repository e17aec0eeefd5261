//! Moderation service for the admin backoffice.
//!
//! Offer approval, user suspension and identity-document verification,
//! all gated on the caller's admin role.

use chrono::Utc;
use findcoloc_common::{AppError, AppResult};
use sea_orm::Set;

use findcoloc_db::{
    entities::{id_document, offer, offer::OfferStatus, user},
    repositories::{IdDocumentRepository, OfferRepository, UserRepository},
};

/// Moderation service for business logic.
#[derive(Clone)]
pub struct ModerationService {
    offer_repo: OfferRepository,
    user_repo: UserRepository,
    document_repo: IdDocumentRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        offer_repo: OfferRepository,
        user_repo: UserRepository,
        document_repo: IdDocumentRepository,
    ) -> Self {
        Self {
            offer_repo,
            user_repo,
            document_repo,
        }
    }

    // ========== Offers ==========

    /// Get offers awaiting moderation.
    pub async fn get_pending_offers(
        &self,
        moderator_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<offer::Model>> {
        self.require_admin(moderator_id).await?;
        self.offer_repo.find_pending(limit, offset).await
    }

    /// Approve a pending offer, publishing it.
    pub async fn approve_offer(
        &self,
        moderator_id: &str,
        offer_id: &str,
    ) -> AppResult<offer::Model> {
        self.require_admin(moderator_id).await?;

        let offer = self.offer_repo.get_by_id(offer_id).await?;
        if offer.status != OfferStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending offers can be approved".to_string(),
            ));
        }

        self.set_offer_status(offer, OfferStatus::Active).await
    }

    /// Reject a pending offer.
    pub async fn reject_offer(
        &self,
        moderator_id: &str,
        offer_id: &str,
    ) -> AppResult<offer::Model> {
        self.require_admin(moderator_id).await?;

        let offer = self.offer_repo.get_by_id(offer_id).await?;
        if offer.status != OfferStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending offers can be rejected".to_string(),
            ));
        }

        self.set_offer_status(offer, OfferStatus::Rejected).await
    }

    /// Close an offer, removing it from circulation.
    pub async fn close_offer(
        &self,
        moderator_id: &str,
        offer_id: &str,
    ) -> AppResult<offer::Model> {
        self.require_admin(moderator_id).await?;

        let offer = self.offer_repo.get_by_id(offer_id).await?;
        if offer.status == OfferStatus::Rented {
            return Err(AppError::BadRequest(
                "A rented offer cannot be closed while its stay is active".to_string(),
            ));
        }

        self.set_offer_status(offer, OfferStatus::Closed).await
    }

    async fn set_offer_status(
        &self,
        offer: offer::Model,
        status: OfferStatus,
    ) -> AppResult<offer::Model> {
        let mut model: offer::ActiveModel = offer.into();
        model.status = Set(status);
        model.updated_at = Set(Some(Utc::now().into()));
        self.offer_repo.update(model).await
    }

    // ========== Users ==========

    /// List users for the backoffice.
    pub async fn list_users(
        &self,
        moderator_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.require_admin(moderator_id).await?;
        self.user_repo.list(limit, offset).await
    }

    /// Suspend a user.
    pub async fn suspend_user(&self, moderator_id: &str, user_id: &str) -> AppResult<user::Model> {
        self.require_admin(moderator_id).await?;

        if moderator_id == user_id {
            return Err(AppError::BadRequest("Cannot suspend yourself".to_string()));
        }

        let target = self.user_repo.get_by_id(user_id).await?;

        if target.is_admin {
            return Err(AppError::Forbidden("Cannot suspend an admin".to_string()));
        }

        if target.is_suspended {
            return Err(AppError::BadRequest("User already suspended".to_string()));
        }

        let mut model: user::ActiveModel = target.into();
        model.is_suspended = Set(true);
        model.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(model).await
    }

    /// Lift a user suspension.
    pub async fn unsuspend_user(
        &self,
        moderator_id: &str,
        user_id: &str,
    ) -> AppResult<user::Model> {
        self.require_admin(moderator_id).await?;

        let target = self.user_repo.get_by_id(user_id).await?;

        if !target.is_suspended {
            return Err(AppError::BadRequest("User is not suspended".to_string()));
        }

        let mut model: user::ActiveModel = target.into();
        model.is_suspended = Set(false);
        model.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(model).await
    }

    // ========== Identity documents ==========

    /// Mark an identity document as verified.
    pub async fn verify_document(
        &self,
        moderator_id: &str,
        document_id: &str,
    ) -> AppResult<id_document::Model> {
        self.require_admin(moderator_id).await?;

        let document = self.document_repo.get_by_id(document_id).await?;

        if document.verified {
            return Err(AppError::BadRequest(
                "Document is already verified".to_string(),
            ));
        }

        let mut model: id_document::ActiveModel = document.into();
        model.verified = Set(true);
        self.document_repo.update(model).await
    }

    /// Verify the caller has the admin role.
    async fn require_admin(&self, moderator_id: &str) -> AppResult<()> {
        let moderator = self.user_repo.get_by_id(moderator_id).await?;
        if !moderator.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can perform moderation actions".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            token: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            phone: None,
            is_admin,
            is_suspended: false,
            onboarding_completed: false,
            budget_min: None,
            budget_max: None,
            smoker: false,
            has_pets: false,
            accepts_visitors: true,
            party_friendly: false,
            gender: None,
            preferred_gender: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_offer(id: &str, status: OfferStatus) -> offer::Model {
        offer::Model {
            id: id.to_string(),
            owner_id: "owner1".to_string(),
            title: "Room".to_string(),
            description: "Room".to_string(),
            price: 500,
            city: "Lyon".to_string(),
            address: "1 rue Test".to_string(),
            postal_code: "69001".to_string(),
            surface_m2: None,
            rooms: None,
            furnished: false,
            wifi: false,
            washing_machine: false,
            parking: false,
            smoking_allowed: false,
            pets_allowed: false,
            visitors_allowed: true,
            party_allowed: false,
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn empty_mock() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        offer_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> ModerationService {
        ModerationService::new(
            OfferRepository::new(offer_db),
            UserRepository::new(user_db),
            IdDocumentRepository::new(empty_mock()),
        )
    }

    #[tokio::test]
    async fn test_non_admin_cannot_approve() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", false)]])
                .into_connection(),
        );
        let service = service(empty_mock(), user_db);

        let result = service.approve_offer("mod1", "o1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_approve_requires_pending_status() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", true)]])
                .into_connection(),
        );
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", OfferStatus::Draft)]])
                .into_connection(),
        );
        let service = service(offer_db, user_db);

        let result = service.approve_offer("mod1", "o1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_approve_publishes_offer() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", true)]])
                .into_connection(),
        );
        let mut approved = test_offer("o1", OfferStatus::Active);
        approved.updated_at = Some(Utc::now().into());
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", OfferStatus::Pending)]])
                .append_query_results([[approved]])
                .into_connection(),
        );
        let service = service(offer_db, user_db);

        let result = service.approve_offer("mod1", "o1").await.unwrap();

        assert_eq!(result.status, OfferStatus::Active);
    }

    #[tokio::test]
    async fn test_cannot_suspend_self() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", true)]])
                .into_connection(),
        );
        let service = service(empty_mock(), user_db);

        let result = service.suspend_user("mod1", "mod1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_cannot_suspend_admin() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", true)]])
                .append_query_results([[test_user("admin2", true)]])
                .into_connection(),
        );
        let service = service(empty_mock(), user_db);

        let result = service.suspend_user("mod1", "admin2").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_close_rented_offer_rejected() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("mod1", true)]])
                .into_connection(),
        );
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", OfferStatus::Rented)]])
                .into_connection(),
        );
        let service = service(offer_db, user_db);

        let result = service.close_offer("mod1", "o1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
