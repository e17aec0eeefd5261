//! Application service (a tenant's request to occupy an offer).

use crate::services::email::{EmailNotificationType, EmailService, EmailTemplateVars};
use chrono::Utc;
use findcoloc_common::{AppError, AppResult, IdGenerator};
use sea_orm::Set;
use validator::Validate;

use findcoloc_db::{
    entities::{application, application::ApplicationStatus, offer::OfferStatus},
    repositories::{ApplicationRepository, OfferRepository, UserRepository},
};

/// Input for creating an application.
#[derive(Debug, Validate)]
pub struct CreateApplicationInput {
    pub offer_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Application service for business logic.
#[derive(Clone)]
pub struct ApplicationService {
    application_repo: ApplicationRepository,
    offer_repo: OfferRepository,
    user_repo: UserRepository,
    mailer: Option<EmailService>,
    id_gen: IdGenerator,
}

impl ApplicationService {
    /// Create a new application service.
    #[must_use]
    pub const fn new(
        application_repo: ApplicationRepository,
        offer_repo: OfferRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            application_repo,
            offer_repo,
            user_repo,
            mailer: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new application service with email notifications.
    #[must_use]
    pub const fn with_mailer(
        application_repo: ApplicationRepository,
        offer_repo: OfferRepository,
        user_repo: UserRepository,
        mailer: EmailService,
    ) -> Self {
        Self {
            application_repo,
            offer_repo,
            user_repo,
            mailer: Some(mailer),
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply to an offer.
    ///
    /// At most one application per (offer, applicant) pair; the unique
    /// index on the table backs this check.
    pub async fn apply(
        &self,
        applicant_id: &str,
        input: CreateApplicationInput,
    ) -> AppResult<application::Model> {
        input.validate()?;

        let offer = self.offer_repo.get_by_id(&input.offer_id).await?;

        if offer.owner_id == applicant_id {
            return Err(AppError::BadRequest(
                "Cannot apply to your own offer".to_string(),
            ));
        }

        if offer.status != OfferStatus::Active {
            return Err(AppError::BadRequest(
                "Offer is not open for applications".to_string(),
            ));
        }

        if self
            .application_repo
            .exists_for_pair(&input.offer_id, applicant_id)
            .await?
        {
            return Err(AppError::Conflict(
                "You already applied to this offer".to_string(),
            ));
        }

        let model = application::ActiveModel {
            id: Set(self.id_gen.generate()),
            offer_id: Set(input.offer_id),
            applicant_id: Set(applicant_id.to_string()),
            message: Set(input.message),
            status: Set(ApplicationStatus::Pending),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.application_repo.create(model).await?;

        // Notify the owner; failures are logged, never surfaced.
        if let Some(ref mailer) = self.mailer {
            self.notify_owner(mailer, &offer.owner_id, applicant_id, &offer.title)
                .await;
        }

        Ok(created)
    }

    /// Accept a pending application (status change only; the stay itself
    /// starts through the sejour lifecycle).
    pub async fn accept(
        &self,
        application_id: &str,
        owner_id: &str,
    ) -> AppResult<application::Model> {
        let application = self
            .authorize_owner_action(application_id, owner_id)
            .await?;

        if application.status != ApplicationStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending applications can be accepted".to_string(),
            ));
        }

        let applicant_id = application.applicant_id.clone();
        let offer_id = application.offer_id.clone();

        let mut model: application::ActiveModel = application.into();
        model.status = Set(ApplicationStatus::Accepted);
        model.updated_at = Set(Some(Utc::now().into()));
        let updated = self.application_repo.update(model).await?;

        if let Some(ref mailer) = self.mailer {
            self.notify_applicant(mailer, &applicant_id, &offer_id).await;
        }

        Ok(updated)
    }

    /// Reject a pending application.
    pub async fn reject(
        &self,
        application_id: &str,
        owner_id: &str,
    ) -> AppResult<application::Model> {
        let application = self
            .authorize_owner_action(application_id, owner_id)
            .await?;

        if application.status != ApplicationStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending applications can be rejected".to_string(),
            ));
        }

        let mut model: application::ActiveModel = application.into();
        model.status = Set(ApplicationStatus::Rejected);
        model.updated_at = Set(Some(Utc::now().into()));
        self.application_repo.update(model).await
    }

    /// Withdraw (delete) one's own pending application.
    pub async fn withdraw(&self, application_id: &str, applicant_id: &str) -> AppResult<()> {
        let application = self.application_repo.get_by_id(application_id).await?;

        if application.applicant_id != applicant_id {
            return Err(AppError::Forbidden(
                "Only the applicant can withdraw an application".to_string(),
            ));
        }

        if application.status != ApplicationStatus::Pending {
            return Err(AppError::BadRequest(
                "Only pending applications can be withdrawn".to_string(),
            ));
        }

        self.application_repo.delete(application_id).await
    }

    /// Get the applications for an offer, restricted to its owner.
    pub async fn get_for_offer(
        &self,
        offer_id: &str,
        owner_id: &str,
        status: Option<ApplicationStatus>,
    ) -> AppResult<Vec<application::Model>> {
        let offer = self.offer_repo.get_by_id(offer_id).await?;
        if offer.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the offer's owner can view its applications".to_string(),
            ));
        }
        self.application_repo.find_by_offer(offer_id, status).await
    }

    /// Get a tenant's own applications.
    pub async fn get_mine(&self, applicant_id: &str) -> AppResult<Vec<application::Model>> {
        self.application_repo.find_by_applicant(applicant_id).await
    }

    /// Get pending applications across all of an owner's offers.
    pub async fn get_pending_for_owner(
        &self,
        owner_id: &str,
    ) -> AppResult<Vec<application::Model>> {
        self.application_repo.find_pending_for_owner(owner_id).await
    }

    /// Load an application and check the caller owns its offer.
    async fn authorize_owner_action(
        &self,
        application_id: &str,
        owner_id: &str,
    ) -> AppResult<application::Model> {
        let application = self.application_repo.get_by_id(application_id).await?;
        let offer = self.offer_repo.get_by_id(&application.offer_id).await?;
        if offer.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Only the offer's owner can act on its applications".to_string(),
            ));
        }
        Ok(application)
    }

    async fn notify_owner(
        &self,
        mailer: &EmailService,
        owner_id: &str,
        applicant_id: &str,
        offer_title: &str,
    ) {
        let owner = match self.user_repo.find_by_id(owner_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(owner_id = %owner_id, error = %e, "Failed to load owner for notification");
                return;
            }
        };
        let applicant_name = match self.user_repo.find_by_id(applicant_id).await {
            Ok(user) => user.map(|u| u.display_name.unwrap_or(u.username)),
            Err(_) => None,
        };

        let vars = EmailTemplateVars {
            recipient_name: owner.display_name.clone().or(Some(owner.username.clone())),
            counterpart_name: applicant_name,
            offer_title: Some(offer_title.to_string()),
            sejour_id: None,
        };
        if let Err(e) = mailer
            .send_notification(EmailNotificationType::ApplicationReceived, &owner.email, vars)
            .await
        {
            tracing::warn!(error = %e, "Failed to send application-received email");
        }
    }

    async fn notify_applicant(&self, mailer: &EmailService, applicant_id: &str, offer_id: &str) {
        let applicant = match self.user_repo.find_by_id(applicant_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(applicant_id = %applicant_id, error = %e, "Failed to load applicant for notification");
                return;
            }
        };
        let offer_title = match self.offer_repo.find_by_id(offer_id).await {
            Ok(offer) => offer.map(|o| o.title),
            Err(_) => None,
        };

        let vars = EmailTemplateVars {
            recipient_name: applicant
                .display_name
                .clone()
                .or(Some(applicant.username.clone())),
            counterpart_name: None,
            offer_title,
            sejour_id: None,
        };
        if let Err(e) = mailer
            .send_notification(
                EmailNotificationType::ApplicationAccepted,
                &applicant.email,
                vars,
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to send application-accepted email");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use findcoloc_db::entities::offer;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn test_offer(id: &str, owner_id: &str, status: OfferStatus) -> offer::Model {
        offer::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
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

    fn test_application(id: &str, status: ApplicationStatus) -> application::Model {
        application::Model {
            id: id.to_string(),
            offer_id: "o1".to_string(),
            applicant_id: "t1".to_string(),
            message: "Hello".to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn empty_mock() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        application_db: Arc<DatabaseConnection>,
        offer_db: Arc<DatabaseConnection>,
    ) -> ApplicationService {
        ApplicationService::new(
            ApplicationRepository::new(application_db),
            OfferRepository::new(offer_db),
            UserRepository::new(empty_mock()),
        )
    }

    #[tokio::test]
    async fn test_apply_to_own_offer_rejected() {
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", "t1", OfferStatus::Active)]])
                .into_connection(),
        );
        let service = service(empty_mock(), offer_db);

        let result = service
            .apply(
                "t1",
                CreateApplicationInput {
                    offer_id: "o1".to_string(),
                    message: "Hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_apply_to_inactive_offer_rejected() {
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", "owner1", OfferStatus::Rented)]])
                .into_connection(),
        );
        let service = service(empty_mock(), offer_db);

        let result = service
            .apply(
                "t1",
                CreateApplicationInput {
                    offer_id: "o1".to_string(),
                    message: "Hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_duplicate_application_rejected() {
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", "owner1", OfferStatus::Active)]])
                .into_connection(),
        );
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_application("a1", ApplicationStatus::Pending)]])
                .into_connection(),
        );
        let service = service(application_db, offer_db);

        let result = service
            .apply(
                "t1",
                CreateApplicationInput {
                    offer_id: "o1".to_string(),
                    message: "Hello".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_success() {
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", "owner1", OfferStatus::Active)]])
                .into_connection(),
        );
        let created = test_application("a1", ApplicationStatus::Pending);
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<application::Model>::new()])
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = service(application_db, offer_db);

        let result = service
            .apply(
                "t1",
                CreateApplicationInput {
                    offer_id: "o1".to_string(),
                    message: "Hello".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_accept_by_non_owner_rejected() {
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_application("a1", ApplicationStatus::Pending)]])
                .into_connection(),
        );
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("o1", "owner1", OfferStatus::Active)]])
                .into_connection(),
        );
        let service = service(application_db, offer_db);

        let result = service.accept("a1", "intruder").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_withdraw_non_pending_rejected() {
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_application("a1", ApplicationStatus::Accepted)]])
                .into_connection(),
        );
        let service = service(application_db, empty_mock());

        let result = service.withdraw("a1", "t1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_withdraw_by_other_user_rejected() {
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_application("a1", ApplicationStatus::Pending)]])
                .into_connection(),
        );
        let service = service(application_db, empty_mock());

        let result = service.withdraw("a1", "someone-else").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
