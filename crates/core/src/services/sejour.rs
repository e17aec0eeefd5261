//! Sejour (stay) lifecycle service.
//!
//! Owns the application → stay → review state machine:
//!
//! ```text
//!         start_stay()                end_stay()
//! [none] ───────────► [active] ───────────────► [ended]  (terminal)
//! ```
//!
//! Invariants: at most one active sejour per tenant, at most one active
//! sejour per offer. The precondition checks below fail fast in cost
//! order; the three-way write (sejour insert + offer update + application
//! update) runs in a single transaction, and partial unique indexes on the
//! sejour table close the remaining read-then-write race window.

use std::sync::Arc;

use crate::services::email::{EmailNotificationType, EmailService, EmailTemplateVars};
use chrono::Utc;
use findcoloc_common::{AppError, AppResult, IdGenerator};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use serde::Serialize;

use findcoloc_db::{
    entities::{
        Application, Offer, application, application::ApplicationStatus, offer,
        offer::OfferStatus, sejour, sejour::SejourStatus, user,
    },
    repositories::{ApplicationRepository, OfferRepository, SejourRepository, UserRepository},
};

/// Result of the stay-start eligibility pre-check.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StayEligibility {
    /// True iff the tenant has no active sejour.
    pub can_start: bool,
    /// Number of active sejours found for the tenant.
    pub active_sejours_count: u64,
}

/// Sejour lifecycle service.
#[derive(Clone)]
pub struct SejourService {
    sejour_repo: SejourRepository,
    offer_repo: OfferRepository,
    application_repo: ApplicationRepository,
    user_repo: UserRepository,
    db: Arc<DatabaseConnection>,
    mailer: Option<EmailService>,
    id_gen: IdGenerator,
}

impl SejourService {
    /// Create a new sejour service.
    #[must_use]
    pub const fn new(
        sejour_repo: SejourRepository,
        offer_repo: OfferRepository,
        application_repo: ApplicationRepository,
        user_repo: UserRepository,
        db: Arc<DatabaseConnection>,
    ) -> Self {
        Self {
            sejour_repo,
            offer_repo,
            application_repo,
            user_repo,
            db,
            mailer: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new sejour service with email notifications.
    #[must_use]
    pub const fn with_mailer(
        sejour_repo: SejourRepository,
        offer_repo: OfferRepository,
        application_repo: ApplicationRepository,
        user_repo: UserRepository,
        db: Arc<DatabaseConnection>,
        mailer: EmailService,
    ) -> Self {
        Self {
            sejour_repo,
            offer_repo,
            application_repo,
            user_repo,
            db,
            mailer: Some(mailer),
            id_gen: IdGenerator::new(),
        }
    }

    /// Check whether a tenant may start a new stay.
    ///
    /// Read-only pre-check; `can_start` is true iff the tenant has no
    /// active sejour.
    pub async fn can_start_stay(&self, tenant_id: &str) -> AppResult<StayEligibility> {
        let count = self.sejour_repo.count_active_by_tenant(tenant_id).await?;
        Ok(StayEligibility {
            can_start: count == 0,
            active_sejours_count: count,
        })
    }

    /// Transition an accepted application into an active stay.
    ///
    /// Preconditions run cheapest-first so relationship-spanning queries
    /// are skipped when an early check already fails. On success the
    /// sejour insert, the offer's move to `Rented` and the application's
    /// move to `Accepted` commit atomically; confirmation emails go out
    /// only after the commit and never roll it back.
    pub async fn start_stay(
        &self,
        application_id: &str,
        owner_id: &str,
        tenant_id: &str,
        offer_id: &str,
    ) -> AppResult<sejour::Model> {
        // 1. All four identifiers present.
        if application_id.trim().is_empty()
            || owner_id.trim().is_empty()
            || tenant_id.trim().is_empty()
            || offer_id.trim().is_empty()
        {
            return Err(AppError::BadRequest(
                "Missing identifiers for stay start".to_string(),
            ));
        }

        // 2. Tenant has no other active stay.
        let eligibility = self.can_start_stay(tenant_id).await?;
        if !eligibility.can_start {
            return Err(AppError::TenantAlreadyHasActiveStay(format!(
                "{} active sejour(s) for tenant {}",
                eligibility.active_sejours_count, tenant_id
            )));
        }

        // 3. No active stay already links this exact (offer, tenant) pair.
        if let Some(existing) = self
            .sejour_repo
            .find_active_by_pair(offer_id, tenant_id)
            .await?
        {
            return Err(AppError::DuplicateStay(existing.id));
        }

        // 4. The offer is not occupied by another tenant.
        if let Some(conflicting) = self.sejour_repo.find_active_by_offer(offer_id).await? {
            return Err(AppError::OfferAlreadyOccupied(conflicting.id));
        }

        // 5. The offer still exists.
        let offer = self
            .offer_repo
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| AppError::OfferNotFound(offer_id.to_string()))?;

        // 6. The offer is not already rented.
        if offer.status == OfferStatus::Rented {
            return Err(AppError::OfferAlreadyRented(offer.id));
        }

        let application = self.application_repo.get_by_id(application_id).await?;

        // Atomic three-way write, retried once on serialization failure.
        let mut retried = false;
        let created = loop {
            match self
                .write_stay_start(&offer, &application, owner_id, tenant_id)
                .await
            {
                Ok(sejour) => break sejour,
                Err(e) if !retried && is_serialization_failure(&e) => {
                    tracing::warn!(error = %e, "Stay start transaction serialization failure, retrying");
                    retried = true;
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        };

        self.notify_stay_started(&created).await;

        Ok(created)
    }

    /// Perform the transactional writes for a stay start.
    async fn write_stay_start(
        &self,
        offer: &offer::Model,
        application: &application::Model,
        owner_id: &str,
        tenant_id: &str,
    ) -> Result<sejour::Model, DbErr> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let sejour_model = sejour::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id.to_string()),
            tenant_id: Set(tenant_id.to_string()),
            offer_id: Set(offer.id.clone()),
            application_id: Set(application.id.clone()),
            status: Set(SejourStatus::Active),
            start_date: Set(now.into()),
            end_date: Set(None),
            owner_feedback_given: Set(false),
            tenant_feedback_given: Set(false),
            created_at: Set(now.into()),
        };
        let created = sejour_model.insert(&txn).await?;

        let mut offer_model: offer::ActiveModel = offer.clone().into();
        offer_model.status = Set(OfferStatus::Rented);
        offer_model.updated_at = Set(Some(now.into()));
        offer_model.update(&txn).await?;

        let mut application_model: application::ActiveModel = application.clone().into();
        application_model.status = Set(ApplicationStatus::Accepted);
        application_model.updated_at = Set(Some(now.into()));
        application_model.update(&txn).await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Close an active stay.
    ///
    /// The offer reverts to `Active` and the application to `Pending`
    /// rather than moving to new terminal statuses, so re-listing the same
    /// offer works exactly like listing a fresh one.
    pub async fn end_stay(
        &self,
        sejour_id: &str,
        requesting_user_id: &str,
    ) -> AppResult<sejour::Model> {
        let sejour = self.sejour_repo.get_by_id(sejour_id).await?;

        if sejour.owner_id != requesting_user_id && sejour.tenant_id != requesting_user_id {
            return Err(AppError::Forbidden(
                "Only stay participants can end a stay".to_string(),
            ));
        }

        if sejour.status == SejourStatus::Ended {
            return Err(AppError::BadRequest("Stay is already ended".to_string()));
        }

        let mut retried = false;
        let ended = loop {
            match self.write_stay_end(&sejour).await {
                Ok(sejour) => break sejour,
                Err(e) if !retried && is_serialization_failure(&e) => {
                    tracing::warn!(error = %e, "Stay end transaction serialization failure, retrying");
                    retried = true;
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        };

        self.notify_stay_ended(&ended).await;

        Ok(ended)
    }

    /// Perform the transactional writes for a stay end.
    async fn write_stay_end(&self, sejour: &sejour::Model) -> Result<sejour::Model, DbErr> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let mut sejour_model: sejour::ActiveModel = sejour.clone().into();
        sejour_model.status = Set(SejourStatus::Ended);
        sejour_model.end_date = Set(Some(now.into()));
        let ended = sejour_model.update(&txn).await?;

        // The offer and application may have been removed while the stay
        // was active; skipping the revert is better than failing the end.
        match Offer::find_by_id(&sejour.offer_id).one(&txn).await? {
            Some(offer) => {
                let mut offer_model: offer::ActiveModel = offer.into();
                offer_model.status = Set(OfferStatus::Active);
                offer_model.updated_at = Set(Some(now.into()));
                offer_model.update(&txn).await?;
            }
            None => {
                tracing::warn!(offer_id = %sejour.offer_id, "Offer missing while ending stay");
            }
        }

        match Application::find_by_id(&sejour.application_id).one(&txn).await? {
            Some(application) => {
                let mut application_model: application::ActiveModel = application.into();
                application_model.status = Set(ApplicationStatus::Pending);
                application_model.updated_at = Set(Some(now.into()));
                application_model.update(&txn).await?;
            }
            None => {
                tracing::warn!(
                    application_id = %sejour.application_id,
                    "Application missing while ending stay"
                );
            }
        }

        txn.commit().await?;
        Ok(ended)
    }

    /// Get a sejour, restricted to its participants.
    pub async fn get_sejour(
        &self,
        sejour_id: &str,
        requesting_user_id: &str,
    ) -> AppResult<sejour::Model> {
        let sejour = self.sejour_repo.get_by_id(sejour_id).await?;
        if sejour.owner_id != requesting_user_id && sejour.tenant_id != requesting_user_id {
            return Err(AppError::Forbidden(
                "Only stay participants can view a stay".to_string(),
            ));
        }
        Ok(sejour)
    }

    /// Get the stays a user participates in, as owner or tenant.
    pub async fn get_sejours_for_user(&self, user_id: &str) -> AppResult<Vec<sejour::Model>> {
        self.sejour_repo.find_by_participant(user_id).await
    }

    // ==================== Notification helpers ====================

    /// Best-effort confirmation emails after a stay start.
    async fn notify_stay_started(&self, sejour: &sejour::Model) {
        let Some(ref mailer) = self.mailer else {
            return;
        };

        let offer_title = self.load_offer_title(&sejour.offer_id).await;
        let owner = self.load_user(&sejour.owner_id).await;
        let tenant = self.load_user(&sejour.tenant_id).await;

        if let Some(ref tenant) = tenant {
            let vars = EmailTemplateVars {
                recipient_name: display_name(tenant),
                counterpart_name: owner.as_ref().and_then(|o| display_name(o)),
                offer_title: offer_title.clone(),
                sejour_id: Some(sejour.id.clone()),
            };
            self.dispatch(mailer, EmailNotificationType::StayStarted, &tenant.email, vars)
                .await;
        }

        if let Some(ref owner) = owner {
            let vars = EmailTemplateVars {
                recipient_name: display_name(owner),
                counterpart_name: tenant.as_ref().and_then(|t| display_name(t)),
                offer_title,
                sejour_id: Some(sejour.id.clone()),
            };
            self.dispatch(mailer, EmailNotificationType::StayStarted, &owner.email, vars)
                .await;
        }
    }

    /// Best-effort feedback-request emails after a stay end.
    async fn notify_stay_ended(&self, sejour: &sejour::Model) {
        let Some(ref mailer) = self.mailer else {
            return;
        };

        let offer_title = self.load_offer_title(&sejour.offer_id).await;

        for user_id in [&sejour.tenant_id, &sejour.owner_id] {
            if let Some(user) = self.load_user(user_id).await {
                let vars = EmailTemplateVars {
                    recipient_name: display_name(&user),
                    counterpart_name: None,
                    offer_title: offer_title.clone(),
                    sejour_id: Some(sejour.id.clone()),
                };
                self.dispatch(mailer, EmailNotificationType::StayEnded, &user.email, vars)
                    .await;
            }
        }
    }

    async fn dispatch(
        &self,
        mailer: &EmailService,
        notification_type: EmailNotificationType,
        to: &str,
        vars: EmailTemplateVars,
    ) {
        match mailer.send_notification(notification_type, to, vars).await {
            Ok(result) if !result.success => {
                tracing::warn!(
                    to = %to,
                    notification = %notification_type,
                    error = ?result.error,
                    "Email delivery failed"
                );
            }
            Err(e) => {
                tracing::warn!(to = %to, notification = %notification_type, error = %e, "Failed to send email");
            }
            Ok(_) => {}
        }
    }

    async fn load_user(&self, user_id: &str) -> Option<user::Model> {
        match self.user_repo.find_by_id(user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to load user for notification");
                None
            }
        }
    }

    async fn load_offer_title(&self, offer_id: &str) -> Option<String> {
        match self.offer_repo.find_by_id(offer_id).await {
            Ok(offer) => offer.map(|o| o.title),
            Err(e) => {
                tracing::warn!(offer_id = %offer_id, error = %e, "Failed to load offer for notification");
                None
            }
        }
    }
}

fn display_name(user: &user::Model) -> Option<String> {
    user.display_name
        .clone()
        .or_else(|| Some(user.username.clone()))
}

/// Whether a database error is a serialization failure worth retrying.
fn is_serialization_failure(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("40001") || msg.to_lowercase().contains("serialization")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_offer(id: &str, owner_id: &str, status: OfferStatus) -> offer::Model {
        offer::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            title: "Room in shared flat".to_string(),
            description: "Bright room".to_string(),
            price: 550,
            city: "Lyon".to_string(),
            address: "12 rue de la République".to_string(),
            postal_code: "69002".to_string(),
            surface_m2: None,
            rooms: None,
            furnished: true,
            wifi: true,
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

    fn test_application(id: &str, offer_id: &str, applicant_id: &str) -> application::Model {
        application::Model {
            id: id.to_string(),
            offer_id: offer_id.to_string(),
            applicant_id: applicant_id.to_string(),
            message: "Hello".to_string(),
            status: ApplicationStatus::Pending,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_sejour(id: &str, tenant_id: &str, offer_id: &str, status: SejourStatus) -> sejour::Model {
        sejour::Model {
            id: id.to_string(),
            owner_id: "owner1".to_string(),
            tenant_id: tenant_id.to_string(),
            offer_id: offer_id.to_string(),
            application_id: "app1".to_string(),
            status,
            start_date: Utc::now().into(),
            end_date: None,
            owner_feedback_given: false,
            tenant_feedback_given: false,
            created_at: Utc::now().into(),
        }
    }

    fn count_result(count: i64) -> Vec<std::collections::BTreeMap<&'static str, sea_orm::Value>> {
        vec![btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(count)),
        }]
    }

    fn empty_mock() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn service(
        sejour_db: Arc<DatabaseConnection>,
        offer_db: Arc<DatabaseConnection>,
        application_db: Arc<DatabaseConnection>,
        txn_db: Arc<DatabaseConnection>,
    ) -> SejourService {
        SejourService::new(
            SejourRepository::new(sejour_db),
            OfferRepository::new(offer_db),
            ApplicationRepository::new(application_db),
            UserRepository::new(empty_mock()),
            txn_db,
        )
    }

    #[tokio::test]
    async fn test_start_stay_rejects_missing_identifiers() {
        let service = service(empty_mock(), empty_mock(), empty_mock(), empty_mock());

        let result = service.start_stay("", "owner1", "tenant1", "offer1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_can_start_stay_with_no_active_sejours() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let eligibility = service.can_start_stay("tenant1").await.unwrap();

        assert!(eligibility.can_start);
        assert_eq!(eligibility.active_sejours_count, 0);
    }

    #[tokio::test]
    async fn test_can_start_stay_blocked_by_active_sejour() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(1)])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let eligibility = service.can_start_stay("tenant1").await.unwrap();

        assert!(!eligibility.can_start);
        assert_eq!(eligibility.active_sejours_count, 1);
    }

    #[tokio::test]
    async fn test_start_stay_rejects_tenant_with_active_stay() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(1)])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await;

        assert!(matches!(
            result,
            Err(AppError::TenantAlreadyHasActiveStay(_))
        ));
    }

    #[tokio::test]
    async fn test_start_stay_rejects_duplicate_pair() {
        let existing = test_sejour("s1", "tenant1", "offer1", SejourStatus::Active);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await;

        match result {
            Err(AppError::DuplicateStay(id)) => assert_eq!(id, "s1"),
            other => panic!("Expected DuplicateStay, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_stay_rejects_occupied_offer() {
        let conflicting = test_sejour("s9", "tenant2", "offer1", SejourStatus::Active);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .append_query_results([Vec::<sejour::Model>::new()])
                .append_query_results([[conflicting]])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await;

        match result {
            Err(AppError::OfferAlreadyOccupied(id)) => assert_eq!(id, "s9"),
            other => panic!("Expected OfferAlreadyOccupied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_stay_rejects_missing_offer() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .append_query_results([
                    Vec::<sejour::Model>::new(),
                    Vec::<sejour::Model>::new(),
                ])
                .into_connection(),
        );
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<offer::Model>::new()])
                .into_connection(),
        );
        let service = service(sejour_db, offer_db, empty_mock(), empty_mock());

        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await;

        assert!(matches!(result, Err(AppError::OfferNotFound(_))));
    }

    #[tokio::test]
    async fn test_start_stay_rejects_rented_offer() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .append_query_results([
                    Vec::<sejour::Model>::new(),
                    Vec::<sejour::Model>::new(),
                ])
                .into_connection(),
        );
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_offer("offer1", "owner1", OfferStatus::Rented)]])
                .into_connection(),
        );
        let service = service(sejour_db, offer_db, empty_mock(), empty_mock());

        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await;

        match result {
            Err(AppError::OfferAlreadyRented(id)) => assert_eq!(id, "offer1"),
            other => panic!("Expected OfferAlreadyRented, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_stay_success() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_result(0)])
                .append_query_results([
                    Vec::<sejour::Model>::new(),
                    Vec::<sejour::Model>::new(),
                ])
                .into_connection(),
        );
        let offer = test_offer("offer1", "owner1", OfferStatus::Active);
        let offer_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[offer.clone()]])
                .into_connection(),
        );
        let application = test_application("app1", "offer1", "tenant1");
        let application_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[application.clone()]])
                .into_connection(),
        );

        let created = test_sejour("s1", "tenant1", "offer1", SejourStatus::Active);
        let mut rented = offer;
        rented.status = OfferStatus::Rented;
        let mut accepted = application;
        accepted.status = ApplicationStatus::Accepted;
        let txn_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .append_query_results([[rented]])
                .append_query_results([[accepted]])
                .into_connection(),
        );

        let service = service(sejour_db, offer_db, application_db, txn_db);
        let result = service
            .start_stay("app1", "owner1", "tenant1", "offer1")
            .await
            .unwrap();

        assert_eq!(result.status, SejourStatus::Active);
        assert_eq!(result.tenant_id, "tenant1");
        assert_eq!(result.offer_id, "offer1");
        assert!(result.end_date.is_none());
    }

    #[tokio::test]
    async fn test_end_stay_not_found() {
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<sejour::Model>::new()])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.end_stay("missing", "tenant1").await;

        assert!(matches!(result, Err(AppError::SejourNotFound(_))));
    }

    #[tokio::test]
    async fn test_end_stay_rejects_non_participant() {
        let sejour = test_sejour("s1", "tenant1", "offer1", SejourStatus::Active);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour]])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.end_stay("s1", "stranger").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_end_stay_rejects_already_ended() {
        let sejour = test_sejour("s1", "tenant1", "offer1", SejourStatus::Ended);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour]])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.end_stay("s1", "tenant1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_end_stay_success_by_tenant() {
        let sejour = test_sejour("s1", "tenant1", "offer1", SejourStatus::Active);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour.clone()]])
                .into_connection(),
        );

        let mut ended = sejour;
        ended.status = SejourStatus::Ended;
        ended.end_date = Some(Utc::now().into());
        let offer = test_offer("offer1", "owner1", OfferStatus::Rented);
        let mut reverted = offer.clone();
        reverted.status = OfferStatus::Active;
        let application = test_application("app1", "offer1", "tenant1");
        let mut pending = application.clone();
        pending.status = ApplicationStatus::Pending;

        let txn_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ended.clone()]])
                .append_query_results([[offer]])
                .append_query_results([[reverted]])
                .append_query_results([[application]])
                .append_query_results([[pending]])
                .into_connection(),
        );

        let service = service(sejour_db, empty_mock(), empty_mock(), txn_db);
        let result = service.end_stay("s1", "tenant1").await.unwrap();

        assert_eq!(result.status, SejourStatus::Ended);
        assert!(result.end_date.is_some());
    }

    #[tokio::test]
    async fn test_get_sejour_restricted_to_participants() {
        let sejour = test_sejour("s1", "tenant1", "offer1", SejourStatus::Active);
        let sejour_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sejour]])
                .into_connection(),
        );
        let service = service(sejour_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.get_sejour("s1", "stranger").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_serialization_failure_detection() {
        let err = DbErr::Custom("SQLSTATE 40001: serialization failure".to_string());
        assert!(is_serialization_failure(&err));

        let err = DbErr::Custom("duplicate key value".to_string());
        assert!(!is_serialization_failure(&err));
    }
}
