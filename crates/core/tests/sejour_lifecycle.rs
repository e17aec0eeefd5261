//! Stay lifecycle integration tests over a real `PostgreSQL` instance.
//!
//! These exercise the transactional start/end writes end to end; the
//! conflict and role logic is covered by the mock-database unit tests.
//! Run with: `cargo test --test sejour_lifecycle -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use findcoloc_common::AppError;
use findcoloc_core::SejourService;
use findcoloc_db::{
    entities::{
        Application, Offer, application, application::ApplicationStatus, offer,
        offer::OfferStatus, sejour::SejourStatus, user,
    },
    repositories::{ApplicationRepository, OfferRepository, SejourRepository, UserRepository},
    test_utils::TestDatabase,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

fn test_user(id: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        username_lower: Set(id.to_string()),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("hash".to_string()),
        is_admin: Set(false),
        is_suspended: Set(false),
        onboarding_completed: Set(false),
        smoker: Set(false),
        has_pets: Set(false),
        accepts_visitors: Set(true),
        party_friendly: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

fn test_offer(id: &str, owner_id: &str) -> offer::ActiveModel {
    offer::ActiveModel {
        id: Set(id.to_string()),
        owner_id: Set(owner_id.to_string()),
        title: Set("Room".to_string()),
        description: Set("Room".to_string()),
        price: Set(500),
        city: Set("Lyon".to_string()),
        address: Set("1 rue Test".to_string()),
        postal_code: Set("69001".to_string()),
        furnished: Set(true),
        wifi: Set(true),
        washing_machine: Set(false),
        parking: Set(false),
        smoking_allowed: Set(false),
        pets_allowed: Set(false),
        visitors_allowed: Set(true),
        party_allowed: Set(false),
        status: Set(OfferStatus::Active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

fn test_application(id: &str, offer_id: &str, applicant_id: &str) -> application::ActiveModel {
    application::ActiveModel {
        id: Set(id.to_string()),
        offer_id: Set(offer_id.to_string()),
        applicant_id: Set(applicant_id.to_string()),
        message: Set("Hello".to_string()),
        status: Set(ApplicationStatus::Pending),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

fn lifecycle_service(db: &Arc<DatabaseConnection>) -> SejourService {
    SejourService::new(
        SejourRepository::new(Arc::clone(db)),
        OfferRepository::new(Arc::clone(db)),
        ApplicationRepository::new(Arc::clone(db)),
        UserRepository::new(Arc::clone(db)),
        Arc::clone(db),
    )
}

/// Starting then ending a stay must move the offer through
/// `Active → Rented → Active` and the application through
/// `Pending → Accepted → Pending`, leaving only the sejour as history.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_start_end_round_trip() {
    let test_db = TestDatabase::provision().await.unwrap();
    let db = test_db.connection_arc();

    test_user("owner").insert(db.as_ref()).await.unwrap();
    test_user("tenant").insert(db.as_ref()).await.unwrap();
    test_offer("offer1", "owner").insert(db.as_ref()).await.unwrap();
    test_application("app1", "offer1", "tenant")
        .insert(db.as_ref())
        .await
        .unwrap();

    let service = lifecycle_service(&db);

    let started = service
        .start_stay("app1", "owner", "tenant", "offer1")
        .await
        .unwrap();
    assert_eq!(started.status, SejourStatus::Active);

    let offer = Offer::find_by_id("offer1")
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status, OfferStatus::Rented);

    let application = Application::find_by_id("app1")
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Accepted);

    let ended = service.end_stay(&started.id, "tenant").await.unwrap();
    assert_eq!(ended.status, SejourStatus::Ended);
    assert!(ended.end_date.is_some());

    let offer = Offer::find_by_id("offer1")
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer.status, OfferStatus::Active);

    let application = Application::find_by_id("app1")
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);

    test_db.teardown().await.unwrap();
}

/// A tenant with an active stay cannot be accepted into a second one,
/// whichever offer it is for.
#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_stay_for_tenant_is_rejected() {
    let test_db = TestDatabase::provision().await.unwrap();
    let db = test_db.connection_arc();

    test_user("owner").insert(db.as_ref()).await.unwrap();
    test_user("owner2").insert(db.as_ref()).await.unwrap();
    test_user("tenant").insert(db.as_ref()).await.unwrap();
    test_offer("offer1", "owner").insert(db.as_ref()).await.unwrap();
    test_offer("offer2", "owner2").insert(db.as_ref()).await.unwrap();
    test_application("app1", "offer1", "tenant")
        .insert(db.as_ref())
        .await
        .unwrap();
    test_application("app2", "offer2", "tenant")
        .insert(db.as_ref())
        .await
        .unwrap();

    let service = lifecycle_service(&db);

    service
        .start_stay("app1", "owner", "tenant", "offer1")
        .await
        .unwrap();

    let second = service
        .start_stay("app2", "owner2", "tenant", "offer2")
        .await;
    assert!(matches!(
        second,
        Err(AppError::TenantAlreadyHasActiveStay(_))
    ));

    // The losing offer must be untouched.
    let offer2 = Offer::find_by_id("offer2")
        .one(db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(offer2.status, OfferStatus::Active);

    test_db.teardown().await.unwrap();
}
