//! Application endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use findcoloc_common::AppResult;
use findcoloc_db::entities::application::{ApplicationStatus, Model as ApplicationModel};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Application response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub offer_id: String,
    pub applicant_id: String,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: String,
}

impl From<ApplicationModel> for ApplicationResponse {
    fn from(a: ApplicationModel) -> Self {
        Self {
            id: a.id,
            offer_id: a.offer_id,
            applicant_id: a.applicant_id,
            message: a.message,
            status: a.status,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Apply request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub offer_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Apply to an offer.
async fn apply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    req.validate()?;

    let input = findcoloc_core::application::CreateApplicationInput {
        offer_id: req.offer_id,
        message: req.message,
    };

    let application = state.application_service.apply(&user.id, input).await?;
    Ok(ApiResponse::ok(application.into()))
}

/// List one's own applications.
async fn my_applications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state.application_service.get_mine(&user.id).await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

/// List pending applications across one's offers.
async fn pending_applications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state
        .application_service
        .get_pending_for_owner(&user.id)
        .await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

/// List applications for one of one's offers.
async fn offer_applications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(offer_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state
        .application_service
        .get_for_offer(&offer_id, &user.id, None)
        .await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(Into::into).collect(),
    ))
}

/// Accept a pending application.
async fn accept_application(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state.application_service.accept(&id, &user.id).await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Reject a pending application.
async fn reject_application(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state.application_service.reject(&id, &user.id).await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Withdraw one's own pending application.
async fn withdraw_application(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.application_service.withdraw(&id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(apply))
        .route("/mine", get(my_applications))
        .route("/pending", get(pending_applications))
        .route("/offer/{offer_id}", get(offer_applications))
        .route("/{id}/accept", post(accept_application))
        .route("/{id}/reject", post(reject_application))
        .route("/{id}", delete(withdraw_application))
}
