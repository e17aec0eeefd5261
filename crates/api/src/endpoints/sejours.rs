//! Sejour (stay) lifecycle endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use findcoloc_common::AppResult;
use findcoloc_core::sejour::StayEligibility;
use findcoloc_db::entities::sejour::{Model as SejourModel, SejourStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Sejour response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SejourResponse {
    pub id: String,
    pub owner_id: String,
    pub tenant_id: String,
    pub offer_id: String,
    pub application_id: String,
    pub status: SejourStatus,
    pub start_date: String,
    pub end_date: Option<String>,
    pub owner_feedback_given: bool,
    pub tenant_feedback_given: bool,
}

impl From<SejourModel> for SejourResponse {
    fn from(s: SejourModel) -> Self {
        Self {
            id: s.id,
            owner_id: s.owner_id,
            tenant_id: s.tenant_id,
            offer_id: s.offer_id,
            application_id: s.application_id,
            status: s.status,
            start_date: s.start_date.to_rfc3339(),
            end_date: s.end_date.map(|d| d.to_rfc3339()),
            owner_feedback_given: s.owner_feedback_given,
            tenant_feedback_given: s.tenant_feedback_given,
        }
    }
}

/// Check whether the caller may start a new stay as tenant.
async fn eligibility(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<StayEligibility>> {
    let eligibility = state.sejour_service.can_start_stay(&user.id).await?;
    Ok(ApiResponse::ok(eligibility))
}

/// Start stay request.
///
/// The caller is the offer's owner accepting an application into a stay;
/// the tenant and offer ids are cross-checked against the application by
/// the lifecycle preconditions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStayRequest {
    pub application_id: String,
    pub tenant_id: String,
    pub offer_id: String,
}

/// Transition an accepted application into an active stay.
async fn start_stay(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StartStayRequest>,
) -> AppResult<ApiResponse<SejourResponse>> {
    let sejour = state
        .sejour_service
        .start_stay(&req.application_id, &user.id, &req.tenant_id, &req.offer_id)
        .await?;
    Ok(ApiResponse::ok(sejour.into()))
}

/// End an active stay (owner or tenant).
async fn end_stay(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SejourResponse>> {
    let sejour = state.sejour_service.end_stay(&id, &user.id).await?;
    Ok(ApiResponse::ok(sejour.into()))
}

/// List the caller's stays, as owner or tenant.
async fn my_sejours(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SejourResponse>>> {
    let sejours = state.sejour_service.get_sejours_for_user(&user.id).await?;
    Ok(ApiResponse::ok(sejours.into_iter().map(Into::into).collect()))
}

/// Get one stay (participants only).
async fn get_sejour(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SejourResponse>> {
    let sejour = state.sejour_service.get_sejour(&id, &user.id).await?;
    Ok(ApiResponse::ok(sejour.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/eligibility", get(eligibility))
        .route("/start", post(start_stay))
        .route("/mine", get(my_sejours))
        .route("/{id}", get(get_sejour))
        .route("/{id}/end", post(end_stay))
}
