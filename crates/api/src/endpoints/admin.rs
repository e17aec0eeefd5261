//! Admin moderation endpoints.
//!
//! Role checks live in the moderation service, not here; the handlers
//! just thread the caller's id through.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use findcoloc_common::AppResult;
use serde::Deserialize;

use crate::{
    endpoints::offers::OfferResponse,
    endpoints::users::{DocumentResponse, UserResponse},
    extractors::AuthUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Pagination for moderation listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationPageRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    30
}

/// List offers awaiting moderation.
async fn pending_offers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(req): Query<ModerationPageRequest>,
) -> AppResult<ApiResponse<Vec<OfferResponse>>> {
    let limit = req.limit.min(100);
    let offers = state
        .moderation_service
        .get_pending_offers(&user.id, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(offers.into_iter().map(Into::into).collect()))
}

/// Approve a pending offer.
async fn approve_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OfferResponse>> {
    let offer = state.moderation_service.approve_offer(&user.id, &id).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// Reject a pending offer.
async fn reject_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OfferResponse>> {
    let offer = state.moderation_service.reject_offer(&user.id, &id).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// Close an offer.
async fn close_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OfferResponse>> {
    let offer = state.moderation_service.close_offer(&user.id, &id).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// List users for the backoffice.
async fn list_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(req): Query<ModerationPageRequest>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let limit = req.limit.min(100);
    let users = state
        .moderation_service
        .list_users(&user.id, limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Suspend a user.
async fn suspend_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let suspended = state.moderation_service.suspend_user(&user.id, &id).await?;
    Ok(ApiResponse::ok(suspended.into()))
}

/// Lift a user suspension.
async fn unsuspend_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let unsuspended = state
        .moderation_service
        .unsuspend_user(&user.id, &id)
        .await?;
    Ok(ApiResponse::ok(unsuspended.into()))
}

/// Mark an identity document as verified.
async fn verify_document(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DocumentResponse>> {
    let document = state
        .moderation_service
        .verify_document(&user.id, &id)
        .await?;
    Ok(ApiResponse::ok(document.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/offers/pending", get(pending_offers))
        .route("/offers/{id}/approve", post(approve_offer))
        .route("/offers/{id}/reject", post(reject_offer))
        .route("/offers/{id}/close", post(close_offer))
        .route("/users", get(list_users))
        .route("/users/{id}/suspend", post(suspend_user))
        .route("/users/{id}/unsuspend", post(unsuspend_user))
        .route("/documents/{id}/verify", post(verify_document))
}
