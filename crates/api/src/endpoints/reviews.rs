//! Review (post-stay feedback) endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use findcoloc_common::AppResult;
use findcoloc_db::entities::review::{Model as ReviewModel, ReviewKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Review response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub author_id: String,
    pub sejour_id: String,
    pub kind: ReviewKind,
    pub target_id: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<ReviewModel> for ReviewResponse {
    fn from(r: ReviewModel) -> Self {
        Self {
            id: r.id,
            author_id: r.author_id,
            sejour_id: r.sejour_id,
            kind: r.kind,
            target_id: r.target_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Create feedback request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub sejour_id: String,
    #[serde(rename = "type")]
    pub kind: ReviewKind,
    pub target_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2048))]
    pub comment: Option<String>,
}

/// Submit feedback for a stay.
async fn create_feedback(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateFeedbackRequest>,
) -> AppResult<ApiResponse<ReviewResponse>> {
    req.validate()?;

    let input = findcoloc_core::review::CreateFeedbackInput {
        sejour_id: req.sejour_id,
        kind: req.kind,
        target_id: req.target_id,
        rating: req.rating,
        comment: req.comment,
    };

    let review = state.review_service.create_feedback(&user.id, input).await?;
    Ok(ApiResponse::ok(review.into()))
}

/// Reviews for a stay (participants only).
async fn sejour_reviews(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(sejour_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ReviewResponse>>> {
    let reviews = state
        .review_service
        .get_reviews_for_sejour(&sejour_id, &user.id)
        .await?;
    Ok(ApiResponse::ok(reviews.into_iter().map(Into::into).collect()))
}

/// Rating summary for a user or an offer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReviewsResponse {
    pub reviews: Vec<ReviewResponse>,
    pub average_rating: Option<f64>,
}

/// Public reviews targeting a user or an offer.
async fn target_reviews(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
) -> AppResult<ApiResponse<TargetReviewsResponse>> {
    let reviews = state.review_service.get_reviews_for_target(&target_id).await?;
    let average_rating = state.review_service.average_rating(&target_id).await?;
    Ok(ApiResponse::ok(TargetReviewsResponse {
        reviews: reviews.into_iter().map(Into::into).collect(),
        average_rating,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_feedback))
        .route("/sejour/{sejour_id}", get(sejour_reviews))
        .route("/target/{target_id}", get(target_reviews))
}
