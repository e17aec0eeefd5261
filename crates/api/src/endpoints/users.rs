//! User profile and onboarding endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use findcoloc_common::AppResult;
use findcoloc_db::entities::{
    id_document::{DocumentKind, Model as IdDocumentModel},
    user::{Gender, Model as UserModel},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Public user profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Own profile response, including preference fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub onboarding_completed: bool,
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub smoker: bool,
    pub has_pets: bool,
    pub accepts_visitors: bool,
    pub party_friendly: bool,
    pub gender: Option<Gender>,
    pub preferred_gender: Option<Gender>,
}

impl From<UserModel> for MeResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            phone: u.phone,
            is_admin: u.is_admin,
            onboarding_completed: u.onboarding_completed,
            budget_min: u.budget_min,
            budget_max: u.budget_max,
            smoker: u.smoker,
            has_pets: u.has_pets,
            accepts_visitors: u.accepts_visitors,
            party_friendly: u.party_friendly,
            gender: u.gender,
            preferred_gender: u.preferred_gender,
        }
    }
}

/// Get one's own profile.
async fn get_me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Update profile request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 256))]
    pub display_name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    pub avatar_url: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Update one's own profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<MeResponse>> {
    req.validate()?;

    let input = findcoloc_core::user::UpdateProfileInput {
        display_name: req.display_name,
        bio: req.bio,
        avatar_url: req.avatar_url,
        phone: req.phone,
    };

    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Onboarding request (preference wizard, one call).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub has_pets: bool,
    #[serde(default = "default_true")]
    pub accepts_visitors: bool,
    #[serde(default)]
    pub party_friendly: bool,
    pub gender: Option<Gender>,
    pub preferred_gender: Option<Gender>,
}

const fn default_true() -> bool {
    true
}

/// Complete the onboarding wizard.
async fn complete_onboarding(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> AppResult<ApiResponse<MeResponse>> {
    let input = findcoloc_core::user::OnboardingInput {
        budget_min: req.budget_min,
        budget_max: req.budget_max,
        smoker: req.smoker,
        has_pets: req.has_pets,
        accepts_visitors: req.accepts_visitors,
        party_friendly: req.party_friendly,
        gender: req.gender,
        preferred_gender: req.preferred_gender,
    };

    let updated = state
        .user_service
        .complete_onboarding(&user.id, input)
        .await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Document upload request (the file itself goes to external storage).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentRequest {
    pub kind: DocumentKind,
    pub file_url: String,
}

/// Document response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub kind: DocumentKind,
    pub file_url: String,
    pub verified: bool,
    pub created_at: String,
}

impl From<IdDocumentModel> for DocumentResponse {
    fn from(d: IdDocumentModel) -> Self {
        Self {
            id: d.id,
            kind: d.kind,
            file_url: d.file_url,
            verified: d.verified,
            created_at: d.created_at.to_rfc3339(),
        }
    }
}

/// Record an identity document upload.
async fn add_document(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddDocumentRequest>,
) -> AppResult<ApiResponse<DocumentResponse>> {
    let document = state
        .user_service
        .add_document(&user.id, req.kind, req.file_url)
        .await?;
    Ok(ApiResponse::ok(document.into()))
}

/// List one's identity documents.
async fn list_documents(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<DocumentResponse>>> {
    let documents = state.user_service.get_documents(&user.id).await?;
    Ok(ApiResponse::ok(
        documents.into_iter().map(Into::into).collect(),
    ))
}

/// Get a public user profile.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get_by_id(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/onboarding", post(complete_onboarding))
        .route("/me/documents", get(list_documents).post(add_document))
        .route("/{id}", get(get_user))
}
