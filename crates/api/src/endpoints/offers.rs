//! Offer endpoints: CRUD, search, gallery and compatibility.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use findcoloc_common::AppResult;
use findcoloc_core::compatibility::{CompatibilityScore, compatibility_score};
use findcoloc_db::{
    entities::{
        offer::{Model as OfferModel, OfferStatus},
        offer_image::Model as OfferImageModel,
    },
    repositories::{OfferSearchFilter, OfferSort},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Offer response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub surface_m2: Option<i32>,
    pub rooms: Option<i32>,
    pub furnished: bool,
    pub wifi: bool,
    pub washing_machine: bool,
    pub parking: bool,
    pub smoking_allowed: bool,
    pub pets_allowed: bool,
    pub visitors_allowed: bool,
    pub party_allowed: bool,
    pub status: OfferStatus,
    pub created_at: String,
}

impl From<OfferModel> for OfferResponse {
    fn from(o: OfferModel) -> Self {
        Self {
            id: o.id,
            owner_id: o.owner_id,
            title: o.title,
            description: o.description,
            price: o.price,
            city: o.city,
            address: o.address,
            postal_code: o.postal_code,
            surface_m2: o.surface_m2,
            rooms: o.rooms,
            furnished: o.furnished,
            wifi: o.wifi,
            washing_machine: o.washing_machine,
            parking: o.parking,
            smoking_allowed: o.smoking_allowed,
            pets_allowed: o.pets_allowed,
            visitors_allowed: o.visitors_allowed,
            party_allowed: o.party_allowed,
            status: o.status,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

/// Offer image response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferImageResponse {
    pub id: String,
    pub url: String,
    pub position: i32,
}

impl From<OfferImageModel> for OfferImageResponse {
    fn from(i: OfferImageModel) -> Self {
        Self {
            id: i.id,
            url: i.url,
            position: i.position,
        }
    }
}

/// Offer with gallery.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetailResponse {
    #[serde(flatten)]
    pub offer: OfferResponse,
    pub images: Vec<OfferImageResponse>,
    /// Present when the viewer is signed in and has completed onboarding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityScore>,
}

/// Create offer request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    pub price: i32,
    #[validate(length(min = 1, max = 128))]
    pub city: String,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: String,
    pub surface_m2: Option<i32>,
    pub rooms: Option<i32>,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub washing_machine: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default)]
    pub pets_allowed: bool,
    #[serde(default = "default_true")]
    pub visitors_allowed: bool,
    #[serde(default)]
    pub party_allowed: bool,
    /// False saves a draft instead of submitting for moderation.
    #[serde(default = "default_true")]
    pub publish: bool,
}

const fn default_true() -> bool {
    true
}

/// Create an offer.
async fn create_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateOfferRequest>,
) -> AppResult<ApiResponse<OfferResponse>> {
    req.validate()?;

    let input = findcoloc_core::offer::CreateOfferInput {
        title: req.title,
        description: req.description,
        price: req.price,
        city: req.city,
        address: req.address,
        postal_code: req.postal_code,
        surface_m2: req.surface_m2,
        rooms: req.rooms,
        furnished: req.furnished,
        wifi: req.wifi,
        washing_machine: req.washing_machine,
        parking: req.parking,
        smoking_allowed: req.smoking_allowed,
        pets_allowed: req.pets_allowed,
        visitors_allowed: req.visitors_allowed,
        party_allowed: req.party_allowed,
        publish: req.publish,
    };

    let offer = state.offer_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// Search request (query string).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOffersRequest {
    pub city: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub furnished: Option<bool>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    /// One of `newest`, `priceAsc`, `priceDesc`.
    pub sort: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

/// Search published offers.
async fn search_offers(
    State(state): State<AppState>,
    Query(req): Query<SearchOffersRequest>,
) -> AppResult<ApiResponse<Vec<OfferResponse>>> {
    let sort = match req.sort.as_deref() {
        Some("priceAsc") => OfferSort::PriceAsc,
        Some("priceDesc") => OfferSort::PriceDesc,
        _ => OfferSort::Newest,
    };

    let filter = OfferSearchFilter {
        city: req.city,
        min_price: req.min_price,
        max_price: req.max_price,
        furnished: req.furnished,
        wifi: req.wifi,
        parking: req.parking,
        smoking_allowed: req.smoking_allowed,
        pets_allowed: req.pets_allowed,
        sort,
    };

    let limit = req.limit.min(100);
    let offers = state.offer_service.search(&filter, limit, req.offset).await?;
    Ok(ApiResponse::ok(offers.into_iter().map(Into::into).collect()))
}

/// List one's own offers.
async fn my_offers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<OfferResponse>>> {
    let offers = state.offer_service.get_mine(&user.id).await?;
    Ok(ApiResponse::ok(offers.into_iter().map(Into::into).collect()))
}

/// Get an offer with its gallery, personalized for signed-in tenants.
async fn get_offer(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OfferDetailResponse>> {
    let detail = state.offer_service.get_detail(&id).await?;

    let compatibility = viewer
        .filter(|v| v.onboarding_completed && v.id != detail.offer.owner_id)
        .map(|v| compatibility_score(&v, &detail.offer));

    Ok(ApiResponse::ok(OfferDetailResponse {
        offer: detail.offer.into(),
        images: detail.images.into_iter().map(Into::into).collect(),
        compatibility,
    }))
}

/// Update offer request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub description: Option<String>,
    pub price: Option<i32>,
    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 512))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub postal_code: Option<String>,
    pub surface_m2: Option<i32>,
    pub rooms: Option<i32>,
    pub furnished: Option<bool>,
    pub wifi: Option<bool>,
    pub washing_machine: Option<bool>,
    pub parking: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub visitors_allowed: Option<bool>,
    pub party_allowed: Option<bool>,
}

/// Update one's own offer.
async fn update_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOfferRequest>,
) -> AppResult<ApiResponse<OfferResponse>> {
    req.validate()?;

    let input = findcoloc_core::offer::UpdateOfferInput {
        title: req.title,
        description: req.description,
        price: req.price,
        city: req.city,
        address: req.address,
        postal_code: req.postal_code,
        surface_m2: req.surface_m2,
        rooms: req.rooms,
        furnished: req.furnished,
        wifi: req.wifi,
        washing_machine: req.washing_machine,
        parking: req.parking,
        smoking_allowed: req.smoking_allowed,
        pets_allowed: req.pets_allowed,
        visitors_allowed: req.visitors_allowed,
        party_allowed: req.party_allowed,
    };

    let offer = state.offer_service.update(&id, &user.id, input).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// Delete one's own draft.
async fn delete_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.offer_service.delete(&id, &user.id).await?;
    Ok(ApiResponse::ok(()))
}

/// Submit a draft for moderation.
async fn submit_offer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OfferResponse>> {
    let offer = state.offer_service.submit(&id, &user.id).await?;
    Ok(ApiResponse::ok(offer.into()))
}

/// Add image request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImageRequest {
    pub url: String,
}

/// Attach an image URL record.
async fn add_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddImageRequest>,
) -> AppResult<ApiResponse<OfferImageResponse>> {
    let image = state.offer_service.add_image(&id, &user.id, req.url).await?;
    Ok(ApiResponse::ok(image.into()))
}

/// Reorder images request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderImagesRequest {
    pub image_ids: Vec<String>,
}

/// Rewrite the gallery order.
async fn reorder_images(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReorderImagesRequest>,
) -> AppResult<ApiResponse<Vec<OfferImageResponse>>> {
    let images = state
        .offer_service
        .reorder_images(&id, &user.id, &req.image_ids)
        .await?;
    Ok(ApiResponse::ok(images.into_iter().map(Into::into).collect()))
}

/// Remove an image record.
async fn remove_image(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .offer_service
        .remove_image(&id, &user.id, &image_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Descriptive compatibility between the caller and an offer.
async fn offer_compatibility(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CompatibilityScore>> {
    let detail = state.offer_service.get_detail(&id).await?;
    Ok(ApiResponse::ok(compatibility_score(&user, &detail.offer)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_offer))
        .route("/search", get(search_offers))
        .route("/mine", get(my_offers))
        .route(
            "/{id}",
            get(get_offer).patch(update_offer).delete(delete_offer),
        )
        .route("/{id}/submit", post(submit_offer))
        .route("/{id}/images", post(add_image).patch(reorder_images))
        .route("/{id}/images/{image_id}", delete(remove_image))
        .route("/{id}/compatibility", get(offer_compatibility))
}
