//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use findcoloc_core::{
    ApplicationService, ModerationService, OfferService, ReviewService, SejourService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub offer_service: OfferService,
    pub application_service: ApplicationService,
    pub sejour_service: SejourService,
    pub review_service: ReviewService,
    pub moderation_service: ModerationService,
}

/// Authentication middleware.
///
/// Resolves a bearer token into a user model stored in request extensions;
/// handlers pick it up through the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
