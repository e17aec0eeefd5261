//! API endpoints.

mod admin;
mod applications;
mod auth;
mod offers;
mod reviews;
mod sejours;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/offers", offers::router())
        .nest("/applications", applications::router())
        .nest("/sejours", sejours::router())
        .nest("/reviews", reviews::router())
        .nest("/admin", admin::router())
}
