//! HTTP API layer for findcoloc.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: offers, applications, sejours, reviews, users, admin
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: auth resolution into request extensions
//!
//! Built on Axum with a Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
