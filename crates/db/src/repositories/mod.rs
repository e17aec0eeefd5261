//! Database repositories.

#![allow(missing_docs)]

pub mod application;
pub mod id_document;
pub mod offer;
pub mod offer_image;
pub mod review;
pub mod sejour;
pub mod user;

pub use application::ApplicationRepository;
pub use id_document::IdDocumentRepository;
pub use offer::{OfferRepository, OfferSearchFilter, OfferSort};
pub use offer_image::OfferImageRepository;
pub use review::ReviewRepository;
pub use sejour::SejourRepository;
pub use user::UserRepository;
