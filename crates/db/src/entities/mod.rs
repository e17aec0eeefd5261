//! Database entities.

#![allow(missing_docs)]

pub mod application;
pub mod id_document;
pub mod offer;
pub mod offer_image;
pub mod review;
pub mod sejour;
pub mod user;

pub use application::Entity as Application;
pub use id_document::Entity as IdDocument;
pub use offer::Entity as Offer;
pub use offer_image::Entity as OfferImage;
pub use review::Entity as Review;
pub use sejour::Entity as Sejour;
pub use user::Entity as User;
