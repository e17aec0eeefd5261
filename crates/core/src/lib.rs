//! Core business logic for findcoloc.
//!
//! Services own the domain rules; persistence stays behind the
//! `findcoloc-db` repositories and notifications behind [`EmailService`].
//! The stay lifecycle lives in [`SejourService`].

pub mod services;

pub use services::*;
