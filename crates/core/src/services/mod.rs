//! Business logic services.

#![allow(missing_docs)]

pub mod application;
pub mod compatibility;
pub mod email;
pub mod moderation;
pub mod offer;
pub mod review;
pub mod sejour;
pub mod user;

pub use application::{ApplicationService, CreateApplicationInput};
pub use compatibility::{CompatibilityCriterion, CompatibilityScore, compatibility_score};
pub use email::{
    EmailConfig, EmailDeliveryResult, EmailMessage, EmailNotificationType, EmailProvider,
    EmailService, EmailTemplateVars, MailgunConfig, SendGridConfig, SmtpConfig,
};
pub use moderation::ModerationService;
pub use offer::{CreateOfferInput, OfferDetail, OfferService, UpdateOfferInput};
pub use review::{CreateFeedbackInput, ReviewService};
pub use sejour::{SejourService, StayEligibility};
pub use user::{
    CreateUserInput, OnboardingInput, UpdateProfileInput, UserService,
};
