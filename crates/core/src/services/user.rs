//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use findcoloc_common::{AppError, AppResult, IdGenerator};
use sea_orm::Set;
use validator::Validate;

use crate::services::email::{EmailNotificationType, EmailService, EmailTemplateVars};
use findcoloc_db::{
    entities::{id_document, id_document::DocumentKind, user, user::Gender},
    repositories::{IdDocumentRepository, UserRepository},
};

/// Input for creating a new user.
#[derive(Debug, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 256))]
    pub display_name: Option<String>,
}

/// Input for updating a profile. Absent fields are left untouched.
#[derive(Debug, Default, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 256))]
    pub display_name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    pub avatar_url: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Input for the onboarding wizard (preference fields, set in one call).
#[derive(Debug, Validate)]
pub struct OnboardingInput {
    pub budget_min: Option<i32>,
    pub budget_max: Option<i32>,
    pub smoker: bool,
    pub has_pets: bool,
    pub accepts_visitors: bool,
    pub party_friendly: bool,
    pub gender: Option<Gender>,
    pub preferred_gender: Option<Gender>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    document_repo: IdDocumentRepository,
    mailer: Option<EmailService>,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, document_repo: IdDocumentRepository) -> Self {
        Self {
            user_repo,
            document_repo,
            mailer: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new user service with email notifications.
    #[must_use]
    pub const fn with_mailer(
        user_repo: UserRepository,
        document_repo: IdDocumentRepository,
        mailer: EmailService,
    ) -> Self {
        Self {
            user_repo,
            document_repo,
            mailer: Some(mailer),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest(
                "Email address already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.clone()),
            password_hash: Set(password_hash),
            token: Set(Some(token)),
            display_name: Set(input.display_name),
            bio: Set(None),
            avatar_url: Set(None),
            phone: Set(None),
            is_admin: Set(false),
            is_suspended: Set(false),
            onboarding_completed: Set(false),
            budget_min: Set(None),
            budget_max: Set(None),
            smoker: Set(false),
            has_pets: Set(false),
            accepts_visitors: Set(true),
            party_friendly: Set(false),
            gender: Set(None),
            preferred_gender: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.user_repo.create(model).await?;

        if let Some(ref mailer) = self.mailer {
            let vars = EmailTemplateVars {
                recipient_name: created
                    .display_name
                    .clone()
                    .or(Some(created.username.clone())),
                ..Default::default()
            };
            if let Err(e) = mailer
                .send_notification(EmailNotificationType::Welcome, &created.email, vars)
                .await
            {
                tracing::warn!(error = %e, "Failed to send welcome email");
            }
        }

        Ok(created)
    }

    /// Authenticate with username or email address, plus password.
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<user::Model> {
        let user = match self.user_repo.find_by_username(login).await? {
            Some(user) => Some(user),
            None if login.contains('@') => self.user_repo.find_by_email(login).await?,
            None => None,
        };
        let user = user.ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized);
        }

        if user.is_suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        Ok(user)
    }

    /// Authenticate by bearer token (middleware path).
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        Ok(user)
    }

    /// Regenerate the bearer token, invalidating the current one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let token = self.id_gen.generate_token();

        let mut model: user::ActiveModel = user.into();
        model.token = Set(Some(token.clone()));
        model.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(model).await?;

        Ok(token)
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(user_id).await
    }

    /// Update one's profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = user.into();

        if let Some(display_name) = input.display_name {
            model.display_name = Set(Some(display_name));
        }
        if let Some(bio) = input.bio {
            model.bio = Set(Some(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        if let Some(phone) = input.phone {
            model.phone = Set(Some(phone));
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(model).await
    }

    /// Complete the onboarding wizard: set every preference field and mark
    /// onboarding done.
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        input: OnboardingInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if let (Some(min), Some(max)) = (input.budget_min, input.budget_max)
            && min > max
        {
            return Err(AppError::BadRequest(
                "Budget minimum exceeds maximum".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = user.into();

        model.budget_min = Set(input.budget_min);
        model.budget_max = Set(input.budget_max);
        model.smoker = Set(input.smoker);
        model.has_pets = Set(input.has_pets);
        model.accepts_visitors = Set(input.accepts_visitors);
        model.party_friendly = Set(input.party_friendly);
        model.gender = Set(input.gender);
        model.preferred_gender = Set(input.preferred_gender);
        model.onboarding_completed = Set(true);
        model.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(model).await
    }

    /// Record an identity document upload.
    pub async fn add_document(
        &self,
        user_id: &str,
        kind: DocumentKind,
        file_url: String,
    ) -> AppResult<id_document::Model> {
        if file_url.trim().is_empty() {
            return Err(AppError::BadRequest("Document URL is required".to_string()));
        }

        let model = id_document::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            kind: Set(kind),
            file_url: Set(file_url),
            verified: Set(false),
            created_at: Set(Utc::now().into()),
        };
        self.document_repo.create(model).await
    }

    /// Get one's identity documents.
    pub async fn get_documents(&self, user_id: &str) -> AppResult<Vec<id_document::Model>> {
        self.document_repo.find_by_user(user_id).await
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against its Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
