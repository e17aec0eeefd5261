//! Findcoloc server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use findcoloc_api::{middleware::AppState, router as api_router};
use findcoloc_common::Config;
use findcoloc_core::{
    ApplicationService, EmailConfig, EmailProvider, EmailService, MailgunConfig, ModerationService,
    OfferService, ReviewService, SejourService, SendGridConfig, SmtpConfig, UserService,
};
use findcoloc_db::repositories::{
    ApplicationRepository, IdDocumentRepository, OfferImageRepository, OfferRepository,
    ReviewRepository, SejourRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Build the email service from configuration, if delivery is configured.
fn build_mailer(config: &Config) -> Option<EmailService> {
    let email = config.email.as_ref()?;

    let provider = match email.provider.as_str() {
        "smtp" => EmailProvider::Smtp(SmtpConfig {
            host: email.smtp_host.clone()?,
            port: email.smtp_port.unwrap_or(587),
            username: email.smtp_username.clone(),
            password: email.smtp_password.clone(),
        }),
        "sendgrid" => EmailProvider::SendGrid(SendGridConfig {
            api_key: email.api_key.clone()?,
        }),
        "mailgun" => EmailProvider::Mailgun(MailgunConfig {
            api_key: email.api_key.clone()?,
            domain: email.domain.clone()?,
        }),
        other => {
            tracing::warn!(provider = %other, "Unknown email provider, notifications disabled");
            return None;
        }
    };

    Some(EmailService::new(EmailConfig {
        provider,
        from_address: email.from_address.clone(),
        from_name: email.from_name.clone(),
        site_name: config.server.site_name.clone(),
        site_url: config.server.url.clone(),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "findcoloc=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting findcoloc server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = findcoloc_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    findcoloc_db::migrate(&db).await?;
    info!("Migrations completed");

    // The notification sender is constructed once here and injected into
    // the services that use it; tests substitute a None mailer instead.
    let mailer = build_mailer(&config);
    if mailer.is_some() {
        info!("Email notifications enabled");
    } else {
        info!("Email notifications disabled");
    }

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let offer_repo = OfferRepository::new(Arc::clone(&db));
    let offer_image_repo = OfferImageRepository::new(Arc::clone(&db));
    let application_repo = ApplicationRepository::new(Arc::clone(&db));
    let sejour_repo = SejourRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let id_document_repo = IdDocumentRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = mailer.clone().map_or_else(
        || UserService::new(user_repo.clone(), id_document_repo.clone()),
        |mailer| UserService::with_mailer(user_repo.clone(), id_document_repo.clone(), mailer),
    );

    let offer_service = OfferService::new(offer_repo.clone(), offer_image_repo);

    let application_service = mailer.clone().map_or_else(
        || {
            ApplicationService::new(
                application_repo.clone(),
                offer_repo.clone(),
                user_repo.clone(),
            )
        },
        |mailer| {
            ApplicationService::with_mailer(
                application_repo.clone(),
                offer_repo.clone(),
                user_repo.clone(),
                mailer,
            )
        },
    );

    let sejour_service = mailer.clone().map_or_else(
        || {
            SejourService::new(
                sejour_repo.clone(),
                offer_repo.clone(),
                application_repo.clone(),
                user_repo.clone(),
                Arc::clone(&db),
            )
        },
        |mailer| {
            SejourService::with_mailer(
                sejour_repo.clone(),
                offer_repo.clone(),
                application_repo.clone(),
                user_repo.clone(),
                Arc::clone(&db),
                mailer,
            )
        },
    );

    // Feedback requires an ended stay in production wiring.
    let review_service = ReviewService::new(review_repo, sejour_repo, true);

    let moderation_service =
        ModerationService::new(offer_repo, user_repo, id_document_repo);

    // Create app state
    let state = AppState {
        user_service,
        offer_service,
        application_service,
        sejour_service,
        review_service,
        moderation_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            findcoloc_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
