//! Email notification service.
//!
//! Notifications are fire-and-forget: `send` returns an
//! [`EmailDeliveryResult`] instead of raising, and callers only ever log
//! failures. Delivery must never participate in a lifecycle transaction.

use serde::{Deserialize, Serialize};

use findcoloc_common::{AppError, AppResult};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Email provider configuration.
#[derive(Debug, Clone)]
pub enum EmailProvider {
    /// SMTP via lettre
    Smtp(SmtpConfig),
    /// SendGrid HTTP API
    SendGrid(SendGridConfig),
    /// Mailgun HTTP API
    Mailgun(MailgunConfig),
}

/// SMTP configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// SendGrid configuration.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// SendGrid API key
    pub api_key: String,
}

/// Mailgun configuration.
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// Mailgun API key
    pub api_key: String,
    /// Mailgun domain
    pub domain: String,
}

/// Email configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider
    pub provider: EmailProvider,
    /// From address
    pub from_address: String,
    /// From name
    pub from_name: String,
    /// Site name (for templates)
    pub site_name: String,
    /// Site URL (for templates)
    pub site_url: String,
}

/// Email notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailNotificationType {
    /// Welcome email after signup
    Welcome,
    /// An offer received a new application (to the owner)
    ApplicationReceived,
    /// An application was accepted (to the applicant)
    ApplicationAccepted,
    /// A stay started (to both parties)
    StayStarted,
    /// A stay ended; ask for feedback (to both parties)
    StayEnded,
}

impl std::fmt::Display for EmailNotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::ApplicationReceived => "application_received",
            Self::ApplicationAccepted => "application_accepted",
            Self::StayStarted => "stay_started",
            Self::StayEnded => "stay_ended",
        };
        write!(f, "{s}")
    }
}

/// Email message to be sent.
#[derive(Debug)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: String,
    /// HTML body (optional)
    pub html_body: Option<String>,
}

/// Template variables for emails.
#[derive(Debug, Default)]
pub struct EmailTemplateVars {
    /// Recipient's display name
    pub recipient_name: Option<String>,
    /// Counterparty's display name (owner or tenant)
    pub counterpart_name: Option<String>,
    /// Offer title
    pub offer_title: Option<String>,
    /// Sejour id (for feedback links)
    pub sejour_id: Option<String>,
}

/// Email delivery result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDeliveryResult {
    /// Whether the email was sent successfully
    pub success: bool,
    /// Message ID from provider (if available)
    pub message_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
    http_client: reqwest::Client,
}

impl EmailService {
    /// Create a new email service.
    #[must_use]
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Send an email.
    ///
    /// Provider failures are reported in the result, not raised; only a
    /// malformed message yields an `Err`.
    pub async fn send(&self, message: EmailMessage) -> AppResult<EmailDeliveryResult> {
        match &self.config.provider {
            EmailProvider::Smtp(smtp) => self.send_smtp(smtp, message).await,
            EmailProvider::SendGrid(sg) => self.send_sendgrid(sg, message).await,
            EmailProvider::Mailgun(mg) => self.send_mailgun(mg, message).await,
        }
    }

    /// Render and send a notification email.
    pub async fn send_notification(
        &self,
        notification_type: EmailNotificationType,
        to: &str,
        vars: EmailTemplateVars,
    ) -> AppResult<EmailDeliveryResult> {
        let (subject, text_body, html_body) = self.render_template(notification_type, &vars);

        let message = EmailMessage {
            to: to.to_string(),
            subject,
            text_body,
            html_body: Some(html_body),
        };

        self.send(message).await
    }

    /// Render an email template.
    fn render_template(
        &self,
        notification_type: EmailNotificationType,
        vars: &EmailTemplateVars,
    ) -> (String, String, String) {
        let config = &self.config;
        let recipient = vars.recipient_name.as_deref().unwrap_or("there");

        match notification_type {
            EmailNotificationType::Welcome => {
                let subject = format!("Welcome to {}!", config.site_name);
                let text = format!(
                    "Hi {}!\n\nWelcome to {}! Complete your profile to start \
                    browsing colocation offers.\n\nGet started: {}",
                    recipient, config.site_name, config.site_url
                );
                let html = self.wrap_html(&format!(
                    "<p>Hi {}!</p>\
                    <p>Welcome to <strong>{}</strong>! Complete your profile to start browsing colocation offers.</p>\
                    <p><a href=\"{}\">Get started</a></p>",
                    recipient, config.site_name, config.site_url
                ));
                (subject, text, html)
            }

            EmailNotificationType::ApplicationReceived => {
                let applicant = vars.counterpart_name.as_deref().unwrap_or("Someone");
                let offer = vars.offer_title.as_deref().unwrap_or("your offer");
                let subject = format!("New application for {offer}");
                let text = format!(
                    "{} applied to {}.\n\nReview the application: {}/offers",
                    applicant, offer, config.site_url
                );
                let html = self.wrap_html(&format!(
                    "<p><strong>{}</strong> applied to <strong>{}</strong>.</p>\
                    <p><a href=\"{}/offers\">Review the application</a></p>",
                    applicant, offer, config.site_url
                ));
                (subject, text, html)
            }

            EmailNotificationType::ApplicationAccepted => {
                let offer = vars.offer_title.as_deref().unwrap_or("an offer");
                let subject = format!("Your application for {offer} was accepted");
                let text = format!(
                    "Hi {}!\n\nYour application for {} was accepted by the owner.\n\n\
                    Log in to see the next steps: {}",
                    recipient, offer, config.site_url
                );
                let html = self.wrap_html(&format!(
                    "<p>Hi {}!</p>\
                    <p>Your application for <strong>{}</strong> was accepted by the owner.</p>\
                    <p><a href=\"{}\">See the next steps</a></p>",
                    recipient, offer, config.site_url
                ));
                (subject, text, html)
            }

            EmailNotificationType::StayStarted => {
                let offer = vars.offer_title.as_deref().unwrap_or("the property");
                let counterpart = vars.counterpart_name.as_deref().unwrap_or("the other party");
                let subject = format!("Your stay at {offer} has started");
                let text = format!(
                    "Hi {}!\n\nYour stay at {} with {} is now active.\n\n\
                    Manage your stay: {}/sejours",
                    recipient, offer, counterpart, config.site_url
                );
                let html = self.wrap_html(&format!(
                    "<p>Hi {}!</p>\
                    <p>Your stay at <strong>{}</strong> with {} is now active.</p>\
                    <p><a href=\"{}/sejours\">Manage your stay</a></p>",
                    recipient, offer, counterpart, config.site_url
                ));
                (subject, text, html)
            }

            EmailNotificationType::StayEnded => {
                let offer = vars.offer_title.as_deref().unwrap_or("the property");
                let sejour_id = vars.sejour_id.as_deref().unwrap_or("");
                let subject = format!("Your stay at {offer} has ended, share your feedback");
                let text = format!(
                    "Hi {}!\n\nYour stay at {} has ended. Please take a minute to \
                    rate your experience:\n{}/sejours/{}/feedback",
                    recipient, offer, config.site_url, sejour_id
                );
                let html = self.wrap_html(&format!(
                    "<p>Hi {}!</p>\
                    <p>Your stay at <strong>{}</strong> has ended. Please take a minute to rate your experience.</p>\
                    <p><a href=\"{}/sejours/{}/feedback\">Leave feedback</a></p>",
                    recipient, offer, config.site_url, sejour_id
                ));
                (subject, text, html)
            }
        }
    }

    /// Wrap HTML content in a basic email template.
    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #007bff; }}
    </style>
</head>
<body>
    {}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        This email was sent from <a href="{}">{}</a>.
    </p>
</body>
</html>"#,
            content, self.config.site_url, self.config.site_name
        )
    }

    // Provider-specific implementations

    async fn send_smtp(
        &self,
        smtp: &SmtpConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_address)
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid from address: {e}")))?;
        let to = message
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let builder = Message::builder().from(from).to(to).subject(message.subject);

        let email = match message.html_body {
            Some(html) => builder
                .multipart(MultiPart::alternative_plain_html(message.text_body, html))
                .map_err(|e| AppError::BadRequest(format!("Failed to build email: {e}")))?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.text_body)
                .map_err(|e| AppError::BadRequest(format!("Failed to build email: {e}")))?,
        };

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host) {
            Ok(relay) => {
                let mut relay = relay.port(smtp.port);
                if let (Some(user), Some(pass)) = (&smtp.username, &smtp.password) {
                    relay = relay.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                relay.build()
            }
            Err(e) => {
                return Ok(EmailDeliveryResult {
                    success: false,
                    message_id: None,
                    error: Some(format!("SMTP relay setup failed: {e}")),
                });
            }
        };

        match transport.send(email).await {
            Ok(_) => Ok(EmailDeliveryResult {
                success: true,
                message_id: None,
                error: None,
            }),
            Err(e) => Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(e.to_string()),
            }),
        }
    }

    async fn send_sendgrid(
        &self,
        sg: &SendGridConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let body = serde_json::json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {
                "email": self.config.from_address,
                "name": self.config.from_name
            },
            "subject": message.subject,
            "content": [
                {"type": "text/plain", "value": message.text_body},
                {"type": "text/html", "value": message.html_body.unwrap_or_default()}
            ]
        });

        let response = self
            .http_client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header("Authorization", format!("Bearer {}", sg.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SendGrid request failed: {e}")))?;

        if response.status().is_success() {
            let message_id = response
                .headers()
                .get("X-Message-Id")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Ok(EmailDeliveryResult {
                success: true,
                message_id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }

    async fn send_mailgun(
        &self,
        mg: &MailgunConfig,
        message: EmailMessage,
    ) -> AppResult<EmailDeliveryResult> {
        let mut form_params = vec![
            (
                "from",
                format!("{} <{}>", self.config.from_name, self.config.from_address),
            ),
            ("to", message.to),
            ("subject", message.subject),
            ("text", message.text_body),
        ];

        if let Some(html) = message.html_body {
            form_params.push(("html", html));
        }

        let response = self
            .http_client
            .post(format!("https://api.mailgun.net/v3/{}/messages", mg.domain))
            .basic_auth("api", Some(&mg.api_key))
            .form(&form_params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Mailgun request failed: {e}")))?;

        if response.status().is_success() {
            #[derive(Deserialize)]
            struct MailgunResponse {
                id: Option<String>,
            }
            let result: MailgunResponse = response
                .json()
                .await
                .unwrap_or(MailgunResponse { id: None });
            Ok(EmailDeliveryResult {
                success: true,
                message_id: result.id,
                error: None,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Ok(EmailDeliveryResult {
                success: false,
                message_id: None,
                error: Some(error_text),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EmailService {
        EmailService::new(EmailConfig {
            provider: EmailProvider::Smtp(SmtpConfig {
                host: "localhost".to_string(),
                port: 2525,
                username: None,
                password: None,
            }),
            from_address: "noreply@findcoloc.example".to_string(),
            from_name: "FindColoc".to_string(),
            site_name: "FindColoc".to_string(),
            site_url: "https://findcoloc.example".to_string(),
        })
    }

    #[test]
    fn test_stay_ended_template_includes_sejour_id() {
        let service = test_service();
        let vars = EmailTemplateVars {
            recipient_name: Some("Alice".to_string()),
            offer_title: Some("Room in Lyon".to_string()),
            sejour_id: Some("sejour123".to_string()),
            ..Default::default()
        };
        let (subject, text, html) =
            service.render_template(EmailNotificationType::StayEnded, &vars);

        assert!(subject.contains("Room in Lyon"));
        assert!(text.contains("/sejours/sejour123/feedback"));
        assert!(html.contains("/sejours/sejour123/feedback"));
    }

    #[test]
    fn test_welcome_template_uses_recipient_name() {
        let service = test_service();
        let vars = EmailTemplateVars {
            recipient_name: Some("Bob".to_string()),
            ..Default::default()
        };
        let (subject, text, _) = service.render_template(EmailNotificationType::Welcome, &vars);

        assert!(subject.contains("FindColoc"));
        assert!(text.contains("Hi Bob!"));
    }
}
