use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::modules::mail::{MailError, MailMessage, MailTemplate, MailTemplates, Mailer};

#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    /// `None` when the account has no email address
    pub fn new(email: Option<&str>, name: Option<&str>) -> Option<Self> {
        let email = email.map(str::trim).filter(|e| !e.is_empty())?;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email));

        Some(Self {
            email: email.to_string(),
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Approved,
    Rejected,
    Published,
}

/// Sends notification emails. Delivery failures are logged, never returned:
/// a failed mail must not fail the request that triggered it.
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    templates: MailTemplates,
    admin_address: Option<String>,
    site_url: String,
}

impl NotificationService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        templates: MailTemplates,
        admin_address: Option<String>,
        site_url: String,
    ) -> Self {
        Self {
            mailer,
            templates,
            admin_address,
            site_url,
        }
    }

    async fn deliver(
        &self,
        to: &str,
        template: MailTemplate,
        ctx: serde_json::Value,
    ) -> Result<(), MailError> {
        let (subject, html) = self.templates.render(template, ctx)?;
        self.mailer
            .send(MailMessage {
                to: vec![to.to_string()],
                subject,
                html,
            })
            .await
    }

    async fn deliver_logged(&self, to: &str, template: MailTemplate, ctx: serde_json::Value) {
        if let Err(e) = self.deliver(to, template, ctx).await {
            tracing::warn!("Failed to send {:?} notification: {}", template, e);
        }
    }

    /// Welcome mail to the new member plus an alert to the site admins
    pub async fn send_signup(&self, recipient: &Recipient) {
        let ctx = json!({
            "name": recipient.name,
            "email": recipient.email,
            "site_url": self.site_url,
        });

        self.deliver_logged(&recipient.email, MailTemplate::Welcome, ctx.clone())
            .await;

        match &self.admin_address {
            Some(admin) => {
                self.deliver_logged(admin, MailTemplate::SignupAlert, ctx)
                    .await
            }
            None => tracing::debug!("No admin address configured, skipping signup alert"),
        }
    }

    pub async fn send_password_changed(&self, recipient: &Recipient) {
        let ctx = json!({
            "name": recipient.name,
            "site_url": self.site_url,
        });
        self.deliver_logged(&recipient.email, MailTemplate::PasswordChanged, ctx)
            .await;
    }

    pub async fn send_review_outcome(
        &self,
        recipient: &Recipient,
        outcome: ReviewOutcome,
        blog_id: Uuid,
        title: &str,
        reason: Option<&str>,
    ) {
        let template = match outcome {
            ReviewOutcome::Approved => MailTemplate::BlogApproved,
            ReviewOutcome::Rejected => MailTemplate::BlogRejected,
            ReviewOutcome::Published => MailTemplate::BlogPublished,
        };
        let ctx = json!({
            "name": recipient.name,
            "title": title,
            "reason": reason,
            "blog_id": blog_id,
            "site_url": self.site_url,
        });
        self.deliver_logged(&recipient.email, template, ctx).await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records sent messages; fails every send when `fail` is set
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<MailMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: MailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Send("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    pub(crate) fn service_with(
        mailer: Arc<RecordingMailer>,
        admin: Option<&str>,
    ) -> NotificationService {
        NotificationService::new(
            mailer,
            MailTemplates::new().unwrap(),
            admin.map(str::to_string),
            "https://natawo.org".to_string(),
        )
    }

    #[tokio::test]
    async fn test_signup_sends_welcome_and_admin_alert() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_with(mailer.clone(), Some("admin@natawo.org"));
        let recipient = Recipient::new(Some("kavya@example.org"), Some("Kavya")).unwrap();

        service.send_signup(&recipient).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["kavya@example.org".to_string()]);
        assert_eq!(sent[1].to, vec!["admin@natawo.org".to_string()]);
        assert!(sent[1].html.contains("kavya@example.org"));
    }

    #[tokio::test]
    async fn test_signup_without_admin_address_only_welcomes() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_with(mailer.clone(), None);
        let recipient = Recipient::new(Some("kavya@example.org"), None).unwrap();

        service.send_signup(&recipient).await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Welcome to NATAWO, kavya");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let service = service_with(mailer.clone(), None);
        let recipient = Recipient::new(Some("a@example.org"), Some("A")).unwrap();

        service.send_password_changed(&recipient).await;
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_review_outcome_picks_template() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service_with(mailer.clone(), None);
        let recipient = Recipient::new(Some("a@example.org"), Some("A")).unwrap();

        service
            .send_review_outcome(
                &recipient,
                ReviewOutcome::Published,
                Uuid::nil(),
                "Monsoon",
                None,
            )
            .await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Your blog \"Monsoon\" is live");
    }

    #[test]
    fn test_recipient_requires_email() {
        assert!(Recipient::new(None, Some("A")).is_none());
        assert!(Recipient::new(Some("  "), Some("A")).is_none());
    }
}
