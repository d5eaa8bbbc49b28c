//! Lead notification
//!
//! Each captured lead is mailed to an operator through an authenticated
//! SMTP relay. Delivery is best effort: the HTTP handler only enqueues
//! the lead on a `NotificationDispatcher`, and a background worker sends
//! it. Failures are logged and counted, never retried.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use realty_agent_config::MailConfig;
use realty_agent_core::Lead;

use crate::NotifyError;

/// Lead notifier trait
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &Lead) -> Result<(), NotifyError>;
}

/// Notifier used when mail is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLeadNotifier;

#[async_trait]
impl LeadNotifier for NoopLeadNotifier {
    async fn notify(&self, lead: &Lead) -> Result<(), NotifyError> {
        tracing::debug!(lead_id = lead.id, "Mail disabled, skipping lead notification");
        Ok(())
    }
}

/// SMTP notifier (STARTTLS relay with credentials)
pub struct SmtpLeadNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Option<String>,
    to: Option<String>,
    subject: String,
}

impl SmtpLeadNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
        })
    }

    /// Plain-text message for a lead
    pub fn build_message(&self, lead: &Lead) -> Result<Message, NotifyError> {
        let from: Mailbox = self
            .from
            .as_deref()
            .ok_or(NotifyError::MissingConfig("mail.from"))?
            .parse()?;
        let to: Mailbox = self
            .to
            .as_deref()
            .ok_or(NotifyError::MissingConfig("mail.to"))?
            .parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(lead_body(lead))?;
        Ok(message)
    }
}

#[async_trait]
impl LeadNotifier for SmtpLeadNotifier {
    async fn notify(&self, lead: &Lead) -> Result<(), NotifyError> {
        let message = self.build_message(lead)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Mail body listing the three contact fields
pub fn lead_body(lead: &Lead) -> String {
    format!(
        "New lead captured\n\nName: {}\nPhone: {}\nEmail: {}\n",
        Lead::display_field(&lead.name),
        Lead::display_field(&lead.phone),
        Lead::display_field(&lead.email),
    )
}

/// Fire-and-forget notification queue
///
/// Cloning shares the same queue. The worker stops once every clone is
/// dropped and the queue is drained.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<Lead>,
}

impl NotificationDispatcher {
    /// Start the worker task; must be called inside a tokio runtime
    pub fn spawn(notifier: Arc<dyn LeadNotifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<Lead>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(lead) = receiver.recv().await {
                match notifier.notify(&lead).await {
                    Ok(()) => {
                        metrics::counter!("realty_agent_notifications_sent_total").increment(1);
                        tracing::info!(lead_id = lead.id, "Lead notification sent");
                    }
                    Err(e) => {
                        metrics::counter!("realty_agent_notifications_failed_total").increment(1);
                        tracing::warn!(lead_id = lead.id, error = %e, "Lead notification failed");
                    }
                }
            }
            tracing::debug!("Notification worker stopped");
        });

        (Self { sender }, worker)
    }

    /// Queue a lead; returns false if it was dropped
    pub fn dispatch(&self, lead: Lead) -> bool {
        match self.sender.try_send(lead) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(lead)) => {
                metrics::counter!("realty_agent_notifications_failed_total").increment(1);
                tracing::warn!(lead_id = lead.id, "Notification queue full, dropping lead notification");
                false
            }
            Err(mpsc::error::TrySendError::Closed(lead)) => {
                tracing::warn!(lead_id = lead.id, "Notification worker stopped, dropping lead notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use realty_agent_core::NewLead;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl LeadNotifier for RecordingNotifier {
        async fn notify(&self, lead: &Lead) -> Result<(), NotifyError> {
            self.seen.lock().push(lead.id);
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl LeadNotifier for FailingNotifier {
        async fn notify(&self, _lead: &Lead) -> Result<(), NotifyError> {
            Err(NotifyError::MissingConfig("mail.to"))
        }
    }

    fn stored(id: i64) -> Lead {
        Lead::from_new(
            id,
            NewLead::new(Some("Asha"), Some("9876543210"), None::<String>),
            None,
        )
    }

    fn mail_config() -> MailConfig {
        MailConfig {
            enabled: true,
            from: Some("bot@example.com".to_string()),
            to: Some("sales@example.com".to_string()),
            ..MailConfig::default()
        }
    }

    #[test]
    fn test_lead_body_lists_fields() {
        let body = lead_body(&stored(1));
        assert!(body.contains("Name: Asha"));
        assert!(body.contains("Phone: 9876543210"));
        assert!(body.contains("Email: -"));
    }

    #[tokio::test]
    async fn test_build_message_requires_recipient() {
        let mut config = mail_config();
        config.to = None;
        let notifier = SmtpLeadNotifier::new(&config).unwrap();

        let err = notifier.build_message(&stored(1)).unwrap_err();
        assert!(matches!(err, NotifyError::MissingConfig("mail.to")));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_address() {
        let mut config = mail_config();
        config.from = Some("not an address".to_string());
        let notifier = SmtpLeadNotifier::new(&config).unwrap();

        assert!(matches!(
            notifier.build_message(&stored(1)),
            Err(NotifyError::Address(_))
        ));
    }

    #[tokio::test]
    async fn test_build_message_ok() {
        let notifier = SmtpLeadNotifier::new(&mail_config()).unwrap();
        assert!(notifier.build_message(&stored(1)).is_ok());
    }

    #[tokio::test]
    async fn test_dispatcher_delivers_in_order() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (dispatcher, worker) = NotificationDispatcher::spawn(notifier.clone(), 8);

        assert!(dispatcher.dispatch(stored(1)));
        assert!(dispatcher.dispatch(stored(2)));
        drop(dispatcher);
        worker.await.unwrap();

        assert_eq!(*notifier.seen.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_dispatcher_survives_failures() {
        let (dispatcher, worker) = NotificationDispatcher::spawn(Arc::new(FailingNotifier), 4);

        assert!(dispatcher.dispatch(stored(1)));
        assert!(dispatcher.dispatch(stored(2)));
        drop(dispatcher);

        // Worker drains the queue and exits cleanly
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_noop_notifier() {
        assert!(NoopLeadNotifier.notify(&stored(3)).await.is_ok());
    }
}
