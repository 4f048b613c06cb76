// Outbound email notifications for note changes
//
// Sends are dispatched on a detached task after the primary mutation has
// committed. A delivery failure is logged and never reaches the response
// path; the note operation has already succeeded by the time SMTP is
// involved.

use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("smtp transport error: {0}")]
    Smtp(#[from] mail_send::Error),
}

/// The note mutation that triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    Created,
    Updated,
    Deleted,
}

impl NoteEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            NoteEvent::Created => "Note is Added",
            NoteEvent::Updated => "Note is Updated",
            NoteEvent::Deleted => "Note is Deleted",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            NoteEvent::Created => "A new note was added by your doctor.",
            NoteEvent::Updated => "A note from your doctor was updated.",
            NoteEvent::Deleted => "A note from your doctor was deleted.",
        }
    }
}

#[derive(Debug, Clone)]
struct SmtpConfig {
    host: String,
    port: u16,
    username: String,
    password: String,
    from_email: String,
    from_name: String,
}

/// Fire-and-forget notification sink. A mailer without SMTP configuration
/// is valid and simply drops events with a debug log.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: Option<SmtpConfig>,
}

impl Mailer {
    /// Load SMTP settings from the environment. Sending is off when
    /// `EMAIL_ENABLED` is false or `SMTP_HOST` is unset.
    pub fn from_env() -> Self {
        let enabled = std::env::var("EMAIL_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);

        let host = std::env::var("SMTP_HOST").ok();
        let config = match (enabled, host) {
            (true, Some(host)) => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
                password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_email: std::env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "noreply@care-notes.local".to_string()),
                from_name: std::env::var("EMAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Care Notes".to_string()),
            }),
            _ => None,
        };

        if config.is_none() {
            info!("Email notifications disabled (no SMTP configuration)");
        }
        Mailer { config }
    }

    /// A mailer that drops every event. Used when notifications are off and
    /// in tests.
    pub fn disabled() -> Self {
        Mailer { config: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Dispatch a note-change notification to the patient. Returns
    /// immediately; the send runs on its own task.
    pub fn notify_note_event(&self, event: NoteEvent, recipient: String) {
        let Some(config) = self.config.clone() else {
            debug!("Dropping {:?} notification, mailer disabled", event);
            return;
        };

        tokio::spawn(async move {
            match send_mail(config, event, &recipient).await {
                Ok(()) => debug!("Sent {:?} notification to {}", event, recipient),
                Err(e) => error!("Failed to send {:?} notification to {}: {}", event, recipient, e),
            }
        });
    }
}

async fn send_mail(config: SmtpConfig, event: NoteEvent, recipient: &str) -> Result<(), MailError> {
    let message = MessageBuilder::new()
        .from((config.from_name.as_str(), config.from_email.as_str()))
        .to(recipient)
        .subject(event.subject())
        .text_body(event.body());

    SmtpClientBuilder::new(config.host.clone(), config.port)
        .implicit_tls(false)
        .credentials((config.username.clone(), config.password.clone()))
        .connect()
        .await?
        .send(message)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_have_distinct_subjects() {
        assert_ne!(NoteEvent::Created.subject(), NoteEvent::Updated.subject());
        assert_ne!(NoteEvent::Updated.subject(), NoteEvent::Deleted.subject());
        assert_eq!(NoteEvent::Created.subject(), "Note is Added");
    }

    #[tokio::test]
    async fn test_disabled_mailer_drops_events_without_panicking() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
        mailer.notify_note_event(NoteEvent::Created, "p@x.com".to_string());
        mailer.notify_note_event(NoteEvent::Deleted, "p@x.com".to_string());
    }
}
