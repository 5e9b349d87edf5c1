//! Background mail worker draining the notification channel.
//!
//! Delivery goes through a Resend-style HTTP mail API. Without an API
//! key the worker logs each delivery instead of sending, which keeps
//! local development mail-free. Failures are logged and dropped; the
//! operations that triggered them have already returned.

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::domain::notification::EventDigest;
use crate::domain::{Notification, Notifier};
use crate::error::ApiError;

/// HTTP mail API client and sender identity.
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    /// Creates a mailer. `api_key = None` switches to log-only mode.
    #[must_use]
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }

    /// Spawns the worker task consuming the notifier channel until the
    /// last sender is dropped.
    pub fn spawn(self, notifier: &Notifier) -> JoinHandle<()> {
        let mut rx = notifier.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) => {
                        if let Err(err) = self.deliver(&notification).await {
                            tracing::error!(error = %err, "notification delivery failed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "mail worker lagged; notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), ApiError> {
        let (to, subject, html) = render(notification);
        if to.is_empty() {
            return Ok(());
        }

        let Some(api_key) = &self.api_key else {
            tracing::debug!(recipients = to.len(), %subject, "mail api key not set; skipping send");
            return Ok(());
        };

        let payload = serde_json::json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html,
        });
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("mail api request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Internal(format!(
                "mail api returned {}",
                response.status()
            )));
        }
        tracing::info!(recipients = to.len(), %subject, "notification delivered");
        Ok(())
    }
}

/// Renders a notification into recipients, subject, and HTML body.
fn render(notification: &Notification) -> (Vec<String>, String, String) {
    match notification {
        Notification::RegistrationConfirmed { recipient, event } => (
            vec![recipient.clone()],
            format!("Registration Confirmation: {}", event.title),
            confirmation_body(event),
        ),
        Notification::Broadcast {
            recipients,
            subject,
            message,
            include_event_details,
            event,
        } => (
            recipients.clone(),
            format!("{}: {}", event.title, subject),
            broadcast_body(event, message, *include_event_details),
        ),
    }
}

fn event_details_list(event: &EventDigest) -> String {
    let mut items = format!(
        "<ul>\
         <li><strong>Date:</strong> {}</li>\
         <li><strong>Time:</strong> {}</li>\
         <li><strong>Location:</strong> {}</li>",
        event.date.format("%Y-%m-%d"),
        event.time,
        event.location,
    );
    if let Some(link) = &event.meet_link {
        items.push_str(&format!(
            "<li><strong>Meeting Link:</strong> <a href=\"{link}\">{link}</a></li>"
        ));
    }
    items.push_str("</ul>");
    items
}

fn confirmation_body(event: &EventDigest) -> String {
    format!(
        "<h2>Event Registration Confirmation</h2>\
         <p>Thank you for registering for {}!</p>\
         <h3>Event Details:</h3>{}\
         <p>Please save this email for your records.</p>",
        event.title,
        event_details_list(event),
    )
}

fn broadcast_body(event: &EventDigest, message: &str, include_event_details: bool) -> String {
    let mut body = format!("<h2>{}</h2><div>{message}</div>", event.title);
    if include_event_details {
        body.push_str("<hr /><h3>Event Details:</h3>");
        body.push_str(&event_details_list(event));
    }
    body
}
