//! Outbound notification capability.
//!
//! [`Notifier`] is the seam between the dispatcher and whatever physically
//! delivers a reminder. Implementations may fail transiently; the
//! dispatcher logs and swallows those failures.

use std::future::Future;

use serde_json::json;
use thiserror::Error;

use crate::habit::UserId;

/// Delivery failure from a notify capability.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Webhook URL is missing or malformed
    #[error("Invalid Discord webhook URL: must start with {DISCORD_WEBHOOK_PREFIX}")]
    InvalidWebhook,

    /// The remote service rejected the delivery
    #[error("Delivery rejected (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure
    #[error("Delivery transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can deliver a reminder to a user.
pub trait Notifier: Send + Sync + 'static {
    /// Deliver `text` to `user_id`. Best-effort; the caller decides what a
    /// failure means.
    fn notify(
        &self,
        user_id: &UserId,
        text: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

pub const DISCORD_WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

/// Delivers reminders through a Discord webhook.
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Build a notifier for a user-provided webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let webhook_url = webhook_url.into();
        if !webhook_url.starts_with(DISCORD_WEBHOOK_PREFIX) {
            return Err(NotifyError::InvalidWebhook);
        }
        Ok(Self {
            webhook_url,
            client: reqwest::Client::new(),
        })
    }
}

impl Notifier for DiscordNotifier {
    async fn notify(&self, user_id: &UserId, text: &str) -> Result<(), NotifyError> {
        // Numeric ids render as a Discord mention; anything else is a
        // plain-text prefix.
        let content = if user_id.as_str().chars().all(|c| c.is_ascii_digit()) {
            format!("<@{user_id}> {text}")
        } else {
            format!("{user_id}: {text}")
        };

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(NotifyError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Prints reminders to stdout; used by the CLI `run` mode and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    async fn notify(&self, user_id: &UserId, text: &str) -> Result<(), NotifyError> {
        println!("[{user_id}] {text}");
        Ok(())
    }
}
