//! Outbound email through the Resend HTTP API.
//!
//! Without `RESEND_API_KEY` the mailer only logs what it would have sent.

use serde::Serialize;
use tracing::{info, warn};
use wreq::header::AUTHORIZATION;

use crate::error::AppResult;

pub struct Mailer {
    client: wreq::Client,
    api_key: Option<String>,
    base_url: String,
    from: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Whether a message left the process or was only written to the log.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delivery {
    Sent,
    Logged,
}

impl Mailer {
    pub fn new(client: wreq::Client, api_key: Option<String>, base_url: String, from: String) -> Self {
        Self { client, api_key, base_url, from }
    }

    pub fn email(&self, to: &str, subject: String, text: String, reply_to: Option<String>) -> Email {
        Email { from: self.from.clone(), to: vec![to.to_string()], subject, text, reply_to }
    }

    /// Never fails: a provider error falls back to logging the message.
    pub async fn deliver(&self, email: &Email) -> Delivery {
        let Some(key) = &self.api_key else {
            info!(to = ?email.to, subject = %email.subject, body = %email.text, "email not configured, logging message");
            return Delivery::Logged;
        };

        match self.send(key, email).await {
            Ok(()) => {
                info!(to = ?email.to, subject = %email.subject, "email sent");
                Delivery::Sent
            },
            Err(err) => {
                warn!(error = %err, to = ?email.to, subject = %email.subject, body = %email.text, "email delivery failed, logging message");
                Delivery::Logged
            },
        }
    }

    async fn send(&self, key: &str, email: &Email) -> AppResult<()> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));
        self.client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(email)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(api_key: Option<&str>) -> Mailer {
        Mailer::new(
            wreq::Client::builder().build().unwrap(),
            api_key.map(str::to_string),
            "http://127.0.0.1:9".to_string(),
            "Børnespil <kontakt@boernespil.test>".to_string(),
        )
    }

    #[tokio::test]
    async fn logs_without_api_key() {
        let m = mailer(None);
        let email = m.email("a@b.dk", "Hej".into(), "Tekst".into(), None);
        assert_eq!(m.deliver(&email).await, Delivery::Logged);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_log() {
        let m = mailer(Some("re_test"));
        let email = m.email("a@b.dk", "Hej".into(), "Tekst".into(), Some("c@d.dk".into()));
        assert_eq!(m.deliver(&email).await, Delivery::Logged);
    }

    #[test]
    fn serialises_resend_payload() {
        let m = mailer(None);
        let value = serde_json::to_value(m.email("a@b.dk", "S".into(), "T".into(), None)).unwrap();
        assert_eq!(value["to"], serde_json::json!(["a@b.dk"]));
        assert!(value.get("reply_to").is_none());
    }
}
