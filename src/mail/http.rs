use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::error;

use super::Notifier;
use crate::error::NotifierError;
use crate::models::email::{OutgoingMail, SendMailRequest};

/// Delivers mail through a JSON email API (`POST` with a bearer key).
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: Option<String>, from: String) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(HttpMailer {
            client,
            endpoint,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifierError> {
        let body = SendMailRequest {
            from: &self.from,
            to: &mail.to,
            cc: &mail.cc,
            reply_to: mail.reply_to.as_deref(),
            subject: &mail.subject,
            text: &mail.text,
            html: &mail.html,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("mail api answered {} for '{}': {}", status, mail.subject, body);
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
