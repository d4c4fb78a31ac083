use crate::adapters::http::{build_client, check_response, transport_error, ServiceKind};
use crate::config::toml_config::{NotificationConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::Notification;
use crate::domain::ports::NotificationService;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// JSON email API (`POST {endpoint}/emails`)
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl NotificationService for HttpMailer {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let body = EmailBody {
            from: &self.from,
            to: &notification.recipients,
            subject: &notification.subject,
            html: &notification.html_body,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ServiceKind::Notification, e))?;
        check_response(ServiceKind::Notification, response).await?;
        Ok(())
    }
}
