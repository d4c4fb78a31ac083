use crate::adapters::http::{build_client, check_response, transport_error, ServiceKind};
use crate::config::toml_config::{RecordServiceConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::{RecordFields, RecordPatch};
use crate::domain::ports::RecordService;
use crate::utils::error::{FailureKind, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

// 資料庫欄位名稱
pub const PROP_NAME: &str = "Name";
pub const PROP_ADDRESS: &str = "Address";
pub const PROP_DATE: &str = "Date";
pub const PROP_QUOTE: &str = "Quote";
pub const PROP_PHONE: &str = "Phone";
pub const PROP_DESCRIPTION: &str = "Description";
pub const PROP_SCHEDULED_BY: &str = "Scheduled By";
pub const PROP_HANDLED_BY: &str = "Handled By";
pub const PROP_PAYMENT_STATUS: &str = "Payment Status";
pub const PROP_CALENDAR_EVENT: &str = "Calendar Event";

/// Notion 單一 rich text 區塊的長度上限
const RICH_TEXT_LIMIT: usize = 2000;

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
}

/// 以 Notion 資料庫作為工作紀錄
pub struct NotionRecordService {
    client: Client,
    endpoint: String,
    token: String,
    database_id: String,
    notion_version: String,
}

impl NotionRecordService {
    pub fn from_config(config: &RecordServiceConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            database_id: config.database_id.clone(),
            notion_version: config.notion_version.clone(),
        })
    }

    fn rich_text(content: &str) -> Value {
        let content: String = content.chars().take(RICH_TEXT_LIMIT).collect();
        json!([{ "text": { "content": content } }])
    }

    pub fn page_properties(fields: &RecordFields) -> Value {
        json!({
            PROP_NAME: { "title": Self::rich_text(&fields.title) },
            PROP_ADDRESS: { "url": fields.address_url },
            PROP_DATE: { "date": { "start": fields.start } },
            PROP_QUOTE: { "number": fields.quote },
            PROP_PHONE: { "phone_number": fields.phone },
            PROP_DESCRIPTION: { "rich_text": Self::rich_text(&fields.description) },
            PROP_SCHEDULED_BY: { "select": { "name": fields.scheduled_by } },
            PROP_HANDLED_BY: { "select": { "name": fields.handled_by } },
            PROP_PAYMENT_STATUS: { "select": { "name": fields.payment_status } },
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.endpoint, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.notion_version)
    }
}

#[async_trait]
impl RecordService for NotionRecordService {
    async fn create_record(&self, fields: &RecordFields) -> Result<String> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": Self::page_properties(fields),
        });

        tracing::debug!("📡 Creating Notion page in database {}", self.database_id);
        let response = self
            .request(reqwest::Method::POST, "/pages")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ServiceKind::Record, e))?;
        let response = check_response(ServiceKind::Record, response).await?;

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| transport_error(ServiceKind::Record, e))?;
        if page.id.is_empty() {
            return Err(ServiceKind::Record.error(
                FailureKind::UnexpectedResponse,
                "page id missing from response",
            ));
        }
        Ok(page.id)
    }

    async fn update_record(&self, record_id: &str, patch: &RecordPatch) -> Result<()> {
        let body = json!({
            "properties": {
                PROP_CALENDAR_EVENT: { "url": patch.calendar_event_url },
            }
        });

        let response = self
            .request(reqwest::Method::PATCH, &format!("/pages/{}", record_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ServiceKind::Record, e))?;
        check_response(ServiceKind::Record, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_properties_shape() {
        let fields = RecordFields {
            title: "Dana".to_string(),
            address_url: "https://maps/?q=x".to_string(),
            start: "2024-05-14T09:30:00-06:00".to_string(),
            quote: 300.0,
            phone: "5551234567".to_string(),
            description: "x".repeat(2500),
            scheduled_by: "Alex".to_string(),
            handled_by: "Window Washing".to_string(),
            payment_status: "Not Paid".to_string(),
        };

        let props = NotionRecordService::page_properties(&fields);
        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Dana");
        assert_eq!(props["Date"]["date"]["start"], "2024-05-14T09:30:00-06:00");
        assert_eq!(props["Quote"]["number"], 300.0);
        assert_eq!(props["Phone"]["phone_number"], "5551234567");
        assert_eq!(props["Payment Status"]["select"]["name"], "Not Paid");
        let description = props["Description"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(description.len(), RICH_TEXT_LIMIT);
    }
}
