use crate::adapters::http::{build_client, check_response, transport_error, ServiceKind};
use crate::config::toml_config::{CalendarServiceConfig, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::{CalendarEvent, CalendarEventSpec};
use crate::domain::ports::CalendarService;
use crate::utils::error::{BookingError, FailureKind, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: &'a str,
    time_zone: &'a str,
}

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    location: &'a str,
    description: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: String,
    html_link: Option<String>,
}

/// Google Calendar events API
pub struct GoogleCalendarService {
    client: Client,
    events_url: Url,
    access_token: String,
}

impl GoogleCalendarService {
    pub fn from_config(config: &CalendarServiceConfig) -> Result<Self> {
        let mut events_url = Url::parse(&config.endpoint).map_err(|e| {
            BookingError::InvalidConfigValueError {
                field: "calendar_service.endpoint".to_string(),
                value: config.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        // calendar id 可能是 email，須逐段編碼
        events_url
            .path_segments_mut()
            .map_err(|_| BookingError::ConfigError {
                message: format!("Calendar endpoint cannot be a base URL: {}", config.endpoint),
            })?
            .pop_if_empty()
            .extend(["calendars", config.calendar_id.as_str(), "events"]);

        Ok(Self {
            client: build_client(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))?,
            events_url,
            access_token: config.access_token.clone(),
        })
    }

    pub fn events_url(&self) -> &str {
        self.events_url.as_str()
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarService {
    async fn create_event(&self, spec: &CalendarEventSpec) -> Result<CalendarEvent> {
        let body = EventBody {
            summary: &spec.summary,
            location: &spec.location,
            description: &spec.description,
            start: EventTime {
                date_time: &spec.start,
                time_zone: &spec.timezone,
            },
            end: EventTime {
                date_time: &spec.end,
                time_zone: &spec.timezone,
            },
        };

        tracing::debug!("📡 Creating calendar event {} → {}", spec.start, spec.end);
        let response = self
            .client
            .post(self.events_url.clone())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(ServiceKind::Calendar, e))?;
        let response = check_response(ServiceKind::Calendar, response).await?;

        let event: EventResponse = response
            .json()
            .await
            .map_err(|e| transport_error(ServiceKind::Calendar, e))?;
        let event_url = event.html_link.ok_or_else(|| {
            ServiceKind::Calendar.error(
                FailureKind::UnexpectedResponse,
                format!("event {} has no htmlLink", event.id),
            )
        })?;

        Ok(CalendarEvent {
            event_id: event.id,
            event_url,
        })
    }
}
