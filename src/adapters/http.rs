use crate::utils::error::{BookingError, FailureKind, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// 錯誤訊息要標示是哪個外部服務
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Record,
    Calendar,
    Notification,
}

impl ServiceKind {
    pub fn error(self, kind: FailureKind, message: impl Into<String>) -> BookingError {
        let message = message.into();
        match self {
            ServiceKind::Record => BookingError::RecordServiceError { kind, message },
            ServiceKind::Calendar => BookingError::CalendarServiceError { kind, message },
            ServiceKind::Notification => BookingError::NotificationError { kind, message },
        }
    }
}

pub fn build_client(timeout_seconds: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("wash-booking/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub fn classify_status(status: StatusCode) -> FailureKind {
    match status.as_u16() {
        400 | 409 | 422 => FailureKind::Malformed,
        401 | 403 => FailureKind::Unauthorized,
        404 => FailureKind::NotFound,
        429 => FailureKind::RateLimited,
        500..=599 => FailureKind::Unavailable,
        _ => FailureKind::UnexpectedResponse,
    }
}

/// 取出 Notion (`{"message": ..}`) 或 Google (`{"error": {"message": ..}}`) 的錯誤訊息
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

pub fn transport_error(service: ServiceKind, error: reqwest::Error) -> BookingError {
    let kind = if error.is_decode() {
        FailureKind::UnexpectedResponse
    } else {
        FailureKind::Unreachable
    };
    service.error(kind, error.to_string())
}

/// 非 2xx 時轉成對應服務的錯誤
pub async fn check_response(service: ServiceKind, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_message(&body).unwrap_or_else(|| {
        let trimmed: String = body.chars().take(200).collect();
        if trimmed.is_empty() {
            status.to_string()
        } else {
            trimmed
        }
    });

    tracing::debug!("{:?} service responded {}: {}", service, status, body);
    Err(service.error(
        classify_status(status),
        format!("HTTP {}: {}", status.as_u16(), detail),
    ))
}
