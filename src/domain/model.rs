use crate::utils::error::BookingError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 價目表的一列：兩種服務層級的價格（美元）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub inside_outside: f64,
    pub outside_only: f64,
}

impl PricePoint {
    pub const fn new(inside_outside: f64, outside_only: f64) -> Self {
        Self {
            inside_outside,
            outside_only,
        }
    }
}

/// 表單送來的原始資料，尚未驗證
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequestPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub job_date: Option<String>,
    pub job_time: Option<String>,
    pub quote: Option<f64>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub scheduled_by: Option<String>,
}

/// 通過驗證的工作資料，只給 orchestrator 使用一次
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub name: String,
    pub address: String,
    pub job_date: NaiveDate,
    pub job_time: NaiveTime,
    pub quote: f64,
    /// 只含數字
    pub phone: String,
    pub description: Option<String>,
    pub scheduled_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEventSpec {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    pub event_id: String,
    pub event_url: String,
}

/// 寫入紀錄服務的欄位
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFields {
    pub title: String,
    pub address_url: String,
    pub start: String,
    pub quote: f64,
    pub phone: String,
    pub description: String,
    pub scheduled_by: String,
    pub handled_by: String,
    pub payment_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPatch {
    pub calendar_event_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// 一次提交的最終結果，優先順序由上而下
#[derive(Debug)]
pub enum SubmissionOutcome {
    ValidationError(BookingError),
    RecordServiceError(BookingError),
    RecordCreatedCalendarFailed {
        record_id: String,
        error: BookingError,
    },
    Success {
        record_id: String,
        event_url: String,
    },
}

impl SubmissionOutcome {
    pub fn record_id(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success { record_id, .. }
            | SubmissionOutcome::RecordCreatedCalendarFailed { record_id, .. } => Some(record_id),
            _ => None,
        }
    }

    pub fn event_url(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success { event_url, .. } => Some(event_url),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }
}
