use crate::domain::model::{JobRequest, JobRequestPayload};
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{normalize_phone, require_text};
use chrono::{NaiveDate, NaiveTime};

pub const MIN_QUOTE: f64 = 0.01;

/// 可以排程工作的員工名單
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRoster {
    names: Vec<String>,
}

impl StaffRoster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// 不分大小寫比對，回傳名單上的正式寫法
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.names
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| BookingError::validation("jobDate", format!("'{}' is not a YYYY-MM-DD date", raw)))
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| BookingError::validation("jobTime", format!("'{}' is not an HH:MM time", raw)))
}

/// 檢查必填欄位與格式，成功時轉成 `JobRequest`
pub fn validate_job(payload: &JobRequestPayload, roster: &StaffRoster) -> Result<JobRequest> {
    let name = require_text("name", &payload.name)?;
    let address = require_text("address", &payload.address)?;
    let job_date = parse_date(require_text("jobDate", &payload.job_date)?)?;
    let job_time = parse_time(require_text("jobTime", &payload.job_time)?)?;

    let quote = payload
        .quote
        .ok_or_else(|| BookingError::validation("quote", "is required"))?;
    if !quote.is_finite() || quote < MIN_QUOTE {
        return Err(BookingError::validation(
            "quote",
            format!("must be at least ${:.2}", MIN_QUOTE),
        ));
    }

    let phone = normalize_phone("phone", require_text("phone", &payload.phone)?)?;

    let scheduler = require_text("scheduledBy", &payload.scheduled_by)?;
    let scheduled_by = roster.resolve(scheduler).ok_or_else(|| {
        BookingError::validation(
            "scheduledBy",
            format!("must be one of: {}", roster.names().join(", ")),
        )
    })?;

    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(JobRequest {
        name: name.to_string(),
        address: address.to_string(),
        job_date,
        job_time,
        quote,
        phone,
        description,
        scheduled_by: scheduled_by.to_string(),
    })
}
