use crate::core::intake::StaffRoster;
use crate::core::orchestrator::SubmissionSettings;
use crate::core::pricing::PriceTable;
use crate::core::timestamp::{OffsetSource, MAX_OFFSET_MINUTES, MIN_OFFSET_MINUTES};
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{
    validate_credential, validate_file_extensions, validate_non_empty_string,
    validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_RECORD_ENDPOINT: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_CALENDAR_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_MAIL_ENDPOINT: &str = "https://api.resend.com";
pub const DEFAULT_HANDLED_BY: &str = "Window Washing";
pub const DEFAULT_PAYMENT_STATUS: &str = "Not Paid";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub timezone: TimezoneConfig,
    pub pricing: Option<PricingConfig>,
    pub staff: StaffConfig,
    pub record_service: RecordServiceConfig,
    pub calendar_service: CalendarServiceConfig,
    pub notification: Option<NotificationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// IANA 名稱，例如 "America/Chicago"
    pub name: String,
    /// 落後 UTC 的分鐘數；設定時取代 `name` 的時區規則
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub table_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffConfig {
    pub schedulers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordServiceConfig {
    #[serde(default = "default_record_endpoint")]
    pub endpoint: String,
    pub token: String,
    pub database_id: String,
    #[serde(default = "default_notion_version")]
    pub notion_version: String,
    #[serde(default = "default_handled_by")]
    pub handled_by: String,
    #[serde(default = "default_payment_status")]
    pub payment_status: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarServiceConfig {
    #[serde(default = "default_calendar_endpoint")]
    pub endpoint: String,
    pub access_token: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub timeout_seconds: Option<u64>,
}

fn default_record_endpoint() -> String {
    DEFAULT_RECORD_ENDPOINT.to_string()
}

fn default_notion_version() -> String {
    DEFAULT_NOTION_VERSION.to_string()
}

fn default_handled_by() -> String {
    DEFAULT_HANDLED_BY.to_string()
}

fn default_payment_status() -> String {
    DEFAULT_PAYMENT_STATUS.to_string()
}

fn default_calendar_endpoint() -> String {
    DEFAULT_CALENDAR_ENDPOINT.to_string()
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_mail_endpoint() -> String {
    DEFAULT_MAIL_ENDPOINT.to_string()
}

impl BookingConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BookingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BookingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOTION_TOKEN})，找不到的保留原樣交給驗證處理
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BookingError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 固定偏移優先，否則依 `timezone.name` 的 IANA 規則
    pub fn offset_source(&self) -> Result<OffsetSource> {
        match self.timezone.utc_offset_minutes {
            Some(minutes) => Ok(OffsetSource::Fixed(minutes)),
            None => OffsetSource::zone(&self.timezone.name),
        }
    }

    /// 有設定 CSV 時載入，否則使用內建價目表
    pub fn price_table(&self) -> Result<PriceTable> {
        match self.pricing.as_ref().and_then(|p| p.table_path.as_ref()) {
            Some(path) => PriceTable::from_csv_path(path),
            None => Ok(PriceTable::standard()),
        }
    }

    pub fn submission_settings(&self) -> Result<SubmissionSettings> {
        Ok(SubmissionSettings {
            roster: StaffRoster::new(self.staff.schedulers.iter().cloned()),
            offsets: self.offset_source()?,
            timezone: self.timezone.name.clone(),
            handled_by: self.record_service.handled_by.clone(),
            payment_status: self.record_service.payment_status.clone(),
        })
    }
}

fn validate_timeout(field_name: &str, timeout: Option<u64>) -> Result<()> {
    if let Some(seconds) = timeout {
        validate_positive_number(field_name, seconds, 1)?;
        validate_range(field_name, seconds, 1, 300)?;
    }
    Ok(())
}

impl Validate for BookingConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.bind", &self.server.bind)?;

        // 時區
        validate_non_empty_string("timezone.name", &self.timezone.name)?;
        // 行事曆服務也會收到這個名稱，即使有固定偏移也必須是有效的 IANA 時區
        OffsetSource::zone(&self.timezone.name)?;
        if let Some(minutes) = self.timezone.utc_offset_minutes {
            validate_range(
                "timezone.utc_offset_minutes",
                minutes,
                MIN_OFFSET_MINUTES,
                MAX_OFFSET_MINUTES,
            )?;
        }

        if let Some(path) = self.pricing.as_ref().and_then(|p| p.table_path.as_ref()) {
            validate_file_extensions("pricing.table_path", std::slice::from_ref(path), &["csv"])?;
        }

        if self.staff.schedulers.is_empty() {
            return Err(BookingError::MissingConfigError {
                field: "staff.schedulers".to_string(),
            });
        }
        for name in &self.staff.schedulers {
            validate_non_empty_string("staff.schedulers", name)?;
        }

        // 紀錄服務
        let record = &self.record_service;
        validate_url("record_service.endpoint", &record.endpoint)?;
        validate_credential("record_service.token", &record.token)?;
        validate_credential("record_service.database_id", &record.database_id)?;
        validate_non_empty_string("record_service.handled_by", &record.handled_by)?;
        validate_non_empty_string("record_service.payment_status", &record.payment_status)?;
        validate_timeout("record_service.timeout_seconds", record.timeout_seconds)?;

        // 行事曆
        let calendar = &self.calendar_service;
        validate_url("calendar_service.endpoint", &calendar.endpoint)?;
        validate_credential("calendar_service.access_token", &calendar.access_token)?;
        validate_non_empty_string("calendar_service.calendar_id", &calendar.calendar_id)?;
        validate_timeout("calendar_service.timeout_seconds", calendar.timeout_seconds)?;

        if let Some(notification) = &self.notification {
            validate_url("notification.endpoint", &notification.endpoint)?;
            validate_credential("notification.api_key", &notification.api_key)?;
            validate_non_empty_string("notification.from", &notification.from)?;
            for recipient in &notification.recipients {
                if !recipient.contains('@') {
                    return Err(BookingError::InvalidConfigValueError {
                        field: "notification.recipients".to_string(),
                        value: recipient.clone(),
                        reason: "Not an email address".to_string(),
                    });
                }
            }
            validate_timeout("notification.timeout_seconds", notification.timeout_seconds)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
