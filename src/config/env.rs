use crate::config::toml_config::{
    BookingConfig, CalendarServiceConfig, NotificationConfig, PricingConfig, RecordServiceConfig,
    ServerConfig, StaffConfig, TimezoneConfig, DEFAULT_BIND, DEFAULT_CALENDAR_ENDPOINT,
    DEFAULT_CALENDAR_ID, DEFAULT_HANDLED_BY, DEFAULT_MAIL_ENDPOINT, DEFAULT_NOTION_VERSION,
    DEFAULT_PAYMENT_STATUS, DEFAULT_RECORD_ENDPOINT,
};
use crate::utils::error::{BookingError, Result};

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl BookingConfig {
    /// 從環境變數建立配置（serverless 部署使用）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| BookingError::MissingConfigError {
                    field: key.to_string(),
                })
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let timeout = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|raw| {
                    raw.trim().parse().map_err(|_| BookingError::InvalidConfigValueError {
                        field: key.to_string(),
                        value: raw.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })
                })
                .transpose()
        };

        let utc_offset_minutes = lookup("BOOKING_UTC_OFFSET_MINUTES")
            .map(|raw| {
                raw.trim().parse().map_err(|_| BookingError::InvalidConfigValueError {
                    field: "BOOKING_UTC_OFFSET_MINUTES".to_string(),
                    value: raw.clone(),
                    reason: "Expected minutes behind UTC, e.g. 360".to_string(),
                })
            })
            .transpose()?;

        let notification = match lookup("NOTIFY_API_KEY") {
            Some(api_key) => Some(NotificationConfig {
                endpoint: or_default("NOTIFY_ENDPOINT", DEFAULT_MAIL_ENDPOINT),
                api_key,
                from: required("NOTIFY_FROM")?,
                recipients: split_list(&required("NOTIFY_RECIPIENTS")?),
                timeout_seconds: timeout("NOTIFY_TIMEOUT_SECONDS")?,
            }),
            None => None,
        };

        Ok(Self {
            server: ServerConfig {
                bind: or_default("BOOKING_BIND", DEFAULT_BIND),
            },
            timezone: TimezoneConfig {
                name: required("BOOKING_TIMEZONE")?,
                utc_offset_minutes,
            },
            pricing: lookup("BOOKING_PRICE_TABLE").map(|path| PricingConfig {
                table_path: Some(path),
            }),
            staff: StaffConfig {
                schedulers: split_list(&required("BOOKING_SCHEDULERS")?),
            },
            record_service: RecordServiceConfig {
                endpoint: or_default("NOTION_ENDPOINT", DEFAULT_RECORD_ENDPOINT),
                token: required("NOTION_TOKEN")?,
                database_id: required("NOTION_DATABASE_ID")?,
                notion_version: or_default("NOTION_VERSION", DEFAULT_NOTION_VERSION),
                handled_by: or_default("RECORD_HANDLED_BY", DEFAULT_HANDLED_BY),
                payment_status: or_default("RECORD_PAYMENT_STATUS", DEFAULT_PAYMENT_STATUS),
                timeout_seconds: timeout("NOTION_TIMEOUT_SECONDS")?,
            },
            calendar_service: CalendarServiceConfig {
                endpoint: or_default("GOOGLE_CALENDAR_ENDPOINT", DEFAULT_CALENDAR_ENDPOINT),
                access_token: required("GOOGLE_CALENDAR_TOKEN")?,
                calendar_id: or_default("GOOGLE_CALENDAR_ID", DEFAULT_CALENDAR_ID),
                timeout_seconds: timeout("GOOGLE_CALENDAR_TIMEOUT_SECONDS")?,
            },
            notification,
        })
    }
}
