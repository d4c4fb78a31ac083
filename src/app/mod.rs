pub mod responses;
pub mod server;

use crate::adapters::{GoogleCalendarService, HttpMailer, NotionRecordService};
use crate::config::BookingConfig;
use crate::core::notification::NotificationDispatcher;
use crate::core::orchestrator::JobSubmissionOrchestrator;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use server::AppState;
use std::sync::Arc;

/// 驗證配置並接上外部服務；缺少憑證時在任何呼叫前失敗
pub fn build_orchestrator(config: &BookingConfig) -> Result<JobSubmissionOrchestrator> {
    config.validate()?;

    let records = Arc::new(NotionRecordService::from_config(&config.record_service)?);
    let calendar = Arc::new(GoogleCalendarService::from_config(&config.calendar_service)?);
    let orchestrator =
        JobSubmissionOrchestrator::new(records, calendar, config.submission_settings()?);

    match &config.notification {
        Some(notification) => {
            let mailer = Arc::new(HttpMailer::from_config(notification)?);
            Ok(orchestrator.with_notifier(NotificationDispatcher::new(
                mailer,
                notification.recipients.clone(),
            )))
        }
        None => {
            tracing::info!("No [notification] section, job emails are disabled");
            Ok(orchestrator)
        }
    }
}

pub fn build_state(config: &BookingConfig) -> Result<AppState> {
    Ok(AppState {
        orchestrator: build_orchestrator(config)?,
        price_table: config.price_table()?,
    })
}
