use crate::core::duration::estimate_duration;
use crate::core::intake::{validate_job, StaffRoster};
use crate::core::notification::{notification_body, notification_subject, NotificationDispatcher};
use crate::core::timestamp::{event_window, EventWindow, OffsetSource};
use crate::domain::model::{
    CalendarEventSpec, JobRequest, JobRequestPayload, RecordFields, RecordPatch, SubmissionOutcome,
};
use crate::domain::ports::{CalendarService, RecordService};
use crate::utils::error::{BookingError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/";

/// 地址轉成地圖搜尋連結
pub fn map_search_url(address: &str) -> Result<String> {
    Url::parse_with_params(MAP_SEARCH_BASE, &[("api", "1"), ("query", address)])
        .map(String::from)
        .map_err(|e| BookingError::validation("address", format!("cannot build map link: {}", e)))
}

#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub roster: StaffRoster,
    pub offsets: OffsetSource,
    /// 傳給行事曆服務的 IANA 時區名稱
    pub timezone: String,
    pub handled_by: String,
    pub payment_status: String,
}

/// 提交結果，加上還在背景送出的通知
pub struct Submission {
    pub outcome: SubmissionOutcome,
    pub notification: Option<JoinHandle<()>>,
}

impl Submission {
    /// 等通知 task 結束，最多等 `limit`；通知失敗不影響結果
    pub async fn settle(self, limit: Duration) -> SubmissionOutcome {
        if let Some(handle) = self.notification {
            match tokio::time::timeout(limit, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("📧 Notification task ended abnormally: {}", e),
                Err(_) => tracing::warn!(
                    "📧 Notification still pending after {:?}, not waiting any longer",
                    limit
                ),
            }
        }
        self.outcome
    }
}

/// 一次提交：驗證 → 建立紀錄 → 建立行事曆事件 → 回寫連結 → 通知
pub struct JobSubmissionOrchestrator {
    records: Arc<dyn RecordService>,
    calendar: Arc<dyn CalendarService>,
    notifier: Option<NotificationDispatcher>,
    settings: SubmissionSettings,
}

/// 驗證後準備好送出的資料
struct PreparedJob {
    job: JobRequest,
    map_url: String,
    window: EventWindow,
}

impl JobSubmissionOrchestrator {
    pub fn new(
        records: Arc<dyn RecordService>,
        calendar: Arc<dyn CalendarService>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            records,
            calendar,
            notifier: None,
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: NotificationDispatcher) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn settings(&self) -> &SubmissionSettings {
        &self.settings
    }

    fn prepare(&self, payload: &JobRequestPayload) -> Result<PreparedJob> {
        let job = validate_job(payload, &self.settings.roster)?;
        let map_url = map_search_url(&job.address)?;
        let window = event_window(
            job.job_date,
            job.job_time,
            estimate_duration(job.quote)?,
            self.settings.offsets,
        )?;
        Ok(PreparedJob {
            job,
            map_url,
            window,
        })
    }

    fn record_fields(&self, prepared: &PreparedJob) -> RecordFields {
        let job = &prepared.job;
        RecordFields {
            title: job.name.clone(),
            address_url: prepared.map_url.clone(),
            start: prepared.window.start.clone(),
            quote: job.quote,
            phone: job.phone.clone(),
            description: job.description.clone().unwrap_or_default(),
            scheduled_by: job.scheduled_by.clone(),
            handled_by: self.settings.handled_by.clone(),
            payment_status: self.settings.payment_status.clone(),
        }
    }

    fn event_spec(&self, prepared: &PreparedJob) -> CalendarEventSpec {
        let job = &prepared.job;
        let mut lines = vec![
            format!("Quote: ${:.2}", job.quote),
            format!("Phone: {}", job.phone),
            format!("Scheduled by: {}", job.scheduled_by),
        ];
        if let Some(description) = &job.description {
            lines.push(String::new());
            lines.push(description.clone());
        }
        lines.push(String::new());
        lines.push(format!("Map: {}", prepared.map_url));

        CalendarEventSpec {
            summary: format!("Window cleaning: {}", job.name),
            location: job.address.clone(),
            description: lines.join("\n"),
            start: prepared.window.start.clone(),
            end: prepared.window.end.clone(),
            timezone: self.settings.timezone.clone(),
        }
    }

    /// 通知交給背景 task，不等待；長駐的服務使用
    pub async fn submit(&self, payload: &JobRequestPayload) -> SubmissionOutcome {
        self.submit_tracked(payload).await.outcome
    }

    /// 同 `submit`，但把通知 task 交還給呼叫端，讓短命的程序在結束前等它
    pub async fn submit_tracked(&self, payload: &JobRequestPayload) -> Submission {
        // State 0: 驗證，失敗時不呼叫任何外部服務
        let prepared = match self.prepare(payload) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::info!("❌ Submission rejected: {}", e);
                return Submission {
                    outcome: SubmissionOutcome::ValidationError(e),
                    notification: None,
                };
            }
        };
        let job = &prepared.job;
        tracing::info!(
            "📝 Booking '{}' on {} at {} (quote ${:.2})",
            job.name,
            job.job_date,
            job.job_time.format("%H:%M"),
            job.quote
        );

        // State 1: 建立紀錄
        let record_id = match self.records.create_record(&self.record_fields(&prepared)).await {
            Ok(id) => {
                tracing::info!("✅ Record created: {}", id);
                id
            }
            Err(e) => {
                tracing::error!("❌ Record creation failed: {}", e);
                return Submission {
                    outcome: SubmissionOutcome::RecordServiceError(e),
                    notification: None,
                };
            }
        };

        // State 2: 行事曆事件，失敗不回滾紀錄
        let outcome = match self.calendar.create_event(&self.event_spec(&prepared)).await {
            Ok(event) => {
                tracing::info!("📅 Calendar event created: {}", event.event_id);

                // State 3: 回寫事件連結，盡力而為
                let patch = RecordPatch {
                    calendar_event_url: event.event_url.clone(),
                };
                if let Err(e) = self.records.update_record(&record_id, &patch).await {
                    tracing::warn!("⚠️ Could not link event back to record {}: {}", record_id, e);
                }

                SubmissionOutcome::Success {
                    record_id,
                    event_url: event.event_url,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Record {} created but calendar event failed: {}",
                    record_id,
                    e
                );
                SubmissionOutcome::RecordCreatedCalendarFailed {
                    record_id,
                    error: e,
                }
            }
        };

        // State 4: 通知，不等待結果
        let notification = self.notifier.as_ref().and_then(|notifier| {
            let body = notification_body(job, &prepared.map_url, outcome.event_url());
            notifier.dispatch(notification_subject(job), body)
        });

        Submission {
            outcome,
            notification,
        }
    }
}
