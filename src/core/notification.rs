use crate::domain::model::{JobRequest, Notification};
use crate::domain::ports::NotificationService;
use std::sync::Arc;
use tokio::task::JoinHandle;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn notification_subject(job: &JobRequest) -> String {
    format!(
        "New job booked: {} on {}",
        job.name,
        job.job_date.format("%Y-%m-%d")
    )
}

/// 工作摘要 email 內容
pub fn notification_body(job: &JobRequest, map_url: &str, event_url: Option<&str>) -> String {
    let mut rows = vec![
        ("Name", escape_html(&job.name)),
        (
            "Address",
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(map_url),
                escape_html(&job.address)
            ),
        ),
        (
            "When",
            format!(
                "{} at {}",
                job.job_date.format("%A, %B %-d, %Y"),
                job.job_time.format("%-I:%M %p")
            ),
        ),
        ("Quote", format!("${:.2}", job.quote)),
        ("Phone", escape_html(&job.phone)),
        ("Scheduled by", escape_html(&job.scheduled_by)),
    ];
    if let Some(description) = &job.description {
        rows.push(("Description", escape_html(description)));
    }
    rows.push((
        "Calendar",
        match event_url {
            Some(url) => format!("<a href=\"{}\">Open event</a>", escape_html(url)),
            None => "Calendar event could not be created".to_string(),
        },
    ));

    let body: String = rows
        .iter()
        .map(|(label, value)| format!("<tr><th align=\"left\">{}</th><td>{}</td></tr>", label, value))
        .collect();

    format!(
        "<h2>New window cleaning job</h2><table>{}</table>",
        body
    )
}

/// 以獨立 task 送出通知；失敗只寫進 log，不回報給呼叫端
#[derive(Clone)]
pub struct NotificationDispatcher {
    service: Arc<dyn NotificationService>,
    recipients: Vec<String>,
}

impl NotificationDispatcher {
    pub fn new(service: Arc<dyn NotificationService>, recipients: Vec<String>) -> Self {
        Self {
            service,
            recipients,
        }
    }

    pub fn dispatch(&self, subject: String, html_body: String) -> Option<JoinHandle<()>> {
        if self.recipients.is_empty() {
            tracing::debug!("No notification recipients configured, skipping email");
            return None;
        }

        let notification = Notification {
            recipients: self.recipients.clone(),
            subject,
            html_body,
        };
        let service = Arc::clone(&self.service);

        Some(tokio::spawn(async move {
            match service.send(&notification).await {
                Ok(()) => tracing::info!(
                    "📧 Notification sent to {} recipient(s)",
                    notification.recipients.len()
                ),
                Err(e) => tracing::warn!("📧 Notification failed (ignored): {}", e),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{BookingError, FailureKind, Result};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use tokio::sync::Mutex;

    fn job() -> JobRequest {
        JobRequest {
            name: "Dana <Whitfield>".to_string(),
            address: "12 Elm St".to_string(),
            job_date: NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
            job_time: NaiveTime::from_hms_opt(13, 30, 0).unwrap(),
            quote: 300.0,
            phone: "5551234567".to_string(),
            description: None,
            scheduled_by: "Alex".to_string(),
        }
    }

    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationService for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            self.sent.lock().await.push(notification.clone());
            if self.fail {
                return Err(BookingError::NotificationError {
                    kind: FailureKind::Unavailable,
                    message: "mail API down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_body_escapes_and_links() {
        let body = notification_body(&job(), "https://maps.example/?q=12+Elm", Some("https://cal/e/1"));
        assert!(body.contains("Dana &lt;Whitfield&gt;"));
        assert!(body.contains("Tuesday, May 14, 2024 at 1:30 PM"));
        assert!(body.contains("$300.00"));
        assert!(body.contains("<a href=\"https://cal/e/1\">Open event</a>"));
        assert!(!body.contains("Description"));
    }

    #[test]
    fn test_body_without_event() {
        let body = notification_body(&job(), "https://maps.example", None);
        assert!(body.contains("Calendar event could not be created"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            notification_subject(&job()),
            "New job booked: Dana <Whitfield> on 2024-05-14"
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_swallowed() {
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let dispatcher =
            NotificationDispatcher::new(notifier.clone(), vec!["office@example.com".to_string()]);

        let handle = dispatcher
            .dispatch("subject".to_string(), "<p>body</p>".to_string())
            .unwrap();
        // task 本身不會 panic
        handle.await.unwrap();
        assert_eq!(notifier.sent.lock().await.len(), 1);
    }

    #[test]
    fn test_no_recipients_skips_dispatch() {
        let notifier = Arc::new(RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: false,
        });
        let dispatcher = NotificationDispatcher::new(notifier, Vec::new());
        // 沒有收件人時不需要 runtime
        assert!(dispatcher
            .dispatch("subject".to_string(), String::new())
            .is_none());
    }
}
