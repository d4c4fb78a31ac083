use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::time::Duration;
use wash_booking::app::build_orchestrator;
use wash_booking::domain::model::{JobRequestPayload, SubmissionOutcome};
use wash_booking::utils::error::{BookingError, FailureKind};
use wash_booking::BookingConfig;

fn config_text(server: &MockServer, with_notification: bool) -> String {
    let base = server.base_url();
    let mut content = format!(
        r#"
[timezone]
name = "America/Chicago"
utc_offset_minutes = 360

[staff]
schedulers = ["Alex", "Jordan"]

[record_service]
endpoint = "{base}"
token = "secret_notion"
database_id = "db-42"

[calendar_service]
endpoint = "{base}"
access_token = "ya29.token"
"#
    );
    if with_notification {
        content.push_str(&format!(
            r#"
[notification]
endpoint = "{base}"
api_key = "re_key"
from = "bookings@example.com"
recipients = ["office@example.com"]
"#
        ));
    }
    content
}

fn config_for(server: &MockServer, with_notification: bool) -> BookingConfig {
    BookingConfig::from_toml_str(&config_text(server, with_notification)).unwrap()
}

fn payload() -> JobRequestPayload {
    serde_json::from_value(json!({
        "name": "Dana Whitfield",
        "address": "12 Elm St, Springfield",
        "jobDate": "2024-05-14",
        "jobTime": "09:30",
        "quote": 300.0,
        "phone": "(555) 123-4567",
        "description": "Second floor skylight",
        "scheduledBy": "Alex"
    }))
    .unwrap()
}

async fn wait_for_hits(mock: &httpmock::Mock<'_>, expected: usize) -> usize {
    for _ in 0..100 {
        let hits = mock.hits_async().await;
        if hits >= expected {
            return hits;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    mock.hits_async().await
}

#[tokio::test]
async fn test_full_submission_success() {
    let server = MockServer::start_async().await;

    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/pages").json_body_partial(
                r#"{ "properties": {
                    "Date": { "date": { "start": "2024-05-14T09:30:00-06:00" } },
                    "Phone": { "phone_number": "5551234567" }
                } }"#,
            );
            then.status(200).json_body(json!({ "id": "page-1" }));
        })
        .await;
    let event = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/calendars/primary/events")
                .json_body_partial(
                    r#"{
                        "start": { "dateTime": "2024-05-14T09:30:00-06:00", "timeZone": "America/Chicago" },
                        "end": { "dateTime": "2024-05-14T14:30:00-06:00", "timeZone": "America/Chicago" }
                    }"#,
                );
            then.status(200).json_body(json!({
                "id": "evt-1",
                "htmlLink": "https://calendar.example/evt-1"
            }));
        })
        .await;
    let link_back = server
        .mock_async(|when, then| {
            when.method(PATCH).path("/pages/page-1");
            then.status(200).json_body(json!({ "id": "page-1" }));
        })
        .await;
    let mail = server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(200).json_body(json!({ "id": "mail-1" }));
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, true)).unwrap();
    let submission = orchestrator.submit_tracked(&payload()).await;
    assert!(submission.notification.is_some());
    let outcome = submission.settle(Duration::from_secs(5)).await;

    match outcome {
        SubmissionOutcome::Success {
            record_id,
            event_url,
        } => {
            assert_eq!(record_id, "page-1");
            assert_eq!(event_url, "https://calendar.example/evt-1");
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    create.assert_async().await;
    event.assert_async().await;
    link_back.assert_async().await;
    // settle 之後通知已經送出，不需要輪詢
    mail.assert_async().await;
}

#[tokio::test]
async fn test_zone_name_sets_offset_without_fixed_minutes() {
    let server = MockServer::start_async().await;

    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/pages").json_body_partial(
                r#"{ "properties": { "Date": { "date": { "start": "2024-05-14T09:30:00-05:00" } } } }"#,
            );
            then.status(200).json_body(json!({ "id": "page-9" }));
        })
        .await;
    let event = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/calendars/primary/events")
                .json_body_partial(
                    r#"{
                        "start": { "dateTime": "2024-05-14T09:30:00-05:00", "timeZone": "America/Chicago" },
                        "end": { "dateTime": "2024-05-14T14:30:00-05:00", "timeZone": "America/Chicago" }
                    }"#,
                );
            then.status(200)
                .json_body(json!({ "id": "evt-9", "htmlLink": "https://calendar.example/evt-9" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/pages/page-9");
            then.status(200).json_body(json!({ "id": "page-9" }));
        })
        .await;

    let content = config_text(&server, false).replace("utc_offset_minutes = 360\n", "");
    let config = BookingConfig::from_toml_str(&content).unwrap();
    let outcome = build_orchestrator(&config).unwrap().submit(&payload()).await;

    assert!(outcome.is_success());
    create.assert_async().await;
    event.assert_async().await;
}

#[tokio::test]
async fn test_huge_quote_is_rejected_without_calls() {
    let server = MockServer::start_async().await;
    let anything = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, false)).unwrap();
    let mut p = payload();
    p.quote = Some(1.0e12);

    let outcome = orchestrator.submit(&p).await;
    assert!(matches!(
        outcome,
        SubmissionOutcome::ValidationError(BookingError::ValidationError { ref field, .. })
            if field == "quote"
    ));
    assert_eq!(anything.hits_async().await, 0);
}

#[tokio::test]
async fn test_calendar_failure_keeps_record() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/pages");
            then.status(200).json_body(json!({ "id": "page-2" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/calendars/primary/events");
            then.status(503).body("backend error");
        })
        .await;
    let any_patch = server
        .mock_async(|when, then| {
            when.method(PATCH);
            then.status(200);
        })
        .await;
    let any_delete = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(200);
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, false)).unwrap();
    let outcome = orchestrator.submit(&payload()).await;

    match outcome {
        SubmissionOutcome::RecordCreatedCalendarFailed { record_id, error } => {
            assert_eq!(record_id, "page-2");
            assert!(matches!(
                error,
                BookingError::CalendarServiceError {
                    kind: FailureKind::Unavailable,
                    ..
                }
            ));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(any_patch.hits_async().await, 0);
    assert_eq!(any_delete.hits_async().await, 0);
}

#[tokio::test]
async fn test_record_failure_skips_calendar() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/pages");
            then.status(404).json_body(json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find database with ID: db-42."
            }));
        })
        .await;
    let event = server
        .mock_async(|when, then| {
            when.method(POST).path("/calendars/primary/events");
            then.status(200).json_body(json!({ "id": "evt", "htmlLink": "https://x" }));
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, false)).unwrap();
    let outcome = orchestrator.submit(&payload()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::RecordServiceError(BookingError::RecordServiceError {
            kind: FailureKind::NotFound,
            ..
        })
    ));
    assert_eq!(event.hits_async().await, 0);
}

#[tokio::test]
async fn test_validation_error_makes_no_external_calls() {
    let server = MockServer::start_async().await;
    let anything = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, true)).unwrap();
    let mut p = payload();
    p.scheduled_by = None;

    let outcome = orchestrator.submit(&p).await;
    assert!(matches!(outcome, SubmissionOutcome::ValidationError(_)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(anything.hits_async().await, 0);
}

#[tokio::test]
async fn test_notification_failure_is_ignored() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/pages");
            then.status(200).json_body(json!({ "id": "page-3" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/calendars/primary/events");
            then.status(200)
                .json_body(json!({ "id": "evt-3", "htmlLink": "https://calendar.example/evt-3" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/pages/page-3");
            then.status(500);
        })
        .await;
    let mail = server
        .mock_async(|when, then| {
            when.method(POST).path("/emails");
            then.status(500).body("mail relay down");
        })
        .await;

    let orchestrator = build_orchestrator(&config_for(&server, true)).unwrap();
    let outcome = orchestrator.submit(&payload()).await;

    // 回寫連結與通知都失敗，結果仍是成功
    assert!(outcome.is_success());
    assert_eq!(wait_for_hits(&mail, 1).await, 1);
}

#[test]
fn test_missing_credentials_fail_before_any_call() {
    let content = r#"
[timezone]
name = "America/Chicago"

[staff]
schedulers = ["Alex"]

[record_service]
token = "${WASH_BOOKING_TEST_NEVER_SET}"
database_id = "db-42"

[calendar_service]
access_token = "ya29.token"
"#;
    let config = BookingConfig::from_toml_str(content).unwrap();
    let err = build_orchestrator(&config).err().unwrap();
    assert!(matches!(err, BookingError::MissingConfigError { .. }));
}
