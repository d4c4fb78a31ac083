use crate::domain::model::SubmissionOutcome;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// 提交端點的回應內容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SubmissionResponse {
    #[serde(rename = "success", rename_all = "camelCase")]
    Success { record_id: String, event_url: String },

    #[serde(rename = "partial", rename_all = "camelCase")]
    Partial { record_id: String, error: String },

    #[serde(rename = "error", rename_all = "camelCase")]
    Error { error_message: String },
}

impl SubmissionResponse {
    pub fn error(message: impl Into<String>) -> Self {
        SubmissionResponse::Error {
            error_message: message.into(),
        }
    }
}

impl From<&SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success {
                record_id,
                event_url,
            } => SubmissionResponse::Success {
                record_id: record_id.clone(),
                event_url: event_url.clone(),
            },
            SubmissionOutcome::RecordCreatedCalendarFailed { record_id, error } => {
                SubmissionResponse::Partial {
                    record_id: record_id.clone(),
                    error: error.to_string(),
                }
            }
            SubmissionOutcome::ValidationError(e) | SubmissionOutcome::RecordServiceError(e) => {
                SubmissionResponse::error(e.user_friendly_message())
            }
        }
    }
}

pub fn status_code(outcome: &SubmissionOutcome) -> StatusCode {
    match outcome {
        SubmissionOutcome::Success { .. } | SubmissionOutcome::RecordCreatedCalendarFailed { .. } => {
            StatusCode::OK
        }
        SubmissionOutcome::ValidationError(_) => StatusCode::BAD_REQUEST,
        SubmissionOutcome::RecordServiceError(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{BookingError, FailureKind};

    #[test]
    fn test_json_shapes() {
        let success = serde_json::to_value(SubmissionResponse::Success {
            record_id: "rec-1".to_string(),
            event_url: "https://cal/e".to_string(),
        })
        .unwrap();
        assert_eq!(
            success,
            serde_json::json!({"status": "success", "recordId": "rec-1", "eventUrl": "https://cal/e"})
        );

        let failure = serde_json::to_value(SubmissionResponse::error("nope")).unwrap();
        assert_eq!(
            failure,
            serde_json::json!({"status": "error", "errorMessage": "nope"})
        );
    }

    #[test]
    fn test_partial_outcome() {
        let outcome = SubmissionOutcome::RecordCreatedCalendarFailed {
            record_id: "rec-9".to_string(),
            error: BookingError::CalendarServiceError {
                kind: FailureKind::NotFound,
                message: "calendar missing".to_string(),
            },
        };
        assert_eq!(status_code(&outcome), StatusCode::OK);
        assert_eq!(
            SubmissionResponse::from(&outcome),
            SubmissionResponse::Partial {
                record_id: "rec-9".to_string(),
                error: "Calendar service error (not found): calendar missing".to_string(),
            }
        );
    }
}
