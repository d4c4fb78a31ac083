pub mod duration;
pub mod intake;
pub mod notification;
pub mod orchestrator;
pub mod pricing;
pub mod quote;
pub mod timestamp;

pub use crate::domain::model::{JobRequest, JobRequestPayload, PricePoint, SubmissionOutcome};
pub use crate::domain::ports::{CalendarService, NotificationService, RecordService};
pub use crate::utils::error::Result;
