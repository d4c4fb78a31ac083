// Adapters layer: concrete HTTP implementations of the domain ports.

pub mod google_calendar;
pub mod http;
pub mod mailer;
pub mod notion;

pub use google_calendar::GoogleCalendarService;
pub use mailer::HttpMailer;
pub use notion::NotionRecordService;
