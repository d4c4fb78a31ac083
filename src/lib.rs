pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::responses::SubmissionResponse;
pub use config::BookingConfig;
pub use core::orchestrator::{JobSubmissionOrchestrator, Submission};
pub use core::pricing::PriceTable;
pub use utils::error::{BookingError, Result};
