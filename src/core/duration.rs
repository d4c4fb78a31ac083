use crate::utils::error::{BookingError, Result};
use chrono::Duration;

/// 以每小時 $60 計價
pub const HOURLY_RATE: f64 = 60.0;
pub const MIN_DURATION_HOURS: f64 = 0.5;

/// 報價換算成工時，無條件進位到半小時，最少半小時
pub fn estimate_duration_hours(quote: f64) -> f64 {
    if !quote.is_finite() || quote <= 0.0 {
        return MIN_DURATION_HOURS;
    }

    let hours = ((quote / HOURLY_RATE) * 2.0).ceil() / 2.0;
    hours.max(MIN_DURATION_HOURS)
}

pub fn estimate_duration(quote: f64) -> Result<Duration> {
    // 半小時的倍數，換成分鐘不會有誤差；`as` 轉換會飽和，超出範圍交給 try_minutes
    let minutes = estimate_duration_hours(quote) * 60.0;
    Duration::try_minutes(minutes as i64).ok_or_else(|| {
        BookingError::validation("quote", format!("{} is too large to schedule", quote))
    })
}
