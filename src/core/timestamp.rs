use crate::utils::error::{BookingError, Result};
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use chrono_tz::Tz;

/// UTC+14:00，以「落後 UTC 的分鐘數」表示
pub const MIN_OFFSET_MINUTES: i32 = -14 * 60;
/// UTC-12:00
pub const MAX_OFFSET_MINUTES: i32 = 12 * 60;

/// 時區偏移的來源。數值一律是落後 UTC 的分鐘數（UTC-06:00 為 360）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSource {
    Fixed(i32),
    /// IANA 時區，依日期套用日光節約時間
    Zone(Tz),
}

impl OffsetSource {
    /// 解析 IANA 名稱，例如 "America/Chicago"
    pub fn zone(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(OffsetSource::Zone)
            .map_err(|e| BookingError::InvalidConfigValueError {
                field: "timezone.name".to_string(),
                value: name.to_string(),
                reason: format!("Unknown IANA timezone: {}", e),
            })
    }

    /// 牆上時間對應到的絕對時刻
    pub fn resolve(&self, local: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        match self {
            OffsetSource::Fixed(minutes) => {
                let offset = fixed_offset(*minutes)?;
                match offset.from_local_datetime(&local) {
                    LocalResult::Single(dt) => Ok(dt),
                    _ => Err(out_of_range(local)),
                }
            }
            OffsetSource::Zone(tz) => match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => Ok(dt.fixed_offset()),
                // 日光節約結束時重複的那一小時取較早者
                LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
                LocalResult::None => Err(BookingError::validation(
                    "jobTime",
                    format!("{} does not exist in {}", local, tz.name()),
                )),
            },
        }
    }

    /// 把絕對時刻換回這個時區的牆上時間與偏移
    pub fn localize(&self, instant: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
        match self {
            OffsetSource::Fixed(minutes) => Ok(instant.with_timezone(&fixed_offset(*minutes)?)),
            OffsetSource::Zone(tz) => {
                let local = instant.with_timezone(tz);
                Ok(local.with_timezone(&local.offset().fix()))
            }
        }
    }

    pub fn minutes_behind_utc(&self, local: NaiveDateTime) -> Result<i32> {
        self.resolve(local).map(|dt| minutes_behind(&dt))
    }
}

fn fixed_offset(minutes_behind_utc: i32) -> Result<FixedOffset> {
    minutes_behind_utc
        .checked_mul(60)
        .and_then(FixedOffset::west_opt)
        .ok_or_else(|| offset_error(minutes_behind_utc))
}

fn offset_error(minutes_behind_utc: i32) -> BookingError {
    BookingError::validation(
        "utc_offset_minutes",
        format!(
            "{} is outside the valid range {}..={}",
            minutes_behind_utc, MIN_OFFSET_MINUTES, MAX_OFFSET_MINUTES
        ),
    )
}

fn out_of_range(local: NaiveDateTime) -> BookingError {
    BookingError::validation("jobDate", format!("{} is outside the supported range", local))
}

fn minutes_behind(dt: &DateTime<FixedOffset>) -> i32 {
    -dt.offset().local_minus_utc() / 60
}

/// 偏移字尾。符號與輸入相反：落後 UTC 360 分鐘輸出 `-06:00`
pub fn format_offset(minutes_behind_utc: i32) -> String {
    let sign = if minutes_behind_utc > 0 { '-' } else { '+' };
    let minutes = minutes_behind_utc.unsigned_abs();
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// 組出 `YYYY-MM-DDTHH:mm:ss±HH:mm`，保留牆上時間，不轉成 UTC
pub fn build_local_timestamp(
    date: NaiveDate,
    time: NaiveTime,
    minutes_behind_utc: i32,
) -> Result<String> {
    if !(MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes_behind_utc) {
        return Err(offset_error(minutes_behind_utc));
    }

    Ok(format!(
        "{}T{}{}",
        date.format("%Y-%m-%d"),
        time.format("%H:%M:%S"),
        format_offset(minutes_behind_utc)
    ))
}

fn render(dt: &DateTime<FixedOffset>) -> Result<String> {
    let local = dt.naive_local();
    build_local_timestamp(local.date(), local.time(), minutes_behind(dt))
}

/// 反向解析，回傳 (日期, 時間, 落後 UTC 的分鐘數)
pub fn parse_local_timestamp(value: &str) -> Result<(NaiveDate, NaiveTime, i32)> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
        BookingError::validation("timestamp", format!("'{}' is not ISO8601: {}", value, e))
    })?;
    let local = parsed.naive_local();
    Ok((local.date(), local.time(), minutes_behind(&parsed)))
}

/// 行事曆事件的開始與結束時間
#[derive(Debug, Clone, PartialEq)]
pub struct EventWindow {
    pub start: String,
    pub end: String,
}

/// 結束時間 = 開始的絕對時刻 + 工時，再換回該時區的牆上時間
pub fn event_window(
    date: NaiveDate,
    time: NaiveTime,
    duration: Duration,
    offsets: OffsetSource,
) -> Result<EventWindow> {
    let start = offsets.resolve(date.and_time(time))?;
    let end = start.checked_add_signed(duration).ok_or_else(|| {
        BookingError::validation("quote", "job would end outside the supported date range")
    })?;
    let end = offsets.localize(end)?;

    Ok(EventWindow {
        start: render(&start)?,
        end: render(&end)?,
    })
}
