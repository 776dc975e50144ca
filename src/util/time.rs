//! Date and time formatting and arithmetic.
//!
//! All values are wall-clock times in the local time zone (`NaiveDateTime`).
//! Functions that need "now" have a variant taking an explicit reference point.

use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike,
};

pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

const WEEKDAYS_ZH: [&str; 7] = [
    "星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六",
];
const WEEKDAYS_EN: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const WEEKDAYS_EN_SHORT: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS_ZH: [&str; 12] = [
    "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月",
    "十二月",
];
const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Layout of a compact digit string for `format_num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    /// `YYYYMMDD`
    Date,
    /// `HHmmss`
    Time,
    /// `YYYYMMDDHHmmss`
    DateTime,
    /// Chosen by digit count
    Auto,
}

impl FromStr for NumKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DT_NUM" | "date" => Ok(Self::Date),
            "TM_NUM" | "time" => Ok(Self::Time),
            "DTTM_NUM" | "datetime" => Ok(Self::DateTime),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown number layout: {other}")),
        }
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn today() -> NaiveDate {
    now().date()
}

/// Replace `YYYY MM DD HH mm ss SSS` in `pattern`, each token once, in that order.
pub fn format_date(date: &NaiveDateTime, pattern: &str) -> String {
    let millis = date.nanosecond() / 1_000_000;
    pattern
        .replacen("YYYY", &date.year().to_string(), 1)
        .replacen("MM", &format!("{:02}", date.month()), 1)
        .replacen("DD", &format!("{:02}", date.day()), 1)
        .replacen("HH", &format!("{:02}", date.hour()), 1)
        .replacen("mm", &format!("{:02}", date.minute()), 1)
        .replacen("ss", &format!("{:02}", date.second()), 1)
        .replacen("SSS", &format!("{:03}", millis), 1)
}

/// Lay out a compact digit string; non-digits are dropped first.
///
/// Input whose length does not fit the layout comes back as the bare digits.
pub fn format_num(input: &str, kind: NumKind) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    let d = digits.as_str();
    let date = || format!("{}-{}-{}", &d[0..4], &d[4..6], &d[6..8]);
    let time = || format!("{}:{}:{}", &d[0..2], &d[2..4], &d[4..6]);
    let datetime = || {
        format!(
            "{}-{}-{} {}:{}:{}",
            &d[0..4],
            &d[4..6],
            &d[6..8],
            &d[8..10],
            &d[10..12],
            &d[12..14]
        )
    };

    match (kind, d.len()) {
        (NumKind::Date | NumKind::Auto, 8) => date(),
        (NumKind::Time | NumKind::Auto, 6) => time(),
        (NumKind::DateTime | NumKind::Auto, 14) => datetime(),
        _ => digits,
    }
}

/// Parse common textual date forms, RFC 3339, or a millisecond timestamp.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.chars().all(|c| c.is_ascii_digit()) {
        return match input.len() {
            8 => NaiveDate::parse_from_str(input, "%Y%m%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            14 => NaiveDateTime::parse_from_str(input, "%Y%m%d%H%M%S").ok(),
            _ => from_timestamp_millis(input.parse().ok()?),
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(input, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Milliseconds since the epoch, interpreting `date` in the local zone.
pub fn timestamp_millis(date: &NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(date)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

pub fn from_timestamp_millis(millis: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.naive_local())
}

/// 刚刚, N分钟前, N小时前, N天前, N个月前 or N年前 for `then` seen from `now`.
pub fn relative_time(then: &NaiveDateTime, now: &NaiveDateTime) -> String {
    let seconds = (*now - *then).num_milliseconds().div_euclid(1000);
    let minutes = seconds.div_euclid(60);
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);
    let months = days.div_euclid(30);
    let years = days.div_euclid(365);

    if seconds < 60 {
        "刚刚".to_string()
    } else if minutes < 60 {
        format!("{minutes}分钟前")
    } else if hours < 24 {
        format!("{hours}小时前")
    } else if days < 30 {
        format!("{days}天前")
    } else if months < 12 {
        format!("{months}个月前")
    } else {
        format!("{years}年前")
    }
}

pub fn relative_time_from_now(then: &NaiveDateTime) -> String {
    relative_time(then, &now())
}

pub fn date_start(date: &NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on the same day.
pub fn date_end(date: &NaiveDateTime) -> NaiveDateTime {
    date.date()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or(*date)
}

pub fn today_start() -> NaiveDateTime {
    date_start(&now())
}

pub fn today_end() -> NaiveDateTime {
    date_end(&now())
}

/// Whole days from `from` to `to`, rounded down; negative when `to` is earlier.
pub fn days_diff(from: &NaiveDateTime, to: &NaiveDateTime) -> i64 {
    (*to - *from).num_milliseconds().div_euclid(86_400_000)
}

/// Whether `date` falls on the day `offset` days away from `reference`.
pub fn is_day_offset(date: &NaiveDateTime, reference: NaiveDate, offset: i64) -> bool {
    Duration::try_days(offset)
        .and_then(|delta| reference.checked_add_signed(delta))
        .is_some_and(|day| day == date.date())
}

pub fn is_today(date: &NaiveDateTime) -> bool {
    is_day_offset(date, today(), 0)
}

pub fn is_yesterday(date: &NaiveDateTime) -> bool {
    is_day_offset(date, today(), -1)
}

pub fn is_tomorrow(date: &NaiveDateTime) -> bool {
    is_day_offset(date, today(), 1)
}

/// Out-of-range shifts leave `date` unchanged.
fn shift(date: &NaiveDateTime, delta: Option<Duration>) -> NaiveDateTime {
    delta
        .and_then(|d| date.checked_add_signed(d))
        .unwrap_or(*date)
}

pub fn add_days(date: &NaiveDateTime, days: i64) -> NaiveDateTime {
    shift(date, Duration::try_days(days))
}

pub fn prev_day(date: &NaiveDateTime) -> NaiveDateTime {
    add_days(date, -1)
}

pub fn add_hours(date: &NaiveDateTime, hours: i64) -> NaiveDateTime {
    shift(date, Duration::try_hours(hours))
}

pub fn add_minutes(date: &NaiveDateTime, minutes: i64) -> NaiveDateTime {
    shift(date, Duration::try_minutes(minutes))
}

/// Calendar months; the day is clamped to the target month's length (Jan 31 + 1 = Feb 28/29).
pub fn add_months(date: &NaiveDateTime, months: i32) -> NaiveDateTime {
    let delta = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    };
    shifted.unwrap_or(*date)
}

pub fn add_years(date: &NaiveDateTime, years: i32) -> NaiveDateTime {
    add_months(date, years.saturating_mul(12))
}

pub fn weekday_zh(date: &NaiveDateTime) -> &'static str {
    WEEKDAYS_ZH[date.weekday().num_days_from_sunday() as usize]
}

pub fn weekday_en(date: &NaiveDateTime, short: bool) -> &'static str {
    let idx = date.weekday().num_days_from_sunday() as usize;
    if short {
        WEEKDAYS_EN_SHORT[idx]
    } else {
        WEEKDAYS_EN[idx]
    }
}

pub fn month_name_zh(date: &NaiveDateTime) -> &'static str {
    MONTHS_ZH[date.month0() as usize]
}

pub fn month_name_en(date: &NaiveDateTime, short: bool) -> &'static str {
    let idx = date.month0() as usize;
    if short {
        MONTHS_EN_SHORT[idx]
    } else {
        MONTHS_EN[idx]
    }
}

/// Monday through Friday.
pub fn is_weekday(date: &NaiveDateTime) -> bool {
    !is_weekend(date)
}

pub fn is_weekend(date: &NaiveDateTime) -> bool {
    matches!(date.weekday().num_days_from_sunday(), 0 | 6)
}

/// 1-4
pub fn quarter(date: &NaiveDateTime) -> u32 {
    date.month0() / 3 + 1
}

/// Completed years between `birth` and `reference`.
pub fn age(birth: &NaiveDate, reference: &NaiveDate) -> i32 {
    let mut age = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Render a duration: 天/小时/分钟 when over a day, down to seconds otherwise.
pub fn format_duration(millis: i64) -> String {
    if millis <= 0 {
        return "0秒".to_string();
    }
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}天{}小时{}分钟", days, hours % 24, minutes % 60)
    } else if hours > 0 {
        format!("{}小时{}分钟{}秒", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}分钟{}秒", minutes, seconds % 60)
    } else {
        format!("{}秒", seconds)
    }
}

fn first_of_month(date: &NaiveDateTime) -> NaiveDate {
    date.date().with_day(1).unwrap_or(date.date())
}

pub fn month_start(date: &NaiveDateTime) -> NaiveDateTime {
    first_of_month(date).and_time(NaiveTime::MIN)
}

pub fn month_end(date: &NaiveDateTime) -> NaiveDateTime {
    let last = first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date.date());
    date_end(&last.and_time(NaiveTime::MIN))
}

pub fn year_start(date: &NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(*date)
}

pub fn year_end(date: &NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.year(), 12, 31)
        .map(|d| date_end(&d.and_time(NaiveTime::MIN)))
        .unwrap_or(*date)
}

pub fn is_same_year(a: &NaiveDateTime, b: &NaiveDateTime) -> bool {
    a.year() == b.year()
}

pub fn is_same_month(a: &NaiveDateTime, b: &NaiveDateTime) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Every day of the month containing `date`.
pub fn month_dates(date: &NaiveDateTime) -> Vec<NaiveDate> {
    let first = first_of_month(date);
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect()
}

/// Days from `date` to `date + days` inclusive, ascending, for either sign of `days`.
pub fn date_range(date: &NaiveDateTime, days: i64) -> Vec<NaiveDate> {
    let base = date.date();
    let Some(other) = Duration::try_days(days).and_then(|d| base.checked_add_signed(d)) else {
        return Vec::new();
    };
    let (start, end) = if other < base { (other, base) } else { (base, other) };
    start.iter_days().take_while(|d| *d <= end).collect()
}
