use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone};

use crate::error::{KpiError, Res};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const CHART_LABEL_FORMAT: &str = "%b %Y";
pub const TABLE_LABEL_FORMAT: &str = "%B %Y";

const SECONDS_PER_DAY: i64 = 86_400;

/// Reporting window in epoch seconds, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    pub fn new(start: i64, end: i64) -> Res<Self> {
        if start > end {
            return Err(KpiError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Builds a range covering whole UTC days: `start` at 00:00:00, `end` at 23:59:59.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Res<Self> {
        if start > end {
            return Err(KpiError::InvalidRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(DateRange {
            start: midnight_utc(start),
            end: midnight_utc(end) + SECONDS_PER_DAY - 1,
        })
    }

    /// Parses two `YYYY-MM-DD` calendar dates.
    pub fn parse(start: &str, end: &str) -> Res<Self> {
        Self::from_dates(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }

    pub fn contains_opt(&self, ts: Option<i64>) -> bool {
        ts.is_some_and(|ts| self.contains(ts))
    }

    /// Window of equal length ending one second before this one starts.
    pub fn previous(&self) -> DateRange {
        let length = self.end - self.start;
        DateRange {
            start: self.start - length - 1,
            end: self.start - 1,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.start, 0).map(|dt| dt.date_naive())
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.end, 0).map(|dt| dt.date_naive())
    }
}

pub fn parse_date(value: &str) -> Res<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| KpiError::InvalidDate(value.to_string()))
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// One calendar month in the reporting time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBin {
    pub first_day: NaiveDate,
    pub start: i64,
    pub end: i64,
}

impl MonthBin {
    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }

    pub fn label(&self, format: &str) -> String {
        self.first_day.format(format).to_string()
    }
}

/// Calendar months from the month containing `range.start` through `range.end`.
///
/// Months are not clipped to the range: the first and last bins cover their whole month.
pub fn month_bins(range: &DateRange, offset: FixedOffset) -> Vec<MonthBin> {
    let Some(local_start) = DateTime::from_timestamp(range.start, 0) else {
        return Vec::new();
    };
    let local_start = local_start.with_timezone(&offset);
    let Some(mut first_day) = NaiveDate::from_ymd_opt(local_start.year(), local_start.month(), 1)
    else {
        return Vec::new();
    };

    let mut bins = Vec::new();
    loop {
        let start = local_midnight(first_day, offset);
        if start > range.end {
            break;
        }
        let Some(next) = first_day.checked_add_months(Months::new(1)) else {
            break;
        };
        bins.push(MonthBin {
            first_day,
            start,
            end: local_midnight(next, offset) - 1,
        });
        first_day = next;
    }
    bins
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    match offset.from_local_datetime(&naive).single() {
        Some(dt) => dt.timestamp(),
        None => naive.and_utc().timestamp() - i64::from(offset.local_minus_utc()),
    }
}
