//! Calendar periods for leaderboard requests

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Month => "month",
            Period::ThreeMonths => "three_months",
            Period::SixMonths => "six_months",
            Period::Year => "year",
        }
    }

    /// Human-readable label used in leaderboard titles
    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Month => "Last Month",
            Period::ThreeMonths => "Last 3 Months",
            Period::SixMonths => "Last 6 Months",
            Period::Year => "Last Year",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "today" => Some(Period::Today),
            "month" => Some(Period::Month),
            "three_months" => Some(Period::ThreeMonths),
            "six_months" => Some(Period::SixMonths),
            "year" => Some(Period::Year),
            _ => None,
        }
    }

    pub fn all() -> [Period; 5] {
        [
            Period::Today,
            Period::Month,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::Year,
        ]
    }

    fn months_back(&self) -> u32 {
        match self {
            Period::Today => 0,
            Period::Month => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::Year => 12,
        }
    }

    /// Inclusive `[start, end]` window ending at `now`
    ///
    /// `start` is `now` moved back by the period's calendar offset and floored
    /// to local midnight in `now`'s time zone. Month arithmetic clamps to the
    /// last day of a shorter target month (Mar 31 minus one month is Feb 29/28).
    pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let start_date = today
            .checked_sub_months(Months::new(self.months_back()))
            .unwrap_or(NaiveDate::MIN);

        let start = local_midnight(&now.timezone(), start_date)
            .unwrap_or_else(|| now.with_timezone(&Utc));

        (start, now.with_timezone(&Utc))
    }
}

/// First instant of `date` in `tz`
///
/// Falls forward hour by hour when midnight is skipped by a DST transition.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    (0..24).find_map(|hour| {
        date.and_hms_opt(hour, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            .map(|dt| dt.with_timezone(&Utc))
    })
}
