use crate::error::{ProcessingError, Result};
use crate::models::DailyExtremumTable;
use crate::utils::constants::WINDOW_REFERENCE_YEAR;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Month and day of a window bound, written `MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    const JAN_1: MonthDay = MonthDay { month: 1, day: 1 };
    const DEC_31: MonthDay = MonthDay { month: 12, day: 31 };

    /// Météo-France heating season, Oct 1 to May 20.
    pub const HEATING_SEASON_START: MonthDay = MonthDay { month: 10, day: 1 };
    pub const HEATING_SEASON_END: MonthDay = MonthDay { month: 5, day: 20 };

    /// Bounds are checked against a non-leap reference year, so Feb 29 is
    /// rejected: it would not exist in most accounting years.
    pub fn new(month: u32, day: u32) -> Result<Self> {
        let invalid = |reason: &str| ProcessingError::InvalidMonthDay {
            value: format!("{:02}-{:02}", month, day),
            reason: reason.to_string(),
        };

        if !(1..=12).contains(&month) {
            return Err(invalid("month must be within 1-12"));
        }
        if !(1..=31).contains(&day) {
            return Err(invalid("day must be within 1-31"));
        }
        if NaiveDate::from_ymd_opt(WINDOW_REFERENCE_YEAR, month, day).is_none() {
            return Err(invalid("not a calendar date"));
        }

        Ok(Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    fn in_year(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or_else(|| {
            ProcessingError::Config(format!("{} is out of range for year {}", self, year))
        })
    }
}

impl FromStr for MonthDay {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ProcessingError::InvalidMonthDay {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (month, day) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("expected MM-DD"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| invalid("month is not a number"))?;
        let day = day.parse::<u32>().map_err(|_| invalid("day is not a number"))?;

        Self::new(month, day).map_err(|_| invalid("not a calendar date"))
    }
}

impl TryFrom<String> for MonthDay {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Degree-day accounting window for each year of the data.
///
/// A window crossing Jan 1 (start after end, e.g. `10-01` to `05-20`) is
/// folded into a single calendar year: year Y covers Jan 1 to the end bound
/// and the start bound to Dec 31, both of year Y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonalWindow {
    start: MonthDay,
    end: MonthDay,
    ranges: BTreeMap<i32, Vec<(NaiveDate, NaiveDate)>>,
}

impl SeasonalWindow {
    pub fn build<I>(start: MonthDay, end: MonthDay, years: I) -> Result<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut ranges = BTreeMap::new();

        for year in years {
            let year_ranges = if start <= end {
                vec![(start.in_year(year)?, end.in_year(year)?)]
            } else {
                vec![
                    (Self::jan_1(year)?, end.in_year(year)?),
                    (start.in_year(year)?, Self::dec_31(year)?),
                ]
            };
            ranges.insert(year, year_ranges);
        }

        debug!(%start, %end, years = ranges.len(), "built seasonal window");

        Ok(Self { start, end, ranges })
    }

    fn jan_1(year: i32) -> Result<NaiveDate> {
        MonthDay::JAN_1.in_year(year)
    }

    fn dec_31(year: i32) -> Result<NaiveDate> {
        MonthDay::DEC_31.in_year(year)
    }

    /// Window over the distinct years of a daily table.
    pub fn for_table(start: MonthDay, end: MonthDay, table: &DailyExtremumTable) -> Result<Self> {
        Self::build(start, end, table.years())
    }

    pub fn start(&self) -> MonthDay {
        self.start
    }

    pub fn end(&self) -> MonthDay {
        self.end
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.ranges.keys().copied()
    }

    /// Year whose window contains `date`, if any.
    pub fn year_label(&self, date: NaiveDate) -> Option<i32> {
        let year = date.year();
        self.ranges
            .get(&year)?
            .iter()
            .any(|(from, to)| (*from..=*to).contains(&date))
            .then_some(year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.year_label(date).is_some()
    }

    /// Dates of one year's window, ascending.
    pub fn dates(&self, year: i32) -> Vec<NaiveDate> {
        self.ranges
            .get(&year)
            .map(|ranges| {
                ranges
                    .iter()
                    .flat_map(|(from, to)| {
                        let to = *to;
                        from.iter_days().take_while(move |d| *d <= to)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every (year label, date) pair of the window, ascending.
    pub fn all_dates(&self) -> Vec<(i32, NaiveDate)> {
        self.years()
            .flat_map(|year| self.dates(year).into_iter().map(move |d| (year, d)))
            .collect()
    }
}
