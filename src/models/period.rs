use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

/// Season of each month, January first.
const SEASON_BY_MONTH: [Season; 12] = [
    Season::Winter,
    Season::Winter,
    Season::Spring,
    Season::Spring,
    Season::Spring,
    Season::Summer,
    Season::Summer,
    Season::Summer,
    Season::Autumn,
    Season::Autumn,
    Season::Autumn,
    Season::Winter,
];

impl Season {
    pub fn from_month(month: u32) -> Option<Self> {
        month
            .checked_sub(1)
            .and_then(|i| SEASON_BY_MONTH.get(i as usize))
            .copied()
    }

    pub fn of(date: NaiveDate) -> Self {
        SEASON_BY_MONTH[date.month0() as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity at which daily values are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Yearly,
    Seasonal,
}

impl Frequency {
    /// Accounting period of `date` when its days are attributed to `year`.
    pub fn period(&self, year: i32, date: NaiveDate) -> PeriodKey {
        match self {
            Frequency::Yearly => PeriodKey::year(year),
            Frequency::Seasonal => PeriodKey::season(year, Season::of(date)),
        }
    }

    /// Accounting period of `date` labelled by its own calendar year.
    pub fn calendar_period(&self, date: NaiveDate) -> PeriodKey {
        self.period(date.year(), date)
    }
}

/// Row label of an aggregate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub season: Option<Season>,
}

impl PeriodKey {
    pub fn year(year: i32) -> Self {
        Self { year, season: None }
    }

    pub fn season(year: i32, season: Season) -> Self {
        Self {
            year,
            season: Some(season),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.season {
            Some(season) => write!(f, "{}-{}", self.year, season),
            None => write!(f, "{}", self.year),
        }
    }
}
