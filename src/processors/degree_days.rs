use crate::error::Result;
use crate::models::{DailyExtremum, DailyExtremumTable, DegreeDayTable, Frequency, PeriodKey};
use crate::processors::SeasonalWindow;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Météo-France partial-day weights: `gap * (A + B * gap / span)`.
const PARTIAL_DAY_OFFSET: f64 = 0.08;
const PARTIAL_DAY_SLOPE: f64 = 0.42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeDayMode {
    /// Degree-days below the reference temperature.
    Heating,
    /// Degree-days above the reference temperature.
    Cooling,
}

impl DegreeDayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeDayMode::Heating => "heating",
            DegreeDayMode::Cooling => "cooling",
        }
    }

    /// Degree-day contribution of one day, or `None` when MIN or MAX is missing.
    ///
    /// Heating: `ref - mean` when MAX < ref, the partial-day formula on
    /// `ref - MIN` when MIN < ref < MAX, nothing otherwise. Cooling mirrors it
    /// around MAX. A day touching the reference without crossing it adds 0.
    pub fn contribution(&self, day: DailyExtremum, ref_value: f64) -> Option<f64> {
        let (min, max) = day.pair()?;
        let mean = (min + max) / 2.0;

        let value = match self {
            DegreeDayMode::Heating => {
                if max < ref_value {
                    ref_value - mean
                } else if min < ref_value && ref_value < max {
                    partial_day(ref_value - min, max - min)
                } else {
                    0.0
                }
            }
            DegreeDayMode::Cooling => {
                if min > ref_value {
                    mean - ref_value
                } else if min < ref_value && ref_value < max {
                    partial_day(max - ref_value, max - min)
                } else {
                    0.0
                }
            }
        };

        Some(value)
    }
}

impl fmt::Display for DegreeDayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold crossed within the day. A flat day has no span to interpolate
/// over and contributes nothing.
fn partial_day(gap: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    gap * (PARTIAL_DAY_OFFSET + PARTIAL_DAY_SLOPE * gap / span)
}

/// Sums daily degree-days inside the seasonal window per accounting period.
pub struct DegreeDayAggregator {
    mode: DegreeDayMode,
    ref_value: f64,
    frequency: Frequency,
}

impl DegreeDayAggregator {
    pub fn new(mode: DegreeDayMode, ref_value: f64) -> Self {
        Self {
            mode,
            ref_value,
            frequency: Frequency::Yearly,
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Accounting period of `date`, or `None` outside the window.
    pub fn period_of(&self, window: &SeasonalWindow, date: chrono::NaiveDate) -> Option<PeriodKey> {
        window
            .year_label(date)
            .map(|year| self.frequency.period(year, date))
    }

    /// One row per accounting period of the window. A cell is no-data when
    /// the station has no complete day inside that period.
    pub fn aggregate(
        &self,
        table: &DailyExtremumTable,
        window: &SeasonalWindow,
    ) -> Result<DegreeDayTable> {
        let periods: Vec<PeriodKey> = window
            .all_dates()
            .into_iter()
            .map(|(year, date)| self.frequency.period(year, date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_periods: Vec<Option<usize>> = table
            .dates()
            .iter()
            .map(|date| {
                self.period_of(window, *date)
                    .and_then(|p| periods.binary_search(&p).ok())
            })
            .collect();

        let columns: Vec<Vec<Option<f64>>> = table
            .columns()
            .par_iter()
            .map(|column| {
                let mut sums: Vec<Option<f64>> = vec![None; periods.len()];
                for (day, period) in column.iter().zip(&row_periods) {
                    let (Some(period), Some(value)) =
                        (period, self.mode.contribution(*day, self.ref_value))
                    else {
                        continue;
                    };
                    let sum = sums[*period].get_or_insert(0.0);
                    *sum += value;
                }
                sums
            })
            .collect();

        debug!(
            mode = %self.mode,
            ref_value = self.ref_value,
            periods = periods.len(),
            "aggregated degree-days"
        );

        DegreeDayTable::new(table.stations().clone(), periods, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationSet;
    use crate::processors::MonthDay;
    use chrono::NaiveDate;

    fn day(min: f64, max: f64) -> DailyExtremum {
        DailyExtremum::new(Some(min), Some(max))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_heating_partial_day() {
        let value = DegreeDayMode::Heating.contribution(day(10.0, 22.0), 18.0).unwrap();
        assert_close(value, 2.88);
    }

    #[test]
    fn test_heating_branches() {
        let heating = DegreeDayMode::Heating;
        assert_close(heating.contribution(day(4.0, 10.0), 18.0).unwrap(), 11.0);
        assert_close(heating.contribution(day(18.0, 25.0), 18.0).unwrap(), 0.0);
        assert_close(heating.contribution(day(20.0, 25.0), 18.0).unwrap(), 0.0);
        // MAX on the threshold is not a crossing.
        assert_close(heating.contribution(day(10.0, 18.0), 18.0).unwrap(), 0.0);
        assert_close(heating.contribution(day(18.0, 18.0), 18.0).unwrap(), 0.0);
        assert_close(heating.contribution(day(10.0, 17.9), 18.0).unwrap(), 4.05);
        assert!(heating
            .contribution(DailyExtremum::new(Some(3.0), None), 18.0)
            .is_none());
    }

    #[test]
    fn test_cooling_branches() {
        let cooling = DegreeDayMode::Cooling;
        assert_close(cooling.contribution(day(20.0, 30.0), 18.0).unwrap(), 7.0);
        assert_close(cooling.contribution(day(5.0, 18.0), 18.0).unwrap(), 0.0);
        // (22 - 18) * (0.08 + 0.42 * 4 / 12)
        assert_close(cooling.contribution(day(10.0, 22.0), 18.0).unwrap(), 0.88);
        // MIN on the threshold is not a crossing.
        assert_close(cooling.contribution(day(18.0, 24.0), 18.0).unwrap(), 0.0);
        assert_close(cooling.contribution(day(18.1, 24.0), 18.0).unwrap(), 3.05);
    }

    #[test]
    fn test_flat_day_contributes_nothing() {
        assert_close(partial_day(0.0, 0.0), 0.0);
        assert_close(partial_day(1.0, 0.0), 0.0);
    }

    fn table(dates: &[NaiveDate], days: Vec<DailyExtremum>) -> DailyExtremumTable {
        DailyExtremumTable::new(
            StationSet::new(vec!["A".to_string()]).unwrap(),
            dates.to_vec(),
            vec![days],
        )
        .unwrap()
    }

    #[test]
    fn test_sum_restricted_to_window() {
        let dates = [
            NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2021, 7, 10).unwrap(),
            NaiveDate::from_ymd_opt(2021, 11, 10).unwrap(),
        ];
        let table = table(&dates, vec![day(0.0, 10.0), day(0.0, 10.0), day(2.0, 6.0)]);
        let window = SeasonalWindow::for_table(
            "10-01".parse::<MonthDay>().unwrap(),
            "05-20".parse::<MonthDay>().unwrap(),
            &table,
        )
        .unwrap();

        let result = DegreeDayAggregator::new(DegreeDayMode::Heating, 18.0)
            .aggregate(&table, &window)
            .unwrap();

        assert_eq!(result.periods(), &[PeriodKey::year(2021)]);
        assert_close(result.value(PeriodKey::year(2021), "A").unwrap(), 13.0 + 14.0);
    }

    #[test]
    fn test_period_without_complete_day_is_no_data() {
        let dates = [NaiveDate::from_ymd_opt(2021, 2, 1).unwrap()];
        let table = table(&dates, vec![DailyExtremum::new(None, Some(3.0))]);
        let window = SeasonalWindow::for_table(
            "01-01".parse::<MonthDay>().unwrap(),
            "12-31".parse::<MonthDay>().unwrap(),
            &table,
        )
        .unwrap();

        let result = DegreeDayAggregator::new(DegreeDayMode::Heating, 18.0)
            .aggregate(&table, &window)
            .unwrap();

        assert_eq!(result.value(PeriodKey::year(2021), "A"), None);
    }
}
