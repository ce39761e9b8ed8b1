use crate::error::{ProcessingError, Result};
use crate::models::{DailyExtremum, DailyExtremumTable, Frequency, HeatWaveTable, PeriodKey};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Counts heat-wave days: hot days preceded by at least `threshold_duration`
/// consecutive hot calendar days.
pub struct HeatWaveCounter {
    threshold_night: f64,
    threshold_day: f64,
    threshold_duration: usize,
    frequency: Frequency,
}

impl HeatWaveCounter {
    pub fn new(threshold_night: f64, threshold_day: f64, threshold_duration: usize) -> Result<Self> {
        if threshold_duration == 0 {
            return Err(ProcessingError::Config(
                "Heat-wave duration must be at least one day".to_string(),
            ));
        }

        Ok(Self {
            threshold_night,
            threshold_day,
            threshold_duration,
            frequency: Frequency::Yearly,
        })
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Night (MIN) and day (MAX) both strictly above their thresholds.
    pub fn is_hot(&self, day: DailyExtremum) -> bool {
        day.pair()
            .is_some_and(|(min, max)| min > self.threshold_night && max > self.threshold_day)
    }

    pub fn count(&self, table: &DailyExtremumTable) -> Result<HeatWaveTable> {
        let periods: Vec<PeriodKey> = table
            .dates()
            .iter()
            .map(|date| self.frequency.calendar_period(*date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_periods: Vec<usize> = table
            .dates()
            .iter()
            .map(|date| {
                let period = self.frequency.calendar_period(*date);
                periods.partition_point(|p| *p < period)
            })
            .collect();

        let columns: Vec<Vec<Option<u32>>> = table
            .columns()
            .par_iter()
            .map(|column| self.count_column(table.dates(), column, &row_periods, periods.len()))
            .collect();

        debug!(
            night = self.threshold_night,
            day = self.threshold_day,
            duration = self.threshold_duration,
            periods = periods.len(),
            "counted heat-wave days"
        );

        HeatWaveTable::new(table.stations().clone(), periods, columns)
    }

    fn count_column(
        &self,
        dates: &[NaiveDate],
        column: &[DailyExtremum],
        row_periods: &[usize],
        period_count: usize,
    ) -> Vec<Option<u32>> {
        let mut counts: Vec<Option<u32>> = vec![None; period_count];
        let mut run = 0usize;
        let mut previous: Option<NaiveDate> = None;

        for ((date, day), period) in dates.iter().zip(column).zip(row_periods) {
            let consecutive = previous.and_then(|p| p.succ_opt()) == Some(*date);
            run = if !self.is_hot(*day) {
                0
            } else if consecutive {
                run + 1
            } else {
                1
            };
            previous = Some(*date);

            if day.pair().is_none() {
                continue;
            }
            let count = counts[*period].get_or_insert(0);
            if run > self.threshold_duration {
                *count += 1;
            }
        }

        counts
    }
}
