use crate::error::{ProcessingError, Result};
use crate::models::{AggregateTable, DailyExtremumTable, MissingRule, PeriodKey, StationSet};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-period, per-station flag: too many missing days to trust the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NanMask {
    stations: StationSet,
    missing: BTreeMap<PeriodKey, Vec<usize>>,
    nb_nan: usize,
}

impl NanMask {
    pub fn missing_days(&self, period: PeriodKey, station: usize) -> usize {
        self.missing
            .get(&period)
            .and_then(|counts| counts.get(station))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_masked(&self, period: PeriodKey, station: usize) -> bool {
        self.missing_days(period, station) >= self.nb_nan
    }

    pub fn masked_cells(&self) -> usize {
        self.missing
            .values()
            .flatten()
            .filter(|count| **count >= self.nb_nan)
            .count()
    }
}

/// Forces aggregate cells to no-data when their period had `nb_nan` or more
/// missing daily observations.
pub struct MissingDataMasker {
    nb_nan: usize,
}

impl MissingDataMasker {
    pub fn new(nb_nan: usize) -> Result<Self> {
        if nb_nan == 0 {
            return Err(ProcessingError::Config(
                "nb_nan must be at least 1".to_string(),
            ));
        }
        Ok(Self { nb_nan })
    }

    pub fn nb_nan(&self) -> usize {
        self.nb_nan
    }

    /// Count missing days of `reference` per accounting period. Days for which
    /// `period_of` returns `None` are outside every period and not counted.
    pub fn nan_mask<F>(&self, reference: &DailyExtremumTable, rule: MissingRule, period_of: F) -> NanMask
    where
        F: Fn(NaiveDate) -> Option<PeriodKey>,
    {
        let stations = reference.stations().clone();
        let mut missing: BTreeMap<PeriodKey, Vec<usize>> = BTreeMap::new();

        for (row, date) in reference.dates().iter().enumerate() {
            let Some(period) = period_of(*date) else {
                continue;
            };
            let counts = missing
                .entry(period)
                .or_insert_with(|| vec![0; stations.len()]);
            for (station, count) in counts.iter_mut().enumerate() {
                if reference.column(station)[row].is_missing(rule) {
                    *count += 1;
                }
            }
        }

        NanMask {
            stations,
            missing,
            nb_nan: self.nb_nan,
        }
    }

    pub fn apply<T: Copy>(&self, mut table: AggregateTable<T>, mask: &NanMask) -> Result<AggregateTable<T>> {
        if table.stations() != &mask.stations {
            return Err(ProcessingError::InvalidSeries(
                "Mask and aggregate table have different stations".to_string(),
            ));
        }

        let periods = table.periods().to_vec();
        let mut masked = 0usize;
        for (station, column) in table.columns_mut().iter_mut().enumerate() {
            for (cell, period) in column.iter_mut().zip(&periods) {
                if mask.is_masked(*period, station) && cell.is_some() {
                    *cell = None;
                    masked += 1;
                }
            }
        }

        if masked > 0 {
            info!(masked, nb_nan = self.nb_nan, "masked periods with missing data");
        } else {
            debug!(nb_nan = self.nb_nan, "no period masked");
        }

        Ok(table)
    }

    /// Build the mask from `reference` and apply it to `table` in one pass.
    pub fn mask<T, F>(
        &self,
        table: AggregateTable<T>,
        reference: &DailyExtremumTable,
        rule: MissingRule,
        period_of: F,
    ) -> Result<AggregateTable<T>>
    where
        T: Copy,
        F: Fn(NaiveDate) -> Option<PeriodKey>,
    {
        let mask = self.nan_mask(reference, rule, period_of);
        self.apply(table, &mask)
    }
}
