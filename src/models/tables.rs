use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

use crate::error::{ProcessingError, Result};
use crate::models::{DailyExtremum, PeriodKey, StationSet};

/// One MIN/MAX pair per calendar date and station, stored column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyExtremumTable {
    stations: StationSet,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<DailyExtremum>>,
}

impl DailyExtremumTable {
    pub fn new(
        stations: StationSet,
        dates: Vec<NaiveDate>,
        columns: Vec<Vec<DailyExtremum>>,
    ) -> Result<Self> {
        if columns.len() != stations.len() {
            return Err(ProcessingError::InvalidSeries(format!(
                "{} columns for {} stations",
                columns.len(),
                stations.len()
            )));
        }

        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ProcessingError::InvalidSeries(
                "Daily dates must be strictly increasing".to_string(),
            ));
        }

        for column in &columns {
            if column.len() != dates.len() {
                return Err(ProcessingError::InvalidSeries(format!(
                    "Column has {} days, expected {}",
                    column.len(),
                    dates.len()
                )));
            }
            for day in column {
                day.validate_relationships()?;
            }
        }

        Ok(Self {
            stations,
            dates,
            columns,
        })
    }

    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, station: usize) -> &[DailyExtremum] {
        &self.columns[station]
    }

    pub fn columns(&self) -> &[Vec<DailyExtremum>] {
        &self.columns
    }

    pub fn get(&self, date: NaiveDate, station: &str) -> Option<DailyExtremum> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self.stations.index_of(station)?;
        Some(self.columns[col][row])
    }

    /// Distinct calendar years of the date index, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.dates
            .iter()
            .map(|d| d.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Per-period, per-station aggregate. A `None` cell is no-data.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable<T> {
    stations: StationSet,
    periods: Vec<PeriodKey>,
    columns: Vec<Vec<Option<T>>>,
}

pub type DegreeDayTable = AggregateTable<f64>;
pub type HeatWaveTable = AggregateTable<u32>;

impl<T: Copy> AggregateTable<T> {
    pub fn new(
        stations: StationSet,
        periods: Vec<PeriodKey>,
        columns: Vec<Vec<Option<T>>>,
    ) -> Result<Self> {
        if columns.len() != stations.len() {
            return Err(ProcessingError::InvalidSeries(format!(
                "{} columns for {} stations",
                columns.len(),
                stations.len()
            )));
        }
        if columns.iter().any(|c| c.len() != periods.len()) {
            return Err(ProcessingError::InvalidSeries(format!(
                "Every column must hold {} periods",
                periods.len()
            )));
        }

        Ok(Self {
            stations,
            periods,
            columns,
        })
    }

    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    pub fn periods(&self) -> &[PeriodKey] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn column(&self, station: usize) -> &[Option<T>] {
        &self.columns[station]
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Vec<Option<T>>] {
        &mut self.columns
    }

    /// Cell value; `None` both for no-data and for unknown labels.
    pub fn value(&self, period: PeriodKey, station: &str) -> Option<T> {
        let row = self.periods.binary_search(&period).ok()?;
        let col = self.stations.index_of(station)?;
        self.columns[col][row]
    }

    /// Row-major view: each period with its station values in column order.
    pub fn rows(&self) -> impl Iterator<Item = (PeriodKey, Vec<Option<T>>)> + '_ {
        self.periods.iter().enumerate().map(move |(row, period)| {
            (
                *period,
                self.columns.iter().map(|column| column[row]).collect(),
            )
        })
    }
}
