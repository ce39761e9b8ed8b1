use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::StationSet;

/// Sub-daily temperature readings, one row per timestamp and one column per
/// station. `None` is the no-data marker; non-finite readings are stored as `None`.
#[derive(Debug, Clone)]
pub struct TemperatureSeries {
    stations: StationSet,
    timestamps: Vec<NaiveDateTime>,
    rows: Vec<Vec<Option<f64>>>,
}

impl TemperatureSeries {
    pub fn new(stations: StationSet) -> Self {
        Self {
            stations,
            timestamps: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(
        stations: StationSet,
        timestamps: Vec<NaiveDateTime>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if timestamps.len() != rows.len() {
            return Err(ProcessingError::InvalidSeries(format!(
                "{} timestamps for {} rows",
                timestamps.len(),
                rows.len()
            )));
        }

        let mut series = Self::new(stations);
        series.timestamps.reserve(timestamps.len());
        series.rows.reserve(rows.len());
        for (timestamp, values) in timestamps.into_iter().zip(rows) {
            series.push(timestamp, values)?;
        }

        Ok(series)
    }

    /// Append a row. Timestamps must be strictly increasing.
    pub fn push(&mut self, timestamp: NaiveDateTime, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.stations.len() {
            return Err(ProcessingError::InvalidSeries(format!(
                "Row at {} has {} values, expected {}",
                timestamp,
                values.len(),
                self.stations.len()
            )));
        }

        if let Some(last) = self.timestamps.last() {
            if timestamp <= *last {
                return Err(ProcessingError::InvalidSeries(format!(
                    "Timestamp {} does not follow {}",
                    timestamp, last
                )));
            }
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|t| t.is_finite()))
            .collect();

        self.timestamps.push(timestamp);
        self.rows.push(values);
        Ok(())
    }

    pub fn stations(&self) -> &StationSet {
        &self.stations
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, &[Option<f64>])> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }
}

/// Which combination of absent extremes makes a day count as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingRule {
    /// Missing when MIN or MAX is absent.
    #[default]
    Either,
    /// Missing only when both MIN and MAX are absent.
    Both,
}

/// Daily minimum and maximum for one station.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyExtremum {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DailyExtremum {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    /// Both extremes, when present.
    pub fn pair(&self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        self.pair().map(|(min, max)| (min + max) / 2.0)
    }

    pub fn is_missing(&self, rule: MissingRule) -> bool {
        match rule {
            MissingRule::Either => self.min.is_none() || self.max.is_none(),
            MissingRule::Both => self.min.is_none() && self.max.is_none(),
        }
    }

    pub fn validate_relationships(&self) -> Result<()> {
        if let Some((min, max)) = self.pair() {
            if min > max {
                return Err(ProcessingError::InvalidSeries(format!(
                    "Daily minimum {} > daily maximum {}",
                    min, max
                )));
            }
        }

        Ok(())
    }
}
