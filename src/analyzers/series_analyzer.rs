use crate::error::{ProcessingError, Result};
use crate::models::{DailyExtremumTable, MissingRule, TemperatureSeries};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SeriesStatistics {
    pub total_samples: usize,
    pub total_days: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub temperature_range: Option<(f64, f64)>,
    pub stations: Vec<StationCoverage>,
}

#[derive(Debug, Serialize)]
pub struct StationCoverage {
    pub name: String,
    pub readings: usize,
    pub missing_readings: usize,
    pub incomplete_days: usize,
}

impl StationCoverage {
    pub fn missing_percentage(&self) -> f64 {
        let total = self.readings + self.missing_readings;
        if total == 0 {
            return 0.0;
        }
        (self.missing_readings as f64 / total as f64) * 100.0
    }
}

/// Descriptive statistics of an input series and its daily reduction.
pub struct SeriesAnalyzer;

impl SeriesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        series: &TemperatureSeries,
        daily: &DailyExtremumTable,
    ) -> Result<SeriesStatistics> {
        let (first, last) = series
            .timestamps()
            .first()
            .zip(series.timestamps().last())
            .ok_or_else(|| ProcessingError::InvalidSeries("Series has no samples".to_string()))?;

        let mut stations: Vec<StationCoverage> = series
            .stations()
            .iter()
            .map(|name| StationCoverage {
                name: name.to_string(),
                readings: 0,
                missing_readings: 0,
                incomplete_days: 0,
            })
            .collect();

        let mut min_temp = f64::INFINITY;
        let mut max_temp = f64::NEG_INFINITY;

        for (_, values) in series.iter() {
            for (coverage, value) in stations.iter_mut().zip(values) {
                match value {
                    Some(t) => {
                        coverage.readings += 1;
                        min_temp = min_temp.min(*t);
                        max_temp = max_temp.max(*t);
                    }
                    None => coverage.missing_readings += 1,
                }
            }
        }

        for (coverage, column) in stations.iter_mut().zip(daily.columns()) {
            coverage.incomplete_days = column
                .iter()
                .filter(|day| day.is_missing(MissingRule::Either))
                .count();
        }

        // No valid reading at all leaves the bounds at infinity
        let temperature_range = (min_temp <= max_temp).then_some((min_temp, max_temp));

        Ok(SeriesStatistics {
            total_samples: series.len(),
            total_days: daily.len(),
            time_range: (*first, *last),
            temperature_range,
            stations,
        })
    }
}

impl Default for SeriesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesStatistics {
    pub fn summary(&self) -> String {
        let temp_range = match self.temperature_range {
            Some((min, max)) => format!("{:.1}°C to {:.1}°C", min, max),
            None => "No valid measurements".to_string(),
        };

        let mut summary = format!(
            "Stations: {}\n\
            Time Range: {} to {}\n\
            Samples: {} over {} days\n\
            Temperature Range: {}\n",
            self.stations.len(),
            self.time_range.0,
            self.time_range.1,
            self.total_samples,
            self.total_days,
            temp_range
        );

        summary.push_str("\nStation Coverage:\n");
        for station in &self.stations {
            summary.push_str(&format!(
                "  - {}: {} readings, {:.1}% missing, {} incomplete days\n",
                station.name,
                station.readings,
                station.missing_percentage(),
                station.incomplete_days
            ));
        }

        summary
    }
}
