use crate::error::Result;
use crate::models::{DailyExtremum, DailyExtremumTable, TemperatureSeries};
use chrono::NaiveDate;
use tracing::debug;

/// Reduces sub-daily readings to one MIN/MAX pair per calendar date.
pub struct DailyExtremumReducer;

impl DailyExtremumReducer {
    pub fn new() -> Self {
        Self
    }

    /// Every date holding at least one timestamp gets a row, whatever the
    /// station. No-data readings are ignored; a station with no reading on a
    /// date gets a missing cell.
    pub fn reduce(&self, series: &TemperatureSeries) -> Result<DailyExtremumTable> {
        let stations = series.stations().clone();
        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut columns: Vec<Vec<DailyExtremum>> = vec![Vec::new(); stations.len()];

        for (timestamp, values) in series.iter() {
            let date = timestamp.date();

            // Timestamps are strictly increasing, so each date is one contiguous block.
            if dates.last() != Some(&date) {
                dates.push(date);
                for column in &mut columns {
                    column.push(DailyExtremum::missing());
                }
            }

            for (column, reading) in columns.iter_mut().zip(values) {
                if let (Some(value), Some(day)) = (reading, column.last_mut()) {
                    day.min = Some(day.min.map_or(*value, |m| m.min(*value)));
                    day.max = Some(day.max.map_or(*value, |m| m.max(*value)));
                }
            }
        }

        debug!(
            samples = series.len(),
            days = dates.len(),
            stations = stations.len(),
            "reduced series to daily extremes"
        );

        DailyExtremumTable::new(stations, dates, columns)
    }
}

impl Default for DailyExtremumReducer {
    fn default() -> Self {
        Self::new()
    }
}
