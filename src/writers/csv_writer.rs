use crate::error::Result;
use crate::models::{AggregateTable, DailyExtremumTable};
use crate::utils::constants::{MAX_LABEL, MIN_LABEL};
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writes result tables as wide CSV: one row per date or period, one column
/// per station. No-data cells are empty fields.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Two header rows (station, extremum); every MIN column precedes every
    /// MAX column.
    pub fn write_daily(&self, table: &DailyExtremumTable, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_daily_to(table, file)?;
        debug!(path = %path.display(), rows = table.len(), "wrote daily extremum csv");
        Ok(())
    }

    pub fn write_daily_to<W: Write>(&self, table: &DailyExtremumTable, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        let stations = table.stations();
        let mut names = vec![String::new()];
        let mut labels = vec![String::new()];
        for label in [MIN_LABEL, MAX_LABEL] {
            names.extend(stations.iter().map(str::to_string));
            labels.extend(stations.iter().map(|_| label.to_string()));
        }
        writer.write_record(&names)?;
        writer.write_record(&labels)?;

        for (row, date) in table.dates().iter().enumerate() {
            let mut record = Vec::with_capacity(1 + 2 * stations.len());
            record.push(date.format("%Y-%m-%d").to_string());
            record.extend(table.columns().iter().map(|c| format_cell(c[row].min)));
            record.extend(table.columns().iter().map(|c| format_cell(c[row].max)));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_aggregate<T>(&self, table: &AggregateTable<T>, path: &Path) -> Result<()>
    where
        T: Copy + Display,
    {
        let file = File::create(path)?;
        self.write_aggregate_to(table, file)?;
        debug!(path = %path.display(), rows = table.periods().len(), "wrote aggregate csv");
        Ok(())
    }

    pub fn write_aggregate_to<T, W>(&self, table: &AggregateTable<T>, writer: W) -> Result<()>
    where
        T: Copy + Display,
        W: Write,
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        let index_label = if table.periods().iter().any(|p| p.season.is_some()) {
            "period"
        } else {
            "year"
        };
        let mut header = vec![index_label.to_string()];
        header.extend(table.stations().iter().map(str::to_string));
        writer.write_record(&header)?;

        for (period, values) in table.rows() {
            let mut record = Vec::with_capacity(1 + values.len());
            record.push(period.to_string());
            record.extend(values.into_iter().map(format_cell));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyExtremum, PeriodKey, Season, StationSet};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn stations() -> StationSet {
        StationSet::new(vec!["A".to_string(), "B".to_string()]).unwrap()
    }

    #[test]
    fn test_daily_layout() {
        let table = DailyExtremumTable::new(
            stations(),
            vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()],
            vec![
                vec![DailyExtremum::new(Some(1.5), Some(9.0))],
                vec![DailyExtremum::missing()],
            ],
        )
        .unwrap();

        let mut buffer = Vec::new();
        CsvWriter::new().write_daily_to(&table, &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            ",A,B,A,B\n,MIN,MIN,MAX,MAX\n2020-01-01,1.5,,9,\n"
        );
    }

    #[test]
    fn test_aggregate_layout() {
        let table = AggregateTable::new(
            stations(),
            vec![PeriodKey::year(2020), PeriodKey::year(2021)],
            vec![vec![Some(3u32), None], vec![Some(0), Some(12)]],
        )
        .unwrap();

        let mut buffer = Vec::new();
        CsvWriter::new().write_aggregate_to(&table, &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "year,A,B\n2020,3,0\n2021,,12\n"
        );
    }

    #[test]
    fn test_seasonal_index_label() {
        let table = AggregateTable::new(
            StationSet::new(vec!["A".to_string()]).unwrap(),
            vec![PeriodKey::season(2020, Season::Winter)],
            vec![vec![Some(2.5f64)]],
        )
        .unwrap();

        let mut buffer = Vec::new();
        CsvWriter::new()
            .with_delimiter(b';')
            .write_aggregate_to(&table, &mut buffer)
            .unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "period;A\n2020-Winter;2.5\n");
    }
}
