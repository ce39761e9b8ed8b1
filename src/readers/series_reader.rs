use crate::error::{ProcessingError, Result};
use crate::models::{StationSet, TemperatureSeries};
use crate::utils::constants::{DATE_FORMATS, MISSING_MARKERS, TIMESTAMP_FORMATS};
use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Reads a time-indexed temperature table: a header row, the timestamp in the
/// first column and one column per station.
pub struct SeriesReader {
    delimiter: u8,
    use_mmap: bool,
}

impl SeriesReader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            use_mmap: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read and validate the series stored at `path`.
    pub fn read_series(&self, path: &Path) -> Result<TemperatureSeries> {
        let content = if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            decode(&mmap)
        } else {
            decode(&std::fs::read(path)?)
        };

        let series = self.parse_str(&content)?;
        info!(
            path = %path.display(),
            rows = series.len(),
            stations = series.stations().len(),
            "read temperature series"
        );

        Ok(series)
    }

    pub fn parse_str(&self, content: &str) -> Result<TemperatureSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(ProcessingError::InvalidFormat(
                "Expected a timestamp column followed by at least one station column"
                    .to_string(),
            ));
        }

        let stations = StationSet::new(headers.iter().skip(1).map(str::to_string).collect())?;
        let mut series = TemperatureSeries::new(stations);

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let timestamp = record.get(0).unwrap_or_default();
            let timestamp = parse_timestamp(timestamp).map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "Invalid timestamp '{}' on data row {}",
                    timestamp,
                    line + 1
                ))
            })?;

            let values = record
                .iter()
                .skip(1)
                .map(|field| self.parse_reading(field))
                .collect::<Result<Vec<_>>>()?;

            series.push(timestamp, values)?;
        }

        debug!(rows = series.len(), "parsed temperature table");
        Ok(series)
    }

    /// Parse one cell; missing markers become `None`. A decimal comma is
    /// accepted when the field delimiter is not a comma.
    fn parse_reading(&self, field: &str) -> Result<Option<f64>> {
        if MISSING_MARKERS.iter().any(|marker| *marker == field) {
            return Ok(None);
        }

        let normalized = if self.delimiter != b',' {
            field.replace(',', ".")
        } else {
            field.to_string()
        };

        let value = normalized.parse::<f64>().map_err(|_| {
            ProcessingError::InvalidFormat(format!("Invalid temperature: '{}'", field))
        })?;

        Ok(Some(value).filter(|v| v.is_finite()))
    }
}

impl Default for SeriesReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts the formats of `TIMESTAMP_FORMATS`, or a bare date at midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }

    let mut last_error = None;
    for format in DATE_FORMATS {
        match NaiveDate::parse_from_str(value, format) {
            Ok(date) => return Ok(date.and_time(chrono::NaiveTime::MIN)),
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e.into()),
        None => Err(ProcessingError::InvalidFormat(format!(
            "Invalid timestamp: '{}'",
            value
        ))),
    }
}

/// UTF-8 (with or without BOM), falling back to Windows-1252.
fn decode(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }

    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text.into_owned(),
        None => {
            debug!("input is not valid UTF-8, decoding as Windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_table() {
        let content = "\
time,Nantes,Rezé
2020-01-01 00:00:00,4.5,3.0
2020-01-01 12:00:00,9.25,NA
2020-01-02 00:00:00,,2.5
";
        let series = SeriesReader::new().parse_str(content).unwrap();

        assert_eq!(series.stations().names(), &["Nantes", "Rezé"]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.row(1).unwrap(), &[Some(9.25), None]);
        assert_eq!(series.row(2).unwrap(), &[None, Some(2.5)]);
    }

    #[test]
    fn test_semicolon_and_decimal_comma() {
        let content = "date;A\n01/06/2021 06:00;12,5\n01/06/2021 18:00;-9999\n";
        let series = SeriesReader::new()
            .with_delimiter(b';')
            .parse_str(content)
            .unwrap();

        assert_eq!(series.row(0).unwrap(), &[Some(12.5)]);
        assert_eq!(series.row(1).unwrap(), &[None]);
    }

    #[test]
    fn test_unordered_rows_rejected() {
        let content = "t,A\n2020-01-02,1\n2020-01-01,2\n";
        assert!(SeriesReader::new().parse_str(content).is_err());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(SeriesReader::new()
            .parse_str("t,A\n2020-01-01,warm\n")
            .is_err());
        assert!(SeriesReader::new()
            .parse_str("t,A\nyesterday,1\n")
            .is_err());
        assert!(SeriesReader::new().parse_str("t\n2020-01-01\n").is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 4)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2020-03-04 13:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2020-03-04T13:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2020-03-04").unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 4).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_read_latin1_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        // "Bouguenais Aéroport" encoded as Windows-1252.
        file.write_all(b"time,Bouguenais A\xe9roport\n2020-01-01 00:00,3.5\n")?;

        for use_mmap in [false, true] {
            let series = SeriesReader::new()
                .with_mmap(use_mmap)
                .read_series(file.path())?;
            assert_eq!(series.stations().name(0), Some("Bouguenais Aéroport"));
            assert_eq!(series.row(0).unwrap(), &[Some(3.5)]);
        }

        Ok(())
    }
}
