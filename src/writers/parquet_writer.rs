use crate::error::{ProcessingError, Result};
use crate::models::{AggregateTable, DailyExtremumTable};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Days from 0001-01-01 to 1970-01-01; Date32 counts from the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Writes result tables in long format, one row per (date or period, station).
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Columns: `date`, `station`, `min`, `max`.
    pub fn write_daily(&self, table: &DailyExtremumTable, path: &Path) -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("station", DataType::Utf8, false),
            Field::new("min", DataType::Float64, true),
            Field::new("max", DataType::Float64, true),
        ]));

        let mut dates = Vec::new();
        let mut stations = Vec::new();
        let mut mins = Vec::new();
        let mut maxes = Vec::new();
        for (row, date) in table.dates().iter().enumerate() {
            for (station, column) in table.stations().iter().zip(table.columns()) {
                dates.push(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);
                stations.push(station);
                mins.push(column[row].min);
                maxes.push(column[row].max);
            }
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(dates)),
            Arc::new(StringArray::from(stations)),
            Arc::new(Float64Array::from(mins)),
            Arc::new(Float64Array::from(maxes)),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;

        self.write_batch(schema, &batch, path)
    }

    /// Columns: `year`, `season` (null for yearly periods), `station`, `value`.
    pub fn write_aggregate<T>(&self, table: &AggregateTable<T>, path: &Path) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("season", DataType::Utf8, true),
            Field::new("station", DataType::Utf8, false),
            Field::new("value", DataType::Float64, true),
        ]));

        let mut years = Vec::new();
        let mut seasons = Vec::new();
        let mut stations = Vec::new();
        let mut values = Vec::new();
        for (period, row) in table.rows() {
            for (station, value) in table.stations().iter().zip(row) {
                years.push(period.year);
                seasons.push(period.season.map(|s| s.as_str()));
                stations.push(station);
                values.push(value.map(Into::into));
            }
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(years)),
            Arc::new(StringArray::from(seasons)),
            Arc::new(StringArray::from(stations)),
            Arc::new(Float64Array::from(values)),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;

        self.write_batch(schema, &batch, path)
    }

    fn write_batch(&self, schema: Arc<Schema>, batch: &RecordBatch, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        debug!(path = %path.display(), rows = batch.num_rows(), "wrote parquet file");
        Ok(())
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let total_rows = metadata.file_metadata().num_rows();
        let row_groups = metadata.num_row_groups();
        let file_size = std::fs::metadata(path)?.len();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyExtremum, PeriodKey, StationSet};
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn stations() -> StationSet {
        StationSet::new(vec!["A".to_string(), "B".to_string()]).unwrap()
    }

    #[test]
    fn test_write_daily() -> Result<()> {
        let table = DailyExtremumTable::new(
            stations(),
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            ],
            vec![
                vec![DailyExtremum::new(Some(1.0), Some(4.0)); 2],
                vec![DailyExtremum::missing(); 2],
            ],
        )?;

        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        writer.write_daily(&table, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 4);

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let table = AggregateTable::new(
            stations(),
            vec![PeriodKey::year(2020)],
            vec![vec![Some(1u32)], vec![None]],
        )?;

        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_aggregate(&table, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
            assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 2);
        }

        Ok(())
    }

    #[test]
    fn test_row_group_size() -> Result<()> {
        let table = AggregateTable::new(
            stations(),
            vec![PeriodKey::year(2020), PeriodKey::year(2021)],
            vec![vec![Some(1.5), Some(2.5)], vec![None, Some(0.0)]],
        )?;

        let writer = ParquetWriter::new().with_row_group_size(2);
        let temp_file = NamedTempFile::new()?;
        writer.write_aggregate(&table, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 4);
        assert_eq!(info.row_groups, 2);

        Ok(())
    }

    #[test]
    fn test_unknown_compression() {
        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
    }

    #[test]
    fn test_epoch_offset() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch.num_days_from_ce(), UNIX_EPOCH_DAYS_FROM_CE);
    }
}
