pub mod series_reader;

pub use series_reader::{parse_timestamp, SeriesReader};
