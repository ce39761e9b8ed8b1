pub mod series_analyzer;

pub use series_analyzer::{SeriesAnalyzer, SeriesStatistics, StationCoverage};
