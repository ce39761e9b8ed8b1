pub mod daily_extremum;
pub mod degree_days;
pub mod heat_wave;
pub mod indicator_processor;
pub mod missing_data;
pub mod seasonal_window;

pub use daily_extremum::DailyExtremumReducer;
pub use degree_days::{DegreeDayAggregator, DegreeDayMode};
pub use heat_wave::HeatWaveCounter;
pub use indicator_processor::{IndicatorProcessor, IndicatorResults};
pub use missing_data::{MissingDataMasker, NanMask};
pub use seasonal_window::{MonthDay, SeasonalWindow};
