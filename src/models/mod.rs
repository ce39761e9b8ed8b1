pub mod period;
pub mod station;
pub mod tables;
pub mod temperature;

pub use period::{Frequency, PeriodKey, Season};
pub use station::StationSet;
pub use tables::{AggregateTable, DailyExtremumTable, DegreeDayTable, HeatWaveTable};
pub use temperature::{DailyExtremum, MissingRule, TemperatureSeries};
