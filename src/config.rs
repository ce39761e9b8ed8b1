use crate::error::Result;
use crate::models::{Frequency, MissingRule};
use crate::processors::{DegreeDayMode, MonthDay};
use crate::utils::constants::{
    DEFAULT_NB_NAN, DEFAULT_REF_VALUE, DEFAULT_THRESHOLD_DAY, DEFAULT_THRESHOLD_DURATION,
    DEFAULT_THRESHOLD_NIGHT,
};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

/// Parameters of one indicator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    /// Reference temperature of the degree-day formula.
    #[validate(range(min = -60.0, max = 60.0))]
    pub ref_value: f64,

    /// Degree-day tables to compute.
    #[validate(length(min = 1))]
    pub modes: Vec<DegreeDayMode>,

    /// First day of the degree-day window.
    pub dju_start: MonthDay,

    /// Last day of the degree-day window.
    pub dju_end: MonthDay,

    /// Day-level missing rule for degree-days.
    pub degree_day_missing: MissingRule,

    #[validate(range(min = -60.0, max = 60.0))]
    pub threshold_night: f64,

    #[validate(range(min = -60.0, max = 60.0))]
    pub threshold_day: f64,

    /// Hot days that must precede a day for it to count as a heat-wave day.
    #[validate(range(min = 1))]
    pub threshold_duration: usize,

    /// Missing days per period at which an aggregate becomes no-data.
    #[validate(range(min = 1))]
    pub nb_nan: usize,

    pub frequency: Frequency,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ref_value: DEFAULT_REF_VALUE,
            modes: vec![DegreeDayMode::Heating, DegreeDayMode::Cooling],
            dju_start: MonthDay::HEATING_SEASON_START,
            dju_end: MonthDay::HEATING_SEASON_END,
            degree_day_missing: MissingRule::Either,
            threshold_night: DEFAULT_THRESHOLD_NIGHT,
            threshold_day: DEFAULT_THRESHOLD_DAY,
            threshold_duration: DEFAULT_THRESHOLD_DURATION,
            nb_nan: DEFAULT_NB_NAN,
            frequency: Frequency::Yearly,
        }
    }
}

impl IndicatorConfig {
    /// Defaults, overlaid with the TOML file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading indicator configuration");
                Config::builder()
                    .add_source(File::from(path).format(FileFormat::Toml))
                    .build()?
                    .try_deserialize::<IndicatorConfig>()?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize::<IndicatorConfig>()?;

        config.validate()?;
        Ok(config)
    }
}
