/// Indicator defaults (Météo-France degree-day method, heat-wave thresholds)
pub const DEFAULT_REF_VALUE: f64 = 18.0;
pub const DEFAULT_THRESHOLD_NIGHT: f64 = 20.0;
pub const DEFAULT_THRESHOLD_DAY: f64 = 34.0;
pub const DEFAULT_THRESHOLD_DURATION: usize = 1;
pub const DEFAULT_NB_NAN: usize = 2;

/// Non-leap year used to validate window bounds
pub const WINDOW_REFERENCE_YEAR: i32 = 1998;

/// Output file names
pub const DAILY_EXTREMUM_FILE: &str = "dailyExtremum";
pub const HEATING_FILE: &str = "heating";
pub const COOLING_FILE: &str = "cooling";
pub const HEAT_WAVE_FILE: &str = "nb_heat_wave_days";

/// Column labels of the daily extremum table
pub const MIN_LABEL: &str = "MIN";
pub const MAX_LABEL: &str = "MAX";

/// Input parsing
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "-9999"];
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
