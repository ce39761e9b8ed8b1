use crate::processors::DegreeDayMode;
use crate::utils::constants::{COOLING_FILE, HEATING_FILE};
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

/// Default output directory with format: output/indicators-{YYMMDD}
pub fn generate_default_output_dir() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    PathBuf::from("output").join(format!("indicators-{:02}{:02}{:02}", year, month, day))
}

pub fn degree_day_stem(mode: DegreeDayMode) -> &'static str {
    match mode {
        DegreeDayMode::Heating => HEATING_FILE,
        DegreeDayMode::Cooling => COOLING_FILE,
    }
}

pub fn output_file(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, extension))
}
