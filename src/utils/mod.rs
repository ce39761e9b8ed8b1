pub mod constants;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use filename::{degree_day_stem, generate_default_output_dir, output_file};
pub use progress::ProgressReporter;
