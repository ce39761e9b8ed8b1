use crate::analyzers::SeriesAnalyzer;
use crate::cli::args::{Cli, Commands, IndicatorArgs, InputArgs, ModeArg, OutputArgs};
use crate::config::IndicatorConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailyExtremumTable, DegreeDayTable, HeatWaveTable, TemperatureSeries};
use crate::processors::{DailyExtremumReducer, DegreeDayMode, IndicatorProcessor, MonthDay};
use crate::readers::SeriesReader;
use crate::utils::constants::{DAILY_EXTREMUM_FILE, HEAT_WAVE_FILE};
use crate::utils::filename::{degree_day_stem, generate_default_output_dir, output_file};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    match cli.command {
        Commands::Compute {
            input,
            output,
            indicators,
            save_daily,
            max_workers,
        } => {
            let config = resolve_config(&indicators)?;
            let processor = IndicatorProcessor::new(config)?.with_max_workers(max_workers);

            println!("Computing climate indicators...");
            println!("Input file: {}", input.input.display());
            println!("Workers: {}", max_workers);

            let series = read_series(&input).await?;
            println!(
                "Loaded {} samples for {} stations",
                series.len(),
                series.stations().len()
            );

            let progress =
                ProgressReporter::new(processor.stage_count(), "Processing series...", quiet);
            let results = processor.process(&series, Some(&progress))?;
            progress.finish_with_message(&format!(
                "Reduced {} days, {} degree-day tables",
                results.daily.len(),
                results.degree_days.len()
            ));

            let output_dir = prepare_output_dir(&output)?;
            let csv_delimiter = delimiter_byte(input.delimiter)?;
            let results = Arc::new(results);
            let mut jobs: Vec<(PathBuf, JoinHandle<Result<()>>)> = Vec::new();

            for (extension, parquet) in output_formats(&output) {
                if save_daily {
                    let path = output_file(&output_dir, DAILY_EXTREMUM_FILE, extension);
                    let results = Arc::clone(&results);
                    let writer = TableWriter::new(parquet, &output.compression, csv_delimiter)?;
                    let target = path.clone();
                    jobs.push((
                        path,
                        tokio::task::spawn_blocking(move || writer.daily(&results.daily, &target)),
                    ));
                }

                for index in 0..results.degree_days.len() {
                    let mode = results.degree_days[index].0;
                    let path = output_file(&output_dir, degree_day_stem(mode), extension);
                    let results = Arc::clone(&results);
                    let writer = TableWriter::new(parquet, &output.compression, csv_delimiter)?;
                    let target = path.clone();
                    jobs.push((
                        path,
                        tokio::task::spawn_blocking(move || {
                            writer.degree_days(&results.degree_days[index].1, &target)
                        }),
                    ));
                }

                let path = output_file(&output_dir, HEAT_WAVE_FILE, extension);
                let results = Arc::clone(&results);
                let writer = TableWriter::new(parquet, &output.compression, csv_delimiter)?;
                let target = path.clone();
                jobs.push((
                    path,
                    tokio::task::spawn_blocking(move || {
                        writer.heat_waves(&results.heat_wave, &target)
                    }),
                ));
            }

            let written = await_writes(jobs, quiet).await?;
            report_written(&written)?;
            println!("Processing complete!");
        }

        Commands::Daily { input, output } => {
            println!("Reducing series to daily extremes...");
            println!("Input file: {}", input.input.display());

            let series = read_series(&input).await?;

            let progress = ProgressReporter::new_spinner("Reducing daily extremes...", quiet);
            let daily = Arc::new(DailyExtremumReducer::new().reduce(&series)?);
            progress.finish_with_message(&format!("Reduced {} days", daily.len()));

            let output_dir = prepare_output_dir(&output)?;
            let csv_delimiter = delimiter_byte(input.delimiter)?;
            let mut jobs: Vec<(PathBuf, JoinHandle<Result<()>>)> = Vec::new();
            for (extension, parquet) in output_formats(&output) {
                let path = output_file(&output_dir, DAILY_EXTREMUM_FILE, extension);
                let daily = Arc::clone(&daily);
                let writer = TableWriter::new(parquet, &output.compression, csv_delimiter)?;
                let target = path.clone();
                jobs.push((
                    path,
                    tokio::task::spawn_blocking(move || writer.daily(&daily, &target)),
                ));
            }

            let written = await_writes(jobs, quiet).await?;
            report_written(&written)?;
        }

        Commands::Inspect { input, json } => {
            let series = read_series(&input).await?;
            let daily: DailyExtremumTable = DailyExtremumReducer::new().reduce(&series)?;
            let stats = SeriesAnalyzer::new().analyze(&series, &daily)?;

            if json {
                let rendered = serde_json::to_string_pretty(&stats)
                    .map_err(|e| ProcessingError::InvalidFormat(e.to_string()))?;
                println!("{}", rendered);
            } else {
                println!("Inspecting series: {}", input.input.display());
                println!("\n{}", stats.summary());
            }
        }
    }

    Ok(())
}

/// Configuration file (or defaults) with individual CLI flags layered on top.
pub fn resolve_config(args: &IndicatorArgs) -> Result<IndicatorConfig> {
    let mut config = IndicatorConfig::load(args.config.as_deref())?;

    if let Some(ref_value) = args.ref_value {
        config.ref_value = ref_value;
    }
    if let Some(mode) = args.mode {
        config.modes = match mode {
            ModeArg::Heating => vec![DegreeDayMode::Heating],
            ModeArg::Cooling => vec![DegreeDayMode::Cooling],
            ModeArg::Both => vec![DegreeDayMode::Heating, DegreeDayMode::Cooling],
        };
    }
    if let Some(start) = &args.dju_start {
        config.dju_start = start.parse::<MonthDay>()?;
    }
    if let Some(end) = &args.dju_end {
        config.dju_end = end.parse::<MonthDay>()?;
    }
    if let Some(threshold) = args.threshold_night {
        config.threshold_night = threshold;
    }
    if let Some(threshold) = args.threshold_day {
        config.threshold_day = threshold;
    }
    if let Some(duration) = args.threshold_duration {
        config.threshold_duration = duration;
    }
    if let Some(nb_nan) = args.nb_nan {
        config.nb_nan = nb_nan;
    }
    if let Some(frequency) = args.frequency {
        config.frequency = frequency.into();
    }

    Ok(config)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .map_err(|_| ProcessingError::Config(format!("Delimiter must be ASCII: {:?}", delimiter)))
}

/// Parsing runs on a blocking task.
async fn read_series(input: &InputArgs) -> Result<TemperatureSeries> {
    let delimiter = delimiter_byte(input.delimiter)?;
    let reader = SeriesReader::new()
        .with_delimiter(delimiter)
        .with_mmap(input.mmap);
    let path = input.input.clone();

    let series = tokio::task::spawn_blocking(move || reader.read_series(&path)).await??;
    info!(
        samples = series.len(),
        stations = series.stations().len(),
        "series loaded"
    );
    Ok(series)
}

fn prepare_output_dir(output: &OutputArgs) -> Result<PathBuf> {
    let dir = output
        .output_dir
        .clone()
        .unwrap_or_else(generate_default_output_dir);
    std::fs::create_dir_all(&dir)?;
    println!("Output directory: {}", dir.display());
    Ok(dir)
}

/// File extension and whether the table goes through the Parquet writer.
fn output_formats(output: &OutputArgs) -> Vec<(&'static str, bool)> {
    let mut formats = Vec::new();
    if output.format.writes_csv() {
        formats.push(("csv", false));
    }
    if output.format.writes_parquet() {
        formats.push(("parquet", true));
    }
    formats
}

async fn await_writes(
    jobs: Vec<(PathBuf, JoinHandle<Result<()>>)>,
    quiet: bool,
) -> Result<Vec<PathBuf>> {
    let progress = ProgressReporter::new(jobs.len() as u64, "Writing tables...", quiet);
    let mut written = Vec::with_capacity(jobs.len());
    for (path, handle) in jobs {
        handle.await??;
        progress.increment(1);
        written.push(path);
    }
    progress.finish_with_message("Tables written");
    Ok(written)
}

fn report_written(paths: &[PathBuf]) -> Result<()> {
    println!("\nWrote {} files:", paths.len());
    for path in paths {
        println!("  - {}", path.display());
        if path.extension().is_some_and(|ext| ext == "parquet") {
            let info = ParquetWriter::new().get_file_info(path)?;
            println!("{}", info.summary());
        }
    }
    Ok(())
}

/// Output format chosen for one file, moved onto a blocking task.
enum TableWriter {
    Csv(CsvWriter),
    Parquet(ParquetWriter),
}

impl TableWriter {
    fn new(parquet: bool, compression: &str, delimiter: u8) -> Result<Self> {
        if parquet {
            Ok(TableWriter::Parquet(
                ParquetWriter::new().with_compression(compression)?,
            ))
        } else {
            Ok(TableWriter::Csv(CsvWriter::new().with_delimiter(delimiter)))
        }
    }

    fn daily(&self, table: &DailyExtremumTable, path: &Path) -> Result<()> {
        match self {
            TableWriter::Csv(writer) => writer.write_daily(table, path),
            TableWriter::Parquet(writer) => writer.write_daily(table, path),
        }
    }

    fn degree_days(&self, table: &DegreeDayTable, path: &Path) -> Result<()> {
        match self {
            TableWriter::Csv(writer) => writer.write_aggregate(table, path),
            TableWriter::Parquet(writer) => writer.write_aggregate(table, path),
        }
    }

    fn heat_waves(&self, table: &HeatWaveTable, path: &Path) -> Result<()> {
        match self {
            TableWriter::Csv(writer) => writer.write_aggregate(table, path),
            TableWriter::Parquet(writer) => writer.write_aggregate(table, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::FrequencyArg;
    use crate::models::Frequency;
    use std::io::Write;

    #[test]
    fn test_flags_override_defaults() {
        let args = IndicatorArgs {
            ref_value: Some(16.0),
            mode: Some(ModeArg::Cooling),
            dju_start: Some("06-01".to_string()),
            dju_end: Some("08-31".to_string()),
            frequency: Some(FrequencyArg::Seasonal),
            ..Default::default()
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.ref_value, 16.0);
        assert_eq!(config.modes, vec![DegreeDayMode::Cooling]);
        assert_eq!(config.dju_start, MonthDay::new(6, 1).unwrap());
        assert_eq!(config.frequency, Frequency::Seasonal);
        assert_eq!(config.nb_nan, 2);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "nb_nan = 5\nthreshold_day = 30.0").unwrap();

        let args = IndicatorArgs {
            config: Some(file.path().to_path_buf()),
            nb_nan: Some(3),
            ..Default::default()
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.nb_nan, 3);
        assert_eq!(config.threshold_day, 30.0);
    }

    #[test]
    fn test_bad_window_bound_fails() {
        let args = IndicatorArgs {
            dju_start: Some("02-29".to_string()),
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }
}
