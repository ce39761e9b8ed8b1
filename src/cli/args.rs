use crate::models::Frequency;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "climate-indicators")]
#[command(about = "Degree-day, heat-wave and daily extremum indicators from station temperature series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase logging verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute daily extremes, degree-days and heat-wave days
    Compute {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        indicators: IndicatorArgs,

        #[arg(long, help = "Also write the daily extremum table")]
        save_daily: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Reduce the series to daily extremes only
    Daily {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Describe an input series without computing indicators
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, help = "Print the statistics as JSON")]
        json: bool,
    },
}

#[derive(Args, Clone)]
pub struct InputArgs {
    #[arg(short, long, help = "Input CSV: timestamp column then one column per station")]
    pub input: PathBuf,

    #[arg(long, default_value = ",", help = "Field delimiter of the input file")]
    pub delimiter: char,

    #[arg(long, help = "Memory-map the input file")]
    pub mmap: bool,
}

#[derive(Args, Clone)]
pub struct OutputArgs {
    #[arg(
        short,
        long,
        help = "Output directory [default: output/indicators-{YYMMDD}]"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    #[arg(short, long, default_value = "snappy", help = "Parquet compression")]
    pub compression: String,
}

#[derive(Args, Clone, Default)]
pub struct IndicatorArgs {
    #[arg(long, help = "TOML file with indicator parameters")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Degree-day reference temperature [default: 18]")]
    pub ref_value: Option<f64>,

    #[arg(long, value_enum, help = "Degree-day table to compute [default: both]")]
    pub mode: Option<ModeArg>,

    #[arg(long, help = "Degree-day window start, MM-DD [default: 10-01]")]
    pub dju_start: Option<String>,

    #[arg(long, help = "Degree-day window end, MM-DD [default: 05-20]")]
    pub dju_end: Option<String>,

    #[arg(long, help = "Heat-wave night (minimum) threshold [default: 20]")]
    pub threshold_night: Option<f64>,

    #[arg(long, help = "Heat-wave day (maximum) threshold [default: 34]")]
    pub threshold_day: Option<f64>,

    #[arg(long, help = "Hot days required before a heat-wave day [default: 1]")]
    pub threshold_duration: Option<usize>,

    #[arg(long, help = "Missing days per period that void an aggregate [default: 2]")]
    pub nb_nan: Option<usize>,

    #[arg(long, value_enum, help = "Accounting period [default: yearly]")]
    pub frequency: Option<FrequencyArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Parquet,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn writes_parquet(&self) -> bool {
        matches!(self, OutputFormat::Parquet | OutputFormat::Both)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Heating,
    Cooling,
    Both,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FrequencyArg {
    Yearly,
    Seasonal,
}

impl From<FrequencyArg> for Frequency {
    fn from(value: FrequencyArg) -> Self {
        match value {
            FrequencyArg::Yearly => Frequency::Yearly,
            FrequencyArg::Seasonal => Frequency::Seasonal,
        }
    }
}
