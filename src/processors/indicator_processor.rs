use crate::config::IndicatorConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{
    DailyExtremumTable, DegreeDayTable, Frequency, HeatWaveTable, MissingRule, TemperatureSeries,
};
use crate::processors::{
    DailyExtremumReducer, DegreeDayAggregator, DegreeDayMode, HeatWaveCounter,
    MissingDataMasker, SeasonalWindow,
};
use crate::utils::progress::ProgressReporter;
use tracing::info;
use validator::Validate;

/// Every table produced by one run.
#[derive(Debug, Clone)]
pub struct IndicatorResults {
    pub daily: DailyExtremumTable,
    pub degree_days: Vec<(DegreeDayMode, DegreeDayTable)>,
    pub heat_wave: HeatWaveTable,
}

impl IndicatorResults {
    pub fn degree_day_table(&self, mode: DegreeDayMode) -> Option<&DegreeDayTable> {
        self.degree_days
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, table)| table)
    }
}

/// Runs the reducer, the aggregators and the masker in order. Stations are
/// independent columns and are spread over a bounded rayon pool.
pub struct IndicatorProcessor {
    config: IndicatorConfig,
    max_workers: usize,
}

impl IndicatorProcessor {
    pub fn new(config: IndicatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            max_workers: num_cpus::get(),
        })
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Progress steps of `process`: reduction, each degree-day mode, heat waves.
    pub fn stage_count(&self) -> u64 {
        2 + self.config.modes.len() as u64
    }

    pub fn reduce(&self, series: &TemperatureSeries) -> Result<DailyExtremumTable> {
        DailyExtremumReducer::new().reduce(series)
    }

    /// Masked degree-day table for one mode.
    pub fn degree_days(
        &self,
        daily: &DailyExtremumTable,
        mode: DegreeDayMode,
    ) -> Result<DegreeDayTable> {
        let window =
            SeasonalWindow::for_table(self.config.dju_start, self.config.dju_end, daily)?;
        let aggregator = DegreeDayAggregator::new(mode, self.config.ref_value)
            .with_frequency(self.config.frequency);
        let table = aggregator.aggregate(daily, &window)?;

        MissingDataMasker::new(self.config.nb_nan)?.mask(
            table,
            daily,
            self.config.degree_day_missing,
            |date| aggregator.period_of(&window, date),
        )
    }

    /// Masked heat-wave table.
    pub fn heat_waves(&self, daily: &DailyExtremumTable) -> Result<HeatWaveTable> {
        let frequency: Frequency = self.config.frequency;
        let table = HeatWaveCounter::new(
            self.config.threshold_night,
            self.config.threshold_day,
            self.config.threshold_duration,
        )?
        .with_frequency(frequency)
        .count(daily)?;

        MissingDataMasker::new(self.config.nb_nan)?.mask(
            table,
            daily,
            MissingRule::Either,
            |date| Some(frequency.calendar_period(date)),
        )
    }

    pub fn process(
        &self,
        series: &TemperatureSeries,
        progress: Option<&ProgressReporter>,
    ) -> Result<IndicatorResults> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        pool.install(|| {
            if let Some(p) = progress {
                p.set_message("Reducing daily extremes...");
            }
            let daily = self.reduce(series)?;
            if let Some(p) = progress {
                p.increment(1);
            }

            let mut degree_days = Vec::with_capacity(self.config.modes.len());
            for mode in &self.config.modes {
                if let Some(p) = progress {
                    p.set_message(&format!("Computing {} degree-days...", mode));
                }
                degree_days.push((*mode, self.degree_days(&daily, *mode)?));
                if let Some(p) = progress {
                    p.increment(1);
                }
            }

            if let Some(p) = progress {
                p.set_message("Counting heat-wave days...");
            }
            let heat_wave = self.heat_waves(&daily)?;
            if let Some(p) = progress {
                p.increment(1);
            }

            info!(
                days = daily.len(),
                stations = daily.stations().len(),
                workers = self.max_workers,
                "indicators computed"
            );

            Ok(IndicatorResults {
                daily,
                degree_days,
                heat_wave,
            })
        })
    }
}

impl Default for IndicatorProcessor {
    fn default() -> Self {
        Self {
            config: IndicatorConfig::default(),
            max_workers: num_cpus::get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodKey, StationSet};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn series() -> TemperatureSeries {
        let stations = StationSet::new(vec!["A".to_string(), "B".to_string()]).unwrap();
        let mut series = TemperatureSeries::new(stations);
        for day in 1..=3 {
            series
                .push(at(1, day, 6), vec![Some(2.0), None])
                .unwrap();
            series
                .push(at(1, day, 15), vec![Some(8.0), None])
                .unwrap();
        }
        for day in 1..=3 {
            series
                .push(at(7, day, 5), vec![Some(22.0), Some(19.0)])
                .unwrap();
            series
                .push(at(7, day, 14), vec![Some(36.0), Some(35.0)])
                .unwrap();
        }
        series
    }

    #[test]
    fn test_process_full_pipeline() {
        let processor = IndicatorProcessor::new(IndicatorConfig::default())
            .unwrap()
            .with_max_workers(2);

        let results = processor.process(&series(), None).unwrap();
        let year = PeriodKey::year(2021);

        assert_eq!(results.daily.len(), 6);

        let heating = results.degree_day_table(DegreeDayMode::Heating).unwrap();
        // Three January days at 18 - 5; July is outside the window.
        assert!((heating.value(year, "A").unwrap() - 39.0).abs() < 1e-9);
        // B has no reading on three days of the window: masked.
        assert_eq!(heating.value(year, "B"), None);

        assert_eq!(results.heat_wave.value(year, "A"), Some(2));
        assert_eq!(results.heat_wave.value(year, "B"), None);
    }

    #[test]
    fn test_process_is_deterministic() {
        let processor = IndicatorProcessor::default();
        let first = processor.process(&series(), None).unwrap();
        let second = processor.process(&series(), None).unwrap();

        assert_eq!(first.degree_days, second.degree_days);
        assert_eq!(first.heat_wave, second.heat_wave);
    }

    #[test]
    fn test_empty_series_gives_empty_tables() {
        let stations = StationSet::new(vec!["A".to_string()]).unwrap();
        let results = IndicatorProcessor::default()
            .process(&TemperatureSeries::new(stations), None)
            .unwrap();

        assert!(results.daily.is_empty());
        assert!(results.heat_wave.is_empty());
        assert!(results.degree_days.iter().all(|(_, t)| t.is_empty()));
    }
}
