use chrono::{Duration, NaiveDate};
use climate_indicators::models::{StationSet, TemperatureSeries};
use climate_indicators::processors::{
    DailyExtremumReducer, DegreeDayAggregator, DegreeDayMode, HeatWaveCounter, IndicatorProcessor,
    SeasonalWindow,
};
use climate_indicators::readers::SeriesReader;
use climate_indicators::IndicatorConfig;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Hourly readings following a yearly and a daily cycle
fn create_test_series(station_count: usize, days: usize) -> TemperatureSeries {
    let names = (1..=station_count)
        .map(|i| format!("Station {}", i))
        .collect();
    let mut series = TemperatureSeries::new(StationSet::new(names).unwrap());

    let start = NaiveDate::from_ymd_opt(2019, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    for hour in 0..days * 24 {
        let timestamp = start + Duration::hours(hour as i64);
        let season = ((hour / 24) as f64 / 365.0 * std::f64::consts::TAU).cos();
        let daily = ((hour % 24) as f64 / 24.0 * std::f64::consts::TAU).sin();

        let values = (0..station_count)
            .map(|station| {
                // Sparse gaps so the masker has work to do
                if (hour + station * 7) % 997 == 0 {
                    None
                } else {
                    Some(14.0 - 12.0 * season + 6.0 * daily + station as f64 * 0.1)
                }
            })
            .collect();
        series.push(timestamp, values).unwrap();
    }

    series
}

fn series_to_csv(series: &TemperatureSeries) -> String {
    let mut content = String::from("time");
    for name in series.stations().iter() {
        content.push(',');
        content.push_str(name);
    }
    content.push('\n');

    for (timestamp, values) in series.iter() {
        content.push_str(&timestamp.format("%Y-%m-%d %H:%M").to_string());
        for value in values {
            content.push(',');
            if let Some(v) = value {
                content.push_str(&format!("{:.1}", v));
            }
        }
        content.push('\n');
    }

    content
}

fn benchmark_daily_reduction(c: &mut Criterion) {
    let series = create_test_series(10, 365);

    c.bench_function("daily_extremum_reduction", |b| {
        b.iter(|| {
            let table = DailyExtremumReducer::new().reduce(black_box(&series)).unwrap();
            black_box(table.len())
        })
    });
}

fn benchmark_degree_days(c: &mut Criterion) {
    let series = create_test_series(10, 3 * 365);
    let daily = DailyExtremumReducer::new().reduce(&series).unwrap();
    let config = IndicatorConfig::default();
    let window = SeasonalWindow::for_table(config.dju_start, config.dju_end, &daily).unwrap();

    for mode in [DegreeDayMode::Heating, DegreeDayMode::Cooling] {
        c.bench_function(&format!("degree_days_{}", mode), |b| {
            let aggregator = DegreeDayAggregator::new(mode, config.ref_value);
            b.iter(|| {
                let table = aggregator.aggregate(black_box(&daily), &window).unwrap();
                black_box(table.periods().len())
            })
        });
    }
}

fn benchmark_heat_waves(c: &mut Criterion) {
    let series = create_test_series(10, 3 * 365);
    let daily = DailyExtremumReducer::new().reduce(&series).unwrap();
    let counter = HeatWaveCounter::new(20.0, 25.0, 2).unwrap();

    c.bench_function("heat_wave_count", |b| {
        b.iter(|| {
            let table = counter.count(black_box(&daily)).unwrap();
            black_box(table.periods().len())
        })
    });
}

fn benchmark_csv_parsing(c: &mut Criterion) {
    let content = series_to_csv(&create_test_series(5, 90));
    let reader = SeriesReader::new();

    c.bench_function("series_csv_parsing", |b| {
        b.iter(|| {
            let series = reader.parse_str(black_box(&content)).unwrap();
            black_box(series.len())
        })
    });
}

fn benchmark_varying_station_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_station_count");

    for &size in &[1, 10, 50, 100] {
        group.bench_with_input(
            BenchmarkId::new("stations", size),
            &size,
            |b, &station_count| {
                let series = create_test_series(station_count, 365);
                let processor = IndicatorProcessor::default();

                b.iter(|| {
                    let results = processor.process(black_box(&series), None).unwrap();
                    black_box(results.daily.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_daily_reduction,
    benchmark_degree_days,
    benchmark_heat_waves,
    benchmark_csv_parsing,
    benchmark_varying_station_counts
);
criterion_main!(benches);
