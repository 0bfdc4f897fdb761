use chrono::{Duration, NaiveDate};
use citycast::{
    CitySeries, DatasetConfig, Forecaster, HeuristicForecaster, LearnedForecaster,
    ObservationRecord, WeatherDataset,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use std::path::Path;

fn synthetic_series(days: usize) -> CitySeries {
    let start = NaiveDate::from_ymd_opt(2012, 10, 1).unwrap();
    let records = (0..days)
        .map(|i| {
            let phase = i as f64 / 365.0 * std::f64::consts::TAU;
            let mut record =
                ObservationRecord::new(start + Duration::days(i as i64), 12.0 - 9.0 * phase.cos());
            record.humidity = Some(70.0 + 15.0 * phase.sin());
            record.pressure = Some(1013.0 + (i % 7) as f64);
            record.wind_speed = Some(3.0 + (i % 4) as f64);
            record
        })
        .collect();
    CitySeries::new("Benchville", records)
}

fn write_hourly_tables(dir: &Path, cities: usize, days: usize) {
    let mut temperature = String::from("datetime");
    for city in 0..cities {
        write!(temperature, ",City{}", city).unwrap();
    }
    let mut humidity = temperature.clone();
    let start = NaiveDate::from_ymd_opt(2012, 10, 1).unwrap();
    for day in 0..days {
        let date = start + Duration::days(day as i64);
        for hour in 0..24 {
            write!(temperature, "\n{} {:02}:00:00", date, hour).unwrap();
            write!(humidity, "\n{} {:02}:00:00", date, hour).unwrap();
            for city in 0..cities {
                write!(temperature, ",{:.2}", 280.0 + ((day + city + hour) % 15) as f64).unwrap();
                write!(humidity, ",{}", 50 + (day + hour) % 40).unwrap();
            }
        }
    }
    std::fs::write(dir.join("temperature.csv"), temperature).unwrap();
    std::fs::write(dir.join("humidity.csv"), humidity).unwrap();
}

fn bench_citycast(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    write_hourly_tables(dir.path(), 10, 120);
    let config = DatasetConfig::new(dir.path());
    c.bench_function("build_dataset", |b| {
        b.iter(|| WeatherDataset::load(black_box(config.clone())).unwrap())
    });

    let series = synthetic_series(1500);
    c.bench_function("heuristic_forecast", |b| {
        b.iter(|| HeuristicForecaster::new().forecast(black_box(&series), 7).unwrap())
    });

    let mut learned = LearnedForecaster::default();
    c.bench_function("learned_train", |b| {
        b.iter(|| learned.train(black_box(&series)).unwrap())
    });
    c.bench_function("learned_rollout", |b| {
        b.iter(|| learned.predict_next(black_box(&series), 30).unwrap())
    });
}

criterion_group!(benches, bench_citycast);
criterion_main!(benches);
