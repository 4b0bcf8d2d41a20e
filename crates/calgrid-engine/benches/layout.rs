//! Layout benchmarks
//!
//! The week layout runs on every navigation; the overflow calculation runs
//! on every observed resize of a month cell.

use std::hint::black_box;

use calgrid_engine::{
    build_collection, compute_layout, organize_events_with_overflow, parse_timezone,
    CalendarEvent, CalendarView, EventDate, LayoutConfig, OverflowOptions, ViewSettings,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Deterministic pseudo-random events spread over one week.
fn synthetic_week(count: usize) -> Vec<CalendarEvent> {
    let monday = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let mut seed: u64 = 12345;
    (0..count)
        .map(|i| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let offset = (seed >> 33) % (7 * 24 * 4);
            let length = 1 + (seed >> 17) % 8;
            let start = monday + Duration::minutes(offset as i64 * 15);
            let end = start + Duration::minutes(length as i64 * 15);
            let id = format!("evt-{i}");
            CalendarEvent::new(&id, &id, EventDate::Instant(start), EventDate::Instant(end))
        })
        .collect()
}

fn bench_week_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("week_layout");
    let view = CalendarView::Week {
        date: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
    };
    let settings = ViewSettings::new("America/New_York");
    let config = LayoutConfig::default();

    for count in [50, 200, 1000] {
        let events = synthetic_week(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &events, |b, events| {
            b.iter(|| compute_layout(black_box(events), &view, &settings, &config));
        });
    }

    group.finish();
}

fn bench_overflow_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("overflow_resize");
    let tz = parse_timezone("UTC").unwrap();
    let options = OverflowOptions::default();

    for count in [5, 20, 80] {
        let items = build_collection(&synthetic_week(count), &tz).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                for height in [24.0, 66.0, 110.0, 240.0] {
                    black_box(organize_events_with_overflow(
                        black_box(items),
                        height,
                        &tz,
                        &options,
                    ));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_week_layout, bench_overflow_resize);
criterion_main!(benches);
