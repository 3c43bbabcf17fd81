// Criterion benchmarks for Polyglot Map

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use polyglot_map::core::{distance::haversine_distance, filter, FilterState};
use polyglot_map::models::{Coordinate, FilterCriteria, LocationRecord};

const LANGUAGES: &[&str] = &["English", "German", "French", "Spanish", "Mandarin", "Arabic"];

fn create_record(id: usize, lat: f64, lon: f64) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        display_name: format!("User {}", id),
        country_code: "DE".to_string(),
        tags: [LANGUAGES[id % LANGUAGES.len()], LANGUAGES[(id / 3) % LANGUAGES.len()]]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        position: if id % 50 == 0 {
            None
        } else {
            Some(Coordinate { latitude: lat, longitude: lon })
        },
    }
}

fn create_records(count: usize) -> Vec<LocationRecord> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.01) % 5.0;
            let lon_offset = (i as f64 * 0.013) % 5.0;
            create_record(i, 50.0 + lat_offset, 8.0 + lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(52.5200),
                black_box(13.4050),
                black_box(48.1351),
                black_box(11.5820),
            )
        });
    });
}

fn bench_filter_pipeline(c: &mut Criterion) {
    let viewer = Some(Coordinate { latitude: 52.52, longitude: 13.405 });
    let criteria = FilterCriteria::new(Some(250.0), ["English", "French"]);

    let mut group = c.benchmark_group("filter");

    for record_count in [100, 1_000, 10_000].iter() {
        let records = create_records(*record_count);

        group.bench_with_input(
            BenchmarkId::new("radius_and_tags", record_count),
            record_count,
            |b, _| {
                b.iter(|| filter(black_box(&records), black_box(viewer), black_box(&criteria)));
            },
        );
    }

    group.finish();
}

fn bench_filter_state(c: &mut Criterion) {
    let state = FilterState::new();
    state.subscribe(|criteria| {
        black_box(criteria.tags.len());
    });
    let criteria = FilterCriteria::new(Some(50.0), ["English"]);

    c.bench_function("filter_state_set", |b| {
        b.iter(|| state.set(black_box(criteria.clone())))
    });

    c.bench_function("filter_state_get", |b| b.iter(|| black_box(state.get())));
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_filter_pipeline,
    bench_filter_state
);

criterion_main!(benches);
