use chrono::{Duration, NaiveDate, TimeZone, Utc, Weekday};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mindmend_common::{AvailabilityWindow, ScheduleWriter, UnavailabilityRecord};
use mindmend_scheduling::{classify_slots, compute_free_slots, InMemoryScheduleStore, SlotQuery};

fn create_window(start: &str, end: &str) -> AvailabilityWindow {
    AvailabilityWindow {
        therapist_id: "t-1".to_string(),
        day_of_week: Weekday::Mon,
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

// Helper function to create `count` blocks of `length_minutes`, one every two hours from 08:00
fn create_blocks(count: i64, length_minutes: i64) -> Vec<UnavailabilityRecord> {
    let day_start = Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let start = day_start + Duration::minutes(i * 120 % (16 * 60));
            UnavailabilityRecord {
                id: Some(i),
                therapist_id: "t-1".to_string(),
                start_time: start.to_rfc3339(),
                end_time: (start + Duration::minutes(length_minutes)).to_rfc3339(),
                reason: None,
                appointment_id: Some(format!("apt-{}", i)),
            }
        })
        .collect()
}

fn benchmark_classify_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_slots");
    let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

    group.bench_function("no_blocks", |b| {
        let window = create_window("09:00", "17:00");
        let records: Vec<UnavailabilityRecord> = Vec::new();
        let query = SlotQuery::new("t-1", date, 60);
        b.iter(|| classify_slots(black_box(&window), black_box(&records), black_box(&query)))
    });

    group.bench_function("few_blocks", |b| {
        let window = create_window("09:00", "17:00");
        let records = create_blocks(4, 60);
        let query = SlotQuery::new("t-1", date, 60);
        b.iter(|| classify_slots(black_box(&window), black_box(&records), black_box(&query)))
    });

    group.bench_function("full_day_fine_interval", |b| {
        let window = create_window("00:00", "23:59");
        let records = create_blocks(50, 45);
        let query = SlotQuery::new("t-1", date, 120).with_interval(5);
        b.iter(|| classify_slots(black_box(&window), black_box(&records), black_box(&query)))
    });

    group.finish();
}

fn benchmark_compute_free_slots(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryScheduleStore::new();
    runtime.block_on(async {
        store
            .upsert_window(create_window("09:00", "17:00"))
            .await
            .unwrap();
        for record in create_blocks(8, 30) {
            store.block_interval(record).await.unwrap();
        }
    });

    let query = SlotQuery::new("t-1", NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(), 60);
    c.bench_function("compute_free_slots_in_memory", |b| {
        b.to_async(&runtime)
            .iter(|| compute_free_slots(black_box(&store), black_box(&query)))
    });
}

criterion_group!(
    benches,
    benchmark_classify_slots,
    benchmark_compute_free_slots
);
criterion_main!(benches);
