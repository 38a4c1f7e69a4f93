use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use mitrials::{
    extract_trials, extract_trials_aligned, extract_trials_multi_channel, Event, EventCodeTable,
    EventLog,
};
use ndarray::Array2;

/// 22 channels × 288 trials (six runs of 48), every 13th trial rejected.
fn session() -> (Array2<f32>, EventLog) {
    let n_trials = 288;
    let mut events = Vec::with_capacity(2 * n_trials);
    for i in 0..n_trials {
        let start = 1000 + i as i64 * 2000;
        let cue = if i % 13 == 0 { 1023 } else { 769 + (i % 4) as i32 };
        events.push(Event { code: 768, position: start, duration: 1875 });
        events.push(Event { code: cue, position: start + 500, duration: 0 });
    }
    let n_t = 1000 + n_trials * 2000;
    let signal = Array2::from_shape_fn((22, n_t), |(c, t)| ((c + t) % 97) as f32);
    (signal, EventLog::from_events(events))
}

fn bench_single_channel(c: &mut Criterion) {
    let (signal, events) = session();
    let table = EventCodeTable::default();
    c.bench_function("extract_trials [1 ch × 288 trials]", |b| {
        b.iter(|| {
            let set = extract_trials(signal.row(7), black_box(&events), &table, 768);
            black_box(set.len())
        })
    });
}

fn bench_multi_channel(c: &mut Criterion) {
    let (signal, events) = session();
    let table = EventCodeTable::default();
    let channels: Vec<usize> = (0..22).collect();
    c.bench_function("extract_trials_multi_channel [22 ch]", |b| {
        b.iter(|| {
            let sets =
                extract_trials_multi_channel(signal.view(), &channels, black_box(&events), &table, 768);
            black_box(sets.len())
        })
    });
    c.bench_function("extract_trials_aligned [22 ch]", |b| {
        b.iter(|| {
            let aligned =
                extract_trials_aligned(signal.view(), &channels, black_box(&events), &table, 768);
            black_box(aligned.len())
        })
    });
}

criterion_group!(benches, bench_single_channel, bench_multi_channel);
criterion_main!(benches);
