use activity_tracker::models::{ActivityStats, GpxPayload};
use activity_tracker::protocol::{decode_frame, encode_frame, ServerResponse};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const LIMIT: usize = 64 * 1024 * 1024;

fn benchmark_frames(c: &mut Criterion) {
    // A 1 MiB track is at the large end of what users upload
    let payload = GpxPayload::new("long_ride.gpx", vec![b'<'; 1024 * 1024]);
    let encoded = encode_frame(&payload, LIMIT).expect("Failed to encode payload");

    let response = ServerResponse::Stats(ActivityStats::new(27.3, 1250.0, 312.5, 142.2));
    let response_frame = encode_frame(&response, LIMIT).expect("Failed to encode response");

    let mut group = c.benchmark_group("wire_frames");

    group.bench_function("encode_1mib_payload", |b| {
        b.iter(|| encode_frame(black_box(&payload), LIMIT))
    });

    group.bench_function("decode_1mib_payload", |b| {
        b.iter(|| decode_frame::<GpxPayload>(black_box(&encoded), LIMIT))
    });

    group.bench_function("decode_stats_response", |b| {
        b.iter(|| decode_frame::<ServerResponse>(black_box(&response_frame), LIMIT))
    });

    group.finish();
}

criterion_group!(benches, benchmark_frames);
criterion_main!(benches);
