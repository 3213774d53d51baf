//! Benchmarks for the session façade overhead.
//!
//! The built-in passthrough engine does no DSP, so these numbers isolate the
//! cost of the boundary itself: buffer contract checks, the state lock, and
//! the stream-delay push.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use resona::config::EchoCanceller;
use resona::{Config, Processor};

fn make_processor(sample_rate: usize, channels: usize, canceller: bool) -> Processor {
    let config = Config {
        echo_canceller: canceller.then(EchoCanceller::default),
        ..Default::default()
    };
    Processor::builder()
        .num_capture_channels(channels)
        .num_render_channels(channels)
        .sample_rate_hz(sample_rate)
        .config(config)
        .build()
        .unwrap()
}

fn bench_capture_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_capture_frame");
    for &(rate, channels) in &[(16000usize, 1usize), (48000, 1), (48000, 2)] {
        let processor = make_processor(rate, channels, true);
        processor.set_stream_delay_ms(40).unwrap();
        let num_frames = processor.num_samples_per_frame();
        let mut buffers: Vec<Vec<f32>> = (0..channels)
            .map(|_| (0..num_frames).map(|i| (i as f32 * 0.01).sin() * 0.1).collect())
            .collect();

        group.bench_function(format!("{rate}hz_{channels}ch"), |b| {
            b.iter(|| {
                let mut frame: Vec<&mut [f32]> =
                    buffers.iter_mut().map(|ch| ch.as_mut_slice()).collect();
                processor.process_capture_frame(black_box(&mut frame)).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_stats_snapshot(c: &mut Criterion) {
    let processor = make_processor(48000, 2, true);
    let num_frames = processor.num_samples_per_frame();
    let mut left = vec![0.1f32; num_frames];
    let mut right = vec![0.1f32; num_frames];
    processor
        .process_capture_frame(&mut [&mut left, &mut right])
        .unwrap();

    c.bench_function("get_stats", |b| {
        b.iter(|| black_box(processor.get_stats()))
    });
}

fn bench_idempotent_aec_config(c: &mut Criterion) {
    let processor = make_processor(48000, 1, true);
    let config = resona::aec3::EchoCancellerConfig::default();
    processor.set_aec_config(Some(config)).unwrap();

    // Steady-state: re-applying the identical config must be cheap (no
    // engine reinitialization).
    c.bench_function("set_aec_config_idempotent", |b| {
        b.iter(|| processor.set_aec_config(black_box(Some(config))).unwrap())
    });
}

criterion_group!(
    benches,
    bench_capture_frame,
    bench_stats_snapshot,
    bench_idempotent_aec_config
);
criterion_main!(benches);
