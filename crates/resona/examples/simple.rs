//! Minimal session demo.
//!
//! Creates a stereo session with echo cancellation and noise suppression
//! enabled, runs synthetic render and capture frames through it, and prints
//! the statistics snapshot.
//!
//! ```sh
//! RUST_LOG=resona=debug cargo run -p resona --example simple
//! ```

use resona::config::{EchoCanceller, NoiseSuppression};
use resona::{Config, Processor};

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config {
        echo_canceller: Some(EchoCanceller::default()),
        noise_suppression: Some(NoiseSuppression::default()),
        ..Default::default()
    };

    let processor = Processor::builder()
        .num_capture_channels(2)
        .num_render_channels(2)
        .sample_rate_hz(48000)
        .config(config)
        .build()
        .expect("session construction");

    let num_frames = processor.num_samples_per_frame();

    // Simulate one second: the render signal is a low cosine, the capture
    // signal a sine with a bit of the render signal leaked in.
    for _ in 0..100 {
        let mut render_l: Vec<f32> = (0..num_frames)
            .map(|i| (i as f32 / 40.0).cos() * 0.4)
            .collect();
        let mut render_r: Vec<f32> = render_l.iter().map(|s| s * 0.5).collect();
        processor
            .process_render_frame(&mut [&mut render_l, &mut render_r])
            .expect("render frame");

        let mut capture_l: Vec<f32> = (0..num_frames)
            .map(|i| (i as f32 / 20.0).sin() * 0.4 + render_l[i] * 0.2)
            .collect();
        let mut capture_r: Vec<f32> = capture_l.iter().map(|s| s * 0.5).collect();
        processor
            .process_capture_frame(&mut [&mut capture_l, &mut capture_r])
            .expect("capture frame");
    }

    let stats = processor.get_stats();
    println!("stats after 1 s of audio: {stats:#?}");
}
