#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resona::config::{EchoCanceller, NoiseSuppression};
use resona::{Config, Processor};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Sample rate index: 0=8k, 1=16k, 2=32k, 3=48k
    sample_rate_idx: u8,
    /// Number of channels (clamped to 1-2)
    channels: u8,
    /// Whether the echo canceller is enabled
    canceller: bool,
    /// Stream delay hint
    delay_ms: i16,
    /// Audio samples (clamped to frame size and [-1, 1])
    samples: Vec<f32>,
}

fn sample_rate(idx: u8) -> usize {
    match idx % 4 {
        0 => 8000,
        1 => 16000,
        2 => 32000,
        _ => 48000,
    }
}

/// Clamp to valid audio range [-1, 1], replacing NaN/inf with 0.
fn sanitize_sample(s: f32) -> f32 {
    if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 }
}

fuzz_target!(|input: FuzzInput| {
    let rate = sample_rate(input.sample_rate_idx);
    let channels = (input.channels % 2) as usize + 1;
    let frames = rate / 100;

    if input.samples.len() < frames * channels {
        return;
    }

    let config = Config {
        echo_canceller: input.canceller.then(EchoCanceller::default),
        noise_suppression: Some(NoiseSuppression::default()),
        ..Default::default()
    };
    let Ok(processor) = Processor::builder()
        .num_capture_channels(channels)
        .num_render_channels(channels)
        .sample_rate_hz(rate)
        .config(config)
        .build()
    else {
        return;
    };

    let _ = processor.set_stream_delay_ms(i32::from(input.delay_ms));

    let mut buffers: Vec<Vec<f32>> = (0..channels)
        .map(|ch| {
            input.samples[ch * frames..(ch + 1) * frames]
                .iter()
                .map(|&s| sanitize_sample(s))
                .collect()
        })
        .collect();

    {
        let mut frame: Vec<&mut [f32]> = buffers.iter_mut().map(|b| b.as_mut_slice()).collect();
        processor.process_render_frame(&mut frame).unwrap();
    }
    {
        let mut frame: Vec<&mut [f32]> = buffers.iter_mut().map(|b| b.as_mut_slice()).collect();
        processor.process_capture_frame(&mut frame).unwrap();
    }

    let stats = processor.get_stats();
    if let Some(rms) = stats.output_rms_dbfs {
        assert!((-127..=0).contains(&rms));
    }
});
