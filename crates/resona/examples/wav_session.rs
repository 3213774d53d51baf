//! Runs a WAV file through a processing session, 10 ms at a time.
//!
//! Demonstrates the chunking the per-frame contract demands: the input is
//! split into exact 10 ms frames (a trailing partial frame is dropped),
//! deinterleaved, processed in place, and written back out.
//!
//! ```sh
//! cargo run -p resona --example wav_session --features examples -- in.wav out.wav
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use resona::config::{EchoCanceller, NoiseSuppression, NoiseSuppressionLevel};
use resona::{Config, NATIVE_SAMPLE_RATES, Processor};

#[derive(Parser)]
struct Args {
    /// Input WAV file (f32 or i16 samples).
    input: std::path::PathBuf,
    /// Output WAV file (f32 samples).
    output: std::path::PathBuf,
    /// Noise suppression level: low, moderate, high, veryhigh.
    #[arg(long, default_value = "moderate")]
    ns_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut reader = hound::WavReader::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let spec = reader.spec();
    let sample_rate = spec.sample_rate as usize;
    let num_channels = spec.channels as usize;

    if !NATIVE_SAMPLE_RATES.contains(&sample_rate) {
        bail!("sample rate {sample_rate} is not supported (need one of {NATIVE_SAMPLE_RATES:?})");
    }

    let level = match args.ns_level.as_str() {
        "low" => NoiseSuppressionLevel::Low,
        "moderate" => NoiseSuppressionLevel::Moderate,
        "high" => NoiseSuppressionLevel::High,
        "veryhigh" => NoiseSuppressionLevel::VeryHigh,
        other => bail!("unknown noise suppression level: {other}"),
    };

    let processor = Processor::builder()
        .num_capture_channels(num_channels)
        .num_render_channels(num_channels)
        .sample_rate_hz(sample_rate)
        .config(Config {
            echo_canceller: Some(EchoCanceller::default()),
            noise_suppression: Some(NoiseSuppression {
                level,
                ..Default::default()
            }),
            ..Default::default()
        })
        .build()
        .context("session construction")?;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|s| f32::from(s) / 32768.0))
            .collect::<Result<_, _>>()?,
    };

    let num_frames = processor.num_samples_per_frame();
    let mut writer = hound::WavWriter::create(
        &args.output,
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        },
    )
    .with_context(|| format!("creating {}", args.output.display()))?;

    let samples_per_chunk = num_frames * num_channels;
    let mut processed = 0usize;
    for chunk in samples.chunks_exact(samples_per_chunk) {
        // Deinterleave into one buffer per channel.
        let mut channels: Vec<Vec<f32>> = (0..num_channels)
            .map(|ch| {
                chunk
                    .iter()
                    .skip(ch)
                    .step_by(num_channels)
                    .copied()
                    .collect()
            })
            .collect();
        let mut frame: Vec<&mut [f32]> =
            channels.iter_mut().map(|ch| ch.as_mut_slice()).collect();
        processor.process_capture_frame(&mut frame)?;

        for i in 0..num_frames {
            for ch in channels.iter() {
                writer.write_sample(ch[i])?;
            }
        }
        processed += 1;
    }
    writer.finalize()?;

    let stats = processor.get_stats();
    println!(
        "{processed} frames processed, final rms: {:?} dBFS",
        stats.output_rms_dbfs
    );
    Ok(())
}
