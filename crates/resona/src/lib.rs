//! Thread-safe session façade for real-time voice-processing engines.
//!
//! Resona wraps a frame-based DSP engine (echo cancellation, noise
//! suppression, gain control, voice detection) behind a stable boundary: the
//! engine is opaque, and the façade owns everything that has to be correct
//! around it — the per-frame buffer contract, the echo-canceller
//! configuration hotswap, single- versus multichannel strategy selection,
//! and a uniform optional representation for statistics.
//!
//! # Quick Start
//!
//! ```
//! use resona::{Config, Processor};
//! use resona::config::{EchoCanceller, NoiseSuppression};
//!
//! let config = Config {
//!     echo_canceller: Some(EchoCanceller::default()),
//!     noise_suppression: Some(NoiseSuppression::default()),
//!     ..Default::default()
//! };
//!
//! let processor = Processor::builder()
//!     .sample_rate_hz(16000)
//!     .config(config)
//!     .build()
//!     .unwrap();
//!
//! // For each 10 ms frame, feed far-end (render) audio, then clean the
//! // near-end (capture) audio in place:
//! let n = processor.num_samples_per_frame();
//! let mut render = vec![0.0f32; n];
//! let mut capture = vec![0.0f32; n];
//! processor.process_render_frame(&mut [&mut render]).unwrap();
//! processor.process_capture_frame(&mut [&mut capture]).unwrap();
//!
//! let stats = processor.get_stats();
//! println!("rms: {:?} dBFS", stats.output_rms_dbfs);
//! ```
//!
//! The engine itself is injected through
//! [`engine::EngineFactory`]; without one, the built-in passthrough engine
//! is used, which honors the full contract but performs no DSP.

pub mod aec3;
pub mod config;
pub(crate) mod config_holder;
pub(crate) mod config_selector;
pub mod engine;
#[cfg(feature = "ffi")]
pub mod ffi;
mod processor;
pub mod stats;
mod stream_config;

// Public re-exports.
pub use config::{Config, RuntimeSetting};
pub use processor::{Error, Processor, ProcessorBuilder};
pub use stats::Stats;
pub use stream_config::{FRAME_MS, NATIVE_SAMPLE_RATES, StreamConfig};
