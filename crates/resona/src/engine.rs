//! The opaque processing-engine boundary.
//!
//! The façade owns no DSP. Everything signal-related happens behind
//! [`ProcessingEngine`], which a real echo-cancellation/noise-suppression
//! engine implements and an [`EngineFactory`] instantiates. The façade talks
//! to the engine only through this surface: initialization with the four
//! per-direction stream descriptors, per-frame processing calls returning raw
//! status codes, configuration pushes, and a statistics read.
//!
//! [`PassthroughEngine`] is the built-in reference implementation: it honors
//! the full engine contract (format checking, stream-delay bookkeeping, lazy
//! echo-controller resolution through the registered factory, RMS metering)
//! while forwarding audio unmodified. It stands in wherever no real DSP
//! engine is linked — examples, the C API, fuzzing.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::aec3::EchoCancellerConfig;
use crate::config::{Config, RuntimeSetting};
use crate::stats::Stats;
use crate::stream_config::StreamConfig;

/// Raw engine status codes. `0` is success; nonzero values are
/// engine-specific and surfaced to callers verbatim.
pub mod status {
    /// Successful operation.
    pub const NO_ERROR: i32 = 0;
    /// Unspecified engine failure.
    pub const UNSPECIFIED_ERROR: i32 = -1;
    /// Engine construction failed.
    pub const CREATION_FAILED: i32 = -2;
    /// A requested component is not available in this build.
    pub const UNSUPPORTED_COMPONENT: i32 = -3;
    /// A requested function is not available in this build.
    pub const UNSUPPORTED_FUNCTION: i32 = -4;
    /// A required pointer argument was null.
    pub const NULL_POINTER: i32 = -5;
    /// A supplied parameter was rejected.
    pub const BAD_PARAMETER: i32 = -6;
    /// The sample rate is not supported.
    pub const BAD_SAMPLE_RATE: i32 = -7;
    /// A buffer had the wrong number of samples.
    pub const BAD_DATA_LENGTH: i32 = -8;
    /// A buffer had the wrong number of channels.
    pub const BAD_NUMBER_CHANNELS: i32 = -9;
    /// A stream parameter was out of range and clamped.
    pub const BAD_STREAM_PARAMETER_WARNING: i32 = -13;

    /// Whether `code` indicates a successful operation.
    #[inline]
    pub fn is_success(code: i32) -> bool {
        code == NO_ERROR
    }
}

/// The four stream descriptors handed to the engine at (re)initialization.
///
/// The engine requires input and output formats to match per direction, so
/// both members of each pair are set from the same descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSetup {
    /// Capture input format.
    pub capture_input: StreamConfig,
    /// Capture output format.
    pub capture_output: StreamConfig,
    /// Render input format.
    pub render_input: StreamConfig,
    /// Render output format.
    pub render_output: StreamConfig,
}

impl EngineSetup {
    /// Builds a setup with identical input and output formats per direction.
    pub fn symmetric(capture: StreamConfig, render: StreamConfig) -> Self {
        Self {
            capture_input: capture,
            capture_output: capture,
            render_input: render,
            render_output: render,
        }
    }
}

/// Builds the engine's echo controller configuration on demand.
///
/// The engine invokes this lazily — the first time it needs an echo
/// controller and again after every reinitialization — passing the live
/// channel counts. Implementations must return by value; the engine must
/// never retain a reference into façade state.
pub trait EchoControlFactory: Send + Sync {
    /// Returns the configuration the controller should be built with.
    fn create(
        &self,
        num_render_channels: usize,
        num_capture_channels: usize,
    ) -> EchoCancellerConfig;
}

impl fmt::Debug for dyn EchoControlFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn EchoControlFactory")
    }
}

/// The engine itself, as consumed by the façade.
///
/// Implementations must be internally synchronized (`Send + Sync`): the
/// façade forwards calls from up to two logical callers — a capture caller
/// and a render/config caller — without serializing the processing paths
/// against each other.
pub trait ProcessingEngine: Send + Sync {
    /// Re-runs engine initialization with the given formats, resetting all
    /// adaptive state.
    fn initialize(&self, setup: &EngineSetup) -> i32;

    /// Processes one 10 ms capture frame in place. One slice per channel.
    fn process_capture(&self, channels: &mut [&mut [f32]]) -> i32;

    /// Feeds and possibly modifies one 10 ms render frame.
    fn process_render(&self, channels: &mut [&mut [f32]]) -> i32;

    /// Observes one 10 ms render frame without modifying it.
    fn analyze_render(&self, channels: &[&[f32]]) -> i32;

    /// Pushes a new top-level configuration.
    fn apply_config(&self, config: &Config);

    /// Enqueues a runtime setting for the capture path.
    fn set_runtime_setting(&self, setting: RuntimeSetting);

    /// Reports the render-to-capture delay for the next capture frame.
    fn set_stream_delay_ms(&self, delay_ms: i32);

    /// Hints that the playout signal is (or will be) muted.
    fn set_output_will_be_muted(&self, muted: bool);

    /// Hints that the next capture frame contains key-press noise.
    fn set_stream_key_pressed(&self, pressed: bool);

    /// Reads the engine's statistics block.
    fn statistics(&self) -> Stats;
}

impl fmt::Debug for dyn ProcessingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn ProcessingEngine")
    }
}

/// Creates engine instances for new sessions.
pub trait EngineFactory: Send + Sync {
    /// Builds an engine for the given formats, retaining `echo_control` for
    /// lazy controller construction.
    ///
    /// Returns a raw engine status code on failure.
    fn create(
        &self,
        setup: &EngineSetup,
        echo_control: Arc<dyn EchoControlFactory>,
    ) -> Result<Box<dyn ProcessingEngine>, i32>;
}

impl fmt::Debug for dyn EngineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn EngineFactory")
    }
}

// ---------------------------------------------------------------------------
// Passthrough reference engine
// ---------------------------------------------------------------------------

struct PassthroughState {
    setup: EngineSetup,
    config: Config,
    stream_delay_ms: i32,
    output_muted: bool,
    key_pressed: bool,
    controller: Option<EchoCancellerConfig>,
    last_capture_rms_dbfs: Option<i32>,
}

/// Reference engine that forwards audio unmodified.
///
/// Tracks formats, configuration, the stream-delay hint, and the echo
/// controller resolved through the registered factory, and meters the RMS
/// level of the most recent capture frame. Statistics that require actual
/// DSP stay absent.
pub struct PassthroughEngine {
    echo_control: Arc<dyn EchoControlFactory>,
    state: Mutex<PassthroughState>,
}

impl fmt::Debug for PassthroughEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassthroughEngine").finish_non_exhaustive()
    }
}

impl PassthroughEngine {
    /// Creates a passthrough engine for the given formats.
    pub fn new(setup: &EngineSetup, echo_control: Arc<dyn EchoControlFactory>) -> Self {
        Self {
            echo_control,
            state: Mutex::new(PassthroughState {
                setup: *setup,
                config: Config::default(),
                stream_delay_ms: 0,
                output_muted: false,
                key_pressed: false,
                controller: None,
                last_capture_rms_dbfs: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PassthroughState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_shape(expected: &StreamConfig, num_channels: usize, lengths_ok: bool) -> i32 {
        if num_channels != expected.num_channels() {
            return status::BAD_NUMBER_CHANNELS;
        }
        if !lengths_ok {
            return status::BAD_DATA_LENGTH;
        }
        status::NO_ERROR
    }
}

impl ProcessingEngine for PassthroughEngine {
    fn initialize(&self, setup: &EngineSetup) -> i32 {
        let mut state = self.lock();
        state.setup = *setup;
        state.last_capture_rms_dbfs = None;
        // Adaptive state would reset here in a real engine; the controller
        // is re-resolved with the live channel counts.
        state.controller = if state.config.echo_canceller.is_some() {
            let resolved = self.echo_control.create(
                setup.render_input.num_channels(),
                setup.capture_input.num_channels(),
            );
            tracing::debug!(
                refined_length = resolved.filter.refined.length_blocks,
                coarse_rate = f64::from(resolved.filter.coarse.rate),
                "echo controller resolved"
            );
            Some(resolved)
        } else {
            None
        };
        status::NO_ERROR
    }

    fn process_capture(&self, channels: &mut [&mut [f32]]) -> i32 {
        let mut state = self.lock();
        let expected = state.setup.capture_input;
        let lengths_ok = channels.iter().all(|ch| ch.len() == expected.num_frames());
        let code = Self::check_shape(&expected, channels.len(), lengths_ok);
        if !status::is_success(code) {
            return code;
        }
        state.last_capture_rms_dbfs = Some(rms_dbfs(channels));
        status::NO_ERROR
    }

    fn process_render(&self, channels: &mut [&mut [f32]]) -> i32 {
        let state = self.lock();
        let expected = state.setup.render_input;
        let lengths_ok = channels.iter().all(|ch| ch.len() == expected.num_frames());
        Self::check_shape(&expected, channels.len(), lengths_ok)
    }

    fn analyze_render(&self, channels: &[&[f32]]) -> i32 {
        let state = self.lock();
        let expected = state.setup.render_input;
        let lengths_ok = channels.iter().all(|ch| ch.len() == expected.num_frames());
        Self::check_shape(&expected, channels.len(), lengths_ok)
    }

    fn apply_config(&self, config: &Config) {
        self.lock().config = config.clone();
    }

    fn set_runtime_setting(&self, _setting: RuntimeSetting) {}

    fn set_stream_delay_ms(&self, delay_ms: i32) {
        self.lock().stream_delay_ms = delay_ms;
    }

    fn set_output_will_be_muted(&self, muted: bool) {
        self.lock().output_muted = muted;
    }

    fn set_stream_key_pressed(&self, pressed: bool) {
        self.lock().key_pressed = pressed;
    }

    fn statistics(&self) -> Stats {
        Stats {
            output_rms_dbfs: self.lock().last_capture_rms_dbfs,
            ..Stats::default()
        }
    }
}

/// Factory for [`PassthroughEngine`]; the default when no engine is injected.
#[derive(Debug, Default)]
pub struct PassthroughEngineFactory;

impl EngineFactory for PassthroughEngineFactory {
    fn create(
        &self,
        setup: &EngineSetup,
        echo_control: Arc<dyn EchoControlFactory>,
    ) -> Result<Box<dyn ProcessingEngine>, i32> {
        Ok(Box::new(PassthroughEngine::new(setup, echo_control)))
    }
}

/// RMS level of a deinterleaved frame in dBFS, constrained to [-127, 0].
/// -127 indicates muted, matching the engine's convention.
fn rms_dbfs(channels: &[&mut [f32]]) -> i32 {
    let num_samples: usize = channels.iter().map(|ch| ch.len()).sum();
    if num_samples == 0 {
        return -127;
    }
    let sum_squares: f64 = channels
        .iter()
        .flat_map(|ch| ch.iter())
        .map(|&s| f64::from(s) * f64::from(s))
        .sum();
    let mean_square = sum_squares / num_samples as f64;
    if mean_square <= 0.0 {
        return -127;
    }
    let dbfs = 10.0 * mean_square.log10();
    dbfs.round().clamp(-127.0, 0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EchoCanceller;
    use crate::config_holder::SharedAecConfig;
    use crate::config_selector::AecConfigSelector;

    fn engine_for(capture: StreamConfig, render: StreamConfig) -> PassthroughEngine {
        let selector = Arc::new(AecConfigSelector::new(SharedAecConfig::new()));
        let setup = EngineSetup::symmetric(capture, render);
        let engine = PassthroughEngine::new(&setup, selector);
        engine.initialize(&setup);
        engine
    }

    #[test]
    fn capture_passthrough_leaves_samples_unchanged() {
        let engine = engine_for(StreamConfig::new(16000, 1), StreamConfig::new(16000, 1));
        let mut samples = vec![0.25f32; 160];
        let original = samples.clone();
        let mut channels: Vec<&mut [f32]> = vec![&mut samples];
        assert_eq!(engine.process_capture(&mut channels), status::NO_ERROR);
        assert_eq!(samples, original);
    }

    #[test]
    fn wrong_channel_count_is_rejected() {
        let engine = engine_for(StreamConfig::new(16000, 2), StreamConfig::new(16000, 2));
        let mut ch0 = vec![0.0f32; 160];
        let mut channels: Vec<&mut [f32]> = vec![&mut ch0];
        assert_eq!(
            engine.process_capture(&mut channels),
            status::BAD_NUMBER_CHANNELS
        );
    }

    #[test]
    fn wrong_frame_length_is_rejected() {
        let engine = engine_for(StreamConfig::new(48000, 1), StreamConfig::new(48000, 1));
        let mut short = vec![0.0f32; 160]; // 480 expected at 48 kHz
        let mut channels: Vec<&mut [f32]> = vec![&mut short];
        assert_eq!(
            engine.process_capture(&mut channels),
            status::BAD_DATA_LENGTH
        );
    }

    #[test]
    fn stats_absent_before_first_capture() {
        let engine = engine_for(StreamConfig::new(16000, 1), StreamConfig::new(16000, 1));
        assert_eq!(engine.statistics(), Stats::default());
    }

    #[test]
    fn rms_is_metered_after_capture() {
        let engine = engine_for(StreamConfig::new(16000, 1), StreamConfig::new(16000, 1));
        let mut samples = vec![0.5f32; 160];
        let mut channels: Vec<&mut [f32]> = vec![&mut samples];
        engine.process_capture(&mut channels);

        let stats = engine.statistics();
        // 0.5 amplitude is -6 dBFS.
        assert_eq!(stats.output_rms_dbfs, Some(-6));
        assert!(stats.voice_detected.is_none());
        assert!(stats.echo_return_loss.is_none());
    }

    #[test]
    fn silence_meters_as_muted() {
        let engine = engine_for(StreamConfig::new(8000, 1), StreamConfig::new(8000, 1));
        let mut samples = vec![0.0f32; 80];
        let mut channels: Vec<&mut [f32]> = vec![&mut samples];
        engine.process_capture(&mut channels);
        assert_eq!(engine.statistics().output_rms_dbfs, Some(-127));
    }

    #[test]
    fn reinitialize_clears_metering() {
        let setup = EngineSetup::symmetric(StreamConfig::new(16000, 1), StreamConfig::new(16000, 1));
        let engine = engine_for(setup.capture_input, setup.render_input);
        let mut samples = vec![0.5f32; 160];
        let mut channels: Vec<&mut [f32]> = vec![&mut samples];
        engine.process_capture(&mut channels);
        assert!(engine.statistics().output_rms_dbfs.is_some());

        engine.initialize(&setup);
        assert!(engine.statistics().output_rms_dbfs.is_none());
    }

    #[test]
    fn controller_resolved_only_with_canceller_enabled() {
        let setup = EngineSetup::symmetric(StreamConfig::new(16000, 1), StreamConfig::new(16000, 1));
        let selector = Arc::new(AecConfigSelector::new(SharedAecConfig::new()));
        let engine = PassthroughEngine::new(&setup, selector);

        engine.initialize(&setup);
        assert!(engine.lock().controller.is_none());

        engine.apply_config(&Config {
            echo_canceller: Some(EchoCanceller::default()),
            ..Config::default()
        });
        engine.initialize(&setup);
        assert_eq!(
            engine.lock().controller,
            Some(EchoCancellerConfig::default())
        );
    }

    #[test]
    fn analyze_render_accepts_shared_slices() {
        let engine = engine_for(StreamConfig::new(16000, 1), StreamConfig::new(16000, 2));
        let left = vec![0.1f32; 160];
        let right = vec![0.2f32; 160];
        let channels: Vec<&[f32]> = vec![&left, &right];
        assert_eq!(engine.analyze_render(&channels), status::NO_ERROR);
    }
}
