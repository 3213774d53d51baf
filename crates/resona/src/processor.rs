//! The processing session.
//!
//! A [`Processor`] is the thread-safe boundary the host application drives
//! frame-by-frame. It owns the engine handle, the immutable per-direction
//! stream descriptors, the mutable stream-delay hint, and the shared echo
//! canceller configuration, and it enforces the per-frame buffer contract
//! before anything reaches the engine.
//!
//! Methods take `&self`; wrap the processor in an [`Arc`](std::sync::Arc) to
//! drive it from a capture thread and a render/config thread. The capture
//! and render processing paths are not serialized against each other — the
//! engine is not guaranteed reentrant across its two streams, so don't call
//! [`process_capture_frame()`](Processor::process_capture_frame) and
//! [`process_render_frame()`](Processor::process_render_frame) concurrently
//! from more than one thread per path.

use std::error;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::aec3::{EchoCancellerConfig, EchoCancellerOverride};
use crate::config::{Config, RuntimeSetting};
use crate::config_holder::SharedAecConfig;
use crate::config_selector::AecConfigSelector;
use crate::engine::{
    EngineFactory, EngineSetup, PassthroughEngineFactory, ProcessingEngine, status,
};
use crate::stats::Stats;
use crate::stream_config::StreamConfig;

// ─── Error ───────────────────────────────────────────────────────────

/// Errors returned by session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sample rate is not one of the engine's native rates.
    BadSampleRate,
    /// A channel count was zero, or a frame had the wrong number of
    /// channel buffers.
    BadNumberChannels,
    /// A channel buffer did not hold exactly one 10 ms frame.
    BadDataLength,
    /// A supplied configuration failed validation; nothing was applied.
    BadParameter,
    /// A stream parameter was out of range and was clamped.
    BadStreamParameter,
    /// A requested optional component is not available in this build.
    UnsupportedComponent,
    /// The engine rejected the combined format/configuration. Carries the
    /// engine-specific code.
    InitializationFailed(i32),
    /// The engine reported a processing error. Carries the raw engine code,
    /// surfaced verbatim.
    Engine(i32),
}

impl Error {
    /// The raw status code for this error, for the C boundary.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadSampleRate => status::BAD_SAMPLE_RATE,
            Self::BadNumberChannels => status::BAD_NUMBER_CHANNELS,
            Self::BadDataLength => status::BAD_DATA_LENGTH,
            Self::BadParameter => status::BAD_PARAMETER,
            Self::BadStreamParameter => status::BAD_STREAM_PARAMETER_WARNING,
            Self::UnsupportedComponent => status::UNSUPPORTED_COMPONENT,
            Self::InitializationFailed(code) | Self::Engine(code) => *code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSampleRate => write!(f, "bad sample rate"),
            Self::BadNumberChannels => write!(f, "bad number of channels"),
            Self::BadDataLength => write!(f, "bad frame length"),
            Self::BadParameter => write!(f, "configuration rejected"),
            Self::BadStreamParameter => write!(f, "bad stream parameter (clamped)"),
            Self::UnsupportedComponent => write!(f, "unsupported component"),
            Self::InitializationFailed(code) => {
                write!(f, "engine initialization failed (code {code})")
            }
            Self::Engine(code) => write!(f, "engine error code {code}"),
        }
    }
}

impl error::Error for Error {}

// ─── Builder ─────────────────────────────────────────────────────────

/// Builder for a [`Processor`].
///
/// # Example
/// ```
/// use resona::{Config, Processor};
/// use resona::config::EchoCanceller;
///
/// let config = Config {
///     echo_canceller: Some(EchoCanceller::default()),
///     ..Default::default()
/// };
///
/// let processor = Processor::builder()
///     .num_capture_channels(2)
///     .num_render_channels(2)
///     .sample_rate_hz(48000)
///     .config(config)
///     .build()
///     .unwrap();
/// assert_eq!(processor.num_samples_per_frame(), 480);
/// ```
#[derive(Debug)]
pub struct ProcessorBuilder {
    num_capture_channels: usize,
    num_render_channels: usize,
    sample_rate_hz: usize,
    config: Config,
    aec_override: Option<EchoCancellerOverride>,
    aec_config: Option<EchoCancellerConfig>,
    engine_factory: Option<Arc<dyn EngineFactory>>,
}

impl ProcessorBuilder {
    fn new() -> Self {
        Self {
            num_capture_channels: 1,
            num_render_channels: 1,
            sample_rate_hz: 48000,
            config: Config::default(),
            aec_override: None,
            aec_config: None,
            engine_factory: None,
        }
    }

    /// Number of capture (microphone) channels. Default: 1.
    pub fn num_capture_channels(mut self, channels: usize) -> Self {
        self.num_capture_channels = channels;
        self
    }

    /// Number of render (loudspeaker) channels. Default: 1.
    pub fn num_render_channels(mut self, channels: usize) -> Self {
        self.num_render_channels = channels;
        self
    }

    /// Sample rate for both directions. Must be one of 8000, 16000, 32000,
    /// or 48000 Hz. Default: 48000.
    pub fn sample_rate_hz(mut self, sample_rate_hz: usize) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self
    }

    /// Initial top-level configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sparse canceller override, merged with the engine's single-channel
    /// baseline and validated at build time.
    pub fn aec_override(mut self, aec_override: EchoCancellerOverride) -> Self {
        self.aec_override = Some(aec_override);
        self
    }

    /// Explicit full canceller configuration. Takes precedence over
    /// [`aec_override()`](Self::aec_override).
    pub fn aec_config(mut self, aec_config: EchoCancellerConfig) -> Self {
        self.aec_config = Some(aec_config);
        self
    }

    /// Injects the engine implementation. Defaults to the built-in
    /// passthrough engine.
    pub fn engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Builds the session.
    ///
    /// Validates formats and any explicit/override-derived canceller
    /// configuration, constructs the engine with the controller factory
    /// bound to the shared config holder, and initializes it with identical
    /// input/output formats per direction. On any failure nothing
    /// partially-constructed escapes.
    pub fn build(self) -> Result<Processor, Error> {
        if !StreamConfig::new(self.sample_rate_hz, 1).is_native_rate() {
            return Err(Error::BadSampleRate);
        }
        if self.num_capture_channels == 0 || self.num_render_channels == 0 {
            return Err(Error::BadNumberChannels);
        }

        let explicit = match (self.aec_config, self.aec_override) {
            (Some(config), _) => Some(validated(config)?),
            (None, Some(ov)) => {
                let merged = ov.merged_with(&EchoCancellerConfig::default());
                Some(validated(merged)?)
            }
            (None, None) => None,
        };

        let holder = SharedAecConfig::new();
        holder.set(explicit);

        let setup = EngineSetup::symmetric(
            StreamConfig::new(self.sample_rate_hz, self.num_capture_channels),
            StreamConfig::new(self.sample_rate_hz, self.num_render_channels),
        );
        let selector = Arc::new(AecConfigSelector::new(holder.clone()));
        let factory = self
            .engine_factory
            .unwrap_or_else(|| Arc::new(PassthroughEngineFactory));
        let engine = factory
            .create(&setup, selector)
            .map_err(Error::InitializationFailed)?;

        let config = normalized(self.config, setup.capture_input.sample_rate_hz());
        engine.apply_config(&config);

        let code = engine.initialize(&setup);
        if !status::is_success(code) {
            return Err(Error::InitializationFailed(code));
        }

        Ok(Processor {
            engine,
            setup,
            state: Mutex::new(StreamState {
                config,
                stream_delay_ms: None,
            }),
            aec_config: holder,
        })
    }
}

// ─── Processor ───────────────────────────────────────────────────────

struct StreamState {
    config: Config,
    stream_delay_ms: Option<i32>,
}

/// A processing session around an opaque engine.
///
/// # Usage
///
/// 1. Create via [`Processor::builder()`].
/// 2. For each 10 ms frame:
///    - feed the far-end audio with
///      [`process_render_frame()`](Self::process_render_frame) (or observe it
///      with [`analyze_render_frame()`](Self::analyze_render_frame));
///    - clean the near-end audio with
///      [`process_capture_frame()`](Self::process_capture_frame);
///    - optionally read [`get_stats()`](Self::get_stats).
/// 3. Reconfigure at any time with [`apply_config()`](Self::apply_config) or
///    [`set_aec_config()`](Self::set_aec_config).
///
/// Dropping the processor releases the engine; the session must not be used
/// afterwards, which ownership already guarantees.
pub struct Processor {
    engine: Box<dyn ProcessingEngine>,
    setup: EngineSetup,
    state: Mutex<StreamState>,
    aec_config: SharedAecConfig,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("setup", &self.setup)
            .finish_non_exhaustive()
    }
}

impl Processor {
    /// Returns a builder for constructing a session.
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    /// The number of capture channels fixed at construction.
    pub fn num_capture_channels(&self) -> usize {
        self.setup.capture_input.num_channels()
    }

    /// The number of render channels fixed at construction.
    pub fn num_render_channels(&self) -> usize {
        self.setup.render_input.num_channels()
    }

    /// The sample rate fixed at construction.
    pub fn sample_rate_hz(&self) -> usize {
        self.setup.capture_input.sample_rate_hz()
    }

    /// Samples per channel in one 10 ms frame.
    pub fn num_samples_per_frame(&self) -> usize {
        self.setup.capture_input.num_frames()
    }

    /// Re-runs engine initialization, retaining the stored descriptors,
    /// configuration, and stream-delay hint.
    ///
    /// The engine's adaptive state is fully reset; expect briefly degraded
    /// echo suppression afterwards.
    pub fn reinitialize(&self) -> Result<(), Error> {
        let code = self.engine.initialize(&self.setup);
        if status::is_success(code) {
            Ok(())
        } else {
            Err(Error::InitializationFailed(code))
        }
    }

    // ─── Per-frame processing ────────────────────────────────────

    /// Processes one 10 ms capture frame in place.
    ///
    /// `channels` must hold exactly [`num_capture_channels()`](Self::num_capture_channels)
    /// buffers of exactly [`num_samples_per_frame()`](Self::num_samples_per_frame)
    /// f32 samples each, deinterleaved, nominally in [-1, 1]. Violations are
    /// rejected before the engine is invoked.
    ///
    /// When the active configuration has the echo canceller enabled, the
    /// stored stream-delay hint (0 if never set) is pushed to the engine
    /// first. Nonzero engine codes surface as [`Error::Engine`].
    pub fn process_capture_frame(&self, channels: &mut [&mut [f32]]) -> Result<(), Error> {
        check_frame_mut(&self.setup.capture_input, channels)?;

        let (canceller_enabled, delay_ms) = {
            let state = self.lock_state();
            (
                state.config.echo_canceller.is_some(),
                state.stream_delay_ms,
            )
        };
        // The lock is released before the engine call; configuration churn
        // must not block the audio thread.
        if canceller_enabled {
            self.engine.set_stream_delay_ms(delay_ms.unwrap_or(0));
        }

        engine_result(self.engine.process_capture(channels))
    }

    /// Feeds one 10 ms render (far-end) frame, possibly modifying it in
    /// place depending on configuration.
    ///
    /// Same buffer contract as [`process_capture_frame()`](Self::process_capture_frame),
    /// against [`num_render_channels()`](Self::num_render_channels).
    pub fn process_render_frame(&self, channels: &mut [&mut [f32]]) -> Result<(), Error> {
        check_frame_mut(&self.setup.render_input, channels)?;
        engine_result(self.engine.process_render(channels))
    }

    /// Observes one 10 ms render frame without modifying it.
    pub fn analyze_render_frame(&self, channels: &[&[f32]]) -> Result<(), Error> {
        check_frame(&self.setup.render_input, channels)?;
        engine_result(self.engine.analyze_render(channels))
    }

    // ─── Configuration ───────────────────────────────────────────

    /// Applies a new top-level configuration.
    ///
    /// Incompatible flag combinations are downgraded rather than rejected:
    /// linear canceller output export requires a 16 kHz capture rate and a
    /// non-mobile canceller, and analysis of that output requires the export
    /// to be active. Both flags are forced off when their requirements do
    /// not hold.
    pub fn apply_config(&self, config: Config) {
        let config = normalized(config, self.setup.capture_input.sample_rate_hz());
        self.lock_state().config = config.clone();
        self.engine.apply_config(&config);
    }

    /// Returns a copy of the active configuration.
    pub fn config(&self) -> Config {
        self.lock_state().config.clone()
    }

    /// Replaces the canceller configuration, or reverts to engine defaults
    /// when `config` is `None`.
    ///
    /// The candidate is validated first; [`Error::BadParameter`] is returned
    /// without any state change if it fails. The engine is reinitialized
    /// only when the stored configuration actually changed, so re-applying
    /// an identical config is free of audible disruption. Returns whether a
    /// change (and therefore a reinitialization) happened.
    pub fn set_aec_config(
        &self,
        config: Option<EchoCancellerConfig>,
    ) -> Result<bool, Error> {
        if let Some(config) = config {
            validated(config)?;
        }
        let changed = self.aec_config.set(config);
        if changed {
            tracing::debug!(
                explicit = config.is_some(),
                "canceller configuration changed, reinitializing engine"
            );
            self.reinitialize()?;
        }
        Ok(changed)
    }

    /// Returns a copy of the explicit canceller configuration, if one is
    /// set.
    pub fn aec_config(&self) -> Option<EchoCancellerConfig> {
        self.aec_config.get()
    }

    /// Enqueues a runtime setting for the capture path.
    pub fn set_runtime_setting(&self, setting: RuntimeSetting) {
        self.engine.set_runtime_setting(setting);
    }

    // ─── Stream hints ────────────────────────────────────────────

    /// Sets the delay in ms between a render frame being played and its echo
    /// appearing in the corresponding capture frame.
    ///
    /// The value is clamped to [0, 500]; [`Error::BadStreamParameter`] is
    /// returned if clamping was necessary (the clamped value is still
    /// stored). The hint reaches the engine before the next capture frame,
    /// and only while the echo canceller is enabled.
    pub fn set_stream_delay_ms(&self, delay_ms: i32) -> Result<(), Error> {
        let clamped = delay_ms.clamp(0, 500);
        self.lock_state().stream_delay_ms = Some(clamped);
        if clamped == delay_ms {
            Ok(())
        } else {
            Err(Error::BadStreamParameter)
        }
    }

    /// Returns the stored stream-delay hint, if any was set.
    pub fn stream_delay_ms(&self) -> Option<i32> {
        self.lock_state().stream_delay_ms
    }

    /// Signals that the audio output will be (or is) muted. The engine may
    /// use the hint to improve parameter adaptation.
    pub fn set_output_will_be_muted(&self, muted: bool) {
        self.engine.set_output_will_be_muted(muted);
    }

    /// Signals that the next capture frame will contain key-press sound.
    pub fn set_stream_key_pressed(&self, pressed: bool) {
        self.engine.set_stream_key_pressed(pressed);
    }

    // ─── Statistics ──────────────────────────────────────────────

    /// Reads the engine statistics once and returns the snapshot.
    ///
    /// Pure read; meaningful after the first
    /// [`process_capture_frame()`](Self::process_capture_frame) call. Fields
    /// the engine has not produced are `None`.
    pub fn get_stats(&self) -> Stats {
        self.engine.statistics()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn engine_result(code: i32) -> Result<(), Error> {
    if status::is_success(code) {
        Ok(())
    } else {
        Err(Error::Engine(code))
    }
}

fn validated(config: EchoCancellerConfig) -> Result<EchoCancellerConfig, Error> {
    let mut probe = config;
    if probe.validate() {
        Ok(config)
    } else {
        tracing::warn!("canceller configuration rejected: out-of-range parameters");
        Err(Error::BadParameter)
    }
}

fn check_frame_mut(expected: &StreamConfig, channels: &[&mut [f32]]) -> Result<(), Error> {
    if channels.len() != expected.num_channels() {
        return Err(Error::BadNumberChannels);
    }
    if channels.iter().any(|ch| ch.len() != expected.num_frames()) {
        return Err(Error::BadDataLength);
    }
    Ok(())
}

fn check_frame(expected: &StreamConfig, channels: &[&[f32]]) -> Result<(), Error> {
    if channels.len() != expected.num_channels() {
        return Err(Error::BadNumberChannels);
    }
    if channels.iter().any(|ch| ch.len() != expected.num_frames()) {
        return Err(Error::BadDataLength);
    }
    Ok(())
}

pub(crate) fn normalized(mut config: Config, capture_sample_rate_hz: usize) -> Config {
    if let Some(ec) = config.echo_canceller.as_mut() {
        if ec.export_linear_aec_output && (capture_sample_rate_hz != 16000 || ec.mobile_mode) {
            tracing::debug!(
                capture_sample_rate_hz,
                mobile_mode = ec.mobile_mode,
                "disabling linear AEC output export"
            );
            ec.export_linear_aec_output = false;
        }
    }
    let export_active = config
        .echo_canceller
        .as_ref()
        .is_some_and(|ec| ec.export_linear_aec_output);
    if !export_active {
        if let Some(ns) = config.noise_suppression.as_mut() {
            if ns.analyze_linear_aec_output {
                tracing::debug!("disabling linear AEC output analysis: export inactive");
                ns.analyze_linear_aec_output = false;
            }
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EchoCanceller, NoiseSuppression};
    use crate::stream_config::NATIVE_SAMPLE_RATES;

    fn frame(processor: &Processor) -> Vec<f32> {
        vec![0.0f32; processor.num_samples_per_frame()]
    }

    #[test]
    fn builder_defaults() {
        let processor = Processor::builder().build().unwrap();
        assert_eq!(processor.num_capture_channels(), 1);
        assert_eq!(processor.num_render_channels(), 1);
        assert_eq!(processor.sample_rate_hz(), 48000);
        assert_eq!(processor.num_samples_per_frame(), 480);
        assert!(processor.stream_delay_ms().is_none());
    }

    #[test]
    fn builder_rejects_non_native_rate() {
        let result = Processor::builder().sample_rate_hz(44100).build();
        assert_eq!(result.unwrap_err(), Error::BadSampleRate);
    }

    #[test]
    fn builder_rejects_zero_channels() {
        let result = Processor::builder().num_capture_channels(0).build();
        assert_eq!(result.unwrap_err(), Error::BadNumberChannels);

        let result = Processor::builder().num_render_channels(0).build();
        assert_eq!(result.unwrap_err(), Error::BadNumberChannels);
    }

    #[test]
    fn builder_rejects_invalid_override() {
        let mut ov = EchoCancellerOverride::default();
        ov.erle.min = Some(-3.0);
        let result = Processor::builder().aec_override(ov).build();
        assert_eq!(result.unwrap_err(), Error::BadParameter);
    }

    #[test]
    fn builder_rejects_invalid_explicit_config() {
        let mut config = EchoCancellerConfig::default();
        config.delay.down_sampling_factor = 3;
        let result = Processor::builder().aec_config(config).build();
        assert_eq!(result.unwrap_err(), Error::BadParameter);
    }

    #[test]
    fn override_derived_config_is_stored_explicitly() {
        let mut ov = EchoCancellerOverride::default();
        ov.delay.default_delay = Some(7);
        let processor = Processor::builder().aec_override(ov).build().unwrap();

        let stored = processor.aec_config().unwrap();
        assert_eq!(stored.delay.default_delay, 7);
    }

    #[test]
    fn all_default_override_equals_baseline_default() {
        let processor = Processor::builder()
            .aec_override(EchoCancellerOverride::default())
            .build()
            .unwrap();
        assert_eq!(processor.aec_config(), Some(EchoCancellerConfig::default()));
    }

    #[test]
    fn process_capture_frame_checks_shape() {
        let processor = Processor::builder()
            .sample_rate_hz(16000)
            .num_capture_channels(2)
            .build()
            .unwrap();

        // Too few channels.
        let mut ch0 = vec![0.0f32; 160];
        let result = processor.process_capture_frame(&mut [&mut ch0]);
        assert_eq!(result.unwrap_err(), Error::BadNumberChannels);

        // Wrong frame length.
        let mut ch0 = vec![0.0f32; 80];
        let mut ch1 = vec![0.0f32; 80];
        let result = processor.process_capture_frame(&mut [&mut ch0, &mut ch1]);
        assert_eq!(result.unwrap_err(), Error::BadDataLength);

        // Exact shape passes.
        let mut ch0 = vec![0.0f32; 160];
        let mut ch1 = vec![0.0f32; 160];
        processor
            .process_capture_frame(&mut [&mut ch0, &mut ch1])
            .unwrap();
    }

    #[test]
    fn render_and_capture_channel_counts_may_differ() {
        let processor = Processor::builder()
            .sample_rate_hz(32000)
            .num_capture_channels(1)
            .num_render_channels(2)
            .build()
            .unwrap();

        let mut capture = frame(&processor);
        processor.process_capture_frame(&mut [&mut capture]).unwrap();

        let mut left = frame(&processor);
        let mut right = frame(&processor);
        processor
            .process_render_frame(&mut [&mut left, &mut right])
            .unwrap();

        let left = frame(&processor);
        let right = frame(&processor);
        processor
            .analyze_render_frame(&[&left, &right])
            .unwrap();
    }

    #[test]
    fn set_stream_delay_clamps_and_warns() {
        let processor = Processor::builder().build().unwrap();

        assert!(processor.set_stream_delay_ms(50).is_ok());
        assert_eq!(processor.stream_delay_ms(), Some(50));

        assert_eq!(
            processor.set_stream_delay_ms(-10),
            Err(Error::BadStreamParameter)
        );
        assert_eq!(processor.stream_delay_ms(), Some(0));

        assert_eq!(
            processor.set_stream_delay_ms(600),
            Err(Error::BadStreamParameter)
        );
        assert_eq!(processor.stream_delay_ms(), Some(500));
    }

    #[test]
    fn apply_config_forces_export_off_at_48k() {
        let processor = Processor::builder().sample_rate_hz(48000).build().unwrap();
        processor.apply_config(Config {
            echo_canceller: Some(EchoCanceller {
                export_linear_aec_output: true,
                ..Default::default()
            }),
            noise_suppression: Some(NoiseSuppression {
                analyze_linear_aec_output: true,
                ..Default::default()
            }),
            ..Default::default()
        });

        let stored = processor.config();
        assert!(!stored.echo_canceller.unwrap().export_linear_aec_output);
        assert!(!stored.noise_suppression.unwrap().analyze_linear_aec_output);
    }

    #[test]
    fn apply_config_keeps_export_at_16k_full_mode() {
        let processor = Processor::builder().sample_rate_hz(16000).build().unwrap();
        processor.apply_config(Config {
            echo_canceller: Some(EchoCanceller {
                export_linear_aec_output: true,
                ..Default::default()
            }),
            noise_suppression: Some(NoiseSuppression {
                analyze_linear_aec_output: true,
                ..Default::default()
            }),
            ..Default::default()
        });

        let stored = processor.config();
        assert!(stored.echo_canceller.unwrap().export_linear_aec_output);
        assert!(stored.noise_suppression.unwrap().analyze_linear_aec_output);
    }

    #[test]
    fn apply_config_forces_export_off_in_mobile_mode() {
        let processor = Processor::builder().sample_rate_hz(16000).build().unwrap();
        processor.apply_config(Config {
            echo_canceller: Some(EchoCanceller {
                mobile_mode: true,
                export_linear_aec_output: true,
                ..Default::default()
            }),
            ..Default::default()
        });

        let stored = processor.config();
        assert!(!stored.echo_canceller.unwrap().export_linear_aec_output);
    }

    #[test]
    fn analyze_without_export_is_forced_off() {
        // Export not even requested: the analyze flag alone must not survive.
        let processor = Processor::builder().sample_rate_hz(16000).build().unwrap();
        processor.apply_config(Config {
            echo_canceller: Some(EchoCanceller::default()),
            noise_suppression: Some(NoiseSuppression {
                analyze_linear_aec_output: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(
            !processor
                .config()
                .noise_suppression
                .unwrap()
                .analyze_linear_aec_output
        );
    }

    #[test]
    fn set_aec_config_reports_change_then_idempotence() {
        let processor = Processor::builder().build().unwrap();
        let config = EchoCancellerConfig::default();

        assert!(processor.set_aec_config(Some(config)).unwrap());
        assert!(!processor.set_aec_config(Some(config)).unwrap());

        assert!(processor.set_aec_config(None).unwrap());
        assert!(!processor.set_aec_config(None).unwrap());
    }

    #[test]
    fn set_aec_config_rejects_invalid_without_state_change() {
        let processor = Processor::builder().build().unwrap();
        let good = EchoCancellerConfig::default();
        processor.set_aec_config(Some(good)).unwrap();

        let mut bad = good;
        bad.erle.min = -1.0;
        assert_eq!(processor.set_aec_config(Some(bad)), Err(Error::BadParameter));
        assert_eq!(processor.aec_config(), Some(good));
    }

    #[test]
    fn stats_flow_through_the_engine() {
        let processor = Processor::builder().sample_rate_hz(16000).build().unwrap();
        assert!(processor.get_stats().output_rms_dbfs.is_none());

        let mut samples = vec![0.5f32; 160];
        processor.process_capture_frame(&mut [&mut samples]).unwrap();
        assert_eq!(processor.get_stats().output_rms_dbfs, Some(-6));
    }

    #[test]
    fn error_display() {
        assert_eq!(Error::BadSampleRate.to_string(), "bad sample rate");
        assert_eq!(Error::Engine(-8).to_string(), "engine error code -8");
        assert_eq!(
            Error::InitializationFailed(-2).to_string(),
            "engine initialization failed (code -2)"
        );
    }

    #[test]
    fn error_codes_round_trip_known_values() {
        assert_eq!(Error::BadSampleRate.code(), status::BAD_SAMPLE_RATE);
        assert_eq!(Error::Engine(-42).code(), -42);
        assert_eq!(Error::InitializationFailed(-2).code(), -2);
    }

    #[test]
    fn create_drop_cycles_for_all_native_rates() {
        for &rate in &NATIVE_SAMPLE_RATES {
            for channels in 1..=2usize {
                for _ in 0..3 {
                    let processor = Processor::builder()
                        .sample_rate_hz(rate)
                        .num_capture_channels(channels)
                        .num_render_channels(channels)
                        .build()
                        .unwrap();
                    drop(processor);
                }
            }
        }
    }
}
