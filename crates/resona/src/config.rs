//! Top-level processing configuration.
//!
//! The config enables and tunes the engine's top-level effects. It is meant
//! for setup and for occasional changes; per-frame knobs go through
//! [`RuntimeSetting`] instead, which avoids submodule resets mid-stream.
//!
//! All components are disabled (`None`) by default.
//!
//! # Example
//!
//! ```
//! use resona::Config;
//! use resona::config::{EchoCanceller, NoiseSuppression, NoiseSuppressionLevel};
//!
//! let config = Config {
//!     echo_canceller: Some(EchoCanceller::default()),
//!     noise_suppression: Some(NoiseSuppression {
//!         level: NoiseSuppressionLevel::High,
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! ```

/// Top-level configuration for the processing session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Pipeline processing properties.
    pub pipeline: Pipeline,
    /// High-pass filter settings. Set to `Some(...)` to enable.
    pub high_pass_filter: Option<HighPassFilter>,
    /// Echo canceller settings. Set to `Some(...)` to enable.
    pub echo_canceller: Option<EchoCanceller>,
    /// Noise suppression settings. Set to `Some(...)` to enable.
    pub noise_suppression: Option<NoiseSuppression>,
    /// Gain controller settings. Set to `Some(...)` to enable.
    pub gain_controller: Option<GainController>,
    /// Voice detection settings. Set to `Some(...)` to enable.
    pub voice_detection: Option<VoiceDetection>,
}

/// Maximum internal processing rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaxProcessingRate {
    /// 32 kHz internal processing rate.
    Rate32kHz,
    /// 48 kHz internal processing rate (the default).
    #[default]
    Rate48kHz,
}

impl MaxProcessingRate {
    /// Returns the rate in Hz.
    pub fn as_hz(self) -> usize {
        match self {
            Self::Rate32kHz => 32000,
            Self::Rate48kHz => 48000,
        }
    }
}

/// Ways to downmix a multi-channel capture signal to mono.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DownmixMethod {
    /// Average across channels (the default).
    #[default]
    AverageChannels,
    /// Use the first channel.
    UseFirstChannel,
}

/// Pipeline processing properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    /// Maximum allowed processing rate used internally.
    pub maximum_internal_processing_rate: MaxProcessingRate,
    /// Allow multi-channel processing of render audio.
    pub multi_channel_render: bool,
    /// Allow multi-channel processing of capture audio when the echo
    /// canceller is active.
    pub multi_channel_capture: bool,
    /// How to downmix multi-channel capture audio to mono when needed.
    pub capture_downmix_method: DownmixMethod,
}

/// High-pass filter settings. Removes DC offset and low-frequency noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighPassFilter {
    /// When true, the filter operates on the full-band signal rather than
    /// only the split bands (default: true).
    pub apply_in_full_band: bool,
}

impl Default for HighPassFilter {
    fn default() -> Self {
        Self {
            apply_in_full_band: true,
        }
    }
}

/// Echo canceller settings.
///
/// The fine-grained canceller tuning lives in
/// [`EchoCancellerConfig`](crate::aec3::EchoCancellerConfig) and is applied
/// through [`Processor::set_aec_config()`](crate::Processor::set_aec_config);
/// this section only selects the operating mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoCanceller {
    /// Use the low-complexity mobile-optimized canceller instead of the full
    /// implementation. Mobile mode cannot export the linear canceller output.
    pub mobile_mode: bool,
    /// Enforce the high-pass filter to be on. Has no effect in mobile mode.
    pub enforce_high_pass_filtering: bool,
    /// Export the linear canceller output alongside the processed signal.
    /// Only honored when the capture rate is exactly 16 kHz and mobile mode
    /// is off; [`Processor::apply_config()`](crate::Processor::apply_config)
    /// forces it off otherwise.
    pub export_linear_aec_output: bool,
}

impl Default for EchoCanceller {
    fn default() -> Self {
        Self {
            mobile_mode: false,
            enforce_high_pass_filtering: true,
            export_linear_aec_output: false,
        }
    }
}

/// Background noise suppression settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseSuppression {
    /// Aggressiveness of the suppression. Higher levels reduce noise further
    /// at the expense of speech distortion.
    pub level: NoiseSuppressionLevel,
    /// Analyze the linear canceller output instead of the capture frame.
    /// Meaningful only while `export_linear_aec_output` is active; forced off
    /// otherwise.
    pub analyze_linear_aec_output: bool,
}

/// Noise suppression aggressiveness level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseSuppressionLevel {
    /// Low suppression (~6 dB).
    Low,
    /// Moderate suppression (~12 dB, the default).
    #[default]
    Moderate,
    /// High suppression (~18 dB).
    High,
    /// Very high suppression (~21 dB).
    VeryHigh,
}

/// Gain control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainControllerMode {
    /// Adaptive mode for capture devices with an analog volume control; the
    /// caller couples the OS mixer to the recommended level.
    AdaptiveAnalog,
    /// Adaptive mode with scaling applied in the digital domain.
    AdaptiveDigital,
    /// Fixed digital compression stage only. Preferred where the capture
    /// level is predictable and a known gain can be applied.
    FixedDigital,
}

/// Automatic gain control settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainController {
    /// Operating mode.
    pub mode: GainControllerMode,
    /// Target peak level in dBFS below full scale; positive convention,
    /// limited to [0, 31].
    pub target_level_dbfs: u8,
    /// Maximum gain the compression stage may apply, in dB. 0 leaves the
    /// signal uncompressed. Limited to [0, 90].
    pub compression_gain_db: u8,
    /// Hard-limit the compressed signal to the target level.
    pub enable_limiter: bool,
    /// Lowest analog level the adaptive-analog mode will prescribe at
    /// startup, in the device range [0, 255]. Default: 85.
    pub startup_min_volume: i32,
}

impl Default for GainController {
    fn default() -> Self {
        Self {
            mode: GainControllerMode::AdaptiveAnalog,
            target_level_dbfs: 3,
            compression_gain_db: 9,
            enable_limiter: true,
            startup_min_volume: 85,
        }
    }
}

/// Voice detection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceDetection {
    /// Likelihood that a frame will be declared to contain voice. A higher
    /// value clips speech less but flags more noise as voice.
    pub detection_likelihood: DetectionLikelihood,
}

/// Voice detector sensitivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetectionLikelihood {
    /// Very low likelihood.
    VeryLow,
    /// Low likelihood (the default).
    #[default]
    Low,
    /// Moderate likelihood.
    Moderate,
    /// High likelihood.
    High,
}

/// Settings that can be changed mid-stream without reinitialization.
///
/// Applied by the engine at the next capture-side processing call.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeSetting {
    /// Capture pre-gain linear factor.
    CapturePreGain(f32),
    /// Fixed post-gain in dB, in the range `0.0..=90.0`.
    CaptureFixedPostGain(f32),
    /// Playout (render) volume change; the value is the unnormalized volume.
    PlayoutVolumeChange(i32),
    /// Whether the capture output is used. When false, the engine may skip
    /// work.
    CaptureOutputUsed(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_all_disabled() {
        let config = Config::default();
        assert_eq!(
            config.pipeline.maximum_internal_processing_rate,
            MaxProcessingRate::Rate48kHz
        );
        assert!(!config.pipeline.multi_channel_render);
        assert!(!config.pipeline.multi_channel_capture);
        assert!(config.high_pass_filter.is_none());
        assert!(config.echo_canceller.is_none());
        assert!(config.noise_suppression.is_none());
        assert!(config.gain_controller.is_none());
        assert!(config.voice_detection.is_none());
    }

    #[test]
    fn default_sub_configs_match_engine() {
        let ec = EchoCanceller::default();
        assert!(!ec.mobile_mode);
        assert!(ec.enforce_high_pass_filtering);
        assert!(!ec.export_linear_aec_output);

        let ns = NoiseSuppression::default();
        assert_eq!(ns.level, NoiseSuppressionLevel::Moderate);
        assert!(!ns.analyze_linear_aec_output);

        let gc = GainController::default();
        assert_eq!(gc.mode, GainControllerMode::AdaptiveAnalog);
        assert_eq!(gc.target_level_dbfs, 3);
        assert_eq!(gc.compression_gain_db, 9);
        assert!(gc.enable_limiter);
        assert_eq!(gc.startup_min_volume, 85);
    }

    #[test]
    fn max_processing_rate_as_hz() {
        assert_eq!(MaxProcessingRate::Rate32kHz.as_hz(), 32000);
        assert_eq!(MaxProcessingRate::Rate48kHz.as_hz(), 48000);
    }

    #[test]
    fn config_equality_is_structural() {
        let a = Config {
            echo_canceller: Some(EchoCanceller::default()),
            ..Default::default()
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.echo_canceller.as_mut().unwrap().mobile_mode = true;
        assert_ne!(a, b);
    }
}
