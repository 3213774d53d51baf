//! Bidirectional conversions between C API types and Rust types.

use crate::config::{
    Config, DetectionLikelihood, DownmixMethod, EchoCanceller, GainController, GainControllerMode,
    HighPassFilter, MaxProcessingRate, NoiseSuppression, NoiseSuppressionLevel, Pipeline,
    RuntimeSetting, VoiceDetection,
};
use crate::stats::Stats;

use super::types::{
    RsnConfig, RsnDetectionLikelihood, RsnDownmixMethod, RsnGainControllerMode,
    RsnNoiseSuppressionLevel, RsnRuntimeSetting, RsnRuntimeSettingKind, RsnStats,
};

// ---------------------------------------------------------------------------
// RsnConfig <-> Config
// ---------------------------------------------------------------------------

impl RsnConfig {
    /// Convert from the flat C config to the nested Rust [`Config`].
    pub(crate) fn to_rust(self) -> Config {
        Config {
            pipeline: Pipeline {
                maximum_internal_processing_rate: if self.pipeline_maximum_internal_processing_rate
                    == 32000
                {
                    MaxProcessingRate::Rate32kHz
                } else {
                    MaxProcessingRate::Rate48kHz
                },
                multi_channel_render: self.pipeline_multi_channel_render,
                multi_channel_capture: self.pipeline_multi_channel_capture,
                capture_downmix_method: self.pipeline_capture_downmix_method.to_rust(),
            },
            high_pass_filter: self.high_pass_filter_enabled.then(|| HighPassFilter {
                apply_in_full_band: self.high_pass_filter_apply_in_full_band,
            }),
            echo_canceller: self.echo_canceller_enabled.then(|| EchoCanceller {
                mobile_mode: self.echo_canceller_mobile_mode,
                enforce_high_pass_filtering: self.echo_canceller_enforce_high_pass_filtering,
                export_linear_aec_output: self.echo_canceller_export_linear_aec_output,
            }),
            noise_suppression: self.noise_suppression_enabled.then(|| NoiseSuppression {
                level: self.noise_suppression_level.to_rust(),
                analyze_linear_aec_output: self.noise_suppression_analyze_linear_aec_output,
            }),
            gain_controller: self.gain_controller_enabled.then(|| GainController {
                mode: self.gain_controller_mode.to_rust(),
                target_level_dbfs: self.gain_controller_target_level_dbfs.clamp(0, 31) as u8,
                compression_gain_db: self.gain_controller_compression_gain_db.clamp(0, 90) as u8,
                enable_limiter: self.gain_controller_enable_limiter,
                startup_min_volume: self.gain_controller_startup_min_volume,
            }),
            voice_detection: self.voice_detection_enabled.then(|| VoiceDetection {
                detection_likelihood: self.voice_detection_likelihood.to_rust(),
            }),
        }
    }

    /// Convert from the nested Rust [`Config`] to the flat C config.
    pub(crate) fn from_rust(config: &Config) -> Self {
        let hpf = config.high_pass_filter.clone().unwrap_or_default();
        let ec = config.echo_canceller.clone().unwrap_or_default();
        let ns = config.noise_suppression.clone().unwrap_or_default();
        let gc = config.gain_controller.clone().unwrap_or_default();
        let vad = config.voice_detection.clone().unwrap_or_default();

        Self {
            pipeline_maximum_internal_processing_rate: config
                .pipeline
                .maximum_internal_processing_rate
                .as_hz() as i32,
            pipeline_multi_channel_render: config.pipeline.multi_channel_render,
            pipeline_multi_channel_capture: config.pipeline.multi_channel_capture,
            pipeline_capture_downmix_method: RsnDownmixMethod::from_rust(
                config.pipeline.capture_downmix_method,
            ),

            high_pass_filter_enabled: config.high_pass_filter.is_some(),
            high_pass_filter_apply_in_full_band: hpf.apply_in_full_band,

            echo_canceller_enabled: config.echo_canceller.is_some(),
            echo_canceller_mobile_mode: ec.mobile_mode,
            echo_canceller_enforce_high_pass_filtering: ec.enforce_high_pass_filtering,
            echo_canceller_export_linear_aec_output: ec.export_linear_aec_output,

            noise_suppression_enabled: config.noise_suppression.is_some(),
            noise_suppression_level: RsnNoiseSuppressionLevel::from_rust(ns.level),
            noise_suppression_analyze_linear_aec_output: ns.analyze_linear_aec_output,

            gain_controller_enabled: config.gain_controller.is_some(),
            gain_controller_mode: RsnGainControllerMode::from_rust(gc.mode),
            gain_controller_target_level_dbfs: i32::from(gc.target_level_dbfs),
            gain_controller_compression_gain_db: i32::from(gc.compression_gain_db),
            gain_controller_enable_limiter: gc.enable_limiter,
            gain_controller_startup_min_volume: gc.startup_min_volume,

            voice_detection_enabled: config.voice_detection.is_some(),
            voice_detection_likelihood: RsnDetectionLikelihood::from_rust(
                vad.detection_likelihood,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Enum conversions
// ---------------------------------------------------------------------------

impl RsnNoiseSuppressionLevel {
    pub(crate) fn to_rust(self) -> NoiseSuppressionLevel {
        match self {
            Self::Low => NoiseSuppressionLevel::Low,
            Self::Moderate => NoiseSuppressionLevel::Moderate,
            Self::High => NoiseSuppressionLevel::High,
            Self::VeryHigh => NoiseSuppressionLevel::VeryHigh,
        }
    }

    pub(crate) fn from_rust(level: NoiseSuppressionLevel) -> Self {
        match level {
            NoiseSuppressionLevel::Low => Self::Low,
            NoiseSuppressionLevel::Moderate => Self::Moderate,
            NoiseSuppressionLevel::High => Self::High,
            NoiseSuppressionLevel::VeryHigh => Self::VeryHigh,
        }
    }
}

impl RsnGainControllerMode {
    pub(crate) fn to_rust(self) -> GainControllerMode {
        match self {
            Self::AdaptiveAnalog => GainControllerMode::AdaptiveAnalog,
            Self::AdaptiveDigital => GainControllerMode::AdaptiveDigital,
            Self::FixedDigital => GainControllerMode::FixedDigital,
        }
    }

    pub(crate) fn from_rust(mode: GainControllerMode) -> Self {
        match mode {
            GainControllerMode::AdaptiveAnalog => Self::AdaptiveAnalog,
            GainControllerMode::AdaptiveDigital => Self::AdaptiveDigital,
            GainControllerMode::FixedDigital => Self::FixedDigital,
        }
    }
}

impl RsnDetectionLikelihood {
    pub(crate) fn to_rust(self) -> DetectionLikelihood {
        match self {
            Self::VeryLow => DetectionLikelihood::VeryLow,
            Self::Low => DetectionLikelihood::Low,
            Self::Moderate => DetectionLikelihood::Moderate,
            Self::High => DetectionLikelihood::High,
        }
    }

    pub(crate) fn from_rust(likelihood: DetectionLikelihood) -> Self {
        match likelihood {
            DetectionLikelihood::VeryLow => Self::VeryLow,
            DetectionLikelihood::Low => Self::Low,
            DetectionLikelihood::Moderate => Self::Moderate,
            DetectionLikelihood::High => Self::High,
        }
    }
}

impl RsnDownmixMethod {
    pub(crate) fn to_rust(self) -> DownmixMethod {
        match self {
            Self::AverageChannels => DownmixMethod::AverageChannels,
            Self::UseFirstChannel => DownmixMethod::UseFirstChannel,
        }
    }

    pub(crate) fn from_rust(method: DownmixMethod) -> Self {
        match method {
            DownmixMethod::AverageChannels => Self::AverageChannels,
            DownmixMethod::UseFirstChannel => Self::UseFirstChannel,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime settings
// ---------------------------------------------------------------------------

impl RsnRuntimeSetting {
    pub(crate) fn to_rust(self) -> RuntimeSetting {
        match self.kind {
            RsnRuntimeSettingKind::CapturePreGain => {
                RuntimeSetting::CapturePreGain(self.float_value)
            }
            RsnRuntimeSettingKind::CaptureFixedPostGain => {
                RuntimeSetting::CaptureFixedPostGain(self.float_value)
            }
            RsnRuntimeSettingKind::PlayoutVolumeChange => {
                RuntimeSetting::PlayoutVolumeChange(self.int_value)
            }
            RsnRuntimeSettingKind::CaptureOutputUsed => {
                RuntimeSetting::CaptureOutputUsed(self.bool_value)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stats -> RsnStats
// ---------------------------------------------------------------------------

impl RsnStats {
    pub(crate) fn from_rust(stats: &Stats) -> Self {
        Self {
            output_rms_dbfs: stats.output_rms_dbfs.into(),
            voice_detected: stats.voice_detected.into(),
            echo_return_loss: stats.echo_return_loss.into(),
            echo_return_loss_enhancement: stats.echo_return_loss_enhancement.into(),
            divergent_filter_fraction: stats.divergent_filter_fraction.into(),
            delay_median_ms: stats.delay_median_ms.into(),
            delay_standard_deviation_ms: stats.delay_standard_deviation_ms.into(),
            residual_echo_likelihood: stats.residual_echo_likelihood.into(),
            residual_echo_likelihood_recent_max: stats.residual_echo_likelihood_recent_max.into(),
            delay_ms: stats.delay_ms.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip_default() {
        let rust_config = Config::default();
        let c_config = RsnConfig::from_rust(&rust_config);
        let roundtrip = c_config.to_rust();

        assert_eq!(rust_config, roundtrip);
    }

    #[test]
    fn config_roundtrip_all_enabled() {
        let rust_config = Config {
            high_pass_filter: Some(HighPassFilter {
                apply_in_full_band: false,
            }),
            echo_canceller: Some(EchoCanceller {
                mobile_mode: true,
                enforce_high_pass_filtering: false,
                export_linear_aec_output: true,
            }),
            noise_suppression: Some(NoiseSuppression {
                level: NoiseSuppressionLevel::VeryHigh,
                analyze_linear_aec_output: true,
            }),
            gain_controller: Some(GainController {
                mode: GainControllerMode::FixedDigital,
                target_level_dbfs: 6,
                compression_gain_db: 12,
                enable_limiter: false,
                startup_min_volume: 120,
            }),
            voice_detection: Some(VoiceDetection {
                detection_likelihood: DetectionLikelihood::High,
            }),
            ..Default::default()
        };

        let roundtrip = RsnConfig::from_rust(&rust_config).to_rust();
        assert_eq!(rust_config, roundtrip);
    }

    #[test]
    fn optional_bridge_preserves_absence() {
        let stats = Stats::default();
        let c_stats = RsnStats::from_rust(&stats);
        assert!(!c_stats.output_rms_dbfs.has_value);
        assert!(!c_stats.voice_detected.has_value);
        assert!(!c_stats.echo_return_loss.has_value);
        assert!(!c_stats.delay_ms.has_value);
        assert_eq!(c_stats.echo_return_loss.value, 0.0);
        assert_eq!(c_stats.delay_ms.value, 0);
    }

    #[test]
    fn optional_bridge_preserves_values() {
        let stats = Stats {
            output_rms_dbfs: Some(-30),
            voice_detected: Some(true),
            echo_return_loss: Some(10.5),
            delay_median_ms: Some(42),
            ..Default::default()
        };
        let c_stats = RsnStats::from_rust(&stats);
        assert!(c_stats.output_rms_dbfs.has_value);
        assert_eq!(c_stats.output_rms_dbfs.value, -30);
        assert!(c_stats.voice_detected.has_value);
        assert!(c_stats.voice_detected.value);
        assert!(c_stats.echo_return_loss.has_value);
        assert_eq!(c_stats.echo_return_loss.value, 10.5);
        assert!(c_stats.delay_median_ms.has_value);
        assert_eq!(c_stats.delay_median_ms.value, 42);
        assert!(!c_stats.delay_standard_deviation_ms.has_value);
    }

    #[test]
    fn runtime_setting_payload_follows_kind() {
        let setting = RsnRuntimeSetting {
            kind: RsnRuntimeSettingKind::CapturePreGain,
            float_value: 2.0,
            int_value: 0,
            bool_value: false,
        };
        assert_eq!(setting.to_rust(), RuntimeSetting::CapturePreGain(2.0));

        let setting = RsnRuntimeSetting {
            kind: RsnRuntimeSettingKind::PlayoutVolumeChange,
            float_value: 0.0,
            int_value: 180,
            bool_value: false,
        };
        assert_eq!(setting.to_rust(), RuntimeSetting::PlayoutVolumeChange(180));
    }
}
