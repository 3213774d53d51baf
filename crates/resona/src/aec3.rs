//! Echo canceller configuration and sparse overrides.
//!
//! [`EchoCancellerConfig`] mirrors the wrapped engine's full tuning surface:
//! eleven sections of independently tunable parameters. The defaults match
//! the engine's single-channel baseline; [`EchoCancellerConfig::multichannel()`]
//! produces the engine's multichannel-tuned baseline. A config is either
//! whole and validated or rejected outright — [`validate()`](EchoCancellerConfig::validate)
//! clamps every parameter to its engine-defined range in place and reports
//! whether the config was already within range.
//!
//! [`EchoCancellerOverride`] is the sparse companion: one optional slot per
//! tunable, applied on top of a baseline via
//! [`merged_with()`](EchoCancellerOverride::merged_with). Callers tune the
//! handful of fields they care about and the engine supplies the rest.
//!
//! All types are `#[repr(C)]` and `Copy` so the same structs cross the C
//! boundary unchanged.

// ---------------------------------------------------------------------------
// Full configuration
// ---------------------------------------------------------------------------

/// Render buffering and excess-render detection settings.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buffering {
    /// Interval in blocks between excess-render detection checks.
    pub excess_render_detection_interval_blocks: usize,
    /// Maximum tolerated excess render blocks before correction.
    pub max_allowed_excess_render_blocks: usize,
}

impl Default for Buffering {
    fn default() -> Self {
        Self {
            excess_render_detection_interval_blocks: 250,
            max_allowed_excess_render_blocks: 8,
        }
    }
}

/// Thresholds for delay-estimator convergence detection.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySelectionThresholds {
    /// Threshold during the initial phase, before convergence.
    pub initial: i32,
    /// Threshold after the delay estimator has converged.
    pub converged: i32,
}

/// Multichannel alignment mixing strategy.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentMixing {
    /// Downmix all channels to mono for alignment.
    pub downmix: bool,
    /// Adaptively select the best channel for alignment.
    pub adaptive_selection: bool,
    /// Power threshold for considering a channel active.
    pub activity_power_threshold: f32,
    /// Prefer the first two channels as the alignment reference.
    pub prefer_first_two_channels: bool,
}

/// Delay estimation and alignment parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delay {
    /// Delay in blocks assumed before estimation converges.
    pub default_delay: usize,
    /// Down-sampling factor for the delay estimator; must be 4 or 8.
    pub down_sampling_factor: usize,
    /// Number of correlator filters used for delay estimation.
    pub num_filters: usize,
    /// Extra headroom in samples added to the estimated delay.
    pub delay_headroom_samples: usize,
    /// Hysteresis in blocks before accepting a new delay estimate.
    pub hysteresis_limit_blocks: usize,
    /// Fixed capture delay in samples; 0 keeps estimation active.
    pub fixed_capture_delay_samples: usize,
    /// Smoothing factor for delay estimates, in [0, 1].
    pub delay_estimate_smoothing: f32,
    /// Smoothing factor once a delay has been found, in [0, 1].
    pub delay_estimate_smoothing_delay_found: f32,
    /// Correlation threshold for detecting a delay candidate, in [0, 1].
    pub delay_candidate_detection_threshold: f32,
    /// Convergence thresholds for delay selection.
    pub delay_selection_thresholds: DelaySelectionThresholds,
    /// Use an externally provided delay estimate.
    pub use_external_delay_estimator: bool,
    /// Log a warning when the delay estimate changes.
    pub log_warning_on_delay_changes: bool,
    /// Alignment mixing for the render signal.
    pub render_alignment_mixing: AlignmentMixing,
    /// Alignment mixing for the capture signal.
    pub capture_alignment_mixing: AlignmentMixing,
    /// Detect and compensate for pre-echo artifacts.
    pub detect_pre_echo: bool,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            default_delay: 5,
            down_sampling_factor: 4,
            num_filters: 5,
            delay_headroom_samples: 32,
            hysteresis_limit_blocks: 1,
            fixed_capture_delay_samples: 0,
            delay_estimate_smoothing: 0.7,
            delay_estimate_smoothing_delay_found: 0.7,
            delay_candidate_detection_threshold: 0.2,
            delay_selection_thresholds: DelaySelectionThresholds {
                initial: 5,
                converged: 20,
            },
            use_external_delay_estimator: false,
            log_warning_on_delay_changes: false,
            render_alignment_mixing: AlignmentMixing {
                downmix: false,
                adaptive_selection: true,
                activity_power_threshold: 10000.0,
                prefer_first_two_channels: true,
            },
            capture_alignment_mixing: AlignmentMixing {
                downmix: false,
                adaptive_selection: true,
                activity_power_threshold: 10000.0,
                prefer_first_two_channels: false,
            },
            detect_pre_echo: true,
        }
    }
}

/// Refined (main) adaptive filter parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedConfiguration {
    /// Filter length in blocks.
    pub length_blocks: usize,
    /// Leakage factor while the filter is converged.
    pub leakage_converged: f32,
    /// Leakage factor while the filter is diverged.
    pub leakage_diverged: f32,
    /// Error floor preventing adaptation lock-up.
    pub error_floor: f32,
    /// Error ceiling limiting adaptation.
    pub error_ceil: f32,
    /// Render power below which adaptation is gated.
    pub noise_gate: f32,
}

/// Coarse (shadow) adaptive filter parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseConfiguration {
    /// Filter length in blocks.
    pub length_blocks: usize,
    /// Adaptation step-size rate, in [0, 1].
    pub rate: f32,
    /// Render power below which adaptation is gated.
    pub noise_gate: f32,
}

/// Adaptive filter settings, including the initial-phase variants used while
/// the canceller is still settling.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    /// Refined filter configuration.
    pub refined: RefinedConfiguration,
    /// Coarse filter configuration.
    pub coarse: CoarseConfiguration,
    /// Refined filter configuration during the initial phase.
    pub refined_initial: RefinedConfiguration,
    /// Coarse filter configuration during the initial phase.
    pub coarse_initial: CoarseConfiguration,
    /// Blocks over which configuration changes are faded in.
    pub config_change_duration_blocks: usize,
    /// Duration of the initial adaptation phase in seconds.
    pub initial_state_seconds: f32,
    /// Hangover in blocks after a coarse filter reset.
    pub coarse_reset_hangover_blocks: i32,
    /// Use a conservative strategy during the initial phase.
    pub conservative_initial_phase: bool,
    /// Allow the coarse filter output to be used for echo subtraction.
    pub enable_coarse_filter_output_usage: bool,
    /// Use the linear adaptive filter for echo removal.
    pub use_linear_filter: bool,
    /// High-pass filter the echo reference signal.
    pub high_pass_filter_echo_reference: bool,
    /// Export the linear canceller output for external use.
    pub export_linear_aec_output: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            refined: RefinedConfiguration {
                length_blocks: 13,
                leakage_converged: 0.00005,
                leakage_diverged: 0.05,
                error_floor: 0.001,
                error_ceil: 2.0,
                noise_gate: 20_075_344.0,
            },
            coarse: CoarseConfiguration {
                length_blocks: 13,
                rate: 0.7,
                noise_gate: 20_075_344.0,
            },
            refined_initial: RefinedConfiguration {
                length_blocks: 12,
                leakage_converged: 0.005,
                leakage_diverged: 0.5,
                error_floor: 0.001,
                error_ceil: 2.0,
                noise_gate: 20_075_344.0,
            },
            coarse_initial: CoarseConfiguration {
                length_blocks: 12,
                rate: 0.9,
                noise_gate: 20_075_344.0,
            },
            config_change_duration_blocks: 250,
            initial_state_seconds: 2.5,
            coarse_reset_hangover_blocks: 25,
            conservative_initial_phase: false,
            enable_coarse_filter_output_usage: true,
            use_linear_filter: true,
            high_pass_filter_echo_reference: false,
            export_linear_aec_output: false,
        }
    }
}

/// Echo return loss enhancement estimation parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Erle {
    /// Minimum ERLE, linear scale.
    pub min: f32,
    /// Maximum ERLE for the low bands, linear scale.
    pub max_l: f32,
    /// Maximum ERLE for the high bands, linear scale.
    pub max_h: f32,
    /// Reset ERLE estimates on detected onsets.
    pub onset_detection: bool,
    /// Number of frequency sections for ERLE estimation. Bounded by the
    /// refined filter length.
    pub num_sections: usize,
    /// Clamp the filter quality estimate at zero.
    pub clamp_quality_estimate_to_zero: bool,
    /// Clamp the filter quality estimate at one.
    pub clamp_quality_estimate_to_one: bool,
}

impl Default for Erle {
    fn default() -> Self {
        Self {
            min: 1.0,
            max_l: 4.0,
            max_h: 1.5,
            onset_detection: true,
            num_sections: 1,
            clamp_quality_estimate_to_zero: true,
            clamp_quality_estimate_to_one: true,
        }
    }
}

/// Echo path strength parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpStrength {
    /// Default echo path gain fed to the suppressor.
    pub default_gain: f32,
    /// Echo path tail length fraction, in [-1, 1].
    pub default_len: f32,
    /// Tail length fraction during dominant nearend, in [-1, 1].
    pub nearend_len: f32,
    /// The echo path can saturate.
    pub echo_can_saturate: bool,
    /// Bound the ERL estimate.
    pub bounded_erl: bool,
    /// Compensate ERLE onsets during dominant nearend.
    pub erle_onset_compensation_in_dominant_nearend: bool,
    /// Use a conservative tail frequency response estimate.
    pub use_conservative_tail_frequency_response: bool,
}

impl Default for EpStrength {
    fn default() -> Self {
        Self {
            default_gain: 1.0,
            default_len: 0.83,
            nearend_len: 0.83,
            echo_can_saturate: true,
            bounded_erl: false,
            erle_onset_compensation_in_dominant_nearend: false,
            use_conservative_tail_frequency_response: true,
        }
    }
}

/// Echo audibility thresholds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoAudibility {
    /// Render power threshold for low activity.
    pub low_render_limit: f32,
    /// Render power threshold for normal activity.
    pub normal_render_limit: f32,
    /// Floor power for the audibility computation.
    pub floor_power: f32,
    /// Audibility threshold, low bands.
    pub audibility_threshold_lf: f32,
    /// Audibility threshold, mid bands.
    pub audibility_threshold_mf: f32,
    /// Audibility threshold, high bands.
    pub audibility_threshold_hf: f32,
    /// Use signal stationarity for audibility detection.
    pub use_stationarity_properties: bool,
    /// Use stationarity during the initial phase as well.
    pub use_stationarity_properties_at_init: bool,
}

impl Default for EchoAudibility {
    fn default() -> Self {
        Self {
            low_render_limit: 4.0 * 64.0,
            normal_render_limit: 64.0,
            floor_power: 2.0 * 64.0,
            audibility_threshold_lf: 10.0,
            audibility_threshold_mf: 10.0,
            audibility_threshold_hf: 10.0,
            use_stationarity_properties: false,
            use_stationarity_properties_at_init: false,
        }
    }
}

/// Render signal level gating.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLevels {
    /// Power above which the render signal counts as active.
    pub active_render_limit: f32,
    /// Power below which render excitation is considered poor.
    pub poor_excitation_render_limit: f32,
    /// Poor-excitation threshold for 8x down-sampled signals.
    pub poor_excitation_render_limit_ds8: f32,
    /// Gain in dB applied to the render power estimate.
    pub render_power_gain_db: f32,
}

impl Default for RenderLevels {
    fn default() -> Self {
        Self {
            active_render_limit: 100.0,
            poor_excitation_render_limit: 150.0,
            poor_excitation_render_limit_ds8: 20.0,
            render_power_gain_db: 0.0,
        }
    }
}

/// Hints about the echo removal environment.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoRemovalControl {
    /// Render and capture clocks drift relative to each other.
    pub has_clock_drift: bool,
    /// The echo path is linear and stable (e.g. loopback).
    pub linear_and_stable_echo_path: bool,
}

/// Echo and noise model parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoModel {
    /// Blocks to hold the noise floor estimate.
    pub noise_floor_hold: usize,
    /// Minimum noise floor power.
    pub min_noise_floor_power: f32,
    /// Slope of the stationarity gate.
    pub stationary_gate_slope: f32,
    /// Noise gate power threshold.
    pub noise_gate_power: f32,
    /// Noise gate transition slope.
    pub noise_gate_slope: f32,
    /// Render window blocks before the current block.
    pub render_pre_window_size: usize,
    /// Render window blocks after the current block.
    pub render_post_window_size: usize,
    /// Model reverb in nonlinear processing mode.
    pub model_reverb_in_nonlinear_mode: bool,
}

impl Default for EchoModel {
    fn default() -> Self {
        Self {
            noise_floor_hold: 50,
            min_noise_floor_power: 1_638_400.0,
            stationary_gate_slope: 10.0,
            noise_gate_power: 27509.42,
            noise_gate_slope: 0.3,
            render_pre_window_size: 1,
            render_post_window_size: 1,
            model_reverb_in_nonlinear_mode: true,
        }
    }
}

/// Comfort noise generation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortNoise {
    /// Comfort noise floor in dBFS.
    pub noise_floor_dbfs: f32,
}

impl Default for ComfortNoise {
    fn default() -> Self {
        Self {
            noise_floor_dbfs: -96.03406,
        }
    }
}

/// Suppression masking thresholds in terms of echo-to-nearend (ENR) and
/// echo-to-masker (EMR) ratios.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskingThresholds {
    /// ENR below which the band is left transparent.
    pub enr_transparent: f32,
    /// ENR above which the band is fully suppressed.
    pub enr_suppress: f32,
    /// EMR below which the band is left transparent.
    pub emr_transparent: f32,
}

/// Suppressor gain tuning for one operating regime.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Masking thresholds for the low bands.
    pub mask_lf: MaskingThresholds,
    /// Masking thresholds for the high bands.
    pub mask_hf: MaskingThresholds,
    /// Maximum gain increase factor per block.
    pub max_inc_factor: f32,
    /// Maximum low-band gain decrease factor per block.
    pub max_dec_factor_lf: f32,
}

/// Dominant nearend speech detection.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantNearendDetection {
    /// ENR threshold to enter the nearend-dominant state.
    pub enr_threshold: f32,
    /// ENR threshold to exit the nearend-dominant state.
    pub enr_exit_threshold: f32,
    /// SNR threshold for nearend detection.
    pub snr_threshold: f32,
    /// Blocks to hold the nearend-dominant state.
    pub hold_duration: i32,
    /// Bands that must exceed the threshold to trigger.
    pub trigger_threshold: i32,
    /// Detect during the initial adaptation phase.
    pub use_during_initial_phase: bool,
    /// Use an unbounded echo spectrum estimate.
    pub use_unbounded_echo_spectrum: bool,
}

impl Default for DominantNearendDetection {
    fn default() -> Self {
        Self {
            enr_threshold: 0.25,
            enr_exit_threshold: 10.0,
            snr_threshold: 30.0,
            hold_duration: 50,
            trigger_threshold: 12,
            use_during_initial_phase: true,
            use_unbounded_echo_spectrum: true,
        }
    }
}

/// A frequency subband given by low and high bin indices.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubbandRegion {
    /// Lower bin index, inclusive.
    pub low: usize,
    /// Upper bin index, inclusive.
    pub high: usize,
}

/// Subband-based nearend detection.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubbandNearendDetection {
    /// Blocks averaged for nearend power estimation.
    pub nearend_average_blocks: usize,
    /// First subband region.
    pub subband1: SubbandRegion,
    /// Second subband region.
    pub subband2: SubbandRegion,
    /// Nearend power threshold.
    pub nearend_threshold: f32,
    /// SNR threshold.
    pub snr_threshold: f32,
}

impl Default for SubbandNearendDetection {
    fn default() -> Self {
        Self {
            nearend_average_blocks: 1,
            subband1: SubbandRegion { low: 1, high: 1 },
            subband2: SubbandRegion { low: 1, high: 1 },
            nearend_threshold: 1.0,
            snr_threshold: 1.0,
        }
    }
}

/// High-band suppression and anti-howling.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighBandsSuppression {
    /// ENR threshold activating high-band suppression.
    pub enr_threshold: f32,
    /// Maximum high-band gain while echo is present.
    pub max_gain_during_echo: f32,
    /// Power threshold activating anti-howling.
    pub anti_howling_activation_threshold: f32,
    /// Gain applied while anti-howling is active.
    pub anti_howling_gain: f32,
}

impl Default for HighBandsSuppression {
    fn default() -> Self {
        Self {
            enr_threshold: 1.0,
            max_gain_during_echo: 1.0,
            anti_howling_activation_threshold: 400.0,
            anti_howling_gain: 1.0,
        }
    }
}

/// High-frequency gain limiting.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighFrequencySuppression {
    /// First band index of the limiting region.
    pub limiting_gain_band: i32,
    /// Number of bands in the limiting region.
    pub bands_in_limiting_gain: i32,
}

impl Default for HighFrequencySuppression {
    fn default() -> Self {
        Self {
            limiting_gain_band: 16,
            bands_in_limiting_gain: 1,
        }
    }
}

/// Suppressor configuration: normal and nearend tunings plus the detectors
/// that switch between them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suppressor {
    /// Blocks averaged for nearend power estimation.
    pub nearend_average_blocks: usize,
    /// Tuning used during normal operation.
    pub normal_tuning: Tuning,
    /// Tuning used while nearend speech dominates.
    pub nearend_tuning: Tuning,
    /// Smooth low-band gains during the initial phase.
    pub lf_smoothing_during_initial_phase: bool,
    /// Last band with permanent low-band smoothing.
    pub last_permanent_lf_smoothing_band: i32,
    /// Last band with low-band smoothing.
    pub last_lf_smoothing_band: i32,
    /// Last band treated as low frequency.
    pub last_lf_band: i32,
    /// First band treated as high frequency. Must lie above `last_lf_band`.
    pub first_hf_band: i32,
    /// Dominant nearend detection settings.
    pub dominant_nearend_detection: DominantNearendDetection,
    /// Subband nearend detection settings.
    pub subband_nearend_detection: SubbandNearendDetection,
    /// Use subband detection instead of dominant nearend detection.
    pub use_subband_nearend_detection: bool,
    /// High-band suppression settings.
    pub high_bands_suppression: HighBandsSuppression,
    /// High-frequency gain limiting settings.
    pub high_frequency_suppression: HighFrequencySuppression,
    /// Initial suppression gain floor increase per block.
    pub floor_first_increase: f32,
    /// Apply conservative suppression in the high bands.
    pub conservative_hf_suppression: bool,
}

impl Default for Suppressor {
    fn default() -> Self {
        Self {
            nearend_average_blocks: 4,
            normal_tuning: Tuning {
                mask_lf: MaskingThresholds {
                    enr_transparent: 0.3,
                    enr_suppress: 0.4,
                    emr_transparent: 0.3,
                },
                mask_hf: MaskingThresholds {
                    enr_transparent: 0.07,
                    enr_suppress: 0.1,
                    emr_transparent: 0.3,
                },
                max_inc_factor: 2.0,
                max_dec_factor_lf: 0.25,
            },
            nearend_tuning: Tuning {
                mask_lf: MaskingThresholds {
                    enr_transparent: 1.09,
                    enr_suppress: 1.1,
                    emr_transparent: 0.3,
                },
                mask_hf: MaskingThresholds {
                    enr_transparent: 0.1,
                    enr_suppress: 0.3,
                    emr_transparent: 0.3,
                },
                max_inc_factor: 2.0,
                max_dec_factor_lf: 0.25,
            },
            lf_smoothing_during_initial_phase: true,
            last_permanent_lf_smoothing_band: 0,
            last_lf_smoothing_band: 5,
            last_lf_band: 5,
            first_hf_band: 8,
            dominant_nearend_detection: DominantNearendDetection::default(),
            subband_nearend_detection: SubbandNearendDetection::default(),
            use_subband_nearend_detection: false,
            high_bands_suppression: HighBandsSuppression::default(),
            high_frequency_suppression: HighFrequencySuppression::default(),
            floor_first_increase: 0.00001,
            conservative_hf_suppression: false,
        }
    }
}

/// Full echo canceller configuration.
///
/// Defaults match the engine's single-channel baseline. Equality is the
/// derived structural comparison over every field and is used only for
/// change detection, never for semantic comparison.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoCancellerConfig {
    /// Render buffering settings.
    pub buffering: Buffering,
    /// Delay estimation and alignment settings.
    pub delay: Delay,
    /// Adaptive filter settings.
    pub filter: Filter,
    /// ERLE estimation settings.
    pub erle: Erle,
    /// Echo path strength settings.
    pub ep_strength: EpStrength,
    /// Echo audibility thresholds.
    pub echo_audibility: EchoAudibility,
    /// Render level gating.
    pub render_levels: RenderLevels,
    /// Echo removal hints.
    pub echo_removal_control: EchoRemovalControl,
    /// Echo model parameters.
    pub echo_model: EchoModel,
    /// Comfort noise settings.
    pub comfort_noise: ComfortNoise,
    /// Suppressor tuning.
    pub suppressor: Suppressor,
}

impl EchoCancellerConfig {
    /// The engine's baseline tuned for multichannel sessions.
    ///
    /// The selection between this and [`default()`](Self::default) mirrors
    /// the engine's own defaulting policy; if the engine changes that
    /// policy this must change in lockstep.
    pub fn multichannel() -> Self {
        let mut cfg = Self::default();
        cfg.filter.coarse.length_blocks = 11;
        cfg.filter.coarse.rate = 0.95;
        cfg.filter.coarse_initial.length_blocks = 11;
        cfg.filter.coarse_initial.rate = 0.95;
        cfg.suppressor.normal_tuning.max_dec_factor_lf = 0.35;
        cfg.suppressor.normal_tuning.max_inc_factor = 1.5;
        cfg
    }

    /// Clamps every parameter to its engine-defined range in place.
    ///
    /// Returns `true` if and only if the config did not need to be changed.
    pub fn validate(&mut self) -> bool {
        let mut ok = true;

        if self.delay.down_sampling_factor != 4 && self.delay.down_sampling_factor != 8 {
            self.delay.down_sampling_factor = 4;
            ok = false;
        }

        ok &= bound_usize(&mut self.delay.default_delay, 0, 5000);
        ok &= bound_usize(&mut self.delay.num_filters, 0, 5000);
        ok &= bound_usize(&mut self.delay.delay_headroom_samples, 0, 5000);
        ok &= bound_usize(&mut self.delay.hysteresis_limit_blocks, 0, 5000);
        ok &= bound_usize(&mut self.delay.fixed_capture_delay_samples, 0, 5000);
        ok &= bound_f32(&mut self.delay.delay_estimate_smoothing, 0.0, 1.0);
        ok &= bound_f32(&mut self.delay.delay_estimate_smoothing_delay_found, 0.0, 1.0);
        ok &= bound_f32(&mut self.delay.delay_candidate_detection_threshold, 0.0, 1.0);
        ok &= bound_i32(&mut self.delay.delay_selection_thresholds.initial, 1, 250);
        ok &= bound_i32(&mut self.delay.delay_selection_thresholds.converged, 1, 250);

        ok &= raise_usize(&mut self.filter.refined.length_blocks, 1);
        ok &= bound_f32(&mut self.filter.refined.leakage_converged, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined.leakage_diverged, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined.error_floor, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined.error_ceil, 0.0, 100_000_000.0);
        ok &= bound_f32(&mut self.filter.refined.noise_gate, 0.0, 100_000_000.0);

        ok &= raise_usize(&mut self.filter.refined_initial.length_blocks, 1);
        ok &= bound_f32(&mut self.filter.refined_initial.leakage_converged, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined_initial.leakage_diverged, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined_initial.error_floor, 0.0, 1000.0);
        ok &= bound_f32(&mut self.filter.refined_initial.error_ceil, 0.0, 100_000_000.0);
        ok &= bound_f32(&mut self.filter.refined_initial.noise_gate, 0.0, 100_000_000.0);

        // The initial filter may never be longer than the converged one.
        if self.filter.refined.length_blocks < self.filter.refined_initial.length_blocks {
            self.filter.refined_initial.length_blocks = self.filter.refined.length_blocks;
            ok = false;
        }

        ok &= raise_usize(&mut self.filter.coarse.length_blocks, 1);
        ok &= bound_f32(&mut self.filter.coarse.rate, 0.0, 1.0);
        ok &= bound_f32(&mut self.filter.coarse.noise_gate, 0.0, 100_000_000.0);

        ok &= raise_usize(&mut self.filter.coarse_initial.length_blocks, 1);
        ok &= bound_f32(&mut self.filter.coarse_initial.rate, 0.0, 1.0);
        ok &= bound_f32(&mut self.filter.coarse_initial.noise_gate, 0.0, 100_000_000.0);

        if self.filter.coarse.length_blocks < self.filter.coarse_initial.length_blocks {
            self.filter.coarse_initial.length_blocks = self.filter.coarse.length_blocks;
            ok = false;
        }

        ok &= bound_usize(&mut self.filter.config_change_duration_blocks, 0, 100_000);
        ok &= bound_f32(&mut self.filter.initial_state_seconds, 0.0, 100.0);
        ok &= bound_i32(&mut self.filter.coarse_reset_hangover_blocks, 0, 250_000);

        ok &= bound_f32(&mut self.erle.min, 1.0, 100_000.0);
        ok &= bound_f32(&mut self.erle.max_l, 1.0, 100_000.0);
        ok &= bound_f32(&mut self.erle.max_h, 1.0, 100_000.0);
        if self.erle.min > self.erle.max_l || self.erle.min > self.erle.max_h {
            self.erle.min = self.erle.max_l.min(self.erle.max_h);
            ok = false;
        }
        ok &= bound_usize(&mut self.erle.num_sections, 1, self.filter.refined.length_blocks);

        ok &= bound_f32(&mut self.ep_strength.default_gain, 0.0, 1_000_000.0);
        ok &= bound_f32(&mut self.ep_strength.default_len, -1.0, 1.0);
        ok &= bound_f32(&mut self.ep_strength.nearend_len, -1.0, 1.0);

        let max_power = 32768.0f32 * 32768.0;
        ok &= bound_f32(&mut self.echo_audibility.low_render_limit, 0.0, max_power);
        ok &= bound_f32(&mut self.echo_audibility.normal_render_limit, 0.0, max_power);
        ok &= bound_f32(&mut self.echo_audibility.floor_power, 0.0, max_power);
        ok &= bound_f32(&mut self.echo_audibility.audibility_threshold_lf, 0.0, max_power);
        ok &= bound_f32(&mut self.echo_audibility.audibility_threshold_mf, 0.0, max_power);
        ok &= bound_f32(&mut self.echo_audibility.audibility_threshold_hf, 0.0, max_power);

        ok &= bound_f32(&mut self.render_levels.active_render_limit, 0.0, max_power);
        ok &= bound_f32(&mut self.render_levels.poor_excitation_render_limit, 0.0, max_power);
        ok &= bound_f32(
            &mut self.render_levels.poor_excitation_render_limit_ds8,
            0.0,
            max_power,
        );

        ok &= bound_usize(&mut self.echo_model.noise_floor_hold, 0, 1000);
        ok &= bound_f32(&mut self.echo_model.min_noise_floor_power, 0.0, 2_000_000.0);
        ok &= bound_f32(&mut self.echo_model.stationary_gate_slope, 0.0, 1_000_000.0);
        ok &= bound_f32(&mut self.echo_model.noise_gate_power, 0.0, 1_000_000.0);
        ok &= bound_f32(&mut self.echo_model.noise_gate_slope, 0.0, 1_000_000.0);
        ok &= bound_usize(&mut self.echo_model.render_pre_window_size, 0, 100);
        ok &= bound_usize(&mut self.echo_model.render_post_window_size, 0, 100);

        ok &= bound_f32(&mut self.comfort_noise.noise_floor_dbfs, -200.0, 0.0);

        ok &= bound_usize(&mut self.suppressor.nearend_average_blocks, 1, 5000);
        ok &= bound_tuning(&mut self.suppressor.normal_tuning);
        ok &= bound_tuning(&mut self.suppressor.nearend_tuning);

        ok &= bound_i32(&mut self.suppressor.last_permanent_lf_smoothing_band, 0, 64);
        ok &= bound_i32(&mut self.suppressor.last_lf_smoothing_band, 0, 64);
        ok &= bound_i32(&mut self.suppressor.last_lf_band, 0, 63);
        ok &= bound_i32(
            &mut self.suppressor.first_hf_band,
            self.suppressor.last_lf_band + 1,
            64,
        );

        let dominant = &mut self.suppressor.dominant_nearend_detection;
        ok &= bound_f32(&mut dominant.enr_threshold, 0.0, 1_000_000.0);
        ok &= bound_f32(&mut dominant.snr_threshold, 0.0, 1_000_000.0);
        ok &= bound_i32(&mut dominant.hold_duration, 0, 10_000);
        ok &= bound_i32(&mut dominant.trigger_threshold, 0, 10_000);

        let subband = &mut self.suppressor.subband_nearend_detection;
        ok &= bound_usize(&mut subband.nearend_average_blocks, 1, 1024);
        ok &= bound_usize(&mut subband.subband1.low, 0, 65);
        ok &= bound_usize(&mut subband.subband1.high, subband.subband1.low, 65);
        ok &= bound_usize(&mut subband.subband2.low, 0, 65);
        ok &= bound_usize(&mut subband.subband2.high, subband.subband2.low, 65);
        ok &= bound_f32(&mut subband.nearend_threshold, 0.0, 1.0e24);
        ok &= bound_f32(&mut subband.snr_threshold, 0.0, 1.0e24);

        let high_bands = &mut self.suppressor.high_bands_suppression;
        ok &= bound_f32(&mut high_bands.enr_threshold, 0.0, 1_000_000.0);
        ok &= bound_f32(&mut high_bands.max_gain_during_echo, 0.0, 1.0);
        ok &= bound_f32(
            &mut high_bands.anti_howling_activation_threshold,
            0.0,
            max_power,
        );
        ok &= bound_f32(&mut high_bands.anti_howling_gain, 0.0, 1.0);

        ok &= bound_i32(
            &mut self.suppressor.high_frequency_suppression.limiting_gain_band,
            1,
            64,
        );
        let limiting_gain_band = self.suppressor.high_frequency_suppression.limiting_gain_band;
        ok &= bound_i32(
            &mut self
                .suppressor
                .high_frequency_suppression
                .bands_in_limiting_gain,
            0,
            64 - limiting_gain_band,
        );

        ok &= bound_f32(&mut self.suppressor.floor_first_increase, 0.0, 1_000_000.0);

        ok
    }
}

fn bound_tuning(t: &mut Tuning) -> bool {
    let mut ok = true;
    ok &= bound_f32(&mut t.mask_lf.enr_transparent, 0.0, 100.0);
    ok &= bound_f32(&mut t.mask_lf.enr_suppress, 0.0, 100.0);
    ok &= bound_f32(&mut t.mask_lf.emr_transparent, 0.0, 100.0);
    ok &= bound_f32(&mut t.mask_hf.enr_transparent, 0.0, 100.0);
    ok &= bound_f32(&mut t.mask_hf.enr_suppress, 0.0, 100.0);
    ok &= bound_f32(&mut t.mask_hf.emr_transparent, 0.0, 100.0);
    ok &= bound_f32(&mut t.max_inc_factor, 0.0, 100.0);
    ok &= bound_f32(&mut t.max_dec_factor_lf, 0.0, 100.0);
    ok
}

fn bound_f32(value: &mut f32, min: f32, max: f32) -> bool {
    let clamped = value.clamp(min, max);
    let clamped = if clamped.is_finite() { clamped } else { min };
    let unchanged = *value == clamped;
    *value = clamped;
    unchanged
}

fn bound_usize(value: &mut usize, min: usize, max: usize) -> bool {
    let clamped = (*value).clamp(min, max);
    let unchanged = *value == clamped;
    *value = clamped;
    unchanged
}

fn bound_i32(value: &mut i32, min: i32, max: i32) -> bool {
    let clamped = (*value).clamp(min, max);
    let unchanged = *value == clamped;
    *value = clamped;
    unchanged
}

fn raise_usize(value: &mut usize, min: usize) -> bool {
    if *value < min {
        *value = min;
        false
    } else {
        true
    }
}

// ---------------------------------------------------------------------------
// Sparse override
// ---------------------------------------------------------------------------

macro_rules! merge {
    ($dst:expr, $src:expr) => {
        if let Some(v) = $src {
            $dst = v;
        }
    };
}

/// Sparse mirror of [`Buffering`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BufferingOverride {
    pub excess_render_detection_interval_blocks: Option<usize>,
    pub max_allowed_excess_render_blocks: Option<usize>,
}

impl BufferingOverride {
    fn apply_to(&self, cfg: &mut Buffering) {
        merge!(
            cfg.excess_render_detection_interval_blocks,
            self.excess_render_detection_interval_blocks
        );
        merge!(
            cfg.max_allowed_excess_render_blocks,
            self.max_allowed_excess_render_blocks
        );
    }
}

/// Sparse mirror of [`AlignmentMixing`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlignmentMixingOverride {
    pub downmix: Option<bool>,
    pub adaptive_selection: Option<bool>,
    pub activity_power_threshold: Option<f32>,
    pub prefer_first_two_channels: Option<bool>,
}

impl AlignmentMixingOverride {
    fn apply_to(&self, cfg: &mut AlignmentMixing) {
        merge!(cfg.downmix, self.downmix);
        merge!(cfg.adaptive_selection, self.adaptive_selection);
        merge!(cfg.activity_power_threshold, self.activity_power_threshold);
        merge!(cfg.prefer_first_two_channels, self.prefer_first_two_channels);
    }
}

/// Sparse mirror of [`Delay`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelayOverride {
    pub default_delay: Option<usize>,
    pub down_sampling_factor: Option<usize>,
    pub num_filters: Option<usize>,
    pub delay_headroom_samples: Option<usize>,
    pub hysteresis_limit_blocks: Option<usize>,
    pub fixed_capture_delay_samples: Option<usize>,
    pub delay_estimate_smoothing: Option<f32>,
    pub delay_estimate_smoothing_delay_found: Option<f32>,
    pub delay_candidate_detection_threshold: Option<f32>,
    pub delay_selection_threshold_initial: Option<i32>,
    pub delay_selection_threshold_converged: Option<i32>,
    pub use_external_delay_estimator: Option<bool>,
    pub log_warning_on_delay_changes: Option<bool>,
    pub render_alignment_mixing: AlignmentMixingOverride,
    pub capture_alignment_mixing: AlignmentMixingOverride,
    pub detect_pre_echo: Option<bool>,
}

impl DelayOverride {
    fn apply_to(&self, cfg: &mut Delay) {
        merge!(cfg.default_delay, self.default_delay);
        merge!(cfg.down_sampling_factor, self.down_sampling_factor);
        merge!(cfg.num_filters, self.num_filters);
        merge!(cfg.delay_headroom_samples, self.delay_headroom_samples);
        merge!(cfg.hysteresis_limit_blocks, self.hysteresis_limit_blocks);
        merge!(
            cfg.fixed_capture_delay_samples,
            self.fixed_capture_delay_samples
        );
        merge!(cfg.delay_estimate_smoothing, self.delay_estimate_smoothing);
        merge!(
            cfg.delay_estimate_smoothing_delay_found,
            self.delay_estimate_smoothing_delay_found
        );
        merge!(
            cfg.delay_candidate_detection_threshold,
            self.delay_candidate_detection_threshold
        );
        merge!(
            cfg.delay_selection_thresholds.initial,
            self.delay_selection_threshold_initial
        );
        merge!(
            cfg.delay_selection_thresholds.converged,
            self.delay_selection_threshold_converged
        );
        merge!(
            cfg.use_external_delay_estimator,
            self.use_external_delay_estimator
        );
        merge!(
            cfg.log_warning_on_delay_changes,
            self.log_warning_on_delay_changes
        );
        self.render_alignment_mixing
            .apply_to(&mut cfg.render_alignment_mixing);
        self.capture_alignment_mixing
            .apply_to(&mut cfg.capture_alignment_mixing);
        merge!(cfg.detect_pre_echo, self.detect_pre_echo);
    }
}

/// Sparse mirror of [`RefinedConfiguration`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefinedConfigurationOverride {
    pub length_blocks: Option<usize>,
    pub leakage_converged: Option<f32>,
    pub leakage_diverged: Option<f32>,
    pub error_floor: Option<f32>,
    pub error_ceil: Option<f32>,
    pub noise_gate: Option<f32>,
}

impl RefinedConfigurationOverride {
    fn apply_to(&self, cfg: &mut RefinedConfiguration) {
        merge!(cfg.length_blocks, self.length_blocks);
        merge!(cfg.leakage_converged, self.leakage_converged);
        merge!(cfg.leakage_diverged, self.leakage_diverged);
        merge!(cfg.error_floor, self.error_floor);
        merge!(cfg.error_ceil, self.error_ceil);
        merge!(cfg.noise_gate, self.noise_gate);
    }
}

/// Sparse mirror of [`CoarseConfiguration`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoarseConfigurationOverride {
    pub length_blocks: Option<usize>,
    pub rate: Option<f32>,
    pub noise_gate: Option<f32>,
}

impl CoarseConfigurationOverride {
    fn apply_to(&self, cfg: &mut CoarseConfiguration) {
        merge!(cfg.length_blocks, self.length_blocks);
        merge!(cfg.rate, self.rate);
        merge!(cfg.noise_gate, self.noise_gate);
    }
}

/// Sparse mirror of [`Filter`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterOverride {
    pub refined: RefinedConfigurationOverride,
    pub coarse: CoarseConfigurationOverride,
    pub refined_initial: RefinedConfigurationOverride,
    pub coarse_initial: CoarseConfigurationOverride,
    pub config_change_duration_blocks: Option<usize>,
    pub initial_state_seconds: Option<f32>,
    pub coarse_reset_hangover_blocks: Option<i32>,
    pub conservative_initial_phase: Option<bool>,
    pub enable_coarse_filter_output_usage: Option<bool>,
    pub use_linear_filter: Option<bool>,
    pub high_pass_filter_echo_reference: Option<bool>,
    pub export_linear_aec_output: Option<bool>,
}

impl FilterOverride {
    fn apply_to(&self, cfg: &mut Filter) {
        self.refined.apply_to(&mut cfg.refined);
        self.coarse.apply_to(&mut cfg.coarse);
        self.refined_initial.apply_to(&mut cfg.refined_initial);
        self.coarse_initial.apply_to(&mut cfg.coarse_initial);
        merge!(
            cfg.config_change_duration_blocks,
            self.config_change_duration_blocks
        );
        merge!(cfg.initial_state_seconds, self.initial_state_seconds);
        merge!(
            cfg.coarse_reset_hangover_blocks,
            self.coarse_reset_hangover_blocks
        );
        merge!(
            cfg.conservative_initial_phase,
            self.conservative_initial_phase
        );
        merge!(
            cfg.enable_coarse_filter_output_usage,
            self.enable_coarse_filter_output_usage
        );
        merge!(cfg.use_linear_filter, self.use_linear_filter);
        merge!(
            cfg.high_pass_filter_echo_reference,
            self.high_pass_filter_echo_reference
        );
        merge!(cfg.export_linear_aec_output, self.export_linear_aec_output);
    }
}

/// Sparse mirror of [`Erle`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErleOverride {
    pub min: Option<f32>,
    pub max_l: Option<f32>,
    pub max_h: Option<f32>,
    pub onset_detection: Option<bool>,
    pub num_sections: Option<usize>,
    pub clamp_quality_estimate_to_zero: Option<bool>,
    pub clamp_quality_estimate_to_one: Option<bool>,
}

impl ErleOverride {
    fn apply_to(&self, cfg: &mut Erle) {
        merge!(cfg.min, self.min);
        merge!(cfg.max_l, self.max_l);
        merge!(cfg.max_h, self.max_h);
        merge!(cfg.onset_detection, self.onset_detection);
        merge!(cfg.num_sections, self.num_sections);
        merge!(
            cfg.clamp_quality_estimate_to_zero,
            self.clamp_quality_estimate_to_zero
        );
        merge!(
            cfg.clamp_quality_estimate_to_one,
            self.clamp_quality_estimate_to_one
        );
    }
}

/// Sparse mirror of [`EpStrength`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpStrengthOverride {
    pub default_gain: Option<f32>,
    pub default_len: Option<f32>,
    pub nearend_len: Option<f32>,
    pub echo_can_saturate: Option<bool>,
    pub bounded_erl: Option<bool>,
    pub erle_onset_compensation_in_dominant_nearend: Option<bool>,
    pub use_conservative_tail_frequency_response: Option<bool>,
}

impl EpStrengthOverride {
    fn apply_to(&self, cfg: &mut EpStrength) {
        merge!(cfg.default_gain, self.default_gain);
        merge!(cfg.default_len, self.default_len);
        merge!(cfg.nearend_len, self.nearend_len);
        merge!(cfg.echo_can_saturate, self.echo_can_saturate);
        merge!(cfg.bounded_erl, self.bounded_erl);
        merge!(
            cfg.erle_onset_compensation_in_dominant_nearend,
            self.erle_onset_compensation_in_dominant_nearend
        );
        merge!(
            cfg.use_conservative_tail_frequency_response,
            self.use_conservative_tail_frequency_response
        );
    }
}

/// Sparse mirror of [`EchoAudibility`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoAudibilityOverride {
    pub low_render_limit: Option<f32>,
    pub normal_render_limit: Option<f32>,
    pub floor_power: Option<f32>,
    pub audibility_threshold_lf: Option<f32>,
    pub audibility_threshold_mf: Option<f32>,
    pub audibility_threshold_hf: Option<f32>,
    pub use_stationarity_properties: Option<bool>,
    pub use_stationarity_properties_at_init: Option<bool>,
}

impl EchoAudibilityOverride {
    fn apply_to(&self, cfg: &mut EchoAudibility) {
        merge!(cfg.low_render_limit, self.low_render_limit);
        merge!(cfg.normal_render_limit, self.normal_render_limit);
        merge!(cfg.floor_power, self.floor_power);
        merge!(cfg.audibility_threshold_lf, self.audibility_threshold_lf);
        merge!(cfg.audibility_threshold_mf, self.audibility_threshold_mf);
        merge!(cfg.audibility_threshold_hf, self.audibility_threshold_hf);
        merge!(
            cfg.use_stationarity_properties,
            self.use_stationarity_properties
        );
        merge!(
            cfg.use_stationarity_properties_at_init,
            self.use_stationarity_properties_at_init
        );
    }
}

/// Sparse mirror of [`RenderLevels`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderLevelsOverride {
    pub active_render_limit: Option<f32>,
    pub poor_excitation_render_limit: Option<f32>,
    pub poor_excitation_render_limit_ds8: Option<f32>,
    pub render_power_gain_db: Option<f32>,
}

impl RenderLevelsOverride {
    fn apply_to(&self, cfg: &mut RenderLevels) {
        merge!(cfg.active_render_limit, self.active_render_limit);
        merge!(
            cfg.poor_excitation_render_limit,
            self.poor_excitation_render_limit
        );
        merge!(
            cfg.poor_excitation_render_limit_ds8,
            self.poor_excitation_render_limit_ds8
        );
        merge!(cfg.render_power_gain_db, self.render_power_gain_db);
    }
}

/// Sparse mirror of [`EchoRemovalControl`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoRemovalControlOverride {
    pub has_clock_drift: Option<bool>,
    pub linear_and_stable_echo_path: Option<bool>,
}

impl EchoRemovalControlOverride {
    fn apply_to(&self, cfg: &mut EchoRemovalControl) {
        merge!(cfg.has_clock_drift, self.has_clock_drift);
        merge!(
            cfg.linear_and_stable_echo_path,
            self.linear_and_stable_echo_path
        );
    }
}

/// Sparse mirror of [`EchoModel`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoModelOverride {
    pub noise_floor_hold: Option<usize>,
    pub min_noise_floor_power: Option<f32>,
    pub stationary_gate_slope: Option<f32>,
    pub noise_gate_power: Option<f32>,
    pub noise_gate_slope: Option<f32>,
    pub render_pre_window_size: Option<usize>,
    pub render_post_window_size: Option<usize>,
    pub model_reverb_in_nonlinear_mode: Option<bool>,
}

impl EchoModelOverride {
    fn apply_to(&self, cfg: &mut EchoModel) {
        merge!(cfg.noise_floor_hold, self.noise_floor_hold);
        merge!(cfg.min_noise_floor_power, self.min_noise_floor_power);
        merge!(cfg.stationary_gate_slope, self.stationary_gate_slope);
        merge!(cfg.noise_gate_power, self.noise_gate_power);
        merge!(cfg.noise_gate_slope, self.noise_gate_slope);
        merge!(cfg.render_pre_window_size, self.render_pre_window_size);
        merge!(cfg.render_post_window_size, self.render_post_window_size);
        merge!(
            cfg.model_reverb_in_nonlinear_mode,
            self.model_reverb_in_nonlinear_mode
        );
    }
}

/// Sparse mirror of [`ComfortNoise`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComfortNoiseOverride {
    pub noise_floor_dbfs: Option<f32>,
}

impl ComfortNoiseOverride {
    fn apply_to(&self, cfg: &mut ComfortNoise) {
        merge!(cfg.noise_floor_dbfs, self.noise_floor_dbfs);
    }
}

/// Sparse mirror of [`MaskingThresholds`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaskingThresholdsOverride {
    pub enr_transparent: Option<f32>,
    pub enr_suppress: Option<f32>,
    pub emr_transparent: Option<f32>,
}

impl MaskingThresholdsOverride {
    fn apply_to(&self, cfg: &mut MaskingThresholds) {
        merge!(cfg.enr_transparent, self.enr_transparent);
        merge!(cfg.enr_suppress, self.enr_suppress);
        merge!(cfg.emr_transparent, self.emr_transparent);
    }
}

/// Sparse mirror of [`Tuning`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TuningOverride {
    pub mask_lf: MaskingThresholdsOverride,
    pub mask_hf: MaskingThresholdsOverride,
    pub max_inc_factor: Option<f32>,
    pub max_dec_factor_lf: Option<f32>,
}

impl TuningOverride {
    fn apply_to(&self, cfg: &mut Tuning) {
        self.mask_lf.apply_to(&mut cfg.mask_lf);
        self.mask_hf.apply_to(&mut cfg.mask_hf);
        merge!(cfg.max_inc_factor, self.max_inc_factor);
        merge!(cfg.max_dec_factor_lf, self.max_dec_factor_lf);
    }
}

/// Sparse mirror of [`DominantNearendDetection`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DominantNearendDetectionOverride {
    pub enr_threshold: Option<f32>,
    pub enr_exit_threshold: Option<f32>,
    pub snr_threshold: Option<f32>,
    pub hold_duration: Option<i32>,
    pub trigger_threshold: Option<i32>,
    pub use_during_initial_phase: Option<bool>,
    pub use_unbounded_echo_spectrum: Option<bool>,
}

impl DominantNearendDetectionOverride {
    fn apply_to(&self, cfg: &mut DominantNearendDetection) {
        merge!(cfg.enr_threshold, self.enr_threshold);
        merge!(cfg.enr_exit_threshold, self.enr_exit_threshold);
        merge!(cfg.snr_threshold, self.snr_threshold);
        merge!(cfg.hold_duration, self.hold_duration);
        merge!(cfg.trigger_threshold, self.trigger_threshold);
        merge!(cfg.use_during_initial_phase, self.use_during_initial_phase);
        merge!(
            cfg.use_unbounded_echo_spectrum,
            self.use_unbounded_echo_spectrum
        );
    }
}

/// Sparse mirror of [`SubbandNearendDetection`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubbandNearendDetectionOverride {
    pub nearend_average_blocks: Option<usize>,
    pub subband1_low: Option<usize>,
    pub subband1_high: Option<usize>,
    pub subband2_low: Option<usize>,
    pub subband2_high: Option<usize>,
    pub nearend_threshold: Option<f32>,
    pub snr_threshold: Option<f32>,
}

impl SubbandNearendDetectionOverride {
    fn apply_to(&self, cfg: &mut SubbandNearendDetection) {
        merge!(cfg.nearend_average_blocks, self.nearend_average_blocks);
        merge!(cfg.subband1.low, self.subband1_low);
        merge!(cfg.subband1.high, self.subband1_high);
        merge!(cfg.subband2.low, self.subband2_low);
        merge!(cfg.subband2.high, self.subband2_high);
        merge!(cfg.nearend_threshold, self.nearend_threshold);
        merge!(cfg.snr_threshold, self.snr_threshold);
    }
}

/// Sparse mirror of [`HighBandsSuppression`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HighBandsSuppressionOverride {
    pub enr_threshold: Option<f32>,
    pub max_gain_during_echo: Option<f32>,
    pub anti_howling_activation_threshold: Option<f32>,
    pub anti_howling_gain: Option<f32>,
}

impl HighBandsSuppressionOverride {
    fn apply_to(&self, cfg: &mut HighBandsSuppression) {
        merge!(cfg.enr_threshold, self.enr_threshold);
        merge!(cfg.max_gain_during_echo, self.max_gain_during_echo);
        merge!(
            cfg.anti_howling_activation_threshold,
            self.anti_howling_activation_threshold
        );
        merge!(cfg.anti_howling_gain, self.anti_howling_gain);
    }
}

/// Sparse mirror of [`HighFrequencySuppression`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HighFrequencySuppressionOverride {
    pub limiting_gain_band: Option<i32>,
    pub bands_in_limiting_gain: Option<i32>,
}

impl HighFrequencySuppressionOverride {
    fn apply_to(&self, cfg: &mut HighFrequencySuppression) {
        merge!(cfg.limiting_gain_band, self.limiting_gain_band);
        merge!(cfg.bands_in_limiting_gain, self.bands_in_limiting_gain);
    }
}

/// Sparse mirror of [`Suppressor`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SuppressorOverride {
    pub nearend_average_blocks: Option<usize>,
    pub normal_tuning: TuningOverride,
    pub nearend_tuning: TuningOverride,
    pub lf_smoothing_during_initial_phase: Option<bool>,
    pub last_permanent_lf_smoothing_band: Option<i32>,
    pub last_lf_smoothing_band: Option<i32>,
    pub last_lf_band: Option<i32>,
    pub first_hf_band: Option<i32>,
    pub dominant_nearend_detection: DominantNearendDetectionOverride,
    pub subband_nearend_detection: SubbandNearendDetectionOverride,
    pub use_subband_nearend_detection: Option<bool>,
    pub high_bands_suppression: HighBandsSuppressionOverride,
    pub high_frequency_suppression: HighFrequencySuppressionOverride,
    pub floor_first_increase: Option<f32>,
    pub conservative_hf_suppression: Option<bool>,
}

impl SuppressorOverride {
    fn apply_to(&self, cfg: &mut Suppressor) {
        merge!(cfg.nearend_average_blocks, self.nearend_average_blocks);
        self.normal_tuning.apply_to(&mut cfg.normal_tuning);
        self.nearend_tuning.apply_to(&mut cfg.nearend_tuning);
        merge!(
            cfg.lf_smoothing_during_initial_phase,
            self.lf_smoothing_during_initial_phase
        );
        merge!(
            cfg.last_permanent_lf_smoothing_band,
            self.last_permanent_lf_smoothing_band
        );
        merge!(cfg.last_lf_smoothing_band, self.last_lf_smoothing_band);
        merge!(cfg.last_lf_band, self.last_lf_band);
        merge!(cfg.first_hf_band, self.first_hf_band);
        self.dominant_nearend_detection
            .apply_to(&mut cfg.dominant_nearend_detection);
        self.subband_nearend_detection
            .apply_to(&mut cfg.subband_nearend_detection);
        merge!(
            cfg.use_subband_nearend_detection,
            self.use_subband_nearend_detection
        );
        self.high_bands_suppression
            .apply_to(&mut cfg.high_bands_suppression);
        self.high_frequency_suppression
            .apply_to(&mut cfg.high_frequency_suppression);
        merge!(cfg.floor_first_increase, self.floor_first_increase);
        merge!(
            cfg.conservative_hf_suppression,
            self.conservative_hf_suppression
        );
    }
}

/// Sparse echo canceller override.
///
/// All fields default to "not set". [`merged_with()`](Self::merged_with)
/// produces a full configuration by applying the set fields on top of a
/// baseline; the result must still pass
/// [`validate()`](EchoCancellerConfig::validate) unchanged to be accepted by
/// the session, so a half-applied state is never observable.
///
/// # Example
///
/// ```
/// use resona::aec3::{EchoCancellerConfig, EchoCancellerOverride};
///
/// let mut tweak = EchoCancellerOverride::default();
/// tweak.suppressor.dominant_nearend_detection.enr_threshold = Some(0.5);
/// tweak.delay.default_delay = Some(7);
///
/// let config = tweak.merged_with(&EchoCancellerConfig::default());
/// assert_eq!(config.delay.default_delay, 7);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EchoCancellerOverride {
    pub buffering: BufferingOverride,
    pub delay: DelayOverride,
    pub filter: FilterOverride,
    pub erle: ErleOverride,
    pub ep_strength: EpStrengthOverride,
    pub echo_audibility: EchoAudibilityOverride,
    pub render_levels: RenderLevelsOverride,
    pub echo_removal_control: EchoRemovalControlOverride,
    pub echo_model: EchoModelOverride,
    pub comfort_noise: ComfortNoiseOverride,
    pub suppressor: SuppressorOverride,
}

impl EchoCancellerOverride {
    /// Applies the set fields on top of `baseline` and returns the result.
    pub fn merged_with(&self, baseline: &EchoCancellerConfig) -> EchoCancellerConfig {
        let mut cfg = *baseline;
        self.buffering.apply_to(&mut cfg.buffering);
        self.delay.apply_to(&mut cfg.delay);
        self.filter.apply_to(&mut cfg.filter);
        self.erle.apply_to(&mut cfg.erle);
        self.ep_strength.apply_to(&mut cfg.ep_strength);
        self.echo_audibility.apply_to(&mut cfg.echo_audibility);
        self.render_levels.apply_to(&mut cfg.render_levels);
        self.echo_removal_control
            .apply_to(&mut cfg.echo_removal_control);
        self.echo_model.apply_to(&mut cfg.echo_model);
        self.comfort_noise.apply_to(&mut cfg.comfort_noise);
        self.suppressor.apply_to(&mut cfg.suppressor);
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn defaults_match_engine_baseline() {
        let cfg = EchoCancellerConfig::default();
        assert_eq!(cfg.buffering.max_allowed_excess_render_blocks, 8);
        assert!(cfg.delay.detect_pre_echo);
        assert_eq!(cfg.erle.min, 1.0);
        assert_eq!(cfg.filter.refined.length_blocks, 13);
        assert_eq!(cfg.suppressor.first_hf_band, 8);
    }

    #[test]
    fn default_config_is_valid() {
        let mut cfg = EchoCancellerConfig::default();
        assert!(cfg.validate());
    }

    #[test]
    fn multichannel_config_is_valid_and_differs() {
        let mut cfg = EchoCancellerConfig::multichannel();
        assert!(cfg.validate());
        assert_ne!(cfg, EchoCancellerConfig::default());
        assert_eq!(cfg.filter.coarse.length_blocks, 11);
        assert_eq!(cfg.filter.coarse.rate, 0.95);
        assert_eq!(cfg.suppressor.normal_tuning.max_inc_factor, 1.5);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut cfg = EchoCancellerConfig::default();
        cfg.delay.down_sampling_factor = 3; // invalid, must be 4 or 8
        cfg.erle.min = 200_000.0;
        assert!(!cfg.validate());
        assert_eq!(cfg.delay.down_sampling_factor, 4);
        // erle.min first clamps to 100_000, then the min > max check pulls it
        // down to min(max_l, max_h) = 1.5.
        assert!((cfg.erle.min - 1.5).abs() < 0.01);
    }

    #[test]
    fn non_finite_values_are_replaced() {
        let mut cfg = EchoCancellerConfig::default();
        cfg.filter.refined.error_floor = f32::NAN;
        cfg.comfort_noise.noise_floor_dbfs = f32::NEG_INFINITY;
        assert!(!cfg.validate());
        assert!(cfg.filter.refined.error_floor.is_finite());
        assert!(cfg.comfort_noise.noise_floor_dbfs.is_finite());
        assert!(cfg.validate());
    }

    #[test]
    fn initial_filter_never_longer_than_converged() {
        let mut cfg = EchoCancellerConfig::default();
        cfg.filter.refined.length_blocks = 5;
        assert!(!cfg.validate());
        assert_eq!(cfg.filter.refined_initial.length_blocks, 5);
    }

    #[test]
    fn inverted_erle_bounds_rejected() {
        let mut cfg = EchoCancellerConfig::default();
        cfg.erle.min = 5.0;
        cfg.erle.max_l = 4.0;
        assert!(!cfg.validate());
    }

    #[test]
    fn empty_override_is_identity() {
        let baseline = EchoCancellerConfig::default();
        let merged = EchoCancellerOverride::default().merged_with(&baseline);
        assert_eq!(merged, baseline);

        let multi = EchoCancellerConfig::multichannel();
        let merged = EchoCancellerOverride::default().merged_with(&multi);
        assert_eq!(merged, multi);
    }

    #[test]
    fn override_applies_only_set_fields() {
        let mut ov = EchoCancellerOverride::default();
        ov.erle.min = Some(1.2);
        ov.filter.coarse.rate = Some(0.5);
        ov.suppressor.dominant_nearend_detection.snr_threshold = Some(25.0);

        let baseline = EchoCancellerConfig::default();
        let merged = ov.merged_with(&baseline);

        assert_eq!(merged.erle.min, 1.2);
        assert_eq!(merged.filter.coarse.rate, 0.5);
        assert_eq!(
            merged.suppressor.dominant_nearend_detection.snr_threshold,
            25.0
        );
        // Everything else is untouched.
        assert_eq!(merged.delay, baseline.delay);
        assert_eq!(merged.echo_model, baseline.echo_model);
        assert_eq!(merged.comfort_noise, baseline.comfort_noise);
    }

    #[proptest]
    fn validate_is_idempotent(
        #[strategy(-1.0e9f32..1.0e9)] erle_min: f32,
        #[strategy(0usize..10_000)] default_delay: usize,
        #[strategy(-1.0e9f32..1.0e9)] coarse_rate: f32,
        #[strategy(-500i32..500)] first_hf_band: i32,
    ) {
        let mut cfg = EchoCancellerConfig::default();
        cfg.erle.min = erle_min;
        cfg.delay.default_delay = default_delay;
        cfg.filter.coarse.rate = coarse_rate;
        cfg.suppressor.first_hf_band = first_hf_band;

        cfg.validate();
        let after_first = cfg;
        assert!(cfg.validate(), "second validation must be a no-op");
        assert_eq!(cfg, after_first);
    }

    #[proptest]
    fn merged_default_baseline_revalidates_cleanly(
        #[strategy(0.0f32..100.0)] enr_threshold: f32,
        #[strategy(1usize..100)] refined_length: usize,
    ) {
        let mut ov = EchoCancellerOverride::default();
        ov.suppressor.dominant_nearend_detection.enr_threshold = Some(enr_threshold);
        ov.filter.refined.length_blocks = Some(refined_length);

        let mut merged = ov.merged_with(&EchoCancellerConfig::default());
        merged.validate();
        assert!(merged.validate());
    }
}
