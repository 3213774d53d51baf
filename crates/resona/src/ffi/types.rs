//! C-compatible type definitions.
//!
//! All types are `#[repr(C)]` and safe to pass across the FFI boundary. The
//! `RsnOptional*` structs are the uniform "value or absence" bridge: a
//! `has_value` flag plus a value that defaults to `false`/`0`. The engine's
//! own optional representation never crosses this boundary.

use crate::Processor;

// ---------------------------------------------------------------------------
// Opaque handle
// ---------------------------------------------------------------------------

/// Opaque session handle. Create with `rsn_create()`, release with
/// `rsn_destroy()`.
pub struct RsnProcessor {
    pub(crate) inner: Processor,
}

impl std::fmt::Debug for RsnProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsnProcessor").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Optional bridge
// ---------------------------------------------------------------------------

/// A double that may be absent.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RsnOptionalDouble {
    pub has_value: bool,
    pub value: f64,
}

impl From<Option<f64>> for RsnOptionalDouble {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(value) => Self {
                has_value: true,
                value,
            },
            None => Self::default(),
        }
    }
}

impl From<RsnOptionalDouble> for Option<f64> {
    fn from(optional: RsnOptionalDouble) -> Self {
        optional.has_value.then_some(optional.value)
    }
}

/// An int that may be absent.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsnOptionalInt {
    pub has_value: bool,
    pub value: i32,
}

impl From<Option<i32>> for RsnOptionalInt {
    fn from(value: Option<i32>) -> Self {
        match value {
            Some(value) => Self {
                has_value: true,
                value,
            },
            None => Self::default(),
        }
    }
}

impl From<RsnOptionalInt> for Option<i32> {
    fn from(optional: RsnOptionalInt) -> Self {
        optional.has_value.then_some(optional.value)
    }
}

/// A bool that may be absent.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsnOptionalBool {
    pub has_value: bool,
    pub value: bool,
}

impl From<Option<bool>> for RsnOptionalBool {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(value) => Self {
                has_value: true,
                value,
            },
            None => Self::default(),
        }
    }
}

impl From<RsnOptionalBool> for Option<bool> {
    fn from(optional: RsnOptionalBool) -> Self {
        optional.has_value.then_some(optional.value)
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Statistics snapshot. Absent fields have `has_value == false`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RsnStats {
    pub output_rms_dbfs: RsnOptionalInt,
    pub voice_detected: RsnOptionalBool,
    pub echo_return_loss: RsnOptionalDouble,
    pub echo_return_loss_enhancement: RsnOptionalDouble,
    pub divergent_filter_fraction: RsnOptionalDouble,
    pub delay_median_ms: RsnOptionalInt,
    pub delay_standard_deviation_ms: RsnOptionalInt,
    pub residual_echo_likelihood: RsnOptionalDouble,
    pub residual_echo_likelihood_recent_max: RsnOptionalDouble,
    pub delay_ms: RsnOptionalInt,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Noise suppression aggressiveness level.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsnNoiseSuppressionLevel {
    Low = 0,
    Moderate = 1,
    High = 2,
    VeryHigh = 3,
}

/// Gain controller operating mode.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsnGainControllerMode {
    AdaptiveAnalog = 0,
    AdaptiveDigital = 1,
    FixedDigital = 2,
}

/// Voice detector sensitivity.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsnDetectionLikelihood {
    VeryLow = 0,
    Low = 1,
    Moderate = 2,
    High = 3,
}

/// Downmix method for multi-channel capture.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsnDownmixMethod {
    AverageChannels = 0,
    UseFirstChannel = 1,
}

/// Runtime setting discriminant.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsnRuntimeSettingKind {
    CapturePreGain = 0,
    CaptureFixedPostGain = 1,
    PlayoutVolumeChange = 2,
    CaptureOutputUsed = 3,
}

/// A runtime setting; the field matching `kind` carries the payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsnRuntimeSetting {
    pub kind: RsnRuntimeSettingKind,
    pub float_value: f32,
    pub int_value: i32,
    pub bool_value: bool,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Flat top-level configuration. Obtain defaults via `rsn_config_default()`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RsnConfig {
    // -- Pipeline --
    pub pipeline_maximum_internal_processing_rate: i32,
    pub pipeline_multi_channel_render: bool,
    pub pipeline_multi_channel_capture: bool,
    pub pipeline_capture_downmix_method: RsnDownmixMethod,

    // -- High-pass filter --
    pub high_pass_filter_enabled: bool,
    pub high_pass_filter_apply_in_full_band: bool,

    // -- Echo canceller --
    pub echo_canceller_enabled: bool,
    pub echo_canceller_mobile_mode: bool,
    pub echo_canceller_enforce_high_pass_filtering: bool,
    pub echo_canceller_export_linear_aec_output: bool,

    // -- Noise suppression --
    pub noise_suppression_enabled: bool,
    pub noise_suppression_level: RsnNoiseSuppressionLevel,
    pub noise_suppression_analyze_linear_aec_output: bool,

    // -- Gain controller --
    pub gain_controller_enabled: bool,
    pub gain_controller_mode: RsnGainControllerMode,
    pub gain_controller_target_level_dbfs: i32,
    pub gain_controller_compression_gain_db: i32,
    pub gain_controller_enable_limiter: bool,
    pub gain_controller_startup_min_volume: i32,

    // -- Voice detection --
    pub voice_detection_enabled: bool,
    pub voice_detection_likelihood: RsnDetectionLikelihood,
}
