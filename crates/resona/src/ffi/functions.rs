//! Exported `extern "C"` functions.
//!
//! All public symbols use the `rsn_` prefix. Functions returning `i32`
//! follow the engine status taxonomy: `0` success, negative error.

use std::ptr;
use std::slice;

use crate::Processor;
use crate::aec3::EchoCancellerConfig;
use crate::config::Config;
use crate::engine::status;

use super::panic_guard::{ffi_guard, ffi_guard_ptr, ffi_guard_value};
use super::types::{RsnConfig, RsnProcessor, RsnRuntimeSetting, RsnStats};

// ─── Version ─────────────────────────────────────────────────────────

/// Returns a pointer to a static null-terminated version string.
///
/// The returned pointer is valid for the lifetime of the process.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_version() -> *const std::ffi::c_char {
    c"0.1.0".as_ptr()
}

// ─── Status helpers ──────────────────────────────────────────────────

/// Whether `code` indicates a successful operation.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_is_success(code: i32) -> bool {
    status::is_success(code)
}

// ─── Defaults ────────────────────────────────────────────────────────

/// Returns a default-initialized top-level configuration.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_config_default() -> RsnConfig {
    RsnConfig::from_rust(&Config::default())
}

/// Returns the engine's single-channel canceller baseline.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_default_aec_config() -> EchoCancellerConfig {
    EchoCancellerConfig::default()
}

/// Returns the engine's multichannel-tuned canceller baseline.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_default_multichannel_aec_config() -> EchoCancellerConfig {
    EchoCancellerConfig::multichannel()
}

/// Clamps every parameter of `config` to its valid range in place.
///
/// Returns `true` if and only if the config did not need to be changed.
/// Pure apart from the in-place clamping; a null pointer returns `false`.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_validate_aec_config(config: *mut EchoCancellerConfig) -> bool {
    ffi_guard_value! { false,
        if config.is_null() {
            return false;
        }
        // Safety: the caller guarantees the pointer is valid and exclusive.
        let config = unsafe { &mut *config };
        config.validate()
    }
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Creates a new processing session.
///
/// `aec_config` may be null; when non-null it supplies an explicit canceller
/// configuration that takes precedence over the engine defaults for any
/// channel count. On failure returns `NULL` and, when `error` is non-null,
/// stores the status code there. The caller owns the returned pointer and
/// must free it with [`rsn_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn rsn_create(
    num_capture_channels: i32,
    num_render_channels: i32,
    sample_rate_hz: i32,
    aec_config: *const EchoCancellerConfig,
    error: *mut i32,
) -> *mut RsnProcessor {
    ffi_guard_ptr! {
        let report = |code: i32| {
            if !error.is_null() {
                // Safety: checked non-null; the caller guarantees validity.
                unsafe { ptr::write(error, code) };
            }
        };

        if num_capture_channels < 0 || num_render_channels < 0 || sample_rate_hz < 0 {
            report(status::BAD_PARAMETER);
            return ptr::null_mut();
        }

        let mut builder = Processor::builder()
            .num_capture_channels(num_capture_channels as usize)
            .num_render_channels(num_render_channels as usize)
            .sample_rate_hz(sample_rate_hz as usize);
        if !aec_config.is_null() {
            // Safety: checked non-null; the struct is Copy and repr(C).
            builder = builder.aec_config(unsafe { *aec_config });
        }

        match builder.build() {
            Ok(processor) => {
                report(status::NO_ERROR);
                Box::into_raw(Box::new(RsnProcessor { inner: processor }))
            }
            Err(e) => {
                report(e.code());
                ptr::null_mut()
            }
        }
    }
}

/// Destroys a session and frees its memory.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid;
/// destroying a handle twice is undefined.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_destroy(processor: *mut RsnProcessor) {
    if !processor.is_null() {
        // Safety: created by Box::into_raw in rsn_create; the caller
        // guarantees single ownership.
        let _ = unsafe { Box::from_raw(processor) };
    }
}

/// Re-runs engine initialization, retaining stored formats and settings.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_initialize(processor: *mut RsnProcessor) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        match processor.inner.reinitialize() {
            Ok(()) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

// ─── Per-frame processing ────────────────────────────────────────────

/// Processes one 10 ms capture frame in place.
///
/// `channels` is an array of `num_capture_channels` pointers, each to a
/// buffer of `rsn_num_samples_per_frame()` floats.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_process_capture_frame(
    processor: *mut RsnProcessor,
    channels: *mut *mut f32,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        let num_channels = processor.inner.num_capture_channels();
        let num_frames = processor.inner.num_samples_per_frame();
        let Some(mut frame) = (unsafe { gather_mut(channels, num_channels, num_frames) }) else {
            return status::NULL_POINTER;
        };
        match processor.inner.process_capture_frame(&mut frame) {
            Ok(()) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

/// Feeds one 10 ms render frame, possibly modifying it in place.
///
/// `channels` is an array of `num_render_channels` pointers, each to a
/// buffer of `rsn_num_samples_per_frame()` floats.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_process_render_frame(
    processor: *mut RsnProcessor,
    channels: *mut *mut f32,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        let num_channels = processor.inner.num_render_channels();
        let num_frames = processor.inner.num_samples_per_frame();
        let Some(mut frame) = (unsafe { gather_mut(channels, num_channels, num_frames) }) else {
            return status::NULL_POINTER;
        };
        match processor.inner.process_render_frame(&mut frame) {
            Ok(()) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

/// Observes one 10 ms render frame without modifying it.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_analyze_render_frame(
    processor: *mut RsnProcessor,
    channels: *const *const f32,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        let num_channels = processor.inner.num_render_channels();
        let num_frames = processor.inner.num_samples_per_frame();
        let Some(frame) = (unsafe { gather(channels, num_channels, num_frames) }) else {
            return status::NULL_POINTER;
        };
        match processor.inner.analyze_render_frame(&frame) {
            Ok(()) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

/// Samples per channel in one 10 ms frame, or 0 for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_num_samples_per_frame(processor: *const RsnProcessor) -> i32 {
    ffi_guard_value! { 0,
        match unsafe { processor.as_ref() } {
            Some(processor) => processor.inner.num_samples_per_frame() as i32,
            None => 0,
        }
    }
}

// ─── Configuration ───────────────────────────────────────────────────

/// Applies a new top-level configuration.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_apply_config(processor: *mut RsnProcessor, config: RsnConfig) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        processor.inner.apply_config(config.to_rust());
        status::NO_ERROR
    }
}

/// Replaces the canceller configuration, or reverts to engine defaults when
/// `config` is null.
///
/// Validation failure leaves the session untouched. The engine is
/// reinitialized only when the stored configuration actually changed.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_set_aec_config(
    processor: *mut RsnProcessor,
    config: *const EchoCancellerConfig,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        // Safety: checked non-null; the struct is Copy and repr(C).
        let config = if config.is_null() {
            None
        } else {
            Some(unsafe { *config })
        };
        match processor.inner.set_aec_config(config) {
            Ok(_) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

/// Enqueues a runtime setting for the capture path.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_set_runtime_setting(
    processor: *mut RsnProcessor,
    setting: RsnRuntimeSetting,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        processor.inner.set_runtime_setting(setting.to_rust());
        status::NO_ERROR
    }
}

/// Sets the render-to-capture delay hint in milliseconds.
///
/// Values outside [0, 500] are clamped and reported with
/// `BAD_STREAM_PARAMETER_WARNING`; processing continues either way.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_set_stream_delay_ms(processor: *mut RsnProcessor, delay_ms: i32) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        match processor.inner.set_stream_delay_ms(delay_ms) {
            Ok(()) => status::NO_ERROR,
            Err(e) => e.code(),
        }
    }
}

/// Signals that the audio output will be (or is) muted.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_set_output_will_be_muted(
    processor: *mut RsnProcessor,
    muted: bool,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        processor.inner.set_output_will_be_muted(muted);
        status::NO_ERROR
    }
}

/// Signals that the next capture frame will contain key-press sound.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_set_stream_key_pressed(
    processor: *mut RsnProcessor,
    pressed: bool,
) -> i32 {
    ffi_guard! {
        let Some(processor) = (unsafe { processor.as_ref() }) else {
            return status::NULL_POINTER;
        };
        processor.inner.set_stream_key_pressed(pressed);
        status::NO_ERROR
    }
}

// ─── Statistics ──────────────────────────────────────────────────────

/// Reads the statistics snapshot. A null handle yields a snapshot with every
/// field absent.
#[unsafe(no_mangle)]
pub extern "C" fn rsn_get_stats(processor: *const RsnProcessor) -> RsnStats {
    ffi_guard_value! { RsnStats::default(),
        match unsafe { processor.as_ref() } {
            Some(processor) => RsnStats::from_rust(&processor.inner.get_stats()),
            None => RsnStats::default(),
        }
    }
}

// ─── Pointer gathering ───────────────────────────────────────────────

/// Builds mutable channel slices from a C pointer array.
///
/// # Safety
///
/// `channels` must point to `num_channels` valid, non-aliasing buffers of
/// `num_frames` floats each, or be null.
unsafe fn gather_mut<'a>(
    channels: *mut *mut f32,
    num_channels: usize,
    num_frames: usize,
) -> Option<Vec<&'a mut [f32]>> {
    if channels.is_null() {
        return None;
    }
    let ptrs = unsafe { slice::from_raw_parts(channels, num_channels) };
    if ptrs.iter().any(|p| p.is_null()) {
        return None;
    }
    Some(
        ptrs.iter()
            .map(|&p| unsafe { slice::from_raw_parts_mut(p, num_frames) })
            .collect(),
    )
}

/// Builds shared channel slices from a C pointer array.
///
/// # Safety
///
/// Same requirements as [`gather_mut`], except the buffers are only read.
unsafe fn gather<'a>(
    channels: *const *const f32,
    num_channels: usize,
    num_frames: usize,
) -> Option<Vec<&'a [f32]>> {
    if channels.is_null() {
        return None;
    }
    let ptrs = unsafe { slice::from_raw_parts(channels, num_channels) };
    if ptrs.iter().any(|p| p.is_null()) {
        return None;
    }
    Some(
        ptrs.iter()
            .map(|&p| unsafe { slice::from_raw_parts(p, num_frames) })
            .collect(),
    )
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create(rate: i32, channels: i32) -> *mut RsnProcessor {
        let mut error = 0;
        let p = rsn_create(channels, channels, rate, ptr::null(), &mut error);
        assert!(!p.is_null());
        assert!(rsn_is_success(error));
        p
    }

    #[test]
    fn create_and_destroy() {
        let p = create(48000, 1);
        assert_eq!(rsn_num_samples_per_frame(p), 480);
        rsn_destroy(p);
    }

    #[test]
    fn create_rejects_bad_rate() {
        let mut error = 0;
        let p = rsn_create(1, 1, 44100, ptr::null(), &mut error);
        assert!(p.is_null());
        assert_eq!(error, status::BAD_SAMPLE_RATE);
    }

    #[test]
    fn create_rejects_zero_channels() {
        let mut error = 0;
        let p = rsn_create(0, 1, 16000, ptr::null(), &mut error);
        assert!(p.is_null());
        assert_eq!(error, status::BAD_NUMBER_CHANNELS);
    }

    #[test]
    fn create_rejects_invalid_aec_config() {
        let mut aec = EchoCancellerConfig::default();
        aec.erle.min = -5.0;
        let mut error = 0;
        let p = rsn_create(1, 1, 16000, &aec, &mut error);
        assert!(p.is_null());
        assert_eq!(error, status::BAD_PARAMETER);
    }

    #[test]
    fn null_handle_is_reported() {
        assert_eq!(
            rsn_initialize(ptr::null_mut()),
            status::NULL_POINTER
        );
        assert_eq!(
            rsn_set_stream_delay_ms(ptr::null_mut(), 10),
            status::NULL_POINTER
        );
        assert_eq!(rsn_num_samples_per_frame(ptr::null()), 0);
        assert_eq!(rsn_get_stats(ptr::null()), RsnStats::default());
    }

    #[test]
    fn destroy_null_is_noop() {
        rsn_destroy(ptr::null_mut());
    }

    #[test]
    fn process_frames_and_read_stats() {
        let p = create(16000, 1);

        let empty = rsn_get_stats(p);
        assert!(!empty.output_rms_dbfs.has_value);

        let mut render = vec![0.1f32; 160];
        let mut render_ptrs = [render.as_mut_ptr()];
        assert!(rsn_is_success(rsn_process_render_frame(
            p,
            render_ptrs.as_mut_ptr()
        )));

        let mut capture = vec![0.5f32; 160];
        let mut capture_ptrs = [capture.as_mut_ptr()];
        assert!(rsn_is_success(rsn_process_capture_frame(
            p,
            capture_ptrs.as_mut_ptr()
        )));

        let stats = rsn_get_stats(p);
        assert!(stats.output_rms_dbfs.has_value);
        assert_eq!(stats.output_rms_dbfs.value, -6);
        assert!(!stats.voice_detected.has_value);

        rsn_destroy(p);
    }

    #[test]
    fn analyze_render_does_not_modify() {
        let p = create(16000, 2);
        let left = vec![0.25f32; 160];
        let right = vec![0.5f32; 160];
        let ptrs = [left.as_ptr(), right.as_ptr()];
        assert!(rsn_is_success(rsn_analyze_render_frame(p, ptrs.as_ptr())));
        assert!(left.iter().all(|&s| s == 0.25));
        assert!(right.iter().all(|&s| s == 0.5));
        rsn_destroy(p);
    }

    #[test]
    fn null_channel_array_is_reported() {
        let p = create(16000, 1);
        assert_eq!(
            rsn_process_capture_frame(p, ptr::null_mut()),
            status::NULL_POINTER
        );
        rsn_destroy(p);
    }

    #[test]
    fn apply_config_and_set_aec_config() {
        let p = create(48000, 1);

        let mut config = rsn_config_default();
        config.echo_canceller_enabled = true;
        config.echo_canceller_export_linear_aec_output = true;
        assert!(rsn_is_success(rsn_apply_config(p, config)));

        let aec = rsn_default_aec_config();
        assert!(rsn_is_success(rsn_set_aec_config(p, &aec)));
        assert!(rsn_is_success(rsn_set_aec_config(p, ptr::null())));

        let mut bad = rsn_default_aec_config();
        bad.delay.down_sampling_factor = 3;
        assert_eq!(rsn_set_aec_config(p, &bad), status::BAD_PARAMETER);

        rsn_destroy(p);
    }

    #[test]
    fn validate_clamps_in_place() {
        let mut config = rsn_default_aec_config();
        assert!(rsn_validate_aec_config(&mut config));

        config.erle.min = 200_000.0;
        assert!(!rsn_validate_aec_config(&mut config));
        assert!(config.erle.min <= 100_000.0);

        assert!(!rsn_validate_aec_config(ptr::null_mut()));
    }

    #[test]
    fn multichannel_default_differs() {
        assert_ne!(
            rsn_default_aec_config(),
            rsn_default_multichannel_aec_config()
        );
    }

    #[test]
    fn stream_delay_clamp_is_reported() {
        let p = create(16000, 1);
        assert!(rsn_is_success(rsn_set_stream_delay_ms(p, 100)));
        assert_eq!(
            rsn_set_stream_delay_ms(p, 1000),
            status::BAD_STREAM_PARAMETER_WARNING
        );
        rsn_destroy(p);
    }
}
