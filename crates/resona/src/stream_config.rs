//! Per-direction stream format descriptors.
//!
//! A [`StreamConfig`] pins down the format of one audio direction (capture or
//! render) for the lifetime of a session. The wrapped engine accepts only a
//! small set of native rates and requires input and output formats to match
//! per direction, so the descriptor is built once at session construction and
//! never mutated afterwards.

/// Sample rates the wrapped engine accepts natively.
pub const NATIVE_SAMPLE_RATES: [usize; 4] = [8000, 16000, 32000, 48000];

/// Fixed frame duration. Callers must chunk audio to this boundary; the
/// façade performs no internal buffering or resampling.
pub const FRAME_MS: usize = 10;

/// Configuration describing an audio stream's properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    sample_rate_hz: usize,
    num_channels: usize,
    num_frames: usize,
}

impl StreamConfig {
    /// Create a new stream configuration.
    pub fn new(sample_rate_hz: usize, num_channels: usize) -> Self {
        Self {
            sample_rate_hz,
            num_channels,
            num_frames: sample_rate_hz * FRAME_MS / 1000,
        }
    }

    /// The sampling rate in Hz.
    #[inline]
    pub fn sample_rate_hz(&self) -> usize {
        self.sample_rate_hz
    }

    /// The number of channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// The number of samples per channel in a 10 ms frame.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Total number of samples in a frame (channels × frames).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_channels * self.num_frames
    }

    /// Whether the rate is one the engine processes natively.
    #[inline]
    pub fn is_native_rate(&self) -> bool {
        NATIVE_SAMPLE_RATES.contains(&self.sample_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_follows_rate() {
        for &rate in &NATIVE_SAMPLE_RATES {
            let config = StreamConfig::new(rate, 1);
            assert_eq!(config.num_frames(), rate / 100);
        }
    }

    #[test]
    fn num_samples_counts_all_channels() {
        let config = StreamConfig::new(48000, 2);
        assert_eq!(config.num_frames(), 480);
        assert_eq!(config.num_samples(), 960);
    }

    #[test]
    fn native_rate_detection() {
        assert!(StreamConfig::new(16000, 1).is_native_rate());
        assert!(!StreamConfig::new(44100, 1).is_native_rate());
    }
}
