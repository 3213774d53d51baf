//! Processing statistics snapshot.
//!
//! Every field is optional: the engine reports a statistic only once the
//! corresponding submodule has produced one (typically after the first
//! processed capture frame). Absent stays absent — the façade never
//! substitutes sentinel values.

/// Statistics from the last capture-side processing call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Root mean square level of the processed capture signal in dBFS,
    /// constrained to [-127, 0] where -127 indicates muted.
    pub output_rms_dbfs: Option<i32>,
    /// True if voice was detected in the most recent capture frame.
    pub voice_detected: Option<bool>,
    /// ERL = 10 log10(P_far / P_echo).
    pub echo_return_loss: Option<f64>,
    /// ERLE = 10 log10(P_echo / P_out).
    pub echo_return_loss_enhancement: Option<f64>,
    /// Fraction of time the linear AEC filter is divergent, in a 1-second
    /// non-overlapped aggregation window.
    pub divergent_filter_fraction: Option<f64>,
    /// Median of the measured render-to-capture delay in milliseconds.
    pub delay_median_ms: Option<i32>,
    /// Standard deviation of the measured delay in milliseconds.
    pub delay_standard_deviation_ms: Option<i32>,
    /// Residual echo detector likelihood.
    pub residual_echo_likelihood: Option<f64>,
    /// Maximum residual echo likelihood over the recent period.
    pub residual_echo_likelihood_recent_max: Option<f64>,
    /// Instantaneous delay estimate from the AEC in milliseconds.
    pub delay_ms: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_has_no_values() {
        let stats = Stats::default();
        assert!(stats.output_rms_dbfs.is_none());
        assert!(stats.voice_detected.is_none());
        assert!(stats.echo_return_loss.is_none());
        assert!(stats.echo_return_loss_enhancement.is_none());
        assert!(stats.divergent_filter_fraction.is_none());
        assert!(stats.delay_median_ms.is_none());
        assert!(stats.delay_standard_deviation_ms.is_none());
        assert!(stats.residual_echo_likelihood.is_none());
        assert!(stats.residual_echo_likelihood_recent_max.is_none());
        assert!(stats.delay_ms.is_none());
    }
}
