//! Echo controller configuration strategy.
//!
//! The engine constructs its echo controller lazily, on first use and again
//! after every reinitialization, handing the factory the live render and
//! capture channel counts. The selection below mirrors the engine's own
//! defaulting policy and must be updated in lockstep if that policy changes.

use crate::aec3::EchoCancellerConfig;
use crate::config_holder::SharedAecConfig;
use crate::engine::EchoControlFactory;

/// Selects the canceller configuration for a controller instantiation.
///
/// Decision order:
/// 1. an explicit configuration in the shared holder wins for any channel
///    count — a caller-set config is never replaced by a multichannel
///    default;
/// 2. otherwise, more than one render or capture channel selects the
///    multichannel-tuned baseline;
/// 3. otherwise the single-channel baseline.
#[derive(Debug)]
pub(crate) struct AecConfigSelector {
    holder: SharedAecConfig,
}

impl AecConfigSelector {
    pub(crate) fn new(holder: SharedAecConfig) -> Self {
        Self { holder }
    }
}

impl EchoControlFactory for AecConfigSelector {
    fn create(
        &self,
        num_render_channels: usize,
        num_capture_channels: usize,
    ) -> EchoCancellerConfig {
        if let Some(config) = self.holder.get() {
            return config;
        }
        if num_render_channels > 1 || num_capture_channels > 1 {
            EchoCancellerConfig::multichannel()
        } else {
            EchoCancellerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_channels_select_the_default_baseline() {
        let selector = AecConfigSelector::new(SharedAecConfig::new());
        assert_eq!(selector.create(1, 1), EchoCancellerConfig::default());
    }

    #[test]
    fn any_multichannel_side_selects_the_multichannel_baseline() {
        let selector = AecConfigSelector::new(SharedAecConfig::new());
        for &(render, capture) in &[(2, 1), (1, 2), (2, 2), (8, 1), (1, 8)] {
            assert_eq!(
                selector.create(render, capture),
                EchoCancellerConfig::multichannel(),
                "render={render}, capture={capture}"
            );
        }
    }

    #[test]
    fn explicit_config_wins_for_any_channel_count() {
        let holder = SharedAecConfig::new();
        let mut explicit = EchoCancellerConfig::default();
        explicit.delay.default_delay += 1;
        holder.set(Some(explicit));

        let selector = AecConfigSelector::new(holder);
        for &(render, capture) in &[(1, 1), (2, 1), (1, 2), (8, 8)] {
            assert_eq!(
                selector.create(render, capture),
                explicit,
                "render={render}, capture={capture}"
            );
        }
    }

    #[test]
    fn clearing_the_holder_restores_channel_based_selection() {
        let holder = SharedAecConfig::new();
        holder.set(Some(EchoCancellerConfig::default()));

        let selector = AecConfigSelector::new(holder.clone());
        holder.set(None);
        assert_eq!(selector.create(2, 2), EchoCancellerConfig::multichannel());
    }
}
