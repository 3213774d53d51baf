//! Shared storage for the explicit echo canceller configuration.
//!
//! The holder is reachable from two call paths with different lifetimes: the
//! session (explicit [`set_aec_config()`](crate::Processor::set_aec_config))
//! and the engine-invoked controller factory. It is therefore
//! reference-counted and guards its value with its own lock, independent of
//! the session lock. The factory never calls back into the session, so there
//! is no lock ordering to get wrong.

use std::sync::{Arc, Mutex};

use crate::aec3::EchoCancellerConfig;

/// Reference-counted, lock-protected slot for the explicit canceller config.
///
/// `None` means "no explicit configuration": the factory falls back to the
/// engine-supplied defaults.
#[derive(Debug, Clone, Default)]
pub struct SharedAecConfig {
    inner: Arc<Mutex<Option<EchoCancellerConfig>>>,
}

impl SharedAecConfig {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config` (or clears the slot) and reports whether the stored
    /// value actually changed.
    ///
    /// The comparison is structural over every field; re-applying an
    /// identical configuration returns `false` and leaves the slot
    /// untouched, which is what lets the session skip redundant engine
    /// reinitialization.
    pub fn set(&self, config: Option<EchoCancellerConfig>) -> bool {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if *slot == config {
            return false;
        }
        *slot = config;
        true
    }

    /// Returns a copy of the stored configuration, if any.
    ///
    /// A copy, never a reference: the factory runs on a different call stack
    /// and must not observe a torn or later-mutated value.
    pub fn get(&self) -> Option<EchoCancellerConfig> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert!(SharedAecConfig::new().get().is_none());
    }

    #[test]
    fn set_reports_change() {
        let holder = SharedAecConfig::new();
        assert!(holder.set(Some(EchoCancellerConfig::default())));
        assert!(holder.get().is_some());
    }

    #[test]
    fn identical_set_reports_no_change() {
        let holder = SharedAecConfig::new();
        let config = EchoCancellerConfig::default();
        assert!(holder.set(Some(config)));
        assert!(!holder.set(Some(config)));
    }

    #[test]
    fn clearing_empty_slot_is_no_change() {
        let holder = SharedAecConfig::new();
        assert!(!holder.set(None));
        assert!(holder.set(Some(EchoCancellerConfig::default())));
        assert!(holder.set(None));
        assert!(holder.get().is_none());
    }

    #[test]
    fn modified_config_reports_change() {
        let holder = SharedAecConfig::new();
        let config = EchoCancellerConfig::default();
        holder.set(Some(config));

        let mut changed = config;
        changed.delay.default_delay += 1;
        assert!(holder.set(Some(changed)));
        assert_eq!(holder.get(), Some(changed));
    }

    #[test]
    fn clones_share_the_slot() {
        let holder = SharedAecConfig::new();
        let alias = holder.clone();
        holder.set(Some(EchoCancellerConfig::multichannel()));
        assert_eq!(alias.get(), Some(EchoCancellerConfig::multichannel()));
    }
}
