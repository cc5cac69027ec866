//! Tracking policies and their configuration.
//!
//! The policy decides which substructures of a container are poisoned during
//! collection. It is a closed set: every mode the collector understands is a
//! [`TrackingPolicy`] variant, and the [`TrackingConfig`] value carries the
//! selected mode alongside the global enable switch and the exempt method name
//! used by [`TrackingPolicy::CodeItemsExceptInsnsNoClinit`].
//!
//! Configuration is always an explicit value passed into the collector. There is
//! no process-global state and no compile-time selection.

use strum::{Display, EnumIter, EnumString};

/// The granularity at which a container's substructures are poisoned.
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumString, Display, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum TrackingPolicy {
    /// One poisoned range covering the entire container
    WholeFile,
    /// One poisoned range per method code item
    CodeItems,
    /// Code items poisoned, each instruction array marked defined again
    CodeItemsExceptInsns,
    /// Like [`TrackingPolicy::CodeItemsExceptInsns`], with the code items of a
    /// configured method name (class initializers by default) left fully accessible
    CodeItemsExceptInsnsNoClinit,
    /// No default ranges; callers compose the collector's pass methods themselves
    Custom,
}

/// Configuration for one or more tracking cycles.
///
/// A disabled configuration turns registration into a silent no-op: nothing is
/// collected, nothing is applied, and no diagnostic event is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    /// Global switch; when `false`, collection enqueues nothing and stays silent
    pub enabled: bool,
    /// The active tracking granularity
    pub policy: TrackingPolicy,
    /// Method name whose code items stay accessible under
    /// [`TrackingPolicy::CodeItemsExceptInsnsNoClinit`]; matched by name only,
    /// so same-named methods of every class are exempted alike
    pub exempt_method: String,
}

/// The method name exempted by default, the class initializer
pub const DEFAULT_EXEMPT_METHOD: &str = "<clinit>";

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: TrackingPolicy::WholeFile,
            exempt_method: DEFAULT_EXEMPT_METHOD.to_string(),
        }
    }
}

impl TrackingConfig {
    /// Creates a configuration with tracking switched off entirely
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a configuration poisoning the whole container as one range
    #[must_use]
    pub fn whole_file() -> Self {
        Self::default()
    }

    /// Creates a configuration poisoning every method code item
    #[must_use]
    pub fn code_items() -> Self {
        Self {
            policy: TrackingPolicy::CodeItems,
            ..Self::default()
        }
    }

    /// Creates a configuration poisoning code items while keeping instruction
    /// arrays accessible
    #[must_use]
    pub fn code_items_except_insns() -> Self {
        Self {
            policy: TrackingPolicy::CodeItemsExceptInsns,
            ..Self::default()
        }
    }

    /// Creates a configuration poisoning code items while keeping instruction
    /// arrays and class-initializer code items accessible
    #[must_use]
    pub fn code_items_except_insns_no_clinit() -> Self {
        Self {
            policy: TrackingPolicy::CodeItemsExceptInsnsNoClinit,
            ..Self::default()
        }
    }

    /// Creates a configuration that enqueues no default ranges, for callers
    /// driving the collector's pass methods directly
    #[must_use]
    pub fn custom() -> Self {
        Self {
            policy: TrackingPolicy::Custom,
            ..Self::default()
        }
    }

    /// Replace the exempt method name used by
    /// [`TrackingPolicy::CodeItemsExceptInsnsNoClinit`]
    #[must_use]
    pub fn with_exempt_method(mut self, name: impl Into<String>) -> Self {
        self.exempt_method = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tracking_config_presets() {
        let default = TrackingConfig::default();
        assert!(default.enabled);
        assert_eq!(default.policy, TrackingPolicy::WholeFile);
        assert_eq!(default.exempt_method, "<clinit>");

        let disabled = TrackingConfig::disabled();
        assert!(!disabled.enabled);

        assert_eq!(TrackingConfig::whole_file(), TrackingConfig::default());
        assert_eq!(
            TrackingConfig::code_items().policy,
            TrackingPolicy::CodeItems
        );
        assert_eq!(
            TrackingConfig::code_items_except_insns().policy,
            TrackingPolicy::CodeItemsExceptInsns
        );
        assert_eq!(
            TrackingConfig::code_items_except_insns_no_clinit().policy,
            TrackingPolicy::CodeItemsExceptInsnsNoClinit
        );
        assert_eq!(TrackingConfig::custom().policy, TrackingPolicy::Custom);
    }

    #[test]
    fn test_with_exempt_method() {
        let config =
            TrackingConfig::code_items_except_insns_no_clinit().with_exempt_method("<init>");
        assert_eq!(config.exempt_method, "<init>");
        assert_eq!(config.policy, TrackingPolicy::CodeItemsExceptInsnsNoClinit);
    }

    #[test]
    fn test_policy_set_is_closed() {
        assert_eq!(TrackingPolicy::iter().count(), 5);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(TrackingPolicy::WholeFile.to_string(), "whole-file");
        assert_eq!(
            TrackingPolicy::CodeItemsExceptInsnsNoClinit.to_string(),
            "code-items-except-insns-no-clinit"
        );

        assert_eq!(
            TrackingPolicy::from_str("code-items").unwrap(),
            TrackingPolicy::CodeItems
        );
        assert!(TrackingPolicy::from_str("everything").is_err());
    }
}
