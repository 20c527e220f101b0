//! Runtime configuration.
//!
//! Starts from `QueueConfig::default()` and applies `QC_*` overrides.
//! Unparseable values are logged and ignored.

use qc_confirmation_queue::QueueConfig;
use std::str::FromStr;
use tracing::{info, warn};

/// Everything the node needs at startup.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub queue: QueueConfig,
    /// Head pointer to seed before accepting submissions (`QC_INITIAL_HEAD`)
    pub initial_head: Option<String>,
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let queue = &mut config.queue;

        if let Some(key) = lookup("QC_QUEUE_KEY") {
            queue.queue_key = key;
        }
        if let Some(key) = lookup("QC_HEAD_KEY") {
            queue.head_key = key;
        }

        override_parsed(&lookup, "QC_MAX_ENQUEUE_ATTEMPTS", &mut queue.max_enqueue_attempts);
        override_parsed(&lookup, "QC_INITIAL_BACKOFF_MS", &mut queue.initial_backoff_ms);
        override_parsed(&lookup, "QC_MAX_BACKOFF_MS", &mut queue.max_backoff_ms);
        override_parsed(
            &lookup,
            "QC_TRIGGER_CHANNEL_CAPACITY",
            &mut queue.trigger_channel_capacity,
        );

        let mut sweep_ms = 0u64;
        override_parsed(&lookup, "QC_SWEEP_INTERVAL_MS", &mut sweep_ms);
        // 0 keeps the sweep disabled
        if sweep_ms > 0 {
            queue.sweep_interval_ms = Some(sweep_ms);
        }

        config.initial_head = lookup("QC_INITIAL_HEAD").filter(|head| !head.is_empty());
        if let Some(head) = &config.initial_head {
            info!(head_block_hash = %head, "Initial head loaded from environment");
        }

        config
    }
}

fn override_parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(key, value = %raw, "Ignoring unparseable configuration value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn load(vars: &[(&str, &str)]) -> RuntimeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = load(&[]);
        assert_eq!(config.queue.queue_key, "CONFIRMATION_BLOCK_QUEUE");
        assert_eq!(config.queue.max_enqueue_attempts, 8);
        assert!(config.queue.sweep_interval().is_none());
        assert!(config.initial_head.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let config = load(&[
            ("QC_QUEUE_KEY", "QUEUE"),
            ("QC_MAX_ENQUEUE_ATTEMPTS", "3"),
            ("QC_SWEEP_INTERVAL_MS", "250"),
            ("QC_INITIAL_HEAD", "H0"),
        ]);
        assert_eq!(config.queue.queue_key, "QUEUE");
        assert_eq!(config.queue.max_enqueue_attempts, 3);
        assert_eq!(config.queue.sweep_interval(), Some(Duration::from_millis(250)));
        assert_eq!(config.initial_head.as_deref(), Some("H0"));
    }

    #[test]
    fn test_unparseable_value_keeps_default() {
        let config = load(&[("QC_MAX_BACKOFF_MS", "soon"), ("QC_SWEEP_INTERVAL_MS", "0")]);
        assert_eq!(config.queue.max_backoff_ms, 200);
        assert!(config.queue.sweep_interval().is_none());
    }
}
