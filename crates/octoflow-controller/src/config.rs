use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the reconciliation controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Fixed delay before a dispatched record is re-checked.
    ///
    /// This is the safety-net poll: it drives retries after failures and
    /// covers notifications that were lost. There is no backoff; the delay
    /// is constant.
    #[serde(default = "default_reschedule_interval")]
    pub reschedule_interval: Duration,
    /// Whether `start()` runs the one-time recovery sweep over all records.
    #[serde(default = "default_sweep_on_start")]
    pub sweep_on_start: bool,
}

fn default_reschedule_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_sweep_on_start() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reschedule_interval: default_reschedule_interval(),
            sweep_on_start: default_sweep_on_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.reschedule_interval, Duration::from_secs(60));
        assert!(config.sweep_on_start);
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let config: ControllerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.reschedule_interval, Duration::from_secs(60));
        assert!(config.sweep_on_start);
    }

    #[test]
    fn test_deserialization_override() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"rescheduleInterval": {"secs": 5, "nanos": 0}}"#).unwrap();
        assert_eq!(config.reschedule_interval, Duration::from_secs(5));
    }
}
