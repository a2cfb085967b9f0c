//! Worker pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Worker count used when the configured count is zero.
const DEFAULT_NUM_WORKERS: usize = 2;

/// Per-task timeout used when the configured timeout is zero.
const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(15);

/// Pool-wide timeout used when the configured timeout is zero.
const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single pool run.
///
/// A zero value means "unset": defaults are applied by the pool at entry via
/// [`PoolConfig::normalized`], and the caller's copy is never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of concurrent workers. Zero selects the default of 2.
    pub num_workers: usize,
    /// Timeout for a single worker-function invocation. Zero selects the
    /// default of 15s, capped at the global timeout.
    pub worker_timeout: Duration,
    /// Timeout for the whole batch. Zero selects the default of 30s. A value
    /// below the worker timeout is raised to twice the worker timeout.
    pub global_timeout: Duration,
    /// Cancel the pool on the first worker error or panic; remaining jobs
    /// are reported as skipped.
    pub stop_on_error: bool,
}

impl PoolConfig {
    /// Returns a copy with defaults applied.
    pub fn normalized(&self) -> Self {
        let mut cfg = self.clone();

        if cfg.num_workers == 0 {
            cfg.num_workers = DEFAULT_NUM_WORKERS;
        }

        if cfg.global_timeout.is_zero() {
            cfg.global_timeout = DEFAULT_GLOBAL_TIMEOUT;
        }

        if cfg.worker_timeout.is_zero() {
            cfg.worker_timeout = DEFAULT_WORKER_TIMEOUT.min(cfg.global_timeout);
        }

        // Keep the pool deadline safely above the per-task deadline.
        if cfg.global_timeout < cfg.worker_timeout {
            cfg.global_timeout = cfg.worker_timeout * 2;
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let cfg = PoolConfig::default().normalized();
        assert_eq!(cfg.num_workers, 2);
        assert_eq!(cfg.worker_timeout, Duration::from_secs(15));
        assert_eq!(cfg.global_timeout, Duration::from_secs(30));
        assert!(!cfg.stop_on_error);
    }

    #[test]
    fn test_caller_copy_untouched() {
        let cfg = PoolConfig::default();
        let _ = cfg.normalized();
        assert_eq!(cfg.num_workers, 0);
        assert!(cfg.worker_timeout.is_zero());
    }

    #[test]
    fn test_defaulted_worker_timeout_capped_at_global() {
        let cfg = PoolConfig {
            global_timeout: Duration::from_secs(5),
            ..PoolConfig::default()
        }
        .normalized();
        assert_eq!(cfg.worker_timeout, Duration::from_secs(5));
        assert_eq!(cfg.global_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_global_raised_above_explicit_worker_timeout() {
        let cfg = PoolConfig {
            worker_timeout: Duration::from_secs(60),
            global_timeout: Duration::from_secs(10),
            ..PoolConfig::default()
        }
        .normalized();
        assert_eq!(cfg.worker_timeout, Duration::from_secs(60));
        assert_eq!(cfg.global_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_explicit_values_kept() {
        let cfg = PoolConfig {
            num_workers: 8,
            worker_timeout: Duration::from_secs(3),
            global_timeout: Duration::from_secs(9),
            stop_on_error: true,
        }
        .normalized();
        assert_eq!(cfg.num_workers, 8);
        assert_eq!(cfg.worker_timeout, Duration::from_secs(3));
        assert_eq!(cfg.global_timeout, Duration::from_secs(9));
        assert!(cfg.stop_on_error);
    }

    #[test]
    fn test_config_yaml_parsing() {
        let yaml = r#"
num_workers: 4
worker_timeout:
  secs: 5
  nanos: 0
stop_on_error: true
"#;
        let cfg: PoolConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.num_workers, 4);
        assert_eq!(cfg.worker_timeout, Duration::from_secs(5));
        // Omitted fields stay zero until normalization.
        assert!(cfg.global_timeout.is_zero());
        assert!(cfg.stop_on_error);

        let cfg = cfg.normalized();
        assert_eq!(cfg.global_timeout, Duration::from_secs(30));
    }
}
