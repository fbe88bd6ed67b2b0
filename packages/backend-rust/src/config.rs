use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use utbk_burnout::{BurnoutConfig, ConfigError};

use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub logging: LogConfig,
    pub database_url: String,
    pub burnout: BurnoutConfig,
    /// Why the `BURNOUT_*` overrides were discarded, if they were
    pub rejected_burnout_overrides: Option<String>,
    pub worker: WorkerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = env_parse(&lookup, "PORT").unwrap_or(3000);
        let host = env_parse(&lookup, "HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let database_url = non_empty(&lookup, "DATABASE_URL")
            .unwrap_or_else(|| "sqlite://./data/utbk.db".to_string());

        let (burnout, rejected_burnout_overrides) = match burnout_config_from_lookup(&lookup) {
            Ok(config) => (config, None),
            Err(err) => (BurnoutConfig::default(), Some(err.to_string())),
        };

        Self {
            host,
            port,
            logging: LogConfig::from_lookup(&lookup),
            database_url,
            burnout,
            rejected_burnout_overrides,
            worker: WorkerConfig::from_lookup(&lookup),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Reports the effective settings. Called once tracing is installed,
    /// since the config is read before the subscriber exists.
    pub fn log_summary(&self) {
        tracing::info!(
            addr = %self.bind_addr(),
            database_url = %self.database_url,
            min_answers = self.burnout.min_answers,
            worker_leader = self.worker.leader,
            burnout_batch_enabled = self.worker.burnout_batch_enabled,
            burnout_batch_schedule = %self.worker.burnout_batch_schedule,
            log_filter = %self.logging.filter,
            file_logs = self.logging.file_dir.is_some(),
            "configuration loaded"
        );
        if let Some(err) = &self.rejected_burnout_overrides {
            tracing::warn!(error = %err, "invalid BURNOUT_* overrides, using defaults");
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub leader: bool,
    pub burnout_batch_enabled: bool,
    pub burnout_batch_schedule: String,
}

impl WorkerConfig {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            leader: env_bool(&lookup, "WORKER_LEADER", false),
            burnout_batch_enabled: env_bool(&lookup, "ENABLE_BURNOUT_WORKER", true),
            burnout_batch_schedule: non_empty(&lookup, "BURNOUT_BATCH_SCHEDULE")
                .unwrap_or_else(|| "0 */15 * * * *".to_string()),
        }
    }
}

/// Defaults overridden by `BURNOUT_*` variables. An override set that fails
/// validation is rejected as a whole.
pub fn burnout_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<BurnoutConfig, ConfigError> {
    let mut config = BurnoutConfig::default();

    if let Some(v) = env_parse(&lookup, "BURNOUT_MIN_ANSWERS") {
        config.min_answers = v;
    }

    let weights = &mut config.weights;
    for (key, slot) in [
        ("BURNOUT_WEIGHT_COGNITIVE_LOAD", &mut weights.cognitive_load),
        ("BURNOUT_WEIGHT_DECISION_QUALITY", &mut weights.decision_quality),
        ("BURNOUT_WEIGHT_ENGAGEMENT", &mut weights.engagement),
        ("BURNOUT_WEIGHT_CONSISTENCY", &mut weights.consistency),
    ] {
        if let Some(v) = env_parse(&lookup, key) {
            *slot = v;
        }
    }

    let thresholds = &mut config.thresholds;
    for (key, slot) in [
        ("BURNOUT_THRESHOLD_MILD", &mut thresholds.mild),
        ("BURNOUT_THRESHOLD_MODERATE", &mut thresholds.moderate),
        ("BURNOUT_THRESHOLD_SEVERE", &mut thresholds.severe),
    ] {
        if let Some(v) = env_parse(&lookup, key) {
            *slot = v;
        }
    }

    config.validate()?;
    Ok(config)
}

fn non_empty(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn env_bool(lookup: impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).as_deref().map(str::trim) {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

fn env_parse<T: std::str::FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(vars(&[]));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite://./data/utbk.db");
        assert_eq!(config.logging, LogConfig::default());
        assert_eq!(config.burnout, BurnoutConfig::default());
        assert!(config.rejected_burnout_overrides.is_none());
        assert!(!config.worker.leader);
        assert!(config.worker.burnout_batch_enabled);
        assert_eq!(config.worker.burnout_batch_schedule, "0 */15 * * * *");
    }

    #[test]
    fn valid_overrides_apply() {
        let config = Config::from_lookup(vars(&[
            ("PORT", "8080"),
            ("RUST_LOG", "debug"),
            ("BURNOUT_MIN_ANSWERS", "12"),
            ("BURNOUT_THRESHOLD_SEVERE", "80"),
            ("WORKER_LEADER", "1"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.burnout.min_answers, 12);
        assert_eq!(config.burnout.thresholds.severe, 80.0);
        assert!(config.worker.leader);
    }

    #[test]
    fn invalid_overrides_fall_back_to_defaults() {
        let config = Config::from_lookup(vars(&[
            ("BURNOUT_MIN_ANSWERS", "12"),
            ("BURNOUT_THRESHOLD_MILD", "60"),
        ]));
        assert_eq!(config.burnout, BurnoutConfig::default());
        assert!(config.rejected_burnout_overrides.is_some());
    }
}
