//! Runtime configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::service::ServiceSettings;

/// Every tunable of the running system.
///
/// Values come from the process environment (after loading an optional `.env`
/// file). Missing or unparseable variables keep their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub cache_ttl: Duration,
    pub batch_workers: usize,
    pub batch_timeout: Duration,
    pub background_max_in_flight: usize,
    pub actor_buffer_size: usize,
    pub default_currency: String,
    pub inventory_failure_threshold: u32,
    pub inventory_reset: Duration,
    pub service_call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30 * 60),
            batch_workers: 10,
            batch_timeout: Duration::from_secs(30),
            background_max_in_flight: 1024,
            actor_buffer_size: 32,
            default_currency: "usd".to_string(),
            inventory_failure_threshold: 5,
            inventory_reset: Duration::from_secs(30),
            service_call_timeout: Duration::from_millis(2000),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|raw| raw.trim().parse::<u64>().ok());

        let mut config = Self {
            cache_ttl: parsed("ORDER_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            batch_workers: parse_or(&lookup, "BATCH_WORKERS", defaults.batch_workers),
            batch_timeout: parsed("BATCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.batch_timeout),
            background_max_in_flight: parse_or(
                &lookup,
                "BACKGROUND_MAX_IN_FLIGHT",
                defaults.background_max_in_flight,
            ),
            actor_buffer_size: parse_or(&lookup, "ACTOR_BUFFER_SIZE", defaults.actor_buffer_size),
            default_currency: lookup("DEFAULT_CURRENCY")
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.default_currency),
            inventory_failure_threshold: parse_or(
                &lookup,
                "INVENTORY_FAILURE_THRESHOLD",
                defaults.inventory_failure_threshold,
            ),
            inventory_reset: parsed("INVENTORY_RESET_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.inventory_reset),
            service_call_timeout: parsed("SERVICE_CALL_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.service_call_timeout),
        };
        config.batch_workers = config.batch_workers.max(1);
        config.actor_buffer_size = config.actor_buffer_size.max(1);
        config
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            cache_ttl: self.cache_ttl,
            batch_workers: self.batch_workers,
            batch_timeout: self.batch_timeout,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
