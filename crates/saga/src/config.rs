//! Placement configuration loaded from environment variables.

use std::time::Duration;

const DEFAULT_STEP_TIMEOUT_MS: u64 = 5_000;

/// Per-step deadlines for external collaborator calls.
///
/// Reads from environment variables (all in milliseconds, defaulting
/// to 5000):
/// - `PLACEMENT_CUSTOMER_TIMEOUT_MS` — customer directory lookup
/// - `PLACEMENT_RESERVE_TIMEOUT_MS` — stock reservation
/// - `PLACEMENT_PERSIST_TIMEOUT_MS` — order persistence
/// - `PLACEMENT_CHARGE_TIMEOUT_MS` — payment charge
/// - `PLACEMENT_PUBLISH_TIMEOUT_MS` — confirmation publish
///
/// A timeout on any of the first four steps is treated as that step's
/// failure and triggers the same compensation chain.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    pub customer_lookup_timeout: Duration,
    pub reservation_timeout: Duration,
    pub persist_timeout: Duration,
    pub charge_timeout: Duration,
    pub publish_timeout: Duration,
}

impl PlacementConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            customer_lookup_timeout: timeout_from_env("PLACEMENT_CUSTOMER_TIMEOUT_MS"),
            reservation_timeout: timeout_from_env("PLACEMENT_RESERVE_TIMEOUT_MS"),
            persist_timeout: timeout_from_env("PLACEMENT_PERSIST_TIMEOUT_MS"),
            charge_timeout: timeout_from_env("PLACEMENT_CHARGE_TIMEOUT_MS"),
            publish_timeout: timeout_from_env("PLACEMENT_PUBLISH_TIMEOUT_MS"),
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        let step = Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS);
        Self {
            customer_lookup_timeout: step,
            reservation_timeout: step,
            persist_timeout: step,
            charge_timeout: step,
            publish_timeout: step,
        }
    }
}

fn timeout_from_env(var: &str) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|ms| ms.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS))
}
