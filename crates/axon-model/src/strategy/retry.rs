use serde::{Deserialize, Serialize};

/// Bounded retry applied to a node's connection attempts.
///
/// `max_attempts` counts every attempt including the first; the default of
/// two means one retry after the initial failure. `delay_ms` is the fixed
/// pause before each re-attempt — connection failures are usually boot
/// races, so there is no exponential growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryStrategy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay_ms: 5_000,
        }
    }
}
