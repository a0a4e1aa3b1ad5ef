use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::DEFAULT_TYPING_INTERVAL_MS;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypingConfig {
    /// When false, bot replies are shown in full at once.
    pub enabled: bool,
    pub interval_ms: u64,
}

impl TypingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_TYPING_INTERVAL_MS,
        }
    }
}
