//! Engine tunables

use std::time::Duration;

/// Engine-wide replay settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySettings {
    /// Used when neither the step nor the flow sets a timeout
    pub default_timeout: Option<Duration>,
    /// Pause after a key down / key up event
    pub key_settle: Duration,
    /// Scroll offset sampling interval while a smooth scroll settles
    pub scroll_poll_interval: Duration,
    /// Interval between element count polls in `waitForElement`
    pub wait_poll_interval: Duration,
    /// Bound the scroll settle poll by the step timeout
    pub bound_scroll_settle: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            default_timeout: None,
            key_settle: Duration::from_millis(100),
            scroll_poll_interval: Duration::from_millis(50),
            wait_poll_interval: Duration::from_millis(100),
            bound_scroll_settle: true,
        }
    }
}

impl ReplaySettings {
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Engine default in milliseconds, for the timeout cascade
    pub fn default_timeout_ms(&self) -> Option<u64> {
        self.default_timeout
            .map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    }
}
