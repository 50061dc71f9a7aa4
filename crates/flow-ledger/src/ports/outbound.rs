//! Outbound ports (driven side - SPI)

use chrono::Utc;

/// Port: source of block timestamps
pub trait Clock: Send + Sync {
    /// Current time in Unix epoch milliseconds
    fn now_millis(&self) -> u64;
}

/// Wall-clock time via `chrono`
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        now_millis()
    }
}

/// Current Unix epoch milliseconds, clamped at zero
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
