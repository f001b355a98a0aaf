#![forbid(unsafe_code)]

use chrono::{Local, NaiveDateTime};

/// Format used for record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compact format used for artifact directories and backup file names.
pub const COMPACT_FORMAT: &str = "%Y%m%d_%H%M%S";

pub trait Clock: Send + Sync {
    /// Current wall-clock time in the local timezone.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
