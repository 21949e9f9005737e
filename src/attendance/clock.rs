use chrono::{Local, NaiveDateTime};

/// Source of "now" in the organization's local wall-clock time.
///
/// Scan events may carry their own timestamp; when they don't, the gateway
/// asks the clock. Injected so the engine paths can be driven with fixed
/// times in tests.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub mod fixed {
    use super::*;

    /// Always returns the instant it was built with.
    pub struct FixedClock(pub NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }
}
