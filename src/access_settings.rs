//! Settings for the DGUS RAM access handshake

/// Polling behaviour while waiting for the hardware to finish a slot access
///
/// The run bit of RAMMODE is cleared by the chip once a triggered access
/// is done. It is polled at most `poll_limit` times with a pause of
/// `poll_interval_ns` between two polls before the access is reported
/// as timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSettings {
    /// maximum number of polls of the run bit per slot access
    pub poll_limit: u32,
    /// pause between two polls in nanoseconds, 0 spins without delay
    pub poll_interval_ns: u32,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            poll_limit: 100_000,
            poll_interval_ns: 100,
        }
    }
}

impl AccessSettings {
    /// settings with the given poll limit and the default interval
    pub fn with_poll_limit(poll_limit: u32) -> Self {
        Self {
            poll_limit,
            ..Default::default()
        }
    }

    /// upper bound of the time spent waiting for one slot access
    pub fn max_wait(&self) -> core::time::Duration {
        core::time::Duration::from_nanos(self.poll_limit as u64 * self.poll_interval_ns as u64)
    }
}
