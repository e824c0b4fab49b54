use std::time::Duration;

/// Tuning knobs for the attach and scan coordinators.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Registration timeout handed to the platform broker. The broker
    /// enforces it; the coordinator only forwards it.
    pub attach_timeout: Duration,
    /// Buffer size of the broker event channel.
    pub event_buffer: usize,
    /// Buffer size of the emitted scan record channel.
    pub scan_buffer: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            attach_timeout: Duration::from_millis(15_000),
            event_buffer: 8,
            scan_buffer: 32,
        }
    }
}
