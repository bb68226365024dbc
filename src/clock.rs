use std::time;

/// Frame clock measuring the time between consecutive [`delta`] calls.
///
/// [`delta`]: struct.Clock.html#method.delta
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    start: time::Instant,
    last: time::Instant,
}

impl Clock {
    /// Create new clock based on current system time.
    pub fn new() -> Self {
        let now = time::Instant::now();
        Clock { start: now, last: now }
    }

    /// Get period of time since the previous call (or clock creation) in seconds.
    pub fn delta(&mut self) -> f32 {
        let now = time::Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt.as_secs() as f32 + 1e-9 * dt.subsec_nanos() as f32
    }

    /// Get period of time since clock creation in seconds.
    pub fn elapsed(&self) -> f32 {
        let dt = self.start.elapsed();
        dt.as_secs() as f32 + 1e-9 * dt.subsec_nanos() as f32
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new()
    }
}
