use instant::{Duration, Instant};

/// Wall-clock budget polled by time-limited searches.
pub trait Timer {
    fn elapsed_millis(&self) -> u64;

    /// Milliseconds left in the budget. Negative once the budget is overrun.
    fn remaining_time_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy)]
pub struct ElapsedTimer {
    start: Instant,
    max_time: Duration,
}

impl ElapsedTimer {
    pub fn new(max_time: Duration) -> Self {
        Self {
            start: Instant::now(),
            max_time,
        }
    }

    #[inline]
    pub fn with_max_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// A timer that never runs out in practice, for searches bounded by
    /// something other than time.
    pub fn unbounded() -> Self {
        Self::new(Duration::from_secs(u32::MAX as u64))
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn exceeded_max_time(&self) -> bool {
        self.elapsed() > self.max_time
    }
}

impl Timer for ElapsedTimer {
    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn remaining_time_millis(&self) -> i64 {
        let max = i64::try_from(self.max_time.as_millis()).unwrap_or(i64::MAX);
        let elapsed = i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX);
        max.saturating_sub(elapsed)
    }
}
