use crate::hal::time::{self, Milliseconds};
use core::sync::atomic::{AtomicU32, Ordering};

/// Ticks per simulated millisecond. Coarse on purpose: a polling loop
/// advances one tick per query, so a simulated timeout of a few
/// milliseconds still allows thousands of loop iterations, which keeps
/// a simulated interrupt thread from being starved of chances to run.
pub const TICKS_PER_MILLISECOND: u32 = 1_000;

/// Simulated system timer. Advances one tick every time it is read,
/// so any loop that polls it makes time pass.
#[derive(Debug, Default)]
pub struct MockSysTick {
    ticks: AtomicU32,
}

impl MockSysTick {
    /// Total simulated time since construction.
    pub fn elapsed(&self) -> Milliseconds {
        Milliseconds(self.ticks.load(Ordering::Relaxed) / TICKS_PER_MILLISECOND)
    }

    /// Jumps the timer forward without a read.
    pub fn advance(&self, time: Milliseconds) {
        self.ticks.fetch_add(time.0.saturating_mul(TICKS_PER_MILLISECOND), Ordering::Relaxed);
    }
}

impl time::Now for MockSysTick {
    type I = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant { ticks: self.ticks.fetch_add(1, Ordering::Relaxed) }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct MockInstant {
    ticks: u32,
}

impl time::Instant for MockInstant {}

impl core::ops::Sub for MockInstant {
    type Output = Milliseconds;

    fn sub(self, rhs: Self) -> Self::Output {
        Milliseconds(self.ticks.wrapping_sub(rhs.ticks) / TICKS_PER_MILLISECOND)
    }
}

/// Addition between any Millisecond-convertible type and the current tick.
impl<T: Into<Milliseconds>> core::ops::Add<T> for MockInstant {
    type Output = Self;

    fn add(self, rhs: T) -> Self {
        Self { ticks: self.ticks.wrapping_add(rhs.into().0.saturating_mul(TICKS_PER_MILLISECOND)) }
    }
}
