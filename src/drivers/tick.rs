//! Millisecond arithmetic over a free-running counter, for ports whose
//! time source is a raw tick count at a known frequency.

use crate::hal::time::{self, Milliseconds};

/// Opaque wrapper around a tick counter at a certain point in time.
/// Implements [`time::Instant`], so it plugs directly into the
/// transfer engine's timeout bookkeeping.
#[derive(Copy, Clone, Debug)]
pub struct Tick {
    counter: u32,
    frequency: time::Hertz,
}

impl Tick {
    pub fn new(counter: u32, frequency: time::Hertz) -> Self { Self { counter, frequency } }
}

impl time::Instant for Tick {}

/// Tick subtraction to obtain a time period.
impl core::ops::Sub for Tick {
    type Output = Milliseconds;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(self.frequency == rhs.frequency);
        let difference = self.counter.wrapping_sub(rhs.counter);
        Milliseconds(((difference as u64 * 1000u64) / self.frequency.0 as u64) as u32)
    }
}

/// Addition between any Millisecond-convertible type and the current tick.
impl<T: Into<Milliseconds>> core::ops::Add<T> for Tick {
    type Output = Self;

    fn add(self, rhs: T) -> Self {
        Self {
            counter: self
                .counter
                .wrapping_add(((rhs.into().0 as u64 * self.frequency.0 as u64) / 1000u64) as u32),
            frequency: self.frequency,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tick_differences_and_additions() {
        // Given
        let frequency = time::Hertz(2000);
        let ticks_difference = 1000u32;
        let test_tick_early = Tick::new(0, frequency);
        let test_tick_late = Tick::new(ticks_difference, frequency);

        // Then (1000 ticks at 2000 hertz)
        assert_eq!(Milliseconds(500), test_tick_late - test_tick_early);

        // Given
        let test_tick_late = test_tick_late + Milliseconds(300);

        // Then (1000 ticks at 2000 hertz + 300 milliseconds)
        assert_eq!(Milliseconds(800), test_tick_late - test_tick_early);
    }

    #[test]
    fn counter_wraparound_still_yields_a_positive_period() {
        let frequency = time::Hertz(1000);
        let before_wrap = Tick::new(u32::MAX - 499, frequency);
        let after_wrap = before_wrap + Milliseconds(1000);

        assert_eq!(Milliseconds(1000), after_wrap - before_wrap);
    }
}
