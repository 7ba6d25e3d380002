//! One-shot completion signal between interrupt and task context.

use crate::hal::time::{Milliseconds, Now};
use core::sync::atomic::{AtomicBool, Ordering};

/// Binary, unbuffered rendezvous primitive: given at most once per
/// transfer from interrupt context, taken with a timeout from task
/// context.
///
/// Built on a single atomic flag rather than a blocking lock, as a
/// lock cannot be taken inside an interrupt handler. The release store
/// on give pairs with the acquire swap on take, so any state written
/// by the giver before signalling is visible to the waken waiter.
pub struct Completion {
    signalled: AtomicBool,
}

impl Completion {
    pub const fn new() -> Self { Self { signalled: AtomicBool::new(false) } }

    /// Drops any stale signal left over from a previous rendezvous.
    pub fn clear(&self) { self.signalled.store(false, Ordering::Release); }

    /// Signals the waiting task. Never blocks, so it is safe to call
    /// from interrupt context.
    pub fn give_from_interrupt(&self) { self.signalled.store(true, Ordering::Release); }

    /// Consumes the signal, polling until it arrives or `timeout`
    /// elapses on `systick`. Returns whether the signal was taken.
    pub fn take<TIME: Now>(&self, systick: &TIME, timeout: Milliseconds) -> bool {
        let start = systick.now();
        loop {
            if self.signalled.swap(false, Ordering::AcqRel) {
                return true;
            }
            if systick.now() - start > timeout {
                return false;
            }
            core::hint::spin_loop();
        }
    }
}

impl Default for Completion {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::time::MockSysTick;

    #[test]
    fn signal_given_before_the_wait_is_taken_immediately() {
        // Given
        let completion = Completion::new();
        let systick = MockSysTick::default();

        // When
        completion.give_from_interrupt();

        // Then
        assert!(completion.take(&systick, Milliseconds(1)));
        assert!(systick.elapsed() < Milliseconds(1));
    }

    #[test]
    fn taking_an_absent_signal_waits_out_the_full_timeout() {
        // Given
        let completion = Completion::new();
        let systick = MockSysTick::default();

        // When
        let taken = completion.take(&systick, Milliseconds(5));

        // Then
        assert!(!taken);
        assert!(systick.elapsed() >= Milliseconds(5));
    }

    #[test]
    fn a_take_consumes_the_signal() {
        let completion = Completion::new();
        let systick = MockSysTick::default();

        completion.give_from_interrupt();
        assert!(completion.take(&systick, Milliseconds(1)));
        assert!(!completion.take(&systick, Milliseconds(1)));
    }

    #[test]
    fn clearing_drops_a_stale_signal() {
        let completion = Completion::new();
        let systick = MockSysTick::default();

        completion.give_from_interrupt();
        completion.clear();
        assert!(!completion.take(&systick, Milliseconds(1)));
    }
}
