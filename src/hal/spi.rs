//! Traits for Serial Peripheral Interface implementation.

use crate::hal::time::Hertz;

/// A SPI peripheral staged behind hardware TX and RX FIFOs.
///
/// Implementations model a memory-mapped register block. All methods
/// take `&self` because the same registers are reachable from interrupt
/// context; implementations must be sound under that sharing (register
/// reads and writes are individually atomic on the bus).
pub trait FifoBus {
    type Error;

    /// True when the TX FIFO cannot accept another word.
    fn tx_fifo_full(&self) -> bool;

    /// True once every queued word has left the TX FIFO for the shift
    /// register. Words may still be in flight on the wire.
    fn tx_fifo_empty(&self) -> bool;

    /// True when at least one received word is waiting in the RX FIFO.
    fn rx_fifo_nonempty(&self) -> bool;

    /// Queues a word for transmission. `WouldBlock` when the TX FIFO
    /// is full.
    fn push(&self, word: u8) -> nb::Result<(), Self::Error>;

    /// Takes a received word. `WouldBlock` when the RX FIFO is empty.
    fn pop(&self) -> nb::Result<u8, Self::Error>;

    /// Ungates the TX FIFO low-watermark interrupt. While enabled, the
    /// interrupt fires whenever the TX FIFO drains to its configured
    /// level.
    fn enable_transfer_interrupt(&self);

    /// Gates the TX FIFO low-watermark interrupt.
    fn disable_transfer_interrupt(&self);

    /// Clears the FIFO-level interrupt pending flag.
    fn clear_pending_interrupt(&self);

    /// Acknowledges the interrupt at the controller level, so further
    /// interrupts from this source are not suppressed.
    fn acknowledge_interrupt(&self);

    /// Reconfigures the serial clock rate by rewriting the peripheral's
    /// baud rate divisor.
    fn set_clock_frequency(&self, frequency: Hertz);
}

/// A shared reference to a bus is itself a bus. This is what allows a
/// simulated interrupt context in tests to share the peripheral with
/// the task context, exactly as two register block handles would.
impl<B: FifoBus> FifoBus for &B {
    type Error = B::Error;

    fn tx_fifo_full(&self) -> bool { (*self).tx_fifo_full() }

    fn tx_fifo_empty(&self) -> bool { (*self).tx_fifo_empty() }

    fn rx_fifo_nonempty(&self) -> bool { (*self).rx_fifo_nonempty() }

    fn push(&self, word: u8) -> nb::Result<(), Self::Error> { (*self).push(word) }

    fn pop(&self) -> nb::Result<u8, Self::Error> { (*self).pop() }

    fn enable_transfer_interrupt(&self) { (*self).enable_transfer_interrupt() }

    fn disable_transfer_interrupt(&self) { (*self).disable_transfer_interrupt() }

    fn clear_pending_interrupt(&self) { (*self).clear_pending_interrupt() }

    fn acknowledge_interrupt(&self) { (*self).acknowledge_interrupt() }

    fn set_clock_frequency(&self, frequency: Hertz) { (*self).set_clock_frequency(frequency) }
}
