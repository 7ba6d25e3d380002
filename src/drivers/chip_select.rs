//! Chip select line control.
//!
//! External to the transfer engine: the caller frames a device-level
//! transaction by asserting the line around a send/receive pair. The
//! engine itself never touches the line, so multi-device arbitration
//! stays entirely in the caller's hands.

use crate::hal::gpio::OutputPin;

/// Electrical polarity of the select line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Logical low selects the device (the common convention).
    ActiveLow,
    ActiveHigh,
}

/// A single chip select line. Construction leaves the device
/// deselected.
pub struct ChipSelect<PIN: OutputPin> {
    pin: PIN,
    polarity: Polarity,
    asserted: bool,
}

impl<PIN: OutputPin> ChipSelect<PIN> {
    pub fn new(mut pin: PIN, polarity: Polarity) -> Self {
        match polarity {
            Polarity::ActiveLow => pin.set_high(),
            Polarity::ActiveHigh => pin.set_low(),
        }
        Self { pin, polarity, asserted: false }
    }

    /// Selects the device, opening a transaction frame.
    pub fn assert(&mut self) {
        match self.polarity {
            Polarity::ActiveLow => self.pin.set_low(),
            Polarity::ActiveHigh => self.pin.set_high(),
        }
        self.asserted = true;
    }

    /// Deselects the device, closing the transaction frame.
    pub fn deassert(&mut self) {
        match self.polarity {
            Polarity::ActiveLow => self.pin.set_high(),
            Polarity::ActiveHigh => self.pin.set_low(),
        }
        self.asserted = false;
    }

    pub fn is_asserted(&self) -> bool { self.asserted }

    pub fn release(self) -> PIN { self.pin }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::doubles::gpio::MockPin;

    #[test]
    fn construction_deselects_the_device() {
        let active_low = ChipSelect::new(MockPin::default(), Polarity::ActiveLow);
        assert!(!active_low.is_asserted());
        assert!(active_low.release().is_high());

        let active_high = ChipSelect::new(MockPin::default(), Polarity::ActiveHigh);
        assert!(!active_high.is_asserted());
        assert!(active_high.release().is_low());
    }

    #[test]
    fn assertion_respects_polarity() {
        // Given
        let mut chip_select = ChipSelect::new(MockPin::default(), Polarity::ActiveLow);

        // When
        chip_select.assert();

        // Then
        assert!(chip_select.is_asserted());
        let pin = chip_select.release();
        assert!(pin.is_low());
        assert_eq!(vec![true, false], pin.changes);
    }

    #[test]
    fn a_full_transaction_frame_toggles_the_line_twice() {
        let mut chip_select = ChipSelect::new(MockPin::default(), Polarity::ActiveLow);

        chip_select.assert();
        chip_select.deassert();

        assert!(!chip_select.is_asserted());
        assert_eq!(vec![true, false, true], chip_select.release().changes);
    }
}
