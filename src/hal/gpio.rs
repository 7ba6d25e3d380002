//! # Simple GPIO interface
//!
//! Interface to writable pins, implemented by any GPIO that
//! supports push-pull output. The transfer engine itself never
//! touches a pin; this trait exists for line control collaborators
//! such as chip select.

/// Interface to a writable pin.
pub trait OutputPin {
    fn set_low(&mut self);
    fn set_high(&mut self);
}
