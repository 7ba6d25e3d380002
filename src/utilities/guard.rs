//! RAII guard that calls a given function when constructed,
//! and another when it drops out of scope.
//!
//! Used to pair hardware operations that must happen on every return
//! path: interrupt enable/disable around a blocking wait, chip select
//! assertion around a transaction.
//!
//! Example
//! ```
//! # use fifo_spi::hal::gpio::OutputPin;
//! # use fifo_spi::hal::doubles::gpio::MockPin;
//! # use fifo_spi::utilities::guard::Guard;
//! # let mut pin = MockPin::default();
//! {
//!     // The pin is driven high as soon as the guard is constructed,
//!     // and held by the guard (which has exclusive access to it).
//!     let _guard = Guard::new(&mut pin, OutputPin::set_high, OutputPin::set_low);
//! }
//! // The guard has dropped out of scope here, so the pin is low again
//! // regardless of how the scope was left.
//! assert!(pin.is_low());
//! ```

use core::marker::PhantomData;

pub struct Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    item: &'a mut T,
    on_exit: Option<G>,
    _marker: PhantomData<F>,
}

impl<'a, T, F, G> Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    pub fn new(item: &'a mut T, on_entry: F, on_exit: G) -> Self {
        on_entry(item);
        Self { item, on_exit: Some(on_exit), _marker: PhantomData }
    }
}

impl<'a, T, F, G> Drop for Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    fn drop(&mut self) { self.on_exit.take().unwrap()(self.item); }
}
