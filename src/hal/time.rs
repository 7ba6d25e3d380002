//! Time units.
use core::ops::{Add as Adds, Sub as Subtracts};

/// Abstract point in time. Useful for time periods.
///
/// Any implementer of Instant can be subtracted with
/// itself to obtain a span of milliseconds, and added
/// with milliseconds to obtain another instant.
pub trait Instant
where
    Self: Copy + Clone,
    Self: Subtracts<Output = Milliseconds>,
    Self: Adds<Milliseconds, Output = Self>,
{
}

/// A monotonic time source, polled for timeout bookkeeping.
pub trait Now {
    type I: Instant;
    fn now(&self) -> Self::I;
}

/// Time sources behind shared references are time sources themselves;
/// this allows a single source to be polled from multiple collaborators.
impl<T: Now> Now for &T {
    type I = T::I;
    fn now(&self) -> Self::I { (*self).now() }
}

#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
pub struct Milliseconds(pub u32);

#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
pub struct Seconds(pub u32);

/// Hertz
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
pub struct Hertz(pub u32);

/// KiloHertz
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
pub struct KiloHertz(pub u32);

/// MegaHertz
#[derive(Clone, Copy, Debug, PartialOrd, PartialEq, Eq)]
pub struct MegaHertz(pub u32);

/// Extension trait that adds convenience methods to the `u32` type
pub trait U32Ext {
    /// Wrap in `Hertz`
    fn hz(self) -> Hertz;

    /// Wrap in `KiloHertz`
    fn khz(self) -> KiloHertz;

    /// Wrap in `MegaHertz`
    fn mhz(self) -> MegaHertz;

    /// Wrap in `Seconds`
    fn s(self) -> Seconds;

    /// Wrap in `Milliseconds`
    fn ms(self) -> Milliseconds;
}

impl U32Ext for u32 {
    fn hz(self) -> Hertz { Hertz(self) }

    fn khz(self) -> KiloHertz { KiloHertz(self) }

    fn mhz(self) -> MegaHertz { MegaHertz(self) }

    fn s(self) -> Seconds { Seconds(self) }

    fn ms(self) -> Milliseconds { Milliseconds(self) }
}

impl From<KiloHertz> for Hertz {
    fn from(kilohertz: KiloHertz) -> Self { Hertz(kilohertz.0 * 1_000) }
}

impl From<MegaHertz> for Hertz {
    fn from(megahertz: MegaHertz) -> Self { Hertz(megahertz.0 * 1_000_000) }
}

impl From<MegaHertz> for KiloHertz {
    fn from(megahertz: MegaHertz) -> Self { KiloHertz(megahertz.0 * 1_000) }
}

impl From<Seconds> for Milliseconds {
    fn from(seconds: Seconds) -> Self { Milliseconds(seconds.0 * 1_000) }
}
