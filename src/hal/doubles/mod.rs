//! Hardware doubles for host-side testing. Not compiled for
//! embedded targets.

pub mod gpio;
pub mod spi;
pub mod time;
