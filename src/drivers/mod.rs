//! Drivers generic over the interfaces in [`crate::hal`]. A port
//! supplies the register-level `FifoBus` and time source
//! implementations and wires its interrupt vector to
//! [`spi::on_transfer_interrupt`].

pub mod chip_select;
pub mod spi;
pub mod tick;
