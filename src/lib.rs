//! # Half-duplex SPI transfer engine
//!
//! This crate contains an interrupt-driven, FIFO-buffered transfer
//! engine that moves byte buffers across a synchronous serial bus,
//! in library form. Register-level peripheral access is abstracted
//! behind the traits in [`hal`]; the engine itself lives in
//! [`drivers::spi`] and is fully exercisable on the host against the
//! doubles in `hal::doubles`.
#![cfg_attr(target_arch = "arm", no_std)]

pub mod utilities {
    pub mod completion;
    pub mod guard;
}

pub mod hal;
pub mod drivers;
