//! Scriptable double of the [`FifoBus`] trait.
//!
//! Models the peripheral at FIFO granularity: a 16-deep TX FIFO, a
//! 16-deep RX FIFO, and a wire between them. The wire shifts one word
//! whenever [`MockFifoBus::clock_wire`] is called, and also on every
//! `tx_fifo_empty` query, so a task-context loop waiting for the TX
//! side to drain doubles as the passage of bus time.

use crate::hal::{spi::FifoBus, time::Hertz};
use static_assertions::const_assert;
use std::{
    collections::VecDeque,
    sync::Mutex,
    vec::Vec,
};

pub const FIFO_DEPTH: usize = 16;

/// TX level at or below which the transfer interrupt is considered
/// pending, mirroring a hardware low-watermark configuration.
pub const TX_WATERMARK: usize = 2;

const_assert!(TX_WATERMARK < FIFO_DEPTH);

/// What the far end of the wire does with transmitted words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wire {
    /// The peer echoes every word back into the RX FIFO.
    Loopback,
    /// The peer never answers; transmitted words vanish.
    Silent,
}

#[derive(Debug, Default)]
struct Fifos {
    tx: VecDeque<u8>,
    rx: VecDeque<u8>,
    /// Peer words scheduled to arrive, one per transmitted word. Takes
    /// precedence over the wire mode while non-empty.
    peer_script: VecDeque<u8>,
    interrupt_enabled: bool,
    /// Every word ever pushed, caller data and dummy filler alike.
    pushed: Vec<u8>,
    enable_transitions: usize,
    pending_clears: usize,
    acknowledgements: usize,
    clock_frequency: Option<Hertz>,
}

pub struct MockFifoBus {
    wire: Wire,
    inner: Mutex<Fifos>,
}

impl MockFifoBus {
    pub fn new(wire: Wire) -> Self {
        Self { wire, inner: Mutex::new(Fifos::default()) }
    }

    /// Schedules the peer's side of the conversation: the nth scripted
    /// word arrives in the RX FIFO when the nth transmitted word leaves
    /// the TX FIFO.
    pub fn script_peer(&self, data: &[u8]) {
        self.inner.lock().unwrap().peer_script.extend(data.iter().copied());
    }

    /// Shifts one word off the TX FIFO across the wire.
    pub fn clock_wire(&self) {
        self.shift_one(&mut self.inner.lock().unwrap());
    }

    /// Level-triggered interrupt condition: enabled and the TX FIFO
    /// drained to the watermark.
    pub fn interrupt_pending(&self) -> bool {
        let fifos = self.inner.lock().unwrap();
        fifos.interrupt_enabled && fifos.tx.len() <= TX_WATERMARK
    }

    pub fn interrupt_enabled(&self) -> bool { self.inner.lock().unwrap().interrupt_enabled }

    pub fn pushed(&self) -> Vec<u8> { self.inner.lock().unwrap().pushed.clone() }

    pub fn enable_transitions(&self) -> usize { self.inner.lock().unwrap().enable_transitions }

    pub fn pending_clears(&self) -> usize { self.inner.lock().unwrap().pending_clears }

    pub fn acknowledgements(&self) -> usize { self.inner.lock().unwrap().acknowledgements }

    pub fn clock_frequency(&self) -> Option<Hertz> { self.inner.lock().unwrap().clock_frequency }

    pub fn tx_level(&self) -> usize { self.inner.lock().unwrap().tx.len() }

    pub fn rx_level(&self) -> usize { self.inner.lock().unwrap().rx.len() }

    fn shift_one(&self, fifos: &mut Fifos) {
        if let Some(word) = fifos.tx.pop_front() {
            let arriving = match fifos.peer_script.pop_front() {
                Some(scripted) => Some(scripted),
                None => match self.wire {
                    Wire::Loopback => Some(word),
                    Wire::Silent => None,
                },
            };
            if let Some(word) = arriving {
                if fifos.rx.len() < FIFO_DEPTH {
                    fifos.rx.push_back(word);
                }
            }
        }
    }
}

impl FifoBus for MockFifoBus {
    type Error = ();

    fn tx_fifo_full(&self) -> bool { self.inner.lock().unwrap().tx.len() == FIFO_DEPTH }

    fn tx_fifo_empty(&self) -> bool {
        let mut fifos = self.inner.lock().unwrap();
        let empty = fifos.tx.is_empty();
        if !empty {
            // A status poll from a wait loop is the double's notion of
            // time on the wire.
            self.shift_one(&mut fifos);
        }
        empty
    }

    fn rx_fifo_nonempty(&self) -> bool { !self.inner.lock().unwrap().rx.is_empty() }

    fn push(&self, word: u8) -> nb::Result<(), Self::Error> {
        let mut fifos = self.inner.lock().unwrap();
        if fifos.tx.len() == FIFO_DEPTH {
            Err(nb::Error::WouldBlock)
        } else {
            fifos.tx.push_back(word);
            fifos.pushed.push(word);
            Ok(())
        }
    }

    fn pop(&self) -> nb::Result<u8, Self::Error> {
        self.inner.lock().unwrap().rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn enable_transfer_interrupt(&self) {
        let mut fifos = self.inner.lock().unwrap();
        fifos.interrupt_enabled = true;
        fifos.enable_transitions += 1;
    }

    fn disable_transfer_interrupt(&self) { self.inner.lock().unwrap().interrupt_enabled = false; }

    fn clear_pending_interrupt(&self) { self.inner.lock().unwrap().pending_clears += 1; }

    fn acknowledge_interrupt(&self) { self.inner.lock().unwrap().acknowledgements += 1; }

    fn set_clock_frequency(&self, frequency: Hertz) {
        self.inner.lock().unwrap().clock_frequency = Some(frequency);
    }
}
