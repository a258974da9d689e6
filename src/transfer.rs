//! Address translation between VP words and the 32 bit RAM slots behind them
//!
//! Every slot holds two VP words. The even VP address owns slot bytes 0 and 1
//! (DATA3, DATA2), the odd one owns bytes 2 and 3 (DATA1, DATA0). A transfer
//! starting at an odd address first touches the low half of its slot, then
//! continues slot aligned.

use crate::Error;

/// Size of the VP space in bytes
pub const VP_SPACE_BYTES: u32 = 0x2_0000;

/// Bytes per RAM slot
pub const SLOT_BYTES: usize = 4;

/// Which half of a slot a VP address maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    /// even VP address, DATA3/DATA2
    High,
    /// odd VP address, DATA1/DATA0
    Low,
}

impl Half {
    /// half selected by the parity of the VP address
    pub fn of(addr: u16) -> Half {
        if addr & 0x01 == 0 {
            Half::High
        } else {
            Half::Low
        }
    }
}

/// Hardware slot address of a VP address
pub fn slot_of(addr: u16) -> u32 {
    (addr >> 1) as u32
}

/// Rejects transfers which do not fit the 16 bit VP space
pub fn check_range(addr: u16, len: usize) -> Result<(), Error> {
    if len > u16::MAX as usize {
        return Err(Error::TransferTooLong(len));
    }
    if addr as u32 * 2 + len as u32 > VP_SPACE_BYTES {
        return Err(Error::OutOfRange {
            addr,
            len: len as u16,
        });
    }
    Ok(())
}

/// One slot transaction of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// one or two bytes in the low half of the first slot, taken with auto increment off
    Head(usize),
    /// all four bytes of a slot
    Full,
    /// one to three bytes from the top of the last slot
    Tail(usize),
}

impl Step {
    /// number of buffer bytes moved by this step
    pub fn len(&self) -> usize {
        match *self {
            Step::Head(len) | Step::Tail(len) => len,
            Step::Full => SLOT_BYTES,
        }
    }

    /// index into [`crate::register::DATA_LANES`] of the first byte moved
    pub fn first_lane(&self) -> usize {
        match self {
            Step::Head(_) => 2,
            Step::Full | Step::Tail(_) => 0,
        }
    }

    /// byte enable bits of the lanes this step moves
    pub fn mask(&self) -> u8 {
        let first = self.first_lane();
        (first..first + self.len()).fold(0, |mask, lane| mask | (0x08 >> lane))
    }
}

/// A slot transaction together with the slot it is expected to hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAccess {
    /// hardware slot address
    pub slot: u32,
    /// what is moved
    pub step: Step,
}

/// Splits a transfer into its slot transactions
///
/// The head is emitted only for odd start addresses, the slot address of
/// every following access is exactly one above the previous.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    slot: u32,
    odd: bool,
    remaining: usize,
}

impl TransferPlan {
    /// plan a transfer of `len` bytes starting at VP `addr`
    pub fn new(addr: u16, len: usize) -> TransferPlan {
        TransferPlan {
            slot: slot_of(addr),
            odd: Half::of(addr) == Half::Low,
            remaining: len,
        }
    }
}

impl Iterator for TransferPlan {
    type Item = SlotAccess;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let step = if self.odd {
            self.odd = false;
            Step::Head(self.remaining.min(2))
        } else if self.remaining >= SLOT_BYTES {
            Step::Full
        } else {
            Step::Tail(self.remaining)
        };

        let access = SlotAccess {
            slot: self.slot,
            step,
        };
        self.remaining -= step.len();
        self.slot += 1;
        Some(access)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let head = usize::from(self.odd && self.remaining > 0);
        let rest = self.remaining - self.remaining.min(2) * head;
        let count = head + rest.div_ceil(SLOT_BYTES);
        (count, Some(count))
    }
}

impl ExactSizeIterator for TransferPlan {}
