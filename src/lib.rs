#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! DGUS variable pointer (VP) access for the OS core of the DWIN T5L display controller
//! The implementation is based on the T5L ASIC development guide, chapter DGUS RAM access:
//! VP words are stored pairwise in 32 bit RAM slots which are accessed through
//! a set of special function registers with a hardware handshake.

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod access_settings;
mod critical;
pub mod interface;
pub mod register;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod transfer;
pub mod vp;

use log::debug;

use crate::access_settings::AccessSettings;
use crate::critical::AccessGuard;
use crate::interface::VpInterface;
use crate::register::DATA_LANES;
use crate::transfer::{Step, TransferPlan};

/// Access Error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// the transfer runs past the end of the VP space
    OutOfRange {
        /// first VP address of the transfer
        addr: u16,
        /// length of the transfer in bytes
        len: u16,
    },
    /// more bytes requested than one call can move
    TransferTooLong(usize),
    /// the hardware did not finish a slot access in time
    Timeout {
        /// slot address of the pending access
        slot: u32,
    },
}

/// DGUS VP access driver
/// Owns the RAM port, so every access goes through `write` or `read`
pub struct DgusVp<I> {
    interface: I,
    settings: AccessSettings,
}

impl<I> DgusVp<I>
where
    I: VpInterface,
{
    /// Creates a new driver with default handshake settings
    pub fn new(interface: I) -> DgusVp<I> {
        Self::with_settings(interface, AccessSettings::default())
    }

    /// Creates a new driver with the given handshake settings
    pub fn with_settings(interface: I, settings: AccessSettings) -> DgusVp<I> {
        DgusVp {
            interface,
            settings,
        }
    }

    /// Handshake settings in use
    pub fn settings(&self) -> AccessSettings {
        self.settings
    }

    /// Read only view of the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Consumes the driver and returns the interface
    pub fn release(self) -> I {
        self.interface
    }

    // byte access ------------------------------------------------------------------------------------------------

    /// Writes `data` to consecutive VP words starting at `addr`
    /// The first byte of every pair is the high byte of the word. An odd length leaves
    /// the low byte of the last word untouched.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Error> {
        self.write_from(addr, data.len(), data.iter().copied())
    }

    /// Reads consecutive VP words starting at `addr` into `out`, high byte first
    pub fn read(&mut self, addr: u16, out: &mut [u8]) -> Result<(), Error> {
        self.read_into(addr, out.len(), |index, byte| out[index] = byte)
    }

    // word access ------------------------------------------------------------------------------------------------

    /// Writes a single VP word
    pub fn write_u16(&mut self, addr: u16, value: u16) -> Result<(), Error> {
        self.write(addr, &value.to_be_bytes())
    }

    /// Reads a single VP word
    pub fn read_u16(&mut self, addr: u16) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.read(addr, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Writes a 32 bit value to two VP words, high word at `addr`
    pub fn write_u32(&mut self, addr: u16, value: u32) -> Result<(), Error> {
        self.write(addr, &value.to_be_bytes())
    }

    /// Reads a 32 bit value from two VP words, high word at `addr`
    pub fn read_u32(&mut self, addr: u16) -> Result<u32, Error> {
        let mut buf = [0u8; 4];
        self.read(addr, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Writes a buffer of u16 values to consecutive VP words in one transfer
    pub fn write_words(&mut self, addr: u16, words: &[u16]) -> Result<(), Error> {
        let bytes = words.iter().flat_map(|word| word.to_be_bytes());
        self.write_from(addr, words.len() * 2, bytes)
    }

    /// Reads consecutive VP words into a buffer of u16 values in one transfer
    pub fn read_words(&mut self, addr: u16, words: &mut [u16]) -> Result<(), Error> {
        self.read_into(addr, words.len() * 2, |index, byte| {
            let word = &mut words[index / 2];
            *word = if index % 2 == 0 {
                (*word & 0x00FF) | ((byte as u16) << 8)
            } else {
                (*word & 0xFF00) | byte as u16
            };
        })
    }

    // transfers ------------------------------------------------------------------------------------------------

    fn write_from(
        &mut self,
        addr: u16,
        len: usize,
        mut bytes: impl Iterator<Item = u8>,
    ) -> Result<(), Error> {
        transfer::check_range(addr, len)?;
        if len == 0 {
            return Ok(());
        }
        debug!("write {} bytes to VP {:#06x}", len, addr);

        let settings = self.settings;
        let mut port = AccessGuard::new(&mut self.interface);
        port.set_slot_address(transfer::slot_of(addr));
        port.set_auto_increment(true);

        for access in TransferPlan::new(addr, len) {
            let head = matches!(access.step, Step::Head(_));
            if head {
                // stay on this slot, the next access starts at its successor
                port.set_auto_increment(false);
            }

            let first = access.step.first_lane();
            let lanes = &DATA_LANES[first..first + access.step.len()];
            for (&lane, byte) in lanes.iter().zip(&mut bytes) {
                port.write_register(lane, byte);
            }
            port.run(
                register::write_mode(access.step.mask()),
                access.slot,
                &settings,
            )?;

            if head {
                port.set_slot_address(access.slot + 1);
                port.set_auto_increment(true);
            }
        }
        Ok(())
    }

    fn read_into(
        &mut self,
        addr: u16,
        len: usize,
        mut sink: impl FnMut(usize, u8),
    ) -> Result<(), Error> {
        transfer::check_range(addr, len)?;
        if len == 0 {
            return Ok(());
        }
        debug!("read {} bytes from VP {:#06x}", len, addr);

        let settings = self.settings;
        let mut port = AccessGuard::new(&mut self.interface);
        port.set_slot_address(transfer::slot_of(addr));
        port.set_auto_increment(true);

        let mut index = 0;
        for access in TransferPlan::new(addr, len) {
            let head = matches!(access.step, Step::Head(_));
            if head {
                port.set_auto_increment(false);
            }

            // a fetch always loads the whole slot, only the wanted lanes are copied out
            port.run(register::READ_MODE, access.slot, &settings)?;
            let first = access.step.first_lane();
            for &lane in &DATA_LANES[first..first + access.step.len()] {
                sink(index, port.read_register(lane));
                index += 1;
            }

            if head {
                port.set_slot_address(access.slot + 1);
                port.set_auto_increment(true);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimulatedPort, Transaction};
    use proptest::prelude::*;

    fn driver() -> DgusVp<SimulatedPort> {
        DgusVp::new(SimulatedPort::new())
    }

    fn store(slot: u32, mask: u8) -> Transaction {
        Transaction {
            slot,
            read: false,
            mask,
        }
    }

    #[test]
    fn word_round_trip() {
        let mut dgus = driver();
        dgus.write(0x2010, &[0x00, 0x0D]).unwrap();

        let mut buf = [0u8; 2];
        dgus.read(0x2010, &mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x0D]);
        assert_eq!(dgus.interface().vp_word(0x2010), 0x000D);
    }

    #[test]
    // a single byte at an odd address only touches the high byte of that word
    fn odd_byte_keeps_sibling() {
        let mut port = SimulatedPort::new();
        port.set_vp_word(0x0010, 0x1234);
        port.set_vp_word(0x0011, 0x5678);
        port.set_vp_word(0x0012, 0x9ABC);
        let mut dgus = DgusVp::new(port);

        dgus.write(0x0011, &[0xAB]).unwrap();

        let mut buf = [0u8; 2];
        let mut buf2 = [0u8; 2];
        dgus.read(0x0010, &mut buf).unwrap();
        dgus.read(0x0012, &mut buf2).unwrap();
        assert_eq!(buf, [0x12, 0x34]);
        assert_eq!(buf2, [0x9A, 0xBC]);
        assert_eq!(dgus.read_u16(0x0011), Ok(0xAB78));
        assert_eq!(dgus.interface().transactions()[0], store(0x0008, 0x02));
    }

    #[test]
    fn even_four_bytes_is_one_transaction() {
        let mut dgus = driver();
        dgus.write(0x0010, &[1, 2, 3, 4]).unwrap();
        assert_eq!(dgus.interface().transactions(), &[store(0x0008, 0x0F)]);
    }

    #[test]
    fn odd_four_bytes_span_two_slots() {
        let mut port = SimulatedPort::new();
        port.set_vp_word(0x0010, 0xFFFF);
        port.set_vp_word(0x0013, 0xFFFF);
        let mut dgus = DgusVp::new(port);

        dgus.write(0x0011, &[1, 2, 3, 4]).unwrap();

        let port = dgus.release();
        assert_eq!(
            port.transactions(),
            &[store(0x0008, 0x03), store(0x0009, 0x0C)]
        );
        assert_eq!(port.vp_word(0x0010), 0xFFFF);
        assert_eq!(port.vp_word(0x0011), 0x0102);
        assert_eq!(port.vp_word(0x0012), 0x0304);
        assert_eq!(port.vp_word(0x0013), 0xFFFF);
    }

    #[test]
    fn empty_transfer_touches_nothing() {
        let mut dgus = driver();
        dgus.write(0x1000, &[]).unwrap();
        dgus.read(0x1001, &mut []).unwrap();

        let port = dgus.release();
        assert_eq!(port.register_writes(), 0);
        assert!(port.transactions().is_empty());
    }

    #[test]
    fn nine_bytes_auto_increment_twice() {
        let mut dgus = driver();
        dgus.write(0x1000, &[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();

        let port = dgus.release();
        assert_eq!(
            port.transactions(),
            &[store(0x0800, 0x0F), store(0x0801, 0x0F), store(0x0802, 0x08)]
        );
        assert_eq!(port.vp_word(0x1004), 0x0900);
    }

    #[test]
    fn odd_read_fetches_full_slots() {
        let mut port = SimulatedPort::new();
        for (i, addr) in (0x2000u16..0x2006).enumerate() {
            port.set_vp_word(addr, 0x1111 * i as u16);
        }
        let mut dgus = DgusVp::new(port);

        let mut buf = [0u8; 7];
        dgus.read(0x2001, &mut buf).unwrap();
        assert_eq!(buf, [0x11, 0x11, 0x22, 0x22, 0x33, 0x33, 0x44]);

        let fetches: Vec<_> = dgus
            .interface()
            .transactions()
            .iter()
            .map(|t| (t.slot, t.read, t.mask))
            .collect();
        assert_eq!(
            fetches,
            vec![
                (0x1000, true, 0x0F),
                (0x1001, true, 0x0F),
                (0x1002, true, 0x0F)
            ]
        );
    }

    #[test]
    fn interrupts_are_off_during_access_and_restored() {
        let mut dgus = driver();
        dgus.write(0x1001, &[1, 2, 3, 4, 5]).unwrap();
        dgus.read_u32(0x1001).unwrap();

        let port = dgus.release();
        assert!(port.interrupts_enabled());
        assert_eq!(port.unguarded_accesses(), 0);
        assert_eq!(port.ram_mode(), 0x00);
    }

    #[test]
    fn disabled_interrupts_stay_disabled() {
        let mut port = SimulatedPort::new();
        port.set_interrupts_enabled(false);
        let mut dgus = DgusVp::new(port);
        dgus.write_u16(0x1000, 1).unwrap();
        assert!(!dgus.interface().interrupts_enabled());
    }

    #[test]
    fn hung_bus_reports_timeout() {
        let mut port = SimulatedPort::new();
        port.set_hung(true);
        let mut dgus = DgusVp::with_settings(port, AccessSettings::with_poll_limit(10));

        assert_eq!(
            dgus.write(0x1001, &[1, 2, 3]),
            Err(Error::Timeout { slot: 0x0800 })
        );
        assert_eq!(dgus.read_u16(0x2000), Err(Error::Timeout { slot: 0x1000 }));

        let port = dgus.release();
        assert!(port.interrupts_enabled());
        assert_eq!(port.ram_mode(), 0x00);
        // no access after the first unacknowledged one
        assert_eq!(port.transactions().len(), 2);
    }

    #[test]
    fn slow_bus_within_limit_succeeds() {
        let mut port = SimulatedPort::new();
        port.set_latency(20);
        let mut dgus = DgusVp::with_settings(port, AccessSettings::with_poll_limit(21));
        dgus.write_u32(0x3000, 0xDEAD_BEEF).unwrap();
        assert_eq!(dgus.read_u32(0x3000), Ok(0xDEAD_BEEF));
    }

    #[test]
    fn out_of_range_programs_nothing() {
        let mut dgus = driver();
        assert_eq!(
            dgus.write(0xFFFF, &[1, 2, 3]),
            Err(Error::OutOfRange {
                addr: 0xFFFF,
                len: 3
            })
        );
        assert_eq!(
            dgus.read_u32(0xFFFF),
            Err(Error::OutOfRange {
                addr: 0xFFFF,
                len: 4
            })
        );
        let big = vec![0u16; 0x8000];
        assert_eq!(
            dgus.write_words(0x0000, &big),
            Err(Error::TransferTooLong(0x1_0000))
        );
        assert_eq!(dgus.interface().register_writes(), 0);
    }

    #[test]
    fn last_word_is_reachable() {
        let mut dgus = driver();
        dgus.write_u16(0xFFFF, 0xCAFE).unwrap();
        assert_eq!(dgus.read_u16(0xFFFF), Ok(0xCAFE));
        assert_eq!(dgus.interface().vp_word(0xFFFE), 0x0000);
    }

    #[test]
    fn words_round_trip() {
        let mut dgus = driver();
        let words = [0x5A01, 0x0001, 0xBEEF];
        dgus.write_words(vp::PIC_SET, &words).unwrap();
        assert_eq!(dgus.interface().vp_word(0x0085), 0x0001);

        let mut back = [0xFFFFu16; 3];
        dgus.read_words(vp::PIC_SET, &mut back).unwrap();
        assert_eq!(back, words);

        let mut odd = [0u16; 2];
        dgus.read_words(vp::PIC_SET + 1, &mut odd).unwrap();
        assert_eq!(odd, [0x0001, 0xBEEF]);
    }

    #[test]
    fn rtc_block_write() {
        let mut dgus = driver();
        let rtc = [0x19, 0x0B, 0x09, 0x02, 0x10, 0x0D, 0x00, 0x00];
        dgus.write(vp::RTC, &rtc).unwrap();

        let port = dgus.release();
        assert_eq!(
            port.transactions(),
            &[store(0x0008, 0x0F), store(0x0009, 0x0F)]
        );
        assert_eq!(port.vp_word(vp::RTC + 2), 0x100D);
    }

    proptest! {
        #[test]
        fn round_trip(addr in 0x1000u16..0x1100, data in prop::collection::vec(any::<u8>(), 0..40)) {
            let mut dgus = driver();
            dgus.write(addr, &data).unwrap();

            let mut back = vec![0u8; data.len()];
            dgus.read(addr, &mut back).unwrap();
            prop_assert_eq!(back, data);
        }

        #[test]
        fn neighbours_untouched(addr in 0x1001u16..0x10F0, len in 0usize..20) {
            let mut port = SimulatedPort::new();
            let before = addr - 1;
            let after = addr + len.div_ceil(2) as u16;
            port.set_vp_word(before, 0xA55A);
            port.set_vp_word(after, 0x5AA5);
            if len % 2 == 1 {
                port.set_vp_word(after - 1, 0x00C3);
            }
            let mut dgus = DgusVp::new(port);

            dgus.write(addr, &vec![0xFFu8; len]).unwrap();

            let port = dgus.release();
            prop_assert_eq!(port.vp_word(before), 0xA55A);
            prop_assert_eq!(port.vp_word(after), 0x5AA5);
            if len % 2 == 1 {
                // odd length only replaces the high byte of the last word
                prop_assert_eq!(port.vp_word(after - 1), 0xFFC3);
            }
        }
    }
}
