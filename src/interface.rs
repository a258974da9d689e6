//! Contains the DGUS RAM port interface

use embedded_hal::delay::DelayNs;

use crate::register::{self, Register};

/// Trait to describe the register level access to the DGUS RAM port
/// The port is a set of special function registers of the T5L OS core.
/// Implementations exist for the real SFR window and, behind the `sim` feature,
/// for a simulated chip.
pub trait VpInterface {
    /// write a special function register
    fn write_register(&mut self, reg: Register, value: u8);

    /// read a special function register
    fn read_register(&mut self, reg: Register) -> u8;

    /// disable global interrupts
    /// returns whether they were enabled before
    fn disable_interrupts(&mut self) -> bool;

    /// restore the global interrupt state returned by `disable_interrupts`
    fn restore_interrupts(&mut self, enabled: bool);

    /// wait between two polls of the run bit
    fn delay_ns(&mut self, ns: u32);

    /// program the 24 bit slot address registers
    fn set_slot_address(&mut self, slot: u32) {
        self.write_register(Register::AdrH, (slot >> 16) as u8);
        self.write_register(Register::AdrM, (slot >> 8) as u8);
        self.write_register(Register::AdrL, slot as u8);
    }

    /// switch the slot address auto increment on or off
    fn set_auto_increment(&mut self, enabled: bool) {
        let step = if enabled {
            register::ADR_INC_ONE
        } else {
            register::ADR_INC_OFF
        };
        self.write_register(Register::AdrInc, step);
    }
}

/// Implements the interface for the memory mapped SFR window of the OS core
/// Uses a embedded_hal delay driver between handshake polls
pub struct SfrInterface<DELAY> {
    base: *mut u8,
    delay: DELAY,
}

impl<DELAY> SfrInterface<DELAY>
where
    DELAY: DelayNs,
{
    /// Create a new interface on the SFR window starting at `base`
    /// Register `reg` is accessed at `base + reg.offset()`.
    ///
    /// # Safety
    /// `base` must be valid for volatile reads and writes of all offsets in
    /// [`Register`] for as long as the interface lives, and no other code may
    /// access the RAM port registers meanwhile.
    pub unsafe fn new(base: *mut u8, delay: DELAY) -> SfrInterface<DELAY> {
        SfrInterface { base, delay }
    }

    /// Give back the delay driver
    pub fn release(self) -> DELAY {
        self.delay
    }

    fn register_ptr(&self, reg: Register) -> *mut u8 {
        // SAFETY: `new` requires every register offset to be inside the window
        unsafe { self.base.add(reg.offset() as usize) }
    }
}

impl<DELAY> VpInterface for SfrInterface<DELAY>
where
    DELAY: DelayNs,
{
    fn write_register(&mut self, reg: Register, value: u8) {
        // SAFETY: see `new`
        unsafe { self.register_ptr(reg).write_volatile(value) }
    }

    fn read_register(&mut self, reg: Register) -> u8 {
        // SAFETY: see `new`
        unsafe { self.register_ptr(reg).read_volatile() }
    }

    fn disable_interrupts(&mut self) -> bool {
        let ien0 = self.read_register(Register::Ien0);
        self.write_register(Register::Ien0, ien0 & !register::EA);
        ien0 & register::EA != 0
    }

    fn restore_interrupts(&mut self, enabled: bool) {
        if enabled {
            let ien0 = self.read_register(Register::Ien0);
            self.write_register(Register::Ien0, ien0 | register::EA);
        }
    }

    fn delay_ns(&mut self, ns: u32) {
        if ns > 0 {
            self.delay.delay_ns(ns);
        }
    }
}
