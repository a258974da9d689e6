//! Simulated T5L RAM port for host side tests
//!
//! Models the SFR window, the DGUS RAM behind it and the access handshake,
//! and records every slot transaction so callers can check what reached
//! the bus.

use alloc::{vec, vec::Vec};

use crate::{
    interface::VpInterface,
    register::{self, Register, DATA_LANES},
    transfer::VP_SPACE_BYTES,
};

/// A slot access as seen by the simulated chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    /// slot address the access hit
    pub slot: u32,
    /// true for a fetch, false for a store
    pub read: bool,
    /// byte enables of the access
    pub mask: u8,
}

/// Simulated DGUS RAM port
pub struct SimulatedPort {
    sfr: [u8; 256],
    ram: Vec<u8>,
    transactions: Vec<Transaction>,
    register_writes: usize,
    unguarded_accesses: usize,
    interrupts_enabled: bool,
    latency: u32,
    pending_polls: u32,
    hung: bool,
    waited_ns: u64,
}

impl Default for SimulatedPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPort {
    /// chip with zeroed VP space, interrupts enabled and an instant bus
    pub fn new() -> SimulatedPort {
        SimulatedPort {
            sfr: [0x00; 256],
            ram: vec![0x00; VP_SPACE_BYTES as usize],
            transactions: Vec::new(),
            register_writes: 0,
            unguarded_accesses: 0,
            interrupts_enabled: true,
            latency: 0,
            pending_polls: 0,
            hung: false,
            waited_ns: 0,
        }
    }

    /// number of polls which still see the run bit set after a trigger
    pub fn set_latency(&mut self, polls: u32) {
        self.latency = polls;
    }

    /// never clear the run bit again
    pub fn set_hung(&mut self, hung: bool) {
        self.hung = hung;
    }

    /// set the global interrupt enable as the code before a call would
    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.interrupts_enabled = enabled;
    }

    /// current global interrupt enable
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// VP word as stored in RAM
    pub fn vp_word(&self, addr: u16) -> u16 {
        let offset = addr as usize * 2;
        u16::from_be_bytes([self.ram[offset], self.ram[offset + 1]])
    }

    /// place a VP word into RAM without going through the registers
    pub fn set_vp_word(&mut self, addr: u16, value: u16) {
        let offset = addr as usize * 2;
        self.ram[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// all slot accesses since creation or the last `clear_log`
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// number of register writes since creation or the last `clear_log`
    pub fn register_writes(&self) -> usize {
        self.register_writes
    }

    /// register accesses done while interrupts were enabled
    pub fn unguarded_accesses(&self) -> usize {
        self.unguarded_accesses
    }

    /// total time spent in poll delays
    pub fn waited_ns(&self) -> u64 {
        self.waited_ns
    }

    /// RAMMODE content, without counting as a bus access
    pub fn ram_mode(&self) -> u8 {
        self.sfr[Register::RamMode.offset() as usize]
    }

    /// forget recorded transactions and counters
    pub fn clear_log(&mut self) {
        self.transactions.clear();
        self.register_writes = 0;
        self.unguarded_accesses = 0;
        self.waited_ns = 0;
    }

    fn slot_address(&self) -> u32 {
        let reg = |r: Register| self.sfr[r.offset() as usize] as u32;
        (reg(Register::AdrH) << 16) | (reg(Register::AdrM) << 8) | reg(Register::AdrL)
    }

    fn set_slot_address_registers(&mut self, slot: u32) {
        self.sfr[Register::AdrH.offset() as usize] = (slot >> 16) as u8;
        self.sfr[Register::AdrM.offset() as usize] = (slot >> 8) as u8;
        self.sfr[Register::AdrL.offset() as usize] = slot as u8;
    }

    fn execute(&mut self, mode: u8) {
        let slot = self.slot_address();
        let read = mode & register::APP_RW != 0;
        let mask = mode & register::BYTE_ENABLE_ALL;
        let base = slot as usize * 4;

        if base + 4 <= self.ram.len() {
            for (lane, reg) in DATA_LANES.iter().enumerate() {
                let data = &mut self.sfr[reg.offset() as usize];
                if read {
                    *data = self.ram[base + lane];
                } else if mask & (0x08 >> lane) != 0 {
                    self.ram[base + lane] = *data;
                }
            }
        }
        self.transactions.push(Transaction { slot, read, mask });

        let step = self.sfr[Register::AdrInc.offset() as usize] as u32;
        self.set_slot_address_registers((slot + step) & 0x00FF_FFFF);
        self.pending_polls = self.latency;
    }

    fn note_access(&mut self) {
        if self.interrupts_enabled {
            self.unguarded_accesses += 1;
        }
    }
}

impl VpInterface for SimulatedPort {
    fn write_register(&mut self, reg: Register, value: u8) {
        self.note_access();
        self.register_writes += 1;

        if reg != Register::RamMode {
            self.sfr[reg.offset() as usize] = value;
            return;
        }

        let mut mode = value;
        if mode & register::APP_REQ != 0 {
            mode |= register::APP_ACK;
        }
        self.sfr[reg.offset() as usize] = mode;

        if mode & register::APP_REQ != 0 && mode & register::APP_EN != 0 {
            self.execute(mode);
        }
    }

    fn read_register(&mut self, reg: Register) -> u8 {
        self.note_access();

        if reg == Register::RamMode {
            let mode = &mut self.sfr[reg.offset() as usize];
            if *mode & register::APP_EN != 0 && !self.hung {
                if self.pending_polls > 0 {
                    self.pending_polls -= 1;
                } else {
                    *mode &= !register::APP_EN;
                }
            }
        }
        self.sfr[reg.offset() as usize]
    }

    fn disable_interrupts(&mut self) -> bool {
        let was_enabled = self.interrupts_enabled;
        self.interrupts_enabled = false;
        was_enabled
    }

    fn restore_interrupts(&mut self, enabled: bool) {
        if enabled {
            self.interrupts_enabled = true;
        }
    }

    fn delay_ns(&mut self, ns: u32) {
        self.waited_ns += ns as u64;
    }
}
