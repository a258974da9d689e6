//! T5L special function registers for DGUS RAM access

// ---- T5L DGUS RAM access SFR defines ---------------------------------------------------------

/// Special function registers used by the VP access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Interrupt Enable 0, bit 7 is the global enable (EA)
    Ien0 = 0xA8,
    /// DGUS RAM slot address, bits 23..16
    AdrH = 0xF1,
    /// DGUS RAM slot address, bits 15..8
    AdrM = 0xF2,
    /// DGUS RAM slot address, bits 7..0
    AdrL = 0xF3,
    /// Slot address increment applied after every access
    AdrInc = 0xF4,
    /// Access mode control (request, run, direction, byte enables)
    RamMode = 0xF8,
    /// Slot byte 0 (high byte of the even VP word)
    Data3 = 0xFA,
    /// Slot byte 1 (low byte of the even VP word)
    Data2 = 0xFB,
    /// Slot byte 2 (high byte of the odd VP word)
    Data1 = 0xFC,
    /// Slot byte 3 (low byte of the odd VP word)
    Data0 = 0xFD,
}

impl Register {
    /// SFR address of the register
    pub fn offset(self) -> u8 {
        self as u8
    }
}

/// Data registers in slot byte order, DATA3 first
pub const DATA_LANES: [Register; 4] = [
    Register::Data3,
    Register::Data2,
    Register::Data1,
    Register::Data0,
];

//RAMMODE bits
/// Request access
pub const APP_REQ: u8 = 0x80;
/// Start read/write, cleared by hardware when done
pub const APP_EN: u8 = 0x40;
/// 1=Read, 0=Write
pub const APP_RW: u8 = 0x20;
/// Access granted flag
pub const APP_ACK: u8 = 0x10;
/// DATA3..DATA0 write enables
pub const BYTE_ENABLE_ALL: u8 = 0x0F;

//IEN0 bits
/// Global interrupt enable
pub const EA: u8 = 0x80;

//ADR_INC values
/// Slot address stays put after an access
pub const ADR_INC_OFF: u8 = 0x00;
/// Slot address advances by one after an access
pub const ADR_INC_ONE: u8 = 0x01;

/// RAMMODE value for a write of the enabled bytes
pub const fn write_mode(mask: u8) -> u8 {
    APP_REQ | (mask & BYTE_ENABLE_ALL)
}

/// RAMMODE value for a full slot fetch
pub const READ_MODE: u8 = APP_REQ | APP_RW | BYTE_ENABLE_ALL;
