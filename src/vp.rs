//! Fixed VP addresses of the DGUS II system variables
//!
//! Addresses below [`USER_START`] are reserved for system and peripheral
//! variables of the GUI core. The access layer does not check against this
//! map, it is here for callers.

// ---- System variables -------------------------------------------------------------------------

/// System reset (W)
pub const SYS_RESET: u16 = 0x0004;
/// OS update command (W)
pub const OS_UPDATE_CMD: u16 = 0x0006;
/// NOR flash read/write command (W)
pub const NOR_FLASH_RW_CMD: u16 = 0x0008;
/// UART2 configuration, baud rate and CRC (W)
pub const UART2_CONFIG: u16 = 0x000C;
/// GUI and OS version (R)
pub const VERSION_NUMBER: u16 = 0x000F;
/// RTC date and time, 4 words (R/W)
pub const RTC: u16 = 0x0010;
/// Current page id (R)
pub const PIC_NOW: u16 = 0x0014;
/// GUI status (R)
pub const GUI_STATUS: u16 = 0x0015;
/// Touch panel status and coordinates (R/W)
pub const TP_STATUS: u16 = 0x0016;
/// Backlight brightness (R)
pub const LED_NOW: u16 = 0x0031;
/// AD0-AD7 instantaneous values (R)
pub const ADC_INSTANT: u16 = 0x0032;
/// Horizontal resolution (R)
pub const LCD_HOR_RES: u16 = 0x007A;
/// Vertical resolution (R)
pub const LCD_VER_RES: u16 = 0x007B;
/// System config flags (R/W)
pub const SYSTEM_CONFIG: u16 = 0x0080;
/// Backlight standby and brightness config (R/W)
pub const LED_CONFIG: u16 = 0x0082;
/// Page switch (R/W)
pub const PIC_SET: u16 = 0x0084;
/// PWM0 frequency and precision (R/W)
pub const PWM0_SET: u16 = 0x0086;
/// PWM1 frequency and precision (R/W)
pub const PWM1_SET: u16 = 0x0088;
/// PWM0 duty cycle (R/W)
pub const PWM0_OUT: u16 = 0x0092;
/// PWM1 duty cycle (R/W)
pub const PWM1_OUT: u16 = 0x0093;

// ---- Peripheral interfaces --------------------------------------------------------------------

/// FSK bus interface
pub const FSK_INTERFACE_START: u16 = 0x0100;
/// Dynamic curve status feedback
pub const CURVE_STATUS_START: u16 = 0x0300;
/// Dynamic curve read and config
pub const CURVE_CONFIG_START: u16 = 0x0380;
/// Network interface
pub const NETWORK_INTERFACE_START: u16 = 0x0400;

// ---- User variables ---------------------------------------------------------------------------

/// First free VP address
pub const USER_START: u16 = 0x1000;
/// First free VP address when the 8 curve channel buffers (0x1000-0x4FFF) are in use
pub const USER_START_WITH_CURVE: u16 = 0x5000;

/// Part of the VP space an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpRegion {
    /// fixed system and peripheral variables
    System,
    /// dynamic curve channel buffers
    CurveBuffer,
    /// free for the application
    User,
}

impl VpRegion {
    /// classify `addr`, `curves` tells whether dynamic curves are configured
    pub fn of(addr: u16, curves: bool) -> VpRegion {
        if addr < USER_START {
            VpRegion::System
        } else if curves && addr < USER_START_WITH_CURVE {
            VpRegion::CurveBuffer
        } else {
            VpRegion::User
        }
    }
}
