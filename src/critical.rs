//! Scoped critical section around one DGUS RAM transaction

use core::ops::{Deref, DerefMut};

use log::{trace, warn};

use crate::{
    access_settings::AccessSettings,
    interface::VpInterface,
    register::{self, Register},
    Error,
};

/// Exclusive access to the RAM port with global interrupts disabled
///
/// The address registers, byte enables and the run bit form a single
/// transaction which must not be interleaved with another access.
/// Dropping the guard releases the access request and puts the interrupt
/// enable back to what it was before the guard was taken.
pub(crate) struct AccessGuard<'a, I: VpInterface> {
    interface: &'a mut I,
    restore_enabled: bool,
}

impl<'a, I: VpInterface> AccessGuard<'a, I> {
    pub(crate) fn new(interface: &'a mut I) -> AccessGuard<'a, I> {
        let restore_enabled = interface.disable_interrupts();
        AccessGuard {
            interface,
            restore_enabled,
        }
    }

    /// Program `mode`, start the access and wait for the hardware to clear the run bit
    pub(crate) fn run(
        &mut self,
        mode: u8,
        slot: u32,
        settings: &AccessSettings,
    ) -> Result<(), Error> {
        trace!("slot {:#08x} mode {:#04x}", slot, mode);

        self.interface.write_register(Register::RamMode, mode);
        self.interface
            .write_register(Register::RamMode, mode | register::APP_EN);

        for _ in 0..settings.poll_limit {
            if self.interface.read_register(Register::RamMode) & register::APP_EN == 0 {
                return Ok(());
            }
            self.interface.delay_ns(settings.poll_interval_ns);
        }

        warn!(
            "slot {:#08x} not acknowledged after {} polls",
            slot, settings.poll_limit
        );
        Err(Error::Timeout { slot })
    }
}

impl<I: VpInterface> Deref for AccessGuard<'_, I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.interface
    }
}

impl<I: VpInterface> DerefMut for AccessGuard<'_, I> {
    fn deref_mut(&mut self) -> &mut I {
        self.interface
    }
}

impl<I: VpInterface> Drop for AccessGuard<'_, I> {
    fn drop(&mut self) {
        self.interface.write_register(Register::RamMode, 0x00);
        self.interface.restore_interrupts(self.restore_enabled);
    }
}
