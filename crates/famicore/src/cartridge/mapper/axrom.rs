//! AxROM (mapper 7): 32 KiB PRG banking with register-driven one-screen
//! mirroring.
//!
//! Reference: <https://www.nesdev.org/wiki/AxROM>

use crate::cartridge::{
    header::{Header, Mirroring},
    mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
};

#[derive(Debug, Clone)]
pub(super) struct AxRom;

impl AxRom {
    pub(super) fn attach(core: &mut MapperCore, _header: &Header) -> Self {
        let board = Self;
        board.reset(core);
        board
    }

    pub(super) fn reset(&self, core: &mut MapperCore) {
        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        core.map_bank_prg(PRG_WINDOW, 0x20, 0);
        core.map_bank_chr(0x0, 0x8, 0);
        core.set_mirroring_mode(Mirroring::OneScreenLow);
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8) {
        if addr < 0x8000 {
            return;
        }
        core.map_bank_prg(PRG_WINDOW, 0x20, ((value & 0x07) as usize) << 5);
        core.set_mirroring_mode(if value & 0x10 != 0 {
            Mirroring::OneScreenHigh
        } else {
            Mirroring::OneScreenLow
        });
    }
}
