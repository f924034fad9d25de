//! GxROM (mapper 66): 32 KiB PRG and 8 KiB CHR selected by one register.
//!
//! Reference: <https://www.nesdev.org/wiki/GxROM>

use crate::cartridge::{
    header::{Header, Mirroring},
    mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
};

#[derive(Debug, Clone)]
pub(super) struct GxRom {
    mirroring: Mirroring,
}

impl GxRom {
    pub(super) fn attach(core: &mut MapperCore, header: &Header) -> Self {
        let board = Self {
            mirroring: header.mirroring,
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&self, core: &mut MapperCore) {
        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        core.map_bank_prg(PRG_WINDOW, 0x20, 0);
        core.map_bank_chr(0x0, 0x8, 0);
        core.set_mirroring_mode(self.mirroring);
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8) {
        if addr < 0x8000 {
            return;
        }
        core.map_bank_prg(PRG_WINDOW, 0x20, (((value >> 4) & 0x03) as usize) << 5);
        core.map_bank_chr(0x0, 0x8, ((value & 0x03) as usize) << 3);
    }
}
