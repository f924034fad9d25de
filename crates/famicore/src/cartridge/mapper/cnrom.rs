//! CNROM (mapper 3): fixed PRG, 8 KiB switchable CHR.
//!
//! Reference: <https://www.nesdev.org/wiki/CNROM>

use crate::cartridge::{
    header::{Header, Mirroring},
    mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
};

#[derive(Debug, Clone)]
pub(super) struct CnRom {
    mirroring: Mirroring,
}

impl CnRom {
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
        if addr >= 0x8000 {
            core.map_bank_chr(0x0, 0x8, ((value & 0x03) as usize) << 3);
        }
    }
}
