//! UxROM (mapper 2): 16 KiB switchable PRG, fixed last bank.
//!
//! Reference: <https://www.nesdev.org/wiki/UxROM>

use crate::cartridge::{
    header::{Header, Mirroring},
    mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
};

#[derive(Debug, Clone)]
pub(super) struct UxRom {
    mirroring: Mirroring,
}

impl UxRom {
    pub(super) fn attach(core: &mut MapperCore, header: &Header) -> Self {
        let board = Self {
            mirroring: header.mirroring,
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&self, core: &mut MapperCore) {
        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        core.map_bank_prg(PRG_WINDOW, 0x10, 0);
        let last = core.prg_pages().saturating_sub(0x10);
        core.map_bank_prg(PRG_WINDOW + 0x10, 0x10, last);
        core.map_bank_chr(0x0, 0x8, 0);
        core.set_mirroring_mode(self.mirroring);
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8) {
        if addr >= 0x8000 {
            core.map_bank_prg(PRG_WINDOW, 0x10, ((value & 0x0F) as usize) << 4);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::{Mapper, tests::synthetic_image};

    #[test]
    fn switches_low_window_and_keeps_high_window_fixed() {
        let image = synthetic_image(2, 4, 0);
        let mut mapper = Mapper::new(&image).expect("mapper builds");

        assert_eq!(mapper.read_cpu(0x8000), Some(0));
        assert_eq!(mapper.read_cpu(0xC000), Some(3));

        mapper.write_cpu(0x8000, 2, 0);
        assert_eq!(mapper.read_cpu(0x8000), Some(2));
        assert_eq!(mapper.read_cpu(0xC000), Some(3));
    }
}
