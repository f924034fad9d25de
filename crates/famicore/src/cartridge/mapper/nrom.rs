//! NROM (mapper 0): no banking at all.
//!
//! PRG appears at `$8000` (16 KiB images mirror into `$C000`), CHR at PPU
//! `$0000`, and 8 KiB of work RAM at `$6000`. Mirroring is hardwired by the
//! header. Reference: <https://www.nesdev.org/wiki/NROM>

use crate::cartridge::{
    header::{Header, Mirroring},
    mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
};

#[derive(Debug, Clone)]
pub(super) struct Nrom {
    mirroring: Mirroring,
}

impl Nrom {
    pub(super) fn attach(core: &mut MapperCore, header: &Header) -> Self {
        let board = Self {
            mirroring: header.mirroring,
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&self, core: &mut MapperCore) {
        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        // NROM-128 images fill the window twice; NROM-256 maps linearly.
        let pages = core.prg_pages().clamp(1, 0x20);
        core.map_bank_prg(PRG_WINDOW, pages, 0);
        core.mirror_cpu_banks(PRG_WINDOW, 0x20, pages);
        core.map_bank_chr(0x0, 0x8, 0);
        core.set_mirroring_mode(self.mirroring);
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::{Mapper, tests::synthetic_image};

    #[test]
    fn mirrors_16k_prg_into_the_upper_window() {
        let image = synthetic_image(0, 1, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        assert_eq!(mapper.read_cpu(0x8000), mapper.read_cpu(0xC000));
    }

    #[test]
    fn maps_32k_prg_linearly() {
        let image = synthetic_image(0, 2, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        assert_eq!(mapper.read_cpu(0x8000), Some(0));
        assert_eq!(mapper.read_cpu(0xC000), Some(1));
    }
}
