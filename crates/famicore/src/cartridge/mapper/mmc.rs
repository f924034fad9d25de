//! MMC2 / MMC4 (mappers 9 and 10): PRG banking plus CHR latches toggled by
//! PPU reads of magic pattern-table addresses.
//!
//! The two chips share everything except the size of the switchable PRG
//! window: 8 KiB on MMC2, 16 KiB on MMC4. Each half of the pattern table has
//! a latch choosing between two CHR banks; the PPU flips the latches simply
//! by fetching tiles `$FD`/`$FE`, which lets games swap graphics mid-frame
//! without CPU involvement.
//!
//! References: <https://www.nesdev.org/wiki/MMC2>,
//! <https://www.nesdev.org/wiki/MMC4>

use crate::{
    cartridge::{
        header::{Header, Mirroring},
        mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
    },
    state::Cursor,
};

/// `BANK_PAGES` is the switchable PRG window size in 1 KiB pages.
#[derive(Debug, Clone)]
pub(super) struct Mmc<const BANK_PAGES: usize> {
    /// CHR latch per pattern-table half; selects between the two bank
    /// registers assigned to that half.
    latches: [bool; 2],
    /// CHR bank registers: `$B000/$C000` feed the left half,
    /// `$D000/$E000` the right half.
    selected: [u8; 4],
}

impl<const BANK_PAGES: usize> Mmc<BANK_PAGES> {
    pub(super) fn attach(core: &mut MapperCore, _header: &Header) -> Self {
        let mut board = Self {
            latches: [false; 2],
            selected: [0; 4],
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&mut self, core: &mut MapperCore) {
        self.latches = [false; 2];
        self.selected = [0; 4];

        core.map_bank_chr(0x0, 0x8, 0);
        core.map_bank_prg(PRG_WINDOW, BANK_PAGES, 0);
        let fixed = core.prg_pages().saturating_sub(0x20 - BANK_PAGES);
        core.map_bank_prg(PRG_WINDOW + BANK_PAGES, 0x20 - BANK_PAGES, fixed);
        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, true);
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8) {
        match addr {
            0xA000..=0xAFFF => {
                core.map_bank_prg(PRG_WINDOW, BANK_PAGES, (value & 0x0F) as usize * BANK_PAGES);
            }
            0xB000..=0xBFFF => {
                self.selected[0] = value & 0x1F;
                self.update_banks(core);
            }
            0xC000..=0xCFFF => {
                self.selected[1] = value & 0x1F;
                self.update_banks(core);
            }
            0xD000..=0xDFFF => {
                self.selected[2] = value & 0x1F;
                self.update_banks(core);
            }
            0xE000..=0xEFFF => {
                self.selected[3] = value & 0x1F;
                self.update_banks(core);
            }
            0xF000..=0xFFFF => {
                core.set_mirroring_mode(if value & 0x01 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                });
            }
            _ => {}
        }
    }

    /// The latch flips *after* the fetch completes, so the magic tile itself
    /// still renders from the previously selected bank.
    pub(super) fn read_ppu(&mut self, core: &mut MapperCore, addr: u16) -> u8 {
        let value = core.read_ppu(addr);

        match addr {
            0x0FD8 => {
                self.latches[0] = true;
                self.update_banks(core);
            }
            0x0FE8 => {
                self.latches[0] = false;
                self.update_banks(core);
            }
            0x1FD8..=0x1FDF => {
                self.latches[1] = true;
                self.update_banks(core);
            }
            0x1FE8..=0x1FEF => {
                self.latches[1] = false;
                self.update_banks(core);
            }
            _ => {}
        }

        value
    }

    fn update_banks(&mut self, core: &mut MapperCore) {
        let left = self.selected[if self.latches[0] { 0 } else { 1 }] as usize;
        core.map_bank_chr(0x0, 0x4, left << 2);
        let right = self.selected[if self.latches[1] { 2 } else { 3 }] as usize;
        core.map_bank_chr(0x4, 0x4, right << 2);
    }

    pub(super) fn sync(&mut self, c: &mut Cursor) {
        for latch in self.latches.iter_mut() {
            c.bool(latch);
        }
        for bank in self.selected.iter_mut() {
            c.u8(bank);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cartridge::mapper::{Mapper, tests::synthetic_image};

    #[test]
    fn mmc2_switches_the_8k_window_only() {
        let image = synthetic_image(9, 8, 2);
        let mut mapper = Mapper::new(&image).expect("mapper builds");

        assert_eq!(mapper.read_cpu(0x8000), Some(0));
        mapper.write_cpu(0xA000, 0x05, 0);
        // 8 KiB bank 5 sits in the middle of 16 KiB bank 2.
        assert_eq!(mapper.read_cpu(0x8000), Some(2));
        // The fixed tail still shows the last three 8 KiB banks.
        assert_eq!(mapper.read_cpu(0xA000), Some(6));
        assert_eq!(mapper.read_cpu(0xE000), Some(7));
    }

    #[test]
    fn mmc4_switches_a_16k_window() {
        let image = synthetic_image(10, 8, 2);
        let mut mapper = Mapper::new(&image).expect("mapper builds");

        mapper.write_cpu(0xA000, 0x03, 0);
        assert_eq!(mapper.read_cpu(0x8000), Some(3));
        assert_eq!(mapper.read_cpu(0xC000), Some(7));
    }

    #[test]
    fn pattern_reads_flip_chr_latches() {
        let image = synthetic_image(9, 8, 4);
        let mut mapper = Mapper::new(&image).expect("mapper builds");

        // Latch 0 low selects register 1, high selects register 0.
        mapper.write_cpu(0xB000, 0x02, 0); // 4 KiB bank 2 -> tag 1
        mapper.write_cpu(0xC000, 0x04, 1); // 4 KiB bank 4 -> tag 2
        assert_eq!(mapper.read_ppu(0x0000), 2);

        mapper.read_ppu(0x0FD8); // flip latch 0 high
        assert_eq!(mapper.read_ppu(0x0000), 1);

        mapper.read_ppu(0x0FE8); // and back
        assert_eq!(mapper.read_ppu(0x0000), 2);
    }

    #[test]
    fn work_ram_is_read_only() {
        let image = synthetic_image(9, 8, 2);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        mapper.write_cpu(0x6000, 0x55, 0);
        assert_eq!(mapper.read_cpu(0x6000), Some(0));
    }
}
