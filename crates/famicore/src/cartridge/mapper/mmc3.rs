//! MMC3 (mapper 4): fine-grained PRG/CHR banking plus a scanline IRQ counter
//! clocked by filtered rises of PPU address line A12.
//!
//! | Area | Address range | Behaviour                                      |
//! |------|---------------|------------------------------------------------|
//! | CPU  | `$6000-$7FFF` | Work RAM with enable/write-protect (`$A001`)   |
//! | CPU  | `$8000-$9FFF` | Bank select (even) / bank data (odd)           |
//! | CPU  | `$A000-$BFFF` | Mirroring (even) / RAM protect (odd)           |
//! | CPU  | `$C000-$DFFF` | IRQ latch (even) / IRQ reload strobe (odd)     |
//! | CPU  | `$E000-$FFFF` | IRQ disable+ack (even) / IRQ enable (odd)      |
//! | PPU  | `$0000-$1FFF` | 2x2 KiB + 4x1 KiB CHR banks, layout flippable  |
//!
//! Reference: <https://www.nesdev.org/wiki/MMC3>

use crate::{
    cartridge::{
        header::{Header, Mirroring},
        mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
    },
    state::Cursor,
};

/// Minimum PPU dots between two accepted A12 rises (~10 CPU cycles). Rises
/// spaced closer, like the back-to-back sprite pattern fetches inside one
/// scanline, must not clock the counter twice.
const A12_FILTER_DOTS: u32 = 30;

#[derive(Debug, Clone)]
pub(super) struct Mmc3 {
    base_mirroring: Mirroring,

    /// Bank data targets: 0-1 are 2 KiB CHR pairs, 2-5 are 1 KiB CHR banks,
    /// 6-7 are 8 KiB PRG banks.
    registers: [u8; 8],
    /// Target index selected by `$8000` bits 0-2.
    register_target: u8,
    /// `$8000` bit 6: swap the switchable PRG window to `$C000`.
    mode_prg: bool,
    /// `$8000` bit 7: swap the 2 KiB CHR pairs to `$1000`.
    mode_chr: bool,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,

    /// PPU dots elapsed since the previous observed A12 rise.
    dots_since_rise: u32,
    last_a12_high: bool,
}

impl Mmc3 {
    pub(super) fn attach(core: &mut MapperCore, header: &Header) -> Self {
        let mut board = Self {
            base_mirroring: header.mirroring,
            registers: [0; 8],
            register_target: 0,
            mode_prg: false,
            mode_chr: false,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
            dots_since_rise: A12_FILTER_DOTS,
            last_a12_high: false,
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&mut self, core: &mut MapperCore) {
        self.registers = [0; 8];
        self.register_target = 0;
        self.mode_prg = false;
        self.mode_chr = false;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_pending = false;
        self.dots_since_rise = A12_FILTER_DOTS;
        self.last_a12_high = false;

        core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        core.set_mirroring_mode(self.base_mirroring);
        self.update_banks(core);
    }

    pub(super) fn tick(&mut self) {
        self.dots_since_rise = self.dots_since_rise.saturating_add(1);
    }

    /// Watches the PPU address bus for rising edges of A12, debounced by
    /// [`A12_FILTER_DOTS`]. Every accepted rise clocks the IRQ counter.
    pub(super) fn observe_a12(&mut self, addr: u16) {
        let high = addr & 0x1000 != 0;
        if high && !self.last_a12_high {
            if self.dots_since_rise >= A12_FILTER_DOTS {
                self.clock_irq_counter();
            }
            self.dots_since_rise = 0;
        }
        self.last_a12_high = high;
    }

    fn clock_irq_counter(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    pub(super) fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8) {
        if addr < 0x8000 {
            return;
        }

        match (addr & 0xE000, addr & 1) {
            (0x8000, 0) => {
                self.register_target = value & 0x07;
                self.mode_prg = value & 0x40 != 0;
                self.mode_chr = value & 0x80 != 0;
                self.update_banks(core);
            }
            (0x8000, _) => {
                self.registers[self.register_target as usize] = value;
                self.update_banks(core);
            }
            (0xA000, 0) => {
                core.set_mirroring_mode(if value & 0x01 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                });
            }
            (0xA000, _) => {
                // Bit 7 enables the RAM chip, bit 6 denies writes.
                if value & 0x80 != 0 {
                    core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, value & 0x40 != 0);
                } else {
                    core.unmap_bank_cpu(CPU_RAM_WINDOW, CPU_RAM_PAGES);
                }
            }
            (0xC000, 0) => self.irq_latch = value,
            (0xC000, _) => self.irq_reload = true,
            (0xE000, 0) => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            _ => self.irq_enabled = true,
        }
    }

    fn update_banks(&mut self, core: &mut MapperCore) {
        // PRG: 8 KiB windows. Registers 6/7 drive the switchable slots; the
        // other two are pinned to the last and second-to-last banks.
        let last = core.prg_pages().saturating_sub(0x8);
        let second_last = core.prg_pages().saturating_sub(0x10);
        let bank6 = (self.registers[6] as usize) << 3;
        let bank7 = (self.registers[7] as usize) << 3;

        if self.mode_prg {
            core.map_bank_prg(PRG_WINDOW, 0x8, second_last);
            core.map_bank_prg(PRG_WINDOW + 0x8, 0x8, bank7);
            core.map_bank_prg(PRG_WINDOW + 0x10, 0x8, bank6);
        } else {
            core.map_bank_prg(PRG_WINDOW, 0x8, bank6);
            core.map_bank_prg(PRG_WINDOW + 0x8, 0x8, bank7);
            core.map_bank_prg(PRG_WINDOW + 0x10, 0x8, second_last);
        }
        core.map_bank_prg(PRG_WINDOW + 0x18, 0x8, last);

        // CHR: two 2 KiB pairs plus four 1 KiB banks; bit 7 of the bank
        // select register flips which half of the pattern table holds which.
        let pair0 = (self.registers[0] & !1) as usize;
        let pair1 = (self.registers[1] & !1) as usize;
        let singles = [
            self.registers[2] as usize,
            self.registers[3] as usize,
            self.registers[4] as usize,
            self.registers[5] as usize,
        ];

        if self.mode_chr {
            for (slot, bank) in singles.iter().enumerate() {
                core.map_bank_chr(slot, 1, *bank);
            }
            core.map_bank_chr(0x4, 2, pair0);
            core.map_bank_chr(0x6, 2, pair1);
        } else {
            core.map_bank_chr(0x0, 2, pair0);
            core.map_bank_chr(0x2, 2, pair1);
            for (slot, bank) in singles.iter().enumerate() {
                core.map_bank_chr(0x4 + slot, 1, *bank);
            }
        }
    }

    pub(super) fn sync(&mut self, c: &mut Cursor) {
        for reg in self.registers.iter_mut() {
            c.u8(reg);
        }
        c.u8(&mut self.register_target);
        c.bool(&mut self.mode_prg);
        c.bool(&mut self.mode_chr);
        c.u8(&mut self.irq_latch);
        c.u8(&mut self.irq_counter);
        c.bool(&mut self.irq_reload);
        c.bool(&mut self.irq_enabled);
        c.bool(&mut self.irq_pending);
        c.u32(&mut self.dots_since_rise);
        c.bool(&mut self.last_a12_high);
    }
}
