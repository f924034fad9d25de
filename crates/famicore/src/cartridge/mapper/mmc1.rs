//! MMC1 (mapper 1): serial shift-register programmed banking.
//!
//! CPU writes to `$8000-$FFFF` stream one bit at a time into a 5-bit shift
//! register; the fifth write commits the value to one of four internal
//! registers selected by address bits 13-14. A write with bit 7 set resets
//! the shift register and forces the control register into 16 KiB mode with
//! the last bank fixed. Writes on consecutive CPU cycles are ignored (the
//! hardware debounce that makes RMW instructions program only one bit).
//!
//! Reference: <https://www.nesdev.org/wiki/MMC1>

use crate::{
    cartridge::{
        header::{Header, Mirroring},
        mapper::{CPU_RAM_PAGES, CPU_RAM_WINDOW, MapperCore, PRG_WINDOW},
    },
    state::Cursor,
};

/// Register targets decoded from address bits 13-14.
const REG_CONTROL: usize = 0;
const REG_CHR_0: usize = 1;
const REG_CHR_1: usize = 2;
const REG_PRG: usize = 3;

#[derive(Debug, Clone)]
pub(super) struct Mmc1 {
    /// Control, CHR 0, CHR 1, PRG — all 5-bit.
    registers: [u8; 4],
    shift: u8,
    shift_count: u8,
    /// CPU cycle of the last accepted serial write; `u64::MAX` when idle.
    last_serial_cycle: u64,
}

impl Mmc1 {
    pub(super) fn attach(core: &mut MapperCore, _header: &Header) -> Self {
        let mut board = Self {
            registers: [0x0C, 0, 0, 0],
            shift: 0,
            shift_count: 0,
            last_serial_cycle: u64::MAX,
        };
        board.reset(core);
        board
    }

    pub(super) fn reset(&mut self, core: &mut MapperCore) {
        self.registers = [0x0C, 0, 0, 0];
        self.shift = 0;
        self.shift_count = 0;
        self.last_serial_cycle = u64::MAX;
        core.map_bank_chr(0x0, 0x8, 0);
        self.update_banks(core);
    }

    pub(super) fn write_cpu(&mut self, core: &mut MapperCore, addr: u16, value: u8, cycle: u64) {
        if addr < 0x8000 {
            return;
        }

        if value & 0x80 != 0 {
            self.shift = 0;
            self.shift_count = 0;
            self.registers[REG_CONTROL] |= 0x0C;
            self.last_serial_cycle = u64::MAX;
            self.update_banks(core);
            return;
        }

        // Hardware ignores the second of two writes on consecutive CPU
        // cycles; RMW instructions would otherwise clock the register twice.
        if self.last_serial_cycle != u64::MAX && cycle == self.last_serial_cycle + 1 {
            self.last_serial_cycle = u64::MAX;
            return;
        }
        self.last_serial_cycle = cycle;

        self.shift = (self.shift >> 1) | ((value & 0x01) << 4);
        self.shift_count += 1;

        if self.shift_count == 5 {
            let target = ((addr >> 13) & 0x03) as usize;
            self.registers[target] = self.shift & 0x1F;
            self.shift = 0;
            self.shift_count = 0;
            self.last_serial_cycle = u64::MAX;
            self.update_banks(core);
        }
    }

    fn update_banks(&mut self, core: &mut MapperCore) {
        let control = self.registers[REG_CONTROL];

        core.set_mirroring_mode(match control & 0x03 {
            0 => Mirroring::OneScreenLow,
            1 => Mirroring::OneScreenHigh,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        });

        // CHR: one 8 KiB bank or two independent 4 KiB banks.
        let chr0 = self.registers[REG_CHR_0] as usize;
        let chr1 = self.registers[REG_CHR_1] as usize;
        if control & 0x10 == 0 {
            core.map_bank_chr(0x0, 0x8, (chr0 & !1) << 2);
        } else {
            core.map_bank_chr(0x0, 0x4, chr0 << 2);
            core.map_bank_chr(0x4, 0x4, chr1 << 2);
        }

        // PRG: 32 KiB mode, fixed-first, or fixed-last.
        let prg = (self.registers[REG_PRG] & 0x0F) as usize;
        match (control >> 2) & 0x03 {
            0 | 1 => core.map_bank_prg(PRG_WINDOW, 0x20, (prg & !1) << 4),
            2 => {
                core.map_bank_prg(PRG_WINDOW, 0x10, 0);
                core.map_bank_prg(PRG_WINDOW + 0x10, 0x10, prg << 4);
            }
            _ => {
                core.map_bank_prg(PRG_WINDOW, 0x10, prg << 4);
                let last = core.prg_pages().saturating_sub(0x10);
                core.map_bank_prg(PRG_WINDOW + 0x10, 0x10, last);
            }
        }

        // MMC1B: PRG register bit 4 disables work RAM.
        if self.registers[REG_PRG] & 0x10 == 0 {
            core.map_bank_cpu_ram(CPU_RAM_WINDOW, CPU_RAM_PAGES, 0, false);
        } else {
            core.unmap_bank_cpu(CPU_RAM_WINDOW, CPU_RAM_PAGES);
        }
    }

    pub(super) fn sync(&mut self, c: &mut Cursor) {
        for reg in self.registers.iter_mut() {
            c.u8(reg);
        }
        c.u8(&mut self.shift);
        c.u8(&mut self.shift_count);
        c.u64(&mut self.last_serial_cycle);
    }
}
