#![allow(dead_code)]

use anyhow::{Context, Result};
use famicore::Nes;

pub const PRG_BANK: usize = 16 * 1024;
pub const CHR_BANK: usize = 8 * 1024;

/// Entry point every synthetic ROM boots from.
pub const ENTRY: u16 = 0x8000;
/// Where `build_rom` places the interrupt handler (PRG offset `$0100`).
pub const HANDLER: u16 = 0x8100;

/// Assembles an iNES image for integration tests.
///
/// `main` is machine code placed at the start of PRG, which every supported
/// board maps to `$8000` at power-on. `irq` (when given) lands at `$8100`
/// and serves both the NMI and IRQ vectors; otherwise the vectors point at a
/// lone `RTI`. Unused PRG is `NOP` padding and the vectors sit at the end of
/// the last bank, which all supported boards keep fixed.
pub fn build_rom(
    mapper: u8,
    prg_banks: u8,
    chr_banks: u8,
    main: &[u8],
    irq: Option<&[u8]>,
) -> Vec<u8> {
    assert!(main.len() <= 0x100, "main program overlaps the handler");

    let mut prg = vec![0xEAu8; prg_banks as usize * PRG_BANK];
    prg[..main.len()].copy_from_slice(main);

    let handler = match irq {
        Some(code) => {
            prg[0x100..0x100 + code.len()].copy_from_slice(code);
            HANDLER
        }
        None => {
            prg[0x180] = 0x40; // RTI
            0x8180
        }
    };

    let len = prg.len();
    prg[len - 6..len - 4].copy_from_slice(&handler.to_le_bytes());
    prg[len - 4..len - 2].copy_from_slice(&ENTRY.to_le_bytes());
    prg[len - 2..].copy_from_slice(&handler.to_le_bytes());

    let flags6 = (mapper & 0x0F) << 4;
    let flags7 = mapper & 0xF0;
    let mut rom = vec![
        b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, flags7, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    rom.extend_from_slice(&prg);
    rom.extend(std::iter::repeat(0u8).take(chr_banks as usize * CHR_BANK));
    rom
}

/// Boots a console from an assembled image.
pub fn boot(rom: &[u8]) -> Result<Nes> {
    Nes::from_bytes(rom).context("powering on synthetic ROM")
}

/// NROM image running `main`, halting via `KIL` being the usual idiom.
pub fn boot_nrom(main: &[u8]) -> Result<Nes> {
    boot(&build_rom(0, 1, 1, main, None))
}
