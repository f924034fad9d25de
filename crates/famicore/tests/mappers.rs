//! Board behavior observed through the console: MMC1 register programming
//! and the MMC3 scanline IRQ reaching the CPU.

mod common;

use anyhow::Result;
use common::{boot, build_rom};

/// Image whose PRG banks can be told apart: the first byte of every bank
/// except bank 0 (which holds the idle loop the CPU executes) carries the
/// bank index.
fn tagged_rom(mapper: u8, prg_banks: u8) -> Vec<u8> {
    let mut rom = build_rom(mapper, prg_banks, 1, &[0x4C, 0x00, 0x80], None);
    for bank in 1..prg_banks as usize {
        rom[16 + bank * common::PRG_BANK] = bank as u8;
    }
    rom
}

#[test]
fn mmc1_bit7_write_restores_fixed_last_bank_mode() -> Result<()> {
    let mut nes = boot(&tagged_rom(1, 4))?;

    // Serially program the control register to 32 KiB mode (value 0), then
    // select the 2/3 bank pair.
    for _ in 0..5 {
        nes.write(0x8000, 0x00);
    }
    for i in 0..5 {
        nes.write(0xE000, (0x02 >> i) & 1);
    }
    assert_eq!(nes.read(0xC000), 3);

    for i in 0..5 {
        nes.write(0xE000, 0x00 >> i);
    }
    assert_eq!(nes.read(0xC000), 1);

    // A bit-7 write resets the shift register and forces 16 KiB banking with
    // the last bank fixed at $C000-$FFFF.
    nes.write(0x8000, 0x80);
    assert_eq!(nes.read(0xC000), 3);
    Ok(())
}

/// Enables rendering with the sprite pattern table at `$1000` (so A12 rises
/// every scanline during the sprite fetch window), programs the MMC3 IRQ
/// with a zero reload, and spins. The handler stores a flag and disables
/// further IRQs.
const MMC3_IRQ_MAIN: &[u8] = &[
    0xA9, 0x40, 0x8D, 0x17, 0x40, // LDA #$40; STA $4017 (inhibit frame IRQ)
    0xA9, 0x08, 0x8D, 0x00, 0x20, // LDA #$08; STA $2000
    0xA9, 0x08, 0x8D, 0x01, 0x20, // LDA #$08; STA $2001
    0xA9, 0x00, 0x8D, 0x00, 0xC0, // LDA #$00; STA $C000 (latch = 0)
    0x8D, 0x01, 0xC0, // STA $C001 (reload)
    0x8D, 0x01, 0xE0, // STA $E001 (enable)
    0x58, // CLI
    0x4C, 0x1B, 0x80, // loop: JMP loop
];

const MMC3_IRQ_HANDLER: &[u8] = &[
    0xA9, 0x01, 0x85, 0x00, // LDA #$01; STA $00
    0xA9, 0x00, 0x8D, 0x00, 0xE0, // LDA #$00; STA $E000 (disable + ack)
    0x40, // RTI
];

#[test]
fn mmc3_scanline_irq_reaches_the_cpu_within_a_frame() -> Result<()> {
    let rom = build_rom(4, 2, 1, MMC3_IRQ_MAIN, Some(MMC3_IRQ_HANDLER));
    let mut nes = boot(&rom)?;

    nes.step(2);
    assert_eq!(nes.ram()[0x00], 1);
    Ok(())
}

#[test]
fn mmc3_irq_stays_quiet_when_disabled() -> Result<()> {
    // Same setup but without the $E001 enable write.
    let main: &[u8] = &[
        0xA9, 0x40, 0x8D, 0x17, 0x40, // LDA #$40; STA $4017 (inhibit frame IRQ)
        0xA9, 0x08, 0x8D, 0x00, 0x20, // LDA #$08; STA $2000
        0xA9, 0x08, 0x8D, 0x01, 0x20, // LDA #$08; STA $2001
        0xA9, 0x00, 0x8D, 0x00, 0xC0, // LDA #$00; STA $C000
        0x8D, 0x01, 0xC0, // STA $C001
        0x58, // CLI
        0x4C, 0x18, 0x80, // loop: JMP loop
    ];
    let rom = build_rom(4, 2, 1, main, Some(MMC3_IRQ_HANDLER));
    let mut nes = boot(&rom)?;

    nes.step(3);
    assert_eq!(nes.ram()[0x00], 0);
    Ok(())
}
