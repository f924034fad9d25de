//! NMI and APU frame IRQ delivery, observed by handlers that count into RAM.

mod common;

use anyhow::Result;
use common::{boot, build_rom};

#[test]
fn nmi_fires_once_per_frame() -> Result<()> {
    // LDA #$80; STA $2000 (enable NMI); loop: JMP loop
    let main: &[u8] = &[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80];
    // INC $00; RTI
    let handler: &[u8] = &[0xE6, 0x00, 0x40];

    let rom = build_rom(0, 1, 1, main, Some(handler));
    let mut nes = boot(&rom)?;

    nes.step(4);
    let count = nes.ram()[0x00];
    assert!((3..=5).contains(&count), "saw {count} NMIs in 4 frames");
    Ok(())
}

#[test]
fn nmi_stays_quiet_when_disabled() -> Result<()> {
    let main: &[u8] = &[0x4C, 0x00, 0x80];
    let handler: &[u8] = &[0xE6, 0x00, 0x40];

    let rom = build_rom(0, 1, 1, main, Some(handler));
    let mut nes = boot(&rom)?;

    nes.step(4);
    assert_eq!(nes.ram()[0x00], 0);
    Ok(())
}

#[test]
fn apu_frame_irq_reaches_the_cpu() -> Result<()> {
    // LDA #$00; STA $4017 (4-step mode, IRQ allowed); CLI; loop: JMP loop
    let main: &[u8] = &[0xA9, 0x00, 0x8D, 0x17, 0x40, 0x58, 0x4C, 0x06, 0x80];
    // INC $00; LDA $4015 (acknowledge); RTI
    let handler: &[u8] = &[0xE6, 0x00, 0xAD, 0x15, 0x40, 0x40];

    let rom = build_rom(0, 1, 1, main, Some(handler));
    let mut nes = boot(&rom)?;

    nes.step(3);
    let count = nes.ram()[0x00];
    assert!(count >= 1, "frame IRQ never fired");
    Ok(())
}

#[test]
fn irq_is_masked_while_i_is_set() -> Result<()> {
    // Same as above but without CLI: I stays set from reset.
    let main: &[u8] = &[0xA9, 0x00, 0x8D, 0x17, 0x40, 0x4C, 0x05, 0x80];
    let handler: &[u8] = &[0xE6, 0x00, 0xAD, 0x15, 0x40, 0x40];

    let rom = build_rom(0, 1, 1, main, Some(handler));
    let mut nes = boot(&rom)?;

    nes.step(3);
    assert_eq!(nes.ram()[0x00], 0);
    Ok(())
}
