//! Controller strobe/shift protocol through the `$4016` port.

mod common;

use anyhow::Result;
use common::boot_nrom;
use famicore::Button;

fn read_bits(nes: &mut famicore::Nes, count: usize) -> Vec<u8> {
    (0..count).map(|_| nes.read(0x4016) & 0x01).collect()
}

#[test]
fn strobe_latches_and_shifts_lsb_first() -> Result<()> {
    let mut nes = boot_nrom(&[0x4C, 0x00, 0x80])?;

    nes.controller = 0x01; // A pressed
    nes.write(0x4016, 1);
    nes.write(0x4016, 0);

    assert_eq!(read_bits(&mut nes, 8), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    Ok(())
}

#[test]
fn button_masks_map_to_shift_order() -> Result<()> {
    let mut nes = boot_nrom(&[0x4C, 0x00, 0x80])?;

    nes.controller = Button::Start.mask() | Button::Right.mask();
    nes.write(0x4016, 1);
    nes.write(0x4016, 0);

    assert_eq!(read_bits(&mut nes, 8), vec![0, 0, 0, 1, 0, 0, 0, 1]);
    Ok(())
}

#[test]
fn input_changes_after_latch_are_invisible() -> Result<()> {
    let mut nes = boot_nrom(&[0x4C, 0x00, 0x80])?;

    nes.controller = Button::A.mask();
    nes.write(0x4016, 1);
    nes.write(0x4016, 0);
    nes.controller = 0;

    assert_eq!(read_bits(&mut nes, 1), vec![1]);
    Ok(())
}

#[test]
fn reads_past_eight_bits_return_ones() -> Result<()> {
    let mut nes = boot_nrom(&[0x4C, 0x00, 0x80])?;

    nes.write(0x4016, 1);
    nes.write(0x4016, 0);
    read_bits(&mut nes, 8);

    assert_eq!(read_bits(&mut nes, 2), vec![1, 1]);
    Ok(())
}
