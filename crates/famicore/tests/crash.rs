//! `KIL` crash latching and recovery.

mod common;

use anyhow::Result;
use common::boot_nrom;

#[test]
fn kil_latches_the_crash_flag() -> Result<()> {
    let mut nes = boot_nrom(&[0x02])?;
    assert!(!nes.has_crashed());

    nes.step(1);
    assert!(nes.has_crashed());
    Ok(())
}

#[test]
fn stepping_after_a_crash_returns_the_last_frame() -> Result<()> {
    let mut nes = boot_nrom(&[0x02])?;
    nes.step(1);

    let frozen = nes.frame_buffer().to_vec();
    let cycles = nes.cpu_cycles();

    let frame = nes.step(5).to_vec();
    assert_eq!(frame, frozen);
    assert_eq!(nes.cpu_cycles(), cycles);
    assert!(nes.has_crashed());
    Ok(())
}

#[test]
fn reset_clears_the_crash_flag() -> Result<()> {
    let mut nes = boot_nrom(&[0x02])?;
    nes.step(1);
    assert!(nes.has_crashed());

    nes.reset();
    assert!(!nes.has_crashed());
    Ok(())
}

#[test]
fn load_clears_the_crash_flag() -> Result<()> {
    let mut nes = boot_nrom(&[0x02])?;
    let healthy = nes.save();

    nes.step(1);
    assert!(nes.has_crashed());

    nes.load(&healthy)?;
    assert!(!nes.has_crashed());

    // The restored console runs again (and crashes again, it is that ROM).
    nes.step(1);
    assert!(nes.has_crashed());
    Ok(())
}
