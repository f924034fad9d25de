//! Headless, deterministic NES core.
//!
//! `famicore` executes unmodified iNES ROM images frame by frame and exposes
//! the rendered RGB frame buffer plus the complete mutable machine state to
//! programmatic consumers (reinforcement-learning agents, automated test
//! harnesses). There is no GUI, no audio output, and no internal threading:
//! given the same ROM, reset sequence, controller bytes, and frame counts,
//! every byte of state is reproduced exactly.
//!
//! ```no_run
//! use famicore::Nes;
//!
//! let mut nes = Nes::open("game.nes").unwrap();
//! nes.controller = famicore::Button::Start.mask();
//! let frame = nes.step(60); // one second of emulated time
//! assert_eq!(frame.len(), famicore::FRAME_SIZE);
//! ```

mod apu;
mod bus;
pub mod cartridge;
mod controller;
mod cpu;
mod error;
mod memory;
mod ppu;
mod state;

use std::path::Path;

use crate::{
    apu::Apu,
    bus::{CpuBus, CpuRam},
    cartridge::{RomImage, mapper::Mapper},
    controller::Controller,
    cpu::Cpu,
    memory::cpu as cpu_mem,
    ppu::Ppu,
    state::Cursor,
};

pub use controller::Button;
pub use error::Error;
pub use ppu::{FRAME_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Builds the borrow-splitting CPU bus over a facade's fields. The CPU is
/// deliberately not part of the bus, so it can be borrowed alongside.
macro_rules! cpu_bus {
    ($nes:ident) => {
        CpuBus {
            ram: &mut $nes.ram,
            ppu: &mut $nes.ppu,
            apu: &mut $nes.apu,
            mapper: &mut $nes.mapper,
            pad: &mut $nes.pad,
            input: $nes.controller,
        }
    };
}

/// The console: CPU, PPU, APU, cartridge, work RAM, and one controller port.
#[derive(Debug)]
pub struct Nes {
    cpu: Cpu,
    ppu: Ppu,
    apu: Apu,
    mapper: Mapper,
    ram: CpuRam,
    pad: Controller,
    /// Live controller input: bits are `A, B, Select, Start, Up, Down,
    /// Left, Right` (LSB first). Latched by game writes to `$4016`.
    pub controller: u8,
    /// Save-state size for this ROM, fixed at load time.
    state_size: usize,
}

impl Nes {
    /// Loads a ROM from disk and powers the console on.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_image(&RomImage::from_file(path)?)
    }

    /// Powers on from an in-memory iNES image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_image(&RomImage::new(bytes)?)
    }

    fn from_image(image: &RomImage) -> Result<Self, Error> {
        let mapper = Mapper::new(image)?;
        let mut nes = Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            mapper,
            ram: [0; cpu_mem::INTERNAL_RAM_SIZE],
            pad: Controller::new(),
            controller: 0,
            state_size: 0,
        };

        {
            let mut bus = cpu_bus!(nes);
            nes.cpu.power_on(&mut bus);
        }

        let mut measure = Cursor::measure();
        nes.sync(&mut measure);
        nes.state_size = measure.position();

        tracing::debug!(
            board = nes.mapper.name(),
            state_size = nes.state_size,
            "cartridge loaded"
        );
        Ok(nes)
    }

    /// Re-initializes CPU/PPU/APU and the cartridge registers to their
    /// post-power-on state while keeping cartridge memory, then reasserts
    /// RESET. Work RAM survives, as it does on the console.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.mapper.reset();
        self.pad.reset();
        let mut bus = cpu_bus!(self);
        self.cpu.reset(&mut bus);
    }

    /// Runs the console for `frames` frame boundaries and returns the frame
    /// buffer: 240x256 RGB, row-major, valid until the next `step`, `load`,
    /// or drop. After a CPU crash stepping is a no-op that returns the last
    /// rendered frame.
    pub fn step(&mut self, frames: u32) -> &[u8] {
        for _ in 0..frames {
            if self.cpu.crashed() {
                break;
            }
            let target = self.ppu.frame_count() + 1;
            while self.ppu.frame_count() < target && !self.cpu.crashed() {
                let mut bus = cpu_bus!(self);
                self.cpu.step(&mut bus);
            }
        }
        self.ppu.frame_buffer()
    }

    /// Reads through the CPU bus decode without advancing the clock.
    ///
    /// Register side effects still happen exactly as if the CPU had issued
    /// the read (`$2002` clears the vblank flag, `$4015` acknowledges the
    /// frame IRQ, and so on).
    pub fn read(&mut self, addr: u16) -> u8 {
        let mut bus = cpu_bus!(self);
        bus.decode_read(&mut self.cpu, addr)
    }

    /// Writes through the CPU bus decode without advancing the clock; side
    /// effects (bank switches, register writes, OAM DMA) apply.
    pub fn write(&mut self, addr: u16, value: u8) {
        let mut bus = cpu_bus!(self);
        bus.decode_write(&mut self.cpu, addr, value);
    }

    /// Borrowed view of the 2 KiB internal work RAM.
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// The most recently completed frame, without stepping.
    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    /// True once a `KIL` opcode latched the crash flag; cleared by `reset`
    /// and `load`.
    pub fn has_crashed(&self) -> bool {
        self.cpu.crashed()
    }

    /// CPU cycles elapsed since power-on.
    pub fn cpu_cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Size in bytes of this ROM's save states.
    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Serializes every mutable byte of machine state.
    pub fn save(&mut self) -> Vec<u8> {
        let mut buffer = vec![0u8; self.state_size];
        let mut cursor = Cursor::write(&mut buffer);
        self.sync(&mut cursor);
        debug_assert_eq!(cursor.position(), self.state_size);
        buffer
    }

    /// Restores machine state from a buffer produced by [`Nes::save`] on a
    /// handle opened from the same ROM. A buffer of the wrong length is
    /// rejected without touching any state. Loading clears the crash flag.
    pub fn load(&mut self, buffer: &[u8]) -> Result<(), Error> {
        if buffer.len() != self.state_size {
            return Err(Error::InvalidSaveState {
                expected: self.state_size,
                actual: buffer.len(),
            });
        }
        let mut cursor = Cursor::read(buffer);
        self.sync(&mut cursor);
        self.cpu.clear_crash();
        Ok(())
    }

    /// The save-state walk. The call order here *is* the on-disk format and
    /// must stay stable.
    fn sync(&mut self, c: &mut Cursor) {
        self.cpu.sync(c);
        c.bytes(&mut self.ram);
        self.ppu.sync(c);
        self.apu.sync(c);
        self.mapper.sync(c);
    }
}

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing_subscriber::FmtSubscriber;

    use super::*;
    use crate::cartridge::mapper::tests::synthetic_rom;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn console() -> Nes {
        Nes::from_bytes(&synthetic_rom(0, 1, 1)).expect("console powers on")
    }

    #[test]
    fn ram_mirrors_repeat_every_2k() {
        let mut nes = console();
        nes.write(0x0005, 0xAA);
        assert_eq!(nes.read(0x0805), 0xAA);
        assert_eq!(nes.read(0x1805), 0xAA);
        assert_eq!(nes.ram()[0x0005], 0xAA);
    }

    #[test]
    fn state_size_is_stable_across_saves() {
        let mut nes = console();
        let first = nes.save();
        let second = nes.save();
        assert_eq!(first.len(), nes.state_size());
        assert_eq!(first, second);
    }

    #[test]
    fn load_rejects_wrong_length() {
        let mut nes = console();
        let err = nes.load(&[0u8; 3]).expect_err("must reject");
        assert!(matches!(err, Error::InvalidSaveState { actual: 3, .. }));
    }

    #[test]
    fn frame_buffer_has_expected_dimensions() {
        let nes = console();
        assert_eq!(nes.frame_buffer().len(), FRAME_SIZE);
        assert_eq!(FRAME_SIZE, 240 * 256 * 3);
    }
}
