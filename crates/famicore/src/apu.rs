//! Audio processing unit, modelled at register level.
//!
//! The CPU observes the APU through `$4015` (channel activity, frame IRQ,
//! DMC IRQ) and through the IRQ line, so the sequencers, counters, and the
//! DMC reader are emulated faithfully. Waveform mixing and sample output are
//! out of scope for a headless core.

mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod sweep;
mod tables;
mod triangle;

use crate::{cartridge::mapper::Mapper, memory::apu as apu_mem, state::Cursor};

use dmc::Dmc;
use frame_counter::FrameCounter;
use noise::Noise;
use pulse::Pulse;
use triangle::Triangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,

    frame: FrameCounter,
    frame_irq: bool,

    /// CPU-rate tick counter; pulse and noise timers run at half rate.
    cycles: u64,
}

impl Apu {
    pub(crate) fn new() -> Self {
        Self {
            pulse1: Pulse::new(true),
            pulse2: Pulse::new(false),
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame: FrameCounter::default(),
            frame_irq: false,
            cycles: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances the APU by one CPU cycle.
    pub(crate) fn tick(&mut self, mapper: &mut Mapper) {
        self.cycles = self.cycles.wrapping_add(1);

        let tick = self.frame.clock();
        if tick.quarter {
            self.clock_quarter();
        }
        if tick.half {
            self.clock_half();
        }
        if tick.frame_irq {
            self.frame_irq = true;
        }

        self.triangle.clock_timer();
        self.dmc.clock_timer(mapper);
        if self.cycles & 1 == 0 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }
    }

    fn clock_quarter(&mut self) {
        self.pulse1.clock_quarter();
        self.pulse2.clock_quarter();
        self.triangle.clock_quarter();
        self.noise.clock_quarter();
    }

    fn clock_half(&mut self) {
        self.pulse1.clock_half();
        self.pulse2.clock_half();
        self.triangle.clock_half();
        self.noise.clock_half();
    }

    /// Level of the APU IRQ line (frame counter OR the DMC).
    pub(crate) fn irq_pending(&self) -> bool {
        self.frame_irq || self.dmc.irq_pending()
    }

    /// `$4015` read: channel-active bits plus IRQ flags. Reading acknowledges
    /// the frame IRQ but not the DMC IRQ.
    pub(crate) fn read_status(&mut self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.active() {
            status |= 0x01;
        }
        if self.pulse2.active() {
            status |= 0x02;
        }
        if self.triangle.active() {
            status |= 0x04;
        }
        if self.noise.active() {
            status |= 0x08;
        }
        if self.dmc.active() {
            status |= 0x10;
        }
        if self.frame_irq {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        self.frame_irq = false;
        status
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8, mapper: &mut Mapper) {
        match addr {
            0x4000..=0x4003 => self.pulse1.write(addr, value),
            0x4004..=0x4007 => self.pulse2.write(addr, value),
            0x4008..=0x400B => self.triangle.write(addr, value),
            0x400C..=0x400F => self.noise.write(addr, value),
            0x4010..=apu_mem::CHANNEL_REGISTER_END => self.dmc.write(addr, value),
            apu_mem::STATUS => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0, mapper);
                self.dmc.clear_irq();
            }
            apu_mem::FRAME_COUNTER => {
                let tick = self.frame.configure(value);
                if tick.quarter {
                    self.clock_quarter();
                }
                if tick.half {
                    self.clock_half();
                }
                if self.frame.irq_inhibited() {
                    self.frame_irq = false;
                }
            }
            _ => {}
        }
    }

    pub(crate) fn sync(&mut self, c: &mut Cursor) {
        self.pulse1.sync(c);
        self.pulse2.sync(c);
        self.triangle.sync(c);
        self.noise.sync(c);
        self.dmc.sync(c);
        self.frame.sync(c);
        c.bool(&mut self.frame_irq);
        c.u64(&mut self.cycles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::{Mapper, tests::synthetic_image};

    fn mapper() -> Mapper {
        Mapper::new(&synthetic_image(0, 1, 1)).expect("mapper builds")
    }

    #[test]
    fn length_counter_gates_channel_active_bits() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        apu.write(0x4015, 0x01, &mut mapper);
        apu.write(0x4003, 0x08, &mut mapper); // length index 1 -> 254
        assert_eq!(apu.read_status() & 0x01, 0x01);

        apu.write(0x4015, 0x00, &mut mapper);
        assert_eq!(apu.read_status() & 0x01, 0x00);
    }

    #[test]
    fn disabled_channel_ignores_length_loads() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        apu.write(0x4003, 0x08, &mut mapper);
        assert_eq!(apu.read_status() & 0x01, 0x00);
    }

    #[test]
    fn frame_irq_sets_and_clears_via_status_read() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        for _ in 0..29_830 {
            apu.tick(&mut mapper);
        }
        assert!(apu.irq_pending());
        assert_eq!(apu.read_status() & 0x40, 0x40);
        assert!(!apu.irq_pending());
        assert_eq!(apu.read_status() & 0x40, 0x00);
    }

    #[test]
    fn frame_counter_write_with_inhibit_clears_pending_irq() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        for _ in 0..29_830 {
            apu.tick(&mut mapper);
        }
        assert!(apu.irq_pending());
        apu.write(0x4017, 0x40, &mut mapper);
        assert!(!apu.irq_pending());
    }

    #[test]
    fn half_frames_eventually_silence_a_short_length() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        apu.write(0x4015, 0x01, &mut mapper);
        apu.write(0x4003, 0x18, &mut mapper); // length index 3 -> 2 ticks
        assert!(apu.read_status() & 0x01 != 0);

        // Two half-frame clocks happen within one 4-step sequence.
        for _ in 0..29_830 {
            apu.tick(&mut mapper);
        }
        assert_eq!(apu.read_status() & 0x01, 0x00);
    }

    #[test]
    fn dmc_counts_down_sample_bytes_and_raises_irq() {
        let mut apu = Apu::new();
        let mut mapper = mapper();

        apu.write(0x4010, 0x8F, &mut mapper); // IRQ on, fastest rate
        apu.write(0x4012, 0x00, &mut mapper); // sample at $C000
        apu.write(0x4013, 0x00, &mut mapper); // one byte
        apu.write(0x4015, 0x10, &mut mapper);

        // One byte plus the buffered fetch drains within a few hundred cycles.
        for _ in 0..2_000 {
            apu.tick(&mut mapper);
        }
        assert!(apu.read_status() & 0x80 != 0);
        assert!(apu.irq_pending());

        // Disabling the channel through $4015 acknowledges the IRQ.
        apu.write(0x4015, 0x00, &mut mapper);
        assert!(!apu.irq_pending());
    }
}
