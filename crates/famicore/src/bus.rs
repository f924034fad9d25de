//! CPU bus: address decode plus the master clock.
//!
//! A `CpuBus` is a borrow-splitting view over the console assembled per call,
//! so no component stores a back-reference to another. Every CPU bus access
//! is exactly one CPU cycle: the bus first advances the PPU by three dots
//! (ticking the cartridge before each) and the APU by one step, then decodes
//! the access, then lets the CPU sample its interrupt lines. That ordering is
//! what makes the `$2002`/NMI race come out right: a status read on the same
//! cycle drops the NMI line before the CPU looks at it.

use crate::{
    apu::Apu,
    cartridge::mapper::Mapper,
    controller::Controller,
    cpu::{Cpu, IrqSource},
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    ppu::Ppu,
};

/// Internal CPU work RAM (2 KiB).
pub(crate) type CpuRam = [u8; cpu_mem::INTERNAL_RAM_SIZE];

pub(crate) struct CpuBus<'a> {
    pub(crate) ram: &'a mut CpuRam,
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) apu: &'a mut Apu,
    pub(crate) mapper: &'a mut Mapper,
    pub(crate) pad: &'a mut Controller,
    /// Live controller input byte held by the facade.
    pub(crate) input: u8,
}

impl CpuBus<'_> {
    /// Advances the rest of the console by one CPU cycle (3 PPU dots, one
    /// APU step, cartridge ticks).
    fn clock(&mut self, cpu: &mut Cpu) {
        for _ in 0..3 {
            self.mapper.tick();
            self.ppu.tick(self.mapper);
        }
        self.apu.tick(self.mapper);
        cpu.cycles = cpu.cycles.wrapping_add(1);
    }

    /// Lets the CPU observe the current NMI/IRQ line levels.
    fn sample_interrupts(&mut self, cpu: &mut Cpu) {
        cpu.sample_nmi(self.ppu.nmi_line());
        cpu.set_irq(IrqSource::APU, self.apu.irq_pending());
        cpu.set_irq(IrqSource::MAPPER, self.mapper.irq_pending());
    }

    /// A cycle with no useful bus transfer (DMA alignment).
    fn idle(&mut self, cpu: &mut Cpu) {
        self.clock(cpu);
        self.sample_interrupts(cpu);
    }

    /// One CPU read cycle.
    pub(crate) fn read(&mut self, cpu: &mut Cpu, addr: u16) -> u8 {
        self.clock(cpu);
        let value = self.decode_read(cpu, addr);
        cpu.data_bus = value;
        self.sample_interrupts(cpu);
        value
    }

    /// One CPU write cycle.
    pub(crate) fn write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        self.clock(cpu);
        cpu.data_bus = value;
        self.decode_write(cpu, addr, value);
        self.sample_interrupts(cpu);
    }

    /// Address decode for reads. Also used by the facade's direct `read`,
    /// which skips the clock but keeps every register side effect.
    pub(crate) fn decode_read(&mut self, cpu: &mut Cpu, addr: u16) -> u8 {
        match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_END => {
                self.ram[addr as usize & (cpu_mem::INTERNAL_RAM_SIZE - 1)]
            }
            ppu_mem::REGISTER_BASE..=ppu_mem::REGISTER_MIRROR_END => {
                self.ppu.read_register(addr, self.mapper)
            }
            0x4015 => self.apu.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.pad.read(self.input),
            // No device drives port 2; only the open upper bus lines read back.
            cpu_mem::CONTROLLER_PORT_2 => 0x40,
            // Write-only APU/IO ports and the $4018-$401F test range.
            0x4000..=0x401F => cpu.data_bus,
            _ => self.mapper.read_cpu(addr).unwrap_or(cpu.data_bus),
        }
    }

    /// Address decode for writes.
    pub(crate) fn decode_write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_END => {
                self.ram[addr as usize & (cpu_mem::INTERNAL_RAM_SIZE - 1)] = value;
            }
            ppu_mem::REGISTER_BASE..=ppu_mem::REGISTER_MIRROR_END => {
                self.ppu.write_register(addr, value, self.mapper);
            }
            cpu_mem::OAM_DMA => self.oam_dma(cpu, value),
            cpu_mem::CONTROLLER_PORT_1 => self.pad.write_strobe(value, self.input),
            0x4000..=0x4013 | 0x4015 | cpu_mem::CONTROLLER_PORT_2 => {
                self.apu.write(addr, value, self.mapper);
            }
            0x4018..=0x401F => {}
            _ => self.mapper.write_cpu(addr, value, cpu.cycles),
        }
    }

    /// OAM DMA triggered by a `$4014` write: one dead cycle, one more when
    /// the transfer starts on an odd CPU cycle, then 256 read/write pairs —
    /// 513 or 514 cycles on top of the triggering write.
    fn oam_dma(&mut self, cpu: &mut Cpu, page: u8) {
        if cpu.cycles & 1 == 1 {
            self.idle(cpu);
        }
        self.idle(cpu);

        let base = (page as u16) << 8;
        for offset in 0..ppu_mem::OAM_RAM_SIZE as u16 {
            let value = self.read(cpu, base + offset);
            self.write(cpu, 0x2004, value);
        }
    }
}
