//! 6502 interpreter.
//!
//! One instruction per `step`, but every cycle is a real bus access: the
//! addressing helpers issue the documented sequence of reads and writes
//! (dummy reads on indexing fixups, double writes on read-modify-write
//! instructions), and the bus charges one CPU cycle per access. Cycle counts
//! therefore fall out of the access pattern instead of a lookup table.
//!
//! All 151 official opcodes are implemented, plus the common unofficial set
//! (`LAX`, `SAX`, `DCP`, `ISB`, `SLO`, `RLA`, `SRE`, `RRA`, `ANC`, `ALR`,
//! `ARR`, `AXS`, `XAA`, `LAS`, `AHX`, `SHY`, `SHX`, `TAS`) and the `KIL`
//! jam group, which latches the crash flag instead of wedging the host.
//!
//! Interrupts: NMI is an edge latched from the PPU line and wins over IRQ;
//! IRQ is the level OR of the APU and cartridge lines, taken at instruction
//! boundaries when `I` is clear. `CLI`/`SEI`/`PLP`/`RTI` apply their `I`
//! change one instruction late, which several test ROMs probe.

pub(crate) mod status;

use bitflags::bitflags;

use crate::{
    bus::CpuBus,
    memory::cpu::{IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, STACK_PAGE_START},
    state::Cursor,
};

use status::Status;

bitflags! {
    /// Sources that can hold the IRQ line low.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct IrqSource: u8 {
        const APU = 0b01;
        const MAPPER = 0b10;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Cpu {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: Status,
    pub(crate) pc: u16,

    /// Last value driven on the data bus; reads of unmapped addresses
    /// return it (open bus).
    pub(crate) data_bus: u8,
    /// Monotone CPU cycle counter; also what keeps the PPU/APU in step.
    pub(crate) cycles: u64,

    /// Active IRQ sources (level-triggered).
    irq_sources: IrqSource,
    /// Last sampled NMI line level, for edge detection.
    nmi_line: bool,
    /// Latched NMI edge, consumed when the NMI is serviced.
    nmi_edge: bool,
    /// Interrupt decisions made at the previous instruction boundary.
    take_nmi: bool,
    take_irq: bool,

    /// Latched by the `KIL` opcode group; only reset/load recover.
    crashed: bool,
}

impl Cpu {
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            p: Status::from_bits_retain(0x24),
            pc: 0,
            data_bus: 0,
            cycles: 0,
            irq_sources: IrqSource::empty(),
            nmi_line: false,
            nmi_edge: false,
            take_nmi: false,
            take_irq: false,
            crashed: false,
        }
    }

    /// Cold boot: registers to their power-on values, then the reset
    /// sequence (which leaves S at `$FD`).
    pub(crate) fn power_on(&mut self, bus: &mut CpuBus) {
        *self = Self::new();
        self.reset(bus);
    }

    /// RESET: burns the interrupt sequence without stack writes, drops S by
    /// three, sets `I`, and fetches the vector at `$FFFC`.
    pub(crate) fn reset(&mut self, bus: &mut CpuBus) {
        self.crashed = false;
        self.irq_sources = IrqSource::empty();
        self.nmi_line = false;
        self.nmi_edge = false;
        self.take_nmi = false;
        self.take_irq = false;

        self.read(bus, self.pc);
        self.read(bus, self.pc);
        for _ in 0..3 {
            self.read(bus, STACK_PAGE_START | self.s as u16);
            self.s = self.s.wrapping_sub(1);
        }
        self.p.insert(Status::INTERRUPT);
        let lo = self.read(bus, RESET_VECTOR);
        let hi = self.read(bus, RESET_VECTOR + 1);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    pub(crate) fn crashed(&self) -> bool {
        self.crashed
    }

    pub(crate) fn clear_crash(&mut self) {
        self.crashed = false;
    }

    /// Observes the NMI line level and latches rising edges.
    pub(crate) fn sample_nmi(&mut self, level: bool) {
        if level && !self.nmi_line {
            self.nmi_edge = true;
        }
        self.nmi_line = level;
    }

    /// Drives one IRQ source level.
    pub(crate) fn set_irq(&mut self, source: IrqSource, level: bool) {
        self.irq_sources.set(source, level);
    }

    /// Services a pending interrupt or executes one instruction.
    pub(crate) fn step(&mut self, bus: &mut CpuBus) {
        if self.crashed {
            return;
        }

        if self.take_nmi {
            self.take_nmi = false;
            self.nmi_edge = false;
            self.interrupt(bus, true);
            self.poll_interrupts(self.p.i());
            return;
        }
        if self.take_irq {
            self.take_irq = false;
            self.interrupt(bus, false);
            self.poll_interrupts(self.p.i());
            return;
        }

        let i_before = self.p.i();
        let opcode = self.fetch(bus);
        self.execute(bus, opcode);

        // CLI/SEI/PLP/RTI change I one instruction late as far as the IRQ
        // poll is concerned.
        let effective_i = if matches!(opcode, 0x58 | 0x78 | 0x28 | 0x40) {
            i_before
        } else {
            self.p.i()
        };
        self.poll_interrupts(effective_i);
    }

    fn poll_interrupts(&mut self, effective_i: bool) {
        self.take_nmi = self.nmi_edge;
        self.take_irq = !self.irq_sources.is_empty() && !effective_i;
    }

    /// Hardware interrupt sequence (7 cycles). A NMI edge arriving before
    /// the vector fetch hijacks an in-flight IRQ or BRK.
    fn interrupt(&mut self, bus: &mut CpuBus, nmi: bool) {
        self.read(bus, self.pc);
        self.read(bus, self.pc);
        self.push(bus, (self.pc >> 8) as u8);
        self.push(bus, self.pc as u8);

        let vector = if nmi || self.nmi_edge {
            self.nmi_edge = false;
            self.take_nmi = false;
            NMI_VECTOR
        } else {
            IRQ_VECTOR
        };

        // Hardware interrupts push B clear.
        self.push(bus, ((self.p | Status::UNUSED) - Status::BREAK).bits());
        self.p.insert(Status::INTERRUPT);

        let lo = self.read(bus, vector);
        let hi = self.read(bus, vector + 1);
        self.pc = u16::from_le_bytes([lo, hi]);
    }

    // =====================================================================
    // Bus access primitives — one CPU cycle each
    // =====================================================================

    fn read(&mut self, bus: &mut CpuBus, addr: u16) -> u8 {
        bus.read(self, addr)
    }

    fn write(&mut self, bus: &mut CpuBus, addr: u16, value: u8) {
        bus.write(self, addr, value);
    }

    fn fetch(&mut self, bus: &mut CpuBus) -> u8 {
        let value = self.read(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn push(&mut self, bus: &mut CpuBus, value: u8) {
        self.write(bus, STACK_PAGE_START | self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    fn pop(&mut self, bus: &mut CpuBus) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.read(bus, STACK_PAGE_START | self.s as u16)
    }

    // =====================================================================
    // Addressing modes
    // =====================================================================

    fn addr_zp(&mut self, bus: &mut CpuBus) -> u16 {
        self.fetch(bus) as u16
    }

    fn addr_zpx(&mut self, bus: &mut CpuBus) -> u16 {
        let base = self.fetch(bus);
        self.read(bus, base as u16);
        base.wrapping_add(self.x) as u16
    }

    fn addr_zpy(&mut self, bus: &mut CpuBus) -> u16 {
        let base = self.fetch(bus);
        self.read(bus, base as u16);
        base.wrapping_add(self.y) as u16
    }

    fn addr_abs(&mut self, bus: &mut CpuBus) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Absolute indexed. Read instructions only pay the fixup cycle on a
    /// page crossing; writes and read-modify-writes always do (`force`).
    fn addr_indexed(&mut self, bus: &mut CpuBus, index: u8, force: bool) -> u16 {
        let base = self.addr_abs(bus);
        let addr = base.wrapping_add(index as u16);
        if force || (base & 0xFF00) != (addr & 0xFF00) {
            self.read(bus, (base & 0xFF00) | (addr & 0x00FF));
        }
        addr
    }

    fn addr_absx(&mut self, bus: &mut CpuBus, force: bool) -> u16 {
        self.addr_indexed(bus, self.x, force)
    }

    fn addr_absy(&mut self, bus: &mut CpuBus, force: bool) -> u16 {
        self.addr_indexed(bus, self.y, force)
    }

    fn addr_izx(&mut self, bus: &mut CpuBus) -> u16 {
        let ptr = self.fetch(bus);
        self.read(bus, ptr as u16);
        let ptr = ptr.wrapping_add(self.x);
        let lo = self.read(bus, ptr as u16);
        let hi = self.read(bus, ptr.wrapping_add(1) as u16);
        u16::from_le_bytes([lo, hi])
    }

    fn addr_izy(&mut self, bus: &mut CpuBus, force: bool) -> u16 {
        let ptr = self.fetch(bus);
        let lo = self.read(bus, ptr as u16);
        let hi = self.read(bus, ptr.wrapping_add(1) as u16);
        let base = u16::from_le_bytes([lo, hi]);
        let addr = base.wrapping_add(self.y as u16);
        if force || (base & 0xFF00) != (addr & 0xFF00) {
            self.read(bus, (base & 0xFF00) | (addr & 0x00FF));
        }
        addr
    }

    fn branch(&mut self, bus: &mut CpuBus, taken: bool) {
        let offset = self.fetch(bus) as i8;
        if taken {
            self.read(bus, self.pc);
            let target = self.pc.wrapping_add(offset as u16);
            if (target & 0xFF00) != (self.pc & 0xFF00) {
                self.read(bus, (self.pc & 0xFF00) | (target & 0x00FF));
            }
            self.pc = target;
        }
    }

    /// Read-modify-write: read, write the stale value back, write the
    /// result. The double write is visible to hardware registers.
    fn rmw(&mut self, bus: &mut CpuBus, addr: u16, op: fn(&mut Self, u8) -> u8) {
        let value = self.read(bus, addr);
        self.write(bus, addr, value);
        let result = op(self, value);
        self.write(bus, addr, result);
    }

    // =====================================================================
    // Operations
    // =====================================================================

    fn lda(&mut self, value: u8) {
        self.a = value;
        self.p.set_zn(self.a);
    }

    fn ldx(&mut self, value: u8) {
        self.x = value;
        self.p.set_zn(self.x);
    }

    fn ldy(&mut self, value: u8) {
        self.y = value;
        self.p.set_zn(self.y);
    }

    fn ora(&mut self, value: u8) {
        self.a |= value;
        self.p.set_zn(self.a);
    }

    fn and(&mut self, value: u8) {
        self.a &= value;
        self.p.set_zn(self.a);
    }

    fn eor(&mut self, value: u8) {
        self.a ^= value;
        self.p.set_zn(self.a);
    }

    /// Binary-mode add; the decimal flag is storage only on this CPU.
    fn adc(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.p.c() as u16;
        let result = sum as u8;
        self.p.set_c(sum > 0xFF);
        self.p
            .set_v((!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0);
        self.a = result;
        self.p.set_zn(self.a);
    }

    fn sbc(&mut self, value: u8) {
        self.adc(value ^ 0xFF);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.p.set_c(register >= value);
        self.p.set_zn(register.wrapping_sub(value));
    }

    fn bit(&mut self, value: u8) {
        self.p.set(Status::ZERO, self.a & value == 0);
        self.p.set(Status::NEGATIVE, value & 0x80 != 0);
        self.p.set_v(value & 0x40 != 0);
    }

    fn asl_value(&mut self, value: u8) -> u8 {
        self.p.set_c(value & 0x80 != 0);
        let result = value << 1;
        self.p.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.p.set_c(value & 0x01 != 0);
        let result = value >> 1;
        self.p.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = self.p.c() as u8;
        self.p.set_c(value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.p.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = (self.p.c() as u8) << 7;
        self.p.set_c(value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.p.set_zn(result);
        result
    }

    fn inc_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.p.set_zn(result);
        result
    }

    fn dec_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.p.set_zn(result);
        result
    }

    // Unofficial combos, expressed as read-modify-write kernels.

    fn slo_value(&mut self, value: u8) -> u8 {
        let result = self.asl_value(value);
        self.ora(result);
        result
    }

    fn rla_value(&mut self, value: u8) -> u8 {
        let result = self.rol_value(value);
        self.and(result);
        result
    }

    fn sre_value(&mut self, value: u8) -> u8 {
        let result = self.lsr_value(value);
        self.eor(result);
        result
    }

    fn rra_value(&mut self, value: u8) -> u8 {
        let result = self.ror_value(value);
        self.adc(result);
        result
    }

    fn dcp_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.compare(self.a, result);
        result
    }

    fn isb_value(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.sbc(result);
        result
    }

    fn lax(&mut self, value: u8) {
        self.a = value;
        self.x = value;
        self.p.set_zn(value);
    }

    /// Store opcodes of the `SHA`/`SHX`/`SHY`/`TAS` family AND the value
    /// with the high address byte plus one.
    fn high_and_store(&mut self, bus: &mut CpuBus, addr: u16, value: u8) {
        let masked = value & ((addr >> 8) as u8).wrapping_add(1);
        self.write(bus, addr, masked);
    }

    fn kil(&mut self) {
        tracing::warn!("KIL opcode at {:#06X}, CPU halted", self.pc);
        self.crashed = true;
    }

    // =====================================================================
    // Dispatch
    // =====================================================================

    fn execute(&mut self, bus: &mut CpuBus, opcode: u8) {
        match opcode {
            // BRK: the padding byte is fetched and discarded; B reads as set
            // in the pushed status. A concurrent NMI hijacks the vector.
            0x00 => {
                self.fetch(bus);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, self.pc as u8);
                let vector = if self.nmi_edge {
                    self.nmi_edge = false;
                    self.take_nmi = false;
                    NMI_VECTOR
                } else {
                    IRQ_VECTOR
                };
                self.push(bus, (self.p | Status::UNUSED | Status::BREAK).bits());
                self.p.insert(Status::INTERRUPT);
                let lo = self.read(bus, vector);
                let hi = self.read(bus, vector + 1);
                self.pc = u16::from_le_bytes([lo, hi]);
            }

            // Jumps and subroutines ---------------------------------------
            0x4C => self.pc = self.addr_abs(bus),
            0x6C => {
                let ptr = self.addr_abs(bus);
                let lo = self.read(bus, ptr);
                // 6502 bug: the pointer high byte never carries.
                let hi = self.read(bus, (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
                self.pc = u16::from_le_bytes([lo, hi]);
            }
            0x20 => {
                let lo = self.fetch(bus);
                self.read(bus, STACK_PAGE_START | self.s as u16);
                self.push(bus, (self.pc >> 8) as u8);
                self.push(bus, self.pc as u8);
                let hi = self.fetch(bus);
                self.pc = u16::from_le_bytes([lo, hi]);
            }
            0x60 => {
                self.read(bus, self.pc);
                self.read(bus, STACK_PAGE_START | self.s as u16);
                let lo = self.pop(bus);
                let hi = self.pop(bus);
                self.pc = u16::from_le_bytes([lo, hi]);
                self.read(bus, self.pc);
                self.pc = self.pc.wrapping_add(1);
            }
            0x40 => {
                self.read(bus, self.pc);
                self.read(bus, STACK_PAGE_START | self.s as u16);
                let flags = self.pop(bus);
                self.p.load(flags);
                let lo = self.pop(bus);
                let hi = self.pop(bus);
                self.pc = u16::from_le_bytes([lo, hi]);
            }

            // Branches ----------------------------------------------------
            0x10 => self.branch(bus, !self.p.contains(Status::NEGATIVE)),
            0x30 => self.branch(bus, self.p.contains(Status::NEGATIVE)),
            0x50 => self.branch(bus, !self.p.contains(Status::OVERFLOW)),
            0x70 => self.branch(bus, self.p.contains(Status::OVERFLOW)),
            0x90 => self.branch(bus, !self.p.contains(Status::CARRY)),
            0xB0 => self.branch(bus, self.p.contains(Status::CARRY)),
            0xD0 => self.branch(bus, !self.p.contains(Status::ZERO)),
            0xF0 => self.branch(bus, self.p.contains(Status::ZERO)),

            // Stack -------------------------------------------------------
            0x48 => {
                self.read(bus, self.pc);
                self.push(bus, self.a);
            }
            0x08 => {
                self.read(bus, self.pc);
                self.push(bus, (self.p | Status::UNUSED | Status::BREAK).bits());
            }
            0x68 => {
                self.read(bus, self.pc);
                self.read(bus, STACK_PAGE_START | self.s as u16);
                let value = self.pop(bus);
                self.lda(value);
            }
            0x28 => {
                self.read(bus, self.pc);
                self.read(bus, STACK_PAGE_START | self.s as u16);
                let flags = self.pop(bus);
                self.p.load(flags);
            }

            // Loads -------------------------------------------------------
            0xA9 => {
                let value = self.fetch(bus);
                self.lda(value);
            }
            0xA5 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xB5 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xAD => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xBD => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xB9 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xA1 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.lda(value);
            }
            0xB1 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.lda(value);
            }

            0xA2 => {
                let value = self.fetch(bus);
                self.ldx(value);
            }
            0xA6 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.ldx(value);
            }
            0xB6 => {
                let addr = self.addr_zpy(bus);
                let value = self.read(bus, addr);
                self.ldx(value);
            }
            0xAE => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.ldx(value);
            }
            0xBE => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.ldx(value);
            }

            0xA0 => {
                let value = self.fetch(bus);
                self.ldy(value);
            }
            0xA4 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.ldy(value);
            }
            0xB4 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.ldy(value);
            }
            0xAC => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.ldy(value);
            }
            0xBC => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.ldy(value);
            }

            // Stores ------------------------------------------------------
            0x85 => {
                let addr = self.addr_zp(bus);
                self.write(bus, addr, self.a);
            }
            0x95 => {
                let addr = self.addr_zpx(bus);
                self.write(bus, addr, self.a);
            }
            0x8D => {
                let addr = self.addr_abs(bus);
                self.write(bus, addr, self.a);
            }
            0x9D => {
                let addr = self.addr_absx(bus, true);
                self.write(bus, addr, self.a);
            }
            0x99 => {
                let addr = self.addr_absy(bus, true);
                self.write(bus, addr, self.a);
            }
            0x81 => {
                let addr = self.addr_izx(bus);
                self.write(bus, addr, self.a);
            }
            0x91 => {
                let addr = self.addr_izy(bus, true);
                self.write(bus, addr, self.a);
            }

            0x86 => {
                let addr = self.addr_zp(bus);
                self.write(bus, addr, self.x);
            }
            0x96 => {
                let addr = self.addr_zpy(bus);
                self.write(bus, addr, self.x);
            }
            0x8E => {
                let addr = self.addr_abs(bus);
                self.write(bus, addr, self.x);
            }

            0x84 => {
                let addr = self.addr_zp(bus);
                self.write(bus, addr, self.y);
            }
            0x94 => {
                let addr = self.addr_zpx(bus);
                self.write(bus, addr, self.y);
            }
            0x8C => {
                let addr = self.addr_abs(bus);
                self.write(bus, addr, self.y);
            }

            // Transfers ---------------------------------------------------
            0xAA => {
                self.read(bus, self.pc);
                self.x = self.a;
                self.p.set_zn(self.x);
            }
            0xA8 => {
                self.read(bus, self.pc);
                self.y = self.a;
                self.p.set_zn(self.y);
            }
            0x8A => {
                self.read(bus, self.pc);
                self.a = self.x;
                self.p.set_zn(self.a);
            }
            0x98 => {
                self.read(bus, self.pc);
                self.a = self.y;
                self.p.set_zn(self.a);
            }
            0xBA => {
                self.read(bus, self.pc);
                self.x = self.s;
                self.p.set_zn(self.x);
            }
            0x9A => {
                self.read(bus, self.pc);
                self.s = self.x;
            }

            // ALU: ORA / AND / EOR / ADC / SBC / CMP ----------------------
            0x09 => {
                let value = self.fetch(bus);
                self.ora(value);
            }
            0x05 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x15 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x0D => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x1D => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x19 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x01 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.ora(value);
            }
            0x11 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.ora(value);
            }

            0x29 => {
                let value = self.fetch(bus);
                self.and(value);
            }
            0x25 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x35 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x2D => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x3D => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x39 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x21 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.and(value);
            }
            0x31 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.and(value);
            }

            0x49 => {
                let value = self.fetch(bus);
                self.eor(value);
            }
            0x45 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x55 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x4D => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x5D => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x59 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x41 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.eor(value);
            }
            0x51 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.eor(value);
            }

            0x69 => {
                let value = self.fetch(bus);
                self.adc(value);
            }
            0x65 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x75 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x6D => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x7D => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x79 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x61 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.adc(value);
            }
            0x71 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.adc(value);
            }

            // 0xEB is the documented unofficial SBC immediate alias.
            0xE9 | 0xEB => {
                let value = self.fetch(bus);
                self.sbc(value);
            }
            0xE5 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xF5 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xED => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xFD => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xF9 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xE1 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.sbc(value);
            }
            0xF1 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.sbc(value);
            }

            0xC9 => {
                let value = self.fetch(bus);
                self.compare(self.a, value);
            }
            0xC5 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xD5 => {
                let addr = self.addr_zpx(bus);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xCD => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xDD => {
                let addr = self.addr_absx(bus, false);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xD9 => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xC1 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }
            0xD1 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.compare(self.a, value);
            }

            0xE0 => {
                let value = self.fetch(bus);
                self.compare(self.x, value);
            }
            0xE4 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.compare(self.x, value);
            }
            0xEC => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.compare(self.x, value);
            }

            0xC0 => {
                let value = self.fetch(bus);
                self.compare(self.y, value);
            }
            0xC4 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.compare(self.y, value);
            }
            0xCC => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.compare(self.y, value);
            }

            // BIT ---------------------------------------------------------
            0x24 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.bit(value);
            }
            0x2C => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.bit(value);
            }

            // Shifts and rotates ------------------------------------------
            0x0A => {
                self.read(bus, self.pc);
                self.a = self.asl_value(self.a);
            }
            0x06 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::asl_value);
            }
            0x16 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::asl_value);
            }
            0x0E => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::asl_value);
            }
            0x1E => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::asl_value);
            }

            0x4A => {
                self.read(bus, self.pc);
                self.a = self.lsr_value(self.a);
            }
            0x46 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::lsr_value);
            }
            0x56 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::lsr_value);
            }
            0x4E => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::lsr_value);
            }
            0x5E => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::lsr_value);
            }

            0x2A => {
                self.read(bus, self.pc);
                self.a = self.rol_value(self.a);
            }
            0x26 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::rol_value);
            }
            0x36 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::rol_value);
            }
            0x2E => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::rol_value);
            }
            0x3E => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::rol_value);
            }

            0x6A => {
                self.read(bus, self.pc);
                self.a = self.ror_value(self.a);
            }
            0x66 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::ror_value);
            }
            0x76 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::ror_value);
            }
            0x6E => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::ror_value);
            }
            0x7E => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::ror_value);
            }

            // Increments and decrements -----------------------------------
            0xE6 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::inc_value);
            }
            0xF6 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::inc_value);
            }
            0xEE => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::inc_value);
            }
            0xFE => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::inc_value);
            }
            0xC6 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::dec_value);
            }
            0xD6 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::dec_value);
            }
            0xCE => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::dec_value);
            }
            0xDE => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::dec_value);
            }

            0xE8 => {
                self.read(bus, self.pc);
                self.x = self.inc_value(self.x);
            }
            0xC8 => {
                self.read(bus, self.pc);
                self.y = self.inc_value(self.y);
            }
            0xCA => {
                self.read(bus, self.pc);
                self.x = self.dec_value(self.x);
            }
            0x88 => {
                self.read(bus, self.pc);
                self.y = self.dec_value(self.y);
            }

            // Flag operations ---------------------------------------------
            0x18 => {
                self.read(bus, self.pc);
                self.p.remove(Status::CARRY);
            }
            0x38 => {
                self.read(bus, self.pc);
                self.p.insert(Status::CARRY);
            }
            0x58 => {
                self.read(bus, self.pc);
                self.p.remove(Status::INTERRUPT);
            }
            0x78 => {
                self.read(bus, self.pc);
                self.p.insert(Status::INTERRUPT);
            }
            0xB8 => {
                self.read(bus, self.pc);
                self.p.remove(Status::OVERFLOW);
            }
            0xD8 => {
                self.read(bus, self.pc);
                self.p.remove(Status::DECIMAL);
            }
            0xF8 => {
                self.read(bus, self.pc);
                self.p.insert(Status::DECIMAL);
            }

            // Official and unofficial NOPs --------------------------------
            0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => {
                self.read(bus, self.pc);
            }
            0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => {
                self.fetch(bus);
            }
            0x04 | 0x44 | 0x64 => {
                let addr = self.addr_zp(bus);
                self.read(bus, addr);
            }
            0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => {
                let addr = self.addr_zpx(bus);
                self.read(bus, addr);
            }
            0x0C => {
                let addr = self.addr_abs(bus);
                self.read(bus, addr);
            }
            0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => {
                let addr = self.addr_absx(bus, false);
                self.read(bus, addr);
            }

            // Unofficial loads and stores ---------------------------------
            0xA7 => {
                let addr = self.addr_zp(bus);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xB7 => {
                let addr = self.addr_zpy(bus);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xAF => {
                let addr = self.addr_abs(bus);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xBF => {
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xA3 => {
                let addr = self.addr_izx(bus);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xB3 => {
                let addr = self.addr_izy(bus, false);
                let value = self.read(bus, addr);
                self.lax(value);
            }
            0xAB => {
                let value = self.fetch(bus);
                self.lax(value);
            }

            0x87 => {
                let addr = self.addr_zp(bus);
                self.write(bus, addr, self.a & self.x);
            }
            0x97 => {
                let addr = self.addr_zpy(bus);
                self.write(bus, addr, self.a & self.x);
            }
            0x8F => {
                let addr = self.addr_abs(bus);
                self.write(bus, addr, self.a & self.x);
            }
            0x83 => {
                let addr = self.addr_izx(bus);
                self.write(bus, addr, self.a & self.x);
            }

            // Unofficial read-modify-write combos -------------------------
            0x07 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x17 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x0F => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x1F => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x1B => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x03 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::slo_value);
            }
            0x13 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::slo_value);
            }

            0x27 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x37 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x2F => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x3F => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x3B => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x23 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::rla_value);
            }
            0x33 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::rla_value);
            }

            0x47 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x57 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x4F => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x5F => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x5B => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x43 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::sre_value);
            }
            0x53 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::sre_value);
            }

            0x67 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x77 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x6F => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x7F => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x7B => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x63 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::rra_value);
            }
            0x73 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::rra_value);
            }

            0xC7 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xD7 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xCF => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xDF => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xDB => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xC3 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::dcp_value);
            }
            0xD3 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::dcp_value);
            }

            0xE7 => {
                let addr = self.addr_zp(bus);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xF7 => {
                let addr = self.addr_zpx(bus);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xEF => {
                let addr = self.addr_abs(bus);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xFF => {
                let addr = self.addr_absx(bus, true);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xFB => {
                let addr = self.addr_absy(bus, true);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xE3 => {
                let addr = self.addr_izx(bus);
                self.rmw(bus, addr, Self::isb_value);
            }
            0xF3 => {
                let addr = self.addr_izy(bus, true);
                self.rmw(bus, addr, Self::isb_value);
            }

            // Immediate-mode unofficial arithmetic ------------------------
            0x0B | 0x2B => {
                // ANC: AND, then copy N into C.
                let value = self.fetch(bus);
                self.and(value);
                self.p.set_c(self.a & 0x80 != 0);
            }
            0x4B => {
                // ALR: AND, then LSR A.
                let value = self.fetch(bus);
                self.and(value);
                self.a = self.lsr_value(self.a);
            }
            0x6B => {
                // ARR: AND, then ROR A with C/V derived from bits 6 and 5.
                let value = self.fetch(bus);
                self.and(value);
                let carry_in = (self.p.c() as u8) << 7;
                self.a = (self.a >> 1) | carry_in;
                self.p.set_zn(self.a);
                self.p.set_c(self.a & 0x40 != 0);
                self.p
                    .set_v(((self.a >> 6) ^ (self.a >> 5)) & 0x01 != 0);
            }
            0xCB => {
                // AXS: X = (A & X) - imm, without borrow.
                let value = self.fetch(bus);
                let operand = self.a & self.x;
                self.p.set_c(operand >= value);
                self.x = operand.wrapping_sub(value);
                self.p.set_zn(self.x);
            }
            0x8B => {
                // XAA: unstable; the usual magic-constant model.
                let value = self.fetch(bus);
                self.a = (self.a | 0xEE) & self.x & value;
                self.p.set_zn(self.a);
            }

            // High-byte stores and friends --------------------------------
            0x9F => {
                let addr = self.addr_absy(bus, true);
                self.high_and_store(bus, addr, self.a & self.x);
            }
            0x93 => {
                let addr = self.addr_izy(bus, true);
                self.high_and_store(bus, addr, self.a & self.x);
            }
            0x9C => {
                let addr = self.addr_absx(bus, true);
                self.high_and_store(bus, addr, self.y);
            }
            0x9E => {
                let addr = self.addr_absy(bus, true);
                self.high_and_store(bus, addr, self.x);
            }
            0x9B => {
                let addr = self.addr_absy(bus, true);
                self.s = self.a & self.x;
                self.high_and_store(bus, addr, self.s);
            }
            0xBB => {
                // LAS: A, X, S = value & S.
                let addr = self.addr_absy(bus, false);
                let value = self.read(bus, addr) & self.s;
                self.a = value;
                self.x = value;
                self.s = value;
                self.p.set_zn(value);
            }

            // Jam group ---------------------------------------------------
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
                self.kil();
            }
        }
    }

    // =====================================================================
    // Snapshots
    // =====================================================================

    pub(crate) fn sync(&mut self, c: &mut Cursor) {
        c.u8(&mut self.a);
        c.u8(&mut self.x);
        c.u8(&mut self.y);
        c.u8(&mut self.s);
        let mut p = self.p.bits();
        c.u8(&mut p);
        self.p = Status::from_bits_retain(p);
        c.u16(&mut self.pc);
        c.u8(&mut self.data_bus);
        c.u64(&mut self.cycles);
        let mut irq = self.irq_sources.bits();
        c.u8(&mut irq);
        self.irq_sources = IrqSource::from_bits_truncate(irq);
        c.bool(&mut self.nmi_line);
        c.bool(&mut self.nmi_edge);
        c.bool(&mut self.take_nmi);
        c.bool(&mut self.take_irq);
        c.bool(&mut self.crashed);
    }
}
