//! Cartridge mapper layer: shared bank tables plus per-board variants.
//!
//! Every board owns one contiguous allocation laid out as
//! `[PRG | CHR | work RAM | nametable RAM]` and two bank tables translating
//! bus addresses to offsets into it: 64 CPU banks covering `$0000-$FFFF` and
//! 16 PPU banks covering `$0000-$3FFF`, each 1 KiB wide. Bank switching and
//! mirroring are just rewrites of those tables; entries store raw offsets so
//! snapshots serialize them directly and relocation is never an issue.
//!
//! Variant dispatch is a sum type resolved with `match` on the hot paths.
//! The variants only implement their register side effects; address
//! translation always funnels through [`MapperCore`].

use crate::{
    cartridge::{RomImage, header::Mirroring},
    error::Error,
    memory::cpu as cpu_mem,
    state::Cursor,
};

mod axrom;
mod cnrom;
mod gxrom;
mod mmc;
mod mmc1;
mod mmc3;
mod nrom;
mod unrom512;
mod uxrom;

use axrom::AxRom;
use cnrom::CnRom;
use gxrom::GxRom;
use mmc::Mmc;
use mmc1::Mmc1;
use mmc3::Mmc3;
use nrom::Nrom;
use unrom512::Unrom512;
use uxrom::UxRom;

/// Width of one bank window.
pub(crate) const BANK_SIZE: usize = 0x400;
/// Number of CPU bank entries (`$0000-$FFFF`).
const CPU_BANK_COUNT: usize = 0x40;
/// Number of PPU bank entries (`$0000-$3FFF`).
const PPU_BANK_COUNT: usize = 0x10;

/// Cartridge work RAM pages mapped at `$6000` (8 KiB).
const CPU_RAM_PAGES: usize = 0x8;
/// Console nametable RAM pages (2 KiB).
const PPU_RAM_PAGES: usize = 0x2;

/// First CPU bank page of the work RAM window (`$6000`).
const CPU_RAM_WINDOW: usize = cpu_mem::PRG_RAM_START as usize / BANK_SIZE;
/// First CPU bank page of the PRG window (`$8000`).
const PRG_WINDOW: usize = cpu_mem::PRG_ROM_START as usize / BANK_SIZE;

/// One bank table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bank {
    /// Offset into the cartridge memory allocation.
    offset: usize,
    read_only: bool,
    mapped: bool,
}

impl Bank {
    fn sync(&mut self, c: &mut Cursor) {
        c.offset(&mut self.offset);
        c.bool(&mut self.read_only);
        c.bool(&mut self.mapped);
    }
}

/// Shared cartridge state: the memory allocation and both bank tables.
#[derive(Debug, Clone)]
pub(crate) struct MapperCore {
    memory: Box<[u8]>,
    size_prg: usize,
    size_chr: usize,
    size_cpu_ram: usize,
    size_ppu_ram: usize,
    chr_writable: bool,
    cpu_banks: [Bank; CPU_BANK_COUNT],
    ppu_banks: [Bank; PPU_BANK_COUNT],
}

impl MapperCore {
    fn new(image: &RomImage) -> Self {
        let size_prg = image.prg_rom.len();
        let size_chr = image.chr.len();
        let size_cpu_ram = CPU_RAM_PAGES * BANK_SIZE;
        let size_ppu_ram = PPU_RAM_PAGES * BANK_SIZE;

        let mut memory = vec![0u8; size_prg + size_chr + size_cpu_ram + size_ppu_ram];
        memory[..size_prg].copy_from_slice(&image.prg_rom);
        memory[size_prg..size_prg + size_chr].copy_from_slice(&image.chr);

        // The loader places a trainer at CPU $7000, i.e. 4 KiB into work RAM.
        if let Some(trainer) = &image.trainer {
            let base = size_prg + size_chr + 0x1000;
            memory[base..base + trainer.len()].copy_from_slice(trainer);
        }

        Self {
            memory: memory.into_boxed_slice(),
            size_prg,
            size_chr,
            size_cpu_ram,
            size_ppu_ram,
            chr_writable: image.chr_writable,
            cpu_banks: [Bank::default(); CPU_BANK_COUNT],
            ppu_banks: [Bank::default(); PPU_BANK_COUNT],
        }
    }

    /// Number of 1 KiB PRG pages.
    fn prg_pages(&self) -> usize {
        self.size_prg / BANK_SIZE
    }

    /// Number of 1 KiB CHR pages.
    fn chr_pages(&self) -> usize {
        self.size_chr / BANK_SIZE
    }

    /// Maps `count` consecutive CPU banks starting at `page` onto PRG pages
    /// starting at `target`. Targets wrap modulo the PRG size, so oversized
    /// bank selects land back inside the ROM.
    fn map_bank_prg(&mut self, page: usize, count: usize, target: usize) {
        let pages = self.prg_pages();
        if pages == 0 {
            return;
        }
        for k in 0..count {
            self.cpu_banks[page + k] = Bank {
                offset: ((target + k) % pages) * BANK_SIZE,
                read_only: true,
                mapped: true,
            };
        }
    }

    /// Maps `count` consecutive PPU banks starting at `page` onto CHR pages
    /// starting at `target`.
    fn map_bank_chr(&mut self, page: usize, count: usize, target: usize) {
        let pages = self.chr_pages();
        if pages == 0 {
            return;
        }
        for k in 0..count {
            self.ppu_banks[page + k] = Bank {
                offset: self.size_prg + ((target + k) % pages) * BANK_SIZE,
                read_only: !self.chr_writable,
                mapped: true,
            };
        }
    }

    /// Maps CPU banks onto cartridge work RAM pages.
    fn map_bank_cpu_ram(&mut self, page: usize, count: usize, target: usize, read_only: bool) {
        let pages = self.size_cpu_ram / BANK_SIZE;
        for k in 0..count {
            self.cpu_banks[page + k] = Bank {
                offset: self.size_prg + self.size_chr + ((target + k) % pages) * BANK_SIZE,
                read_only,
                mapped: true,
            };
        }
    }

    /// Maps PPU banks onto console nametable RAM pages.
    fn map_bank_ppu_ram(&mut self, page: usize, count: usize, target: usize, read_only: bool) {
        let pages = self.size_ppu_ram / BANK_SIZE;
        let base = self.size_prg + self.size_chr + self.size_cpu_ram;
        for k in 0..count {
            self.ppu_banks[page + k] = Bank {
                offset: base + ((target + k) % pages) * BANK_SIZE,
                read_only,
                mapped: true,
            };
        }
    }

    fn unmap_bank_cpu(&mut self, page: usize, count: usize) {
        for k in 0..count {
            self.cpu_banks[page + k] = Bank::default();
        }
    }

    /// Points the nametable region (`$2000-$3FFF`) at the two internal
    /// nametable pages according to `mode`.
    fn set_mirroring_mode(&mut self, mode: Mirroring) {
        let layout: [usize; 4] = match mode {
            Mirroring::Horizontal => [0, 0, 1, 1],
            Mirroring::Vertical => [0, 1, 0, 1],
            Mirroring::OneScreenLow | Mirroring::None => [0, 0, 0, 0],
            Mirroring::OneScreenHigh => [1, 1, 1, 1],
        };
        for (slot, page) in layout.iter().enumerate() {
            self.map_bank_ppu_ram(8 + slot, 1, *page, false);
        }
        // $3000-$3FFF repeats the nametable layout.
        self.mirror_ppu_banks(8, 8, 4);
    }

    /// Repeats the bank pattern in `banks[page..page + mirror]` across
    /// `count` entries.
    fn mirror_cpu_banks(&mut self, page: usize, count: usize, mirror: usize) {
        for k in 0..count {
            self.cpu_banks[page + k] = self.cpu_banks[page + (k % mirror)];
        }
    }

    fn mirror_ppu_banks(&mut self, page: usize, count: usize, mirror: usize) {
        for k in 0..count {
            self.ppu_banks[page + k] = self.ppu_banks[page + (k % mirror)];
        }
    }

    /// Translates a CPU address through the bank table. `None` means the bank
    /// is unmapped and the bus should substitute open-bus data.
    fn read_cpu(&self, addr: u16) -> Option<u8> {
        let bank = &self.cpu_banks[(addr as usize) / BANK_SIZE];
        if !bank.mapped {
            return None;
        }
        debug_assert!(bank.offset + BANK_SIZE <= self.memory.len());
        Some(self.memory[bank.offset + (addr as usize & (BANK_SIZE - 1))])
    }

    /// Stores through the CPU bank table; silently dropped for unmapped or
    /// read-only banks (register side effects happen in the variants).
    fn write_cpu(&mut self, addr: u16, value: u8) {
        let bank = &self.cpu_banks[(addr as usize) / BANK_SIZE];
        if bank.mapped && !bank.read_only {
            self.memory[bank.offset + (addr as usize & (BANK_SIZE - 1))] = value;
        }
    }

    fn read_ppu(&self, addr: u16) -> u8 {
        let addr = (addr & 0x3FFF) as usize;
        let bank = &self.ppu_banks[addr / BANK_SIZE];
        if !bank.mapped {
            return 0;
        }
        self.memory[bank.offset + (addr & (BANK_SIZE - 1))]
    }

    fn write_ppu(&mut self, addr: u16, value: u8) {
        let addr = (addr & 0x3FFF) as usize;
        let bank = &self.ppu_banks[addr / BANK_SIZE];
        if bank.mapped && !bank.read_only {
            self.memory[bank.offset + (addr & (BANK_SIZE - 1))] = value;
        }
    }

    /// Walks everything that can change after load: both bank tables and the
    /// writable memory regions. PRG ROM (and read-only CHR) never change and
    /// stay out of the snapshot.
    fn sync(&mut self, c: &mut Cursor) {
        for bank in self.cpu_banks.iter_mut() {
            bank.sync(c);
        }
        for bank in self.ppu_banks.iter_mut() {
            bank.sync(c);
        }

        let (size_prg, size_chr, size_cpu_ram) = (self.size_prg, self.size_chr, self.size_cpu_ram);
        if self.chr_writable {
            c.bytes(&mut self.memory[size_prg..size_prg + size_chr]);
        }
        let ram = size_prg + size_chr;
        c.bytes(&mut self.memory[ram..ram + size_cpu_ram]);
        let vram = ram + size_cpu_ram;
        c.bytes(&mut self.memory[vram..vram + self.size_ppu_ram]);
    }
}

/// Board-specific register state.
#[derive(Debug, Clone)]
enum Variant {
    Nrom(Nrom),
    Mmc1(Mmc1),
    UxRom(UxRom),
    CnRom(CnRom),
    Mmc3(Mmc3),
    AxRom(AxRom),
    Mmc2(Mmc<8>),
    Mmc4(Mmc<16>),
    Unrom512(Unrom512),
    GxRom(GxRom),
}

/// A cartridge: shared bank-table core plus the board variant driving it.
#[derive(Debug, Clone)]
pub(crate) struct Mapper {
    core: MapperCore,
    variant: Variant,
}

impl Mapper {
    /// Builds the board selected by the header's mapper ID.
    pub(crate) fn new(image: &RomImage) -> Result<Self, Error> {
        let header = &image.header;
        let mut core = MapperCore::new(image);

        let variant = match header.mapper {
            0 => Variant::Nrom(Nrom::attach(&mut core, header)),
            1 => Variant::Mmc1(Mmc1::attach(&mut core, header)),
            2 => Variant::UxRom(UxRom::attach(&mut core, header)),
            3 => Variant::CnRom(CnRom::attach(&mut core, header)),
            4 => Variant::Mmc3(Mmc3::attach(&mut core, header)),
            7 => Variant::AxRom(AxRom::attach(&mut core, header)),
            9 => Variant::Mmc2(Mmc::attach(&mut core, header)),
            10 => Variant::Mmc4(Mmc::attach(&mut core, header)),
            30 => Variant::Unrom512(Unrom512::attach(&mut core, header)),
            66 => Variant::GxRom(GxRom::attach(&mut core, header)),
            id => return Err(Error::UnsupportedMapper { id }),
        };

        tracing::debug!(mapper = header.mapper, "selected cartridge board");
        Ok(Self { core, variant })
    }

    /// Board name, mainly for diagnostics.
    pub(crate) fn name(&self) -> &'static str {
        match &self.variant {
            Variant::Nrom(_) => "NROM",
            Variant::Mmc1(_) => "MMC1",
            Variant::UxRom(_) => "UxROM",
            Variant::CnRom(_) => "CNROM",
            Variant::Mmc3(_) => "MMC3",
            Variant::AxRom(_) => "AxROM",
            Variant::Mmc2(_) => "MMC2",
            Variant::Mmc4(_) => "MMC4",
            Variant::Unrom512(_) => "UNROM512",
            Variant::GxRom(_) => "GxROM",
        }
    }

    /// Re-initializes the board registers and bank layout while keeping the
    /// cartridge memory contents (work RAM, CHR RAM) intact.
    pub(crate) fn reset(&mut self) {
        let Self { core, variant } = self;
        match variant {
            Variant::Nrom(m) => m.reset(core),
            Variant::Mmc1(m) => m.reset(core),
            Variant::UxRom(m) => m.reset(core),
            Variant::CnRom(m) => m.reset(core),
            Variant::Mmc3(m) => m.reset(core),
            Variant::AxRom(m) => m.reset(core),
            Variant::Mmc2(m) => m.reset(core),
            Variant::Mmc4(m) => m.reset(core),
            Variant::Unrom512(m) => m.reset(core),
            Variant::GxRom(m) => m.reset(core),
        }
    }

    /// Advances board-internal clocks; called once per PPU dot.
    pub(crate) fn tick(&mut self) {
        if let Variant::Mmc3(m) = &mut self.variant {
            m.tick();
        }
    }

    /// CPU bus read through the bank table. `None` is open bus.
    pub(crate) fn read_cpu(&mut self, addr: u16) -> Option<u8> {
        self.core.read_cpu(addr)
    }

    /// CPU bus write: register side effects first, then the banked store.
    /// `cycle` is the CPU cycle counter, used by boards that must distinguish
    /// writes on consecutive cycles.
    pub(crate) fn write_cpu(&mut self, addr: u16, value: u8, cycle: u64) {
        let Self { core, variant } = self;
        match variant {
            Variant::Nrom(_) => {}
            Variant::Mmc1(m) => m.write_cpu(core, addr, value, cycle),
            Variant::UxRom(m) => m.write_cpu(core, addr, value),
            Variant::CnRom(m) => m.write_cpu(core, addr, value),
            Variant::Mmc3(m) => m.write_cpu(core, addr, value),
            Variant::AxRom(m) => m.write_cpu(core, addr, value),
            Variant::Mmc2(m) => m.write_cpu(core, addr, value),
            Variant::Mmc4(m) => m.write_cpu(core, addr, value),
            Variant::Unrom512(m) => m.write_cpu(core, addr, value),
            Variant::GxRom(m) => m.write_cpu(core, addr, value),
        }
        core.write_cpu(addr, value);
    }

    /// PPU bus read. Boards observe the address: MMC3 clocks its scanline
    /// counter on filtered A12 rises, MMC2/MMC4 toggle their CHR latches.
    pub(crate) fn read_ppu(&mut self, addr: u16) -> u8 {
        let Self { core, variant } = self;
        match variant {
            Variant::Mmc3(m) => m.observe_a12(addr),
            Variant::Mmc2(m) => return m.read_ppu(core, addr),
            Variant::Mmc4(m) => return m.read_ppu(core, addr),
            _ => {}
        }
        core.read_ppu(addr)
    }

    /// PPU bus write (nametables and CHR RAM).
    pub(crate) fn write_ppu(&mut self, addr: u16, value: u8) {
        if let Variant::Mmc3(m) = &mut self.variant {
            m.observe_a12(addr);
        }
        self.core.write_ppu(addr, value);
    }

    /// Level of the board IRQ line.
    pub(crate) fn irq_pending(&self) -> bool {
        match &self.variant {
            Variant::Mmc3(m) => m.irq_pending(),
            _ => false,
        }
    }

    pub(crate) fn sync(&mut self, c: &mut Cursor) {
        let Self { core, variant } = self;
        core.sync(c);
        match variant {
            Variant::Nrom(_) => {}
            Variant::Mmc1(m) => m.sync(c),
            Variant::UxRom(_) => {}
            Variant::CnRom(_) => {}
            Variant::Mmc3(m) => m.sync(c),
            Variant::AxRom(_) => {}
            Variant::Mmc2(m) => m.sync(c),
            Variant::Mmc4(m) => m.sync(c),
            Variant::Unrom512(_) => {}
            Variant::GxRom(_) => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cartridge::header::NES_HEADER_LEN;

    /// Raw iNES image with every 16 KiB PRG bank (and 8 KiB CHR bank)
    /// tagged with its index so tests can identify banks.
    pub(crate) fn synthetic_rom(mapper: u8, prg_banks: u8, chr_banks: u8) -> Vec<u8> {
        let flags6 = (mapper & 0x0F) << 4;
        let flags7 = mapper & 0xF0;
        let mut rom = vec![
            b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6, flags7, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        assert_eq!(rom.len(), NES_HEADER_LEN);
        for bank in 0..prg_banks {
            rom.extend(std::iter::repeat(bank).take(16 * 1024));
        }
        for bank in 0..chr_banks {
            rom.extend(std::iter::repeat(bank).take(8 * 1024));
        }
        rom
    }

    pub(crate) fn synthetic_image(mapper: u8, prg_banks: u8, chr_banks: u8) -> RomImage {
        RomImage::new(&synthetic_rom(mapper, prg_banks, chr_banks)).expect("synthetic image")
    }

    #[test]
    fn unknown_mapper_is_rejected() {
        let mut image = synthetic_image(0, 1, 1);
        image.header.mapper = 5;
        assert!(matches!(
            Mapper::new(&image),
            Err(Error::UnsupportedMapper { id: 5 })
        ));
    }

    #[test]
    fn bank_offsets_stay_inside_the_allocation() {
        for id in [0u8, 1, 2, 3, 4, 7, 9, 10, 30, 66] {
            let image = synthetic_image(id, 4, 2);
            let mapper = Mapper::new(&image).expect("mapper builds");
            for bank in mapper.core.cpu_banks.iter().chain(mapper.core.ppu_banks.iter()) {
                if bank.mapped {
                    assert!(bank.offset + BANK_SIZE <= mapper.core.memory.len());
                }
            }
        }
    }

    #[test]
    fn nametable_writes_land_in_console_ram() {
        let image = synthetic_image(0, 1, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        mapper.write_ppu(0x2000, 0x5A);
        assert_eq!(mapper.read_ppu(0x2000), 0x5A);
        // Horizontal mirroring aliases $2000 and $2400.
        assert_eq!(mapper.read_ppu(0x2400), 0x5A);
        assert_eq!(mapper.read_ppu(0x2800), 0x00);
    }

    #[test]
    fn rom_writes_are_dropped() {
        let image = synthetic_image(0, 2, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        let before = mapper.read_cpu(0x8000);
        mapper.write_cpu(0x8000, 0xEE, 0);
        assert_eq!(mapper.read_cpu(0x8000), before);
    }

    #[test]
    fn work_ram_round_trips() {
        let image = synthetic_image(0, 1, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        mapper.write_cpu(0x6000, 0x42, 0);
        assert_eq!(mapper.read_cpu(0x6000), Some(0x42));
    }

    #[test]
    fn unmapped_banks_read_as_open_bus() {
        let image = synthetic_image(0, 1, 1);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        assert_eq!(mapper.read_cpu(0x4100), None);
    }

    #[test]
    fn snapshot_round_trips_bank_tables_and_ram() {
        let image = synthetic_image(0, 1, 0);
        let mut mapper = Mapper::new(&image).expect("mapper builds");
        mapper.write_cpu(0x6123, 0x77, 0);
        mapper.write_ppu(0x0456, 0x88); // CHR RAM
        mapper.write_ppu(0x2789, 0x99);

        let mut measure = Cursor::measure();
        mapper.sync(&mut measure);
        let mut buf = vec![0u8; measure.position()];
        let mut write = Cursor::write(&mut buf);
        mapper.sync(&mut write);

        let mut other = Mapper::new(&image).expect("mapper builds");
        let mut read = Cursor::read(&buf);
        other.sync(&mut read);

        assert_eq!(other.read_cpu(0x6123), Some(0x77));
        assert_eq!(other.read_ppu(0x0456), 0x88);
        assert_eq!(other.read_ppu(0x2789), 0x99);
    }
}
