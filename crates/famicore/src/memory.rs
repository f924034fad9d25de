//! Shared definitions for the NES memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and prevents magic numbers from sneaking into other modules.

/// CPU memory map details.
pub mod cpu {
    /// Internal work RAM size (2 KiB, mirrored up to `$1FFF`).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Last address of the internal RAM mirror region.
    pub const INTERNAL_RAM_END: u16 = 0x1FFF;

    /// First address of the hardware stack page.
    pub const STACK_PAGE_START: u16 = 0x0100;

    /// Cartridge work RAM window (`$6000-$7FFF`).
    pub const PRG_RAM_START: u16 = 0x6000;
    /// PRG ROM window (`$8000-$FFFF`).
    pub const PRG_ROM_START: u16 = 0x8000;

    /// NMI vector (`$FFFA/$FFFB`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// Reset vector (`$FFFC/$FFFD`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// IRQ/BRK vector (`$FFFE/$FFFF`).
    pub const IRQ_VECTOR: u16 = 0xFFFE;

    /// OAM DMA trigger port (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// Controller strobe / port 1 serial data (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 serial data (`$4017`, shared with the APU frame counter on write).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;
}

/// PPU register layout and VRAM rules.
pub mod ppu {
    /// First CPU-visible PPU register address.
    pub const REGISTER_BASE: u16 = 0x2000;
    /// Last address of the PPU register mirror region.
    pub const REGISTER_MIRROR_END: u16 = 0x3FFF;
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Address mask applied to every VRAM access.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes, mirrored every 32).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// Primary OAM size in bytes.
    pub const OAM_RAM_SIZE: usize = 0x100;
    /// Secondary OAM size in bytes (8 sprites x 4 bytes).
    pub const SECONDARY_OAM_RAM_SIZE: usize = 0x20;

    /// Pattern table base address for table 1 (`$1000`).
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Base address of nametable 0.
    pub const NAMETABLE_BASE: u16 = 0x2000;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

/// Audio Processing Unit (APU) register layout.
pub mod apu {
    /// Final channel register before the status and DMA/controller bridges.
    pub const CHANNEL_REGISTER_END: u16 = 0x4013;
    /// Address of the status register (`$4015`).
    pub const STATUS: u16 = 0x4015;
    /// Address of the frame counter configuration register (`$4017`).
    pub const FRAME_COUNTER: u16 = 0x4017;
}
