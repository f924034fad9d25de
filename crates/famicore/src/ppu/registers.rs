//! CPU-visible PPU register bitfields.

use bitflags::bitflags;

use crate::memory::ppu as ppu_mem;

bitflags! {
    /// PPU control register (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I n n
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Control: u8 {
        /// Base nametable select (bits 0-1); mirrored into `t` bits 10-11.
        const NAMETABLE = 0b0000_0011;
        /// VRAM increment unit: `0` steps by 1, `1` by 32.
        const INCREMENT_32 = 0b0000_0100;
        /// Pattern table for 8x8 sprites.
        const SPRITE_TABLE = 0b0000_1000;
        /// Pattern table for the background.
        const BACKGROUND_TABLE = 0b0001_0000;
        /// Sprite size: 8x8 or 8x16.
        const SPRITE_SIZE_16 = 0b0010_0000;
        /// Master/slave select; unused by a stock console.
        const MASTER_SLAVE = 0b0100_0000;
        /// Generate NMI at the start of vblank.
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    /// VRAM increment applied after `$2007` accesses.
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table base for 8x8 sprites.
    pub(crate) fn sprite_pattern_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            0
        }
    }

    /// Pattern table base for background tiles.
    pub(crate) fn background_pattern_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            ppu_mem::PATTERN_TABLE_1
        } else {
            0
        }
    }

    pub(crate) fn sprite_height(self) -> i16 {
        if self.contains(Control::SPRITE_SIZE_16) {
            16
        } else {
            8
        }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}

bitflags! {
    /// PPU mask register (`$2001`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Mask: u8 {
        const GRAYSCALE = 0b0000_0001;
        /// Show background in the leftmost 8 pixels.
        const BACKGROUND_LEFT = 0b0000_0010;
        /// Show sprites in the leftmost 8 pixels.
        const SPRITES_LEFT = 0b0000_0100;
        const SHOW_BACKGROUND = 0b0000_1000;
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;
    }
}

impl Mask {
    /// True when either layer is enabled — the condition the rest of the PPU
    /// calls "rendering".
    pub(crate) fn rendering(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }
}

bitflags! {
    /// PPU status register (`$2002`). Only the top three bits exist; the low
    /// five read back as open bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK = 0b1000_0000;
    }
}
