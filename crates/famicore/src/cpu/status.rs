use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V 1 B D I Z C
    /// ```
    /// The decimal flag exists but arithmetic ignores it on this CPU variant.
    /// `B` is not a real flag: it reads as set in the byte pushed by
    /// `PHP`/`BRK` and clear in the byte pushed by hardware interrupts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Status: u8 {
        /// Carry flag (C).
        const CARRY     = 0b0000_0001;
        /// Zero flag (Z).
        const ZERO      = 0b0000_0010;
        /// Interrupt disable flag (I); masks IRQ when set.
        const INTERRUPT = 0b0000_0100;
        /// Decimal mode flag (D); storage only on the NES.
        const DECIMAL   = 0b0000_1000;
        /// Break command flag (B); only meaningful in pushed copies.
        const BREAK     = 0b0001_0000;
        /// Unused bit; always reads back as 1.
        const UNUSED    = 0b0010_0000;
        /// Overflow flag (V).
        const OVERFLOW  = 0b0100_0000;
        /// Negative flag (N); mirrors bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Update Z and N from a result byte.
    #[inline]
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    #[inline]
    pub(crate) fn set_c(&mut self, value: bool) {
        self.set(Status::CARRY, value);
    }

    #[inline]
    pub(crate) fn set_v(&mut self, value: bool) {
        self.set(Status::OVERFLOW, value);
    }

    #[inline]
    pub(crate) fn c(&self) -> bool {
        self.contains(Status::CARRY)
    }

    #[inline]
    pub(crate) fn i(&self) -> bool {
        self.contains(Status::INTERRUPT)
    }

    /// Replace the live flags from a pushed byte: `B` is discarded and the
    /// unused bit reads back as set.
    #[inline]
    pub(crate) fn load(&mut self, value: u8) {
        *self = (Status::from_bits_retain(value) - Status::BREAK) | Status::UNUSED;
    }
}
