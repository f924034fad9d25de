//! Sweep unit attached to the two pulse channels.
//!
//! The divider clocks on half frames; when it expires and the sweep is
//! enabled with a non-zero shift, the channel timer period slides toward the
//! computed target. Pulse 1 negates with ones' complement, pulse 2 with
//! two's complement.

use crate::state::Cursor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct Sweep {
    enabled: bool,
    period: u8,
    negate: bool,
    shift: u8,
    divider: u8,
    reload: bool,
}

impl Sweep {
    pub(super) fn configure(&mut self, value: u8) {
        self.enabled = value & 0b1000_0000 != 0;
        self.period = (value >> 4) & 0b0111;
        self.negate = value & 0b0000_1000 != 0;
        self.shift = value & 0b0111;
        self.reload = true;
    }

    fn target(&self, period: u16, ones_complement: bool) -> u16 {
        let change = period >> self.shift;
        if self.negate {
            if ones_complement {
                period.wrapping_sub(change).wrapping_sub(1)
            } else {
                period.wrapping_sub(change)
            }
        } else {
            period.wrapping_add(change)
        }
    }

    /// True when the channel is muted by the sweep unit: raw periods below 8
    /// or targets above `$7FF` silence the pulse regardless of the divider.
    pub(super) fn mutes(&self, period: u16, ones_complement: bool) -> bool {
        period < 8 || (!self.negate && self.target(period, ones_complement) > 0x7FF)
    }

    /// Half-frame clock. Returns the updated channel timer period.
    pub(super) fn clock(&mut self, period: u16, ones_complement: bool) -> u16 {
        let mut out = period;
        if self.divider == 0 && self.enabled && self.shift > 0 && !self.mutes(period, ones_complement)
        {
            out = self.target(period, ones_complement) & 0x7FF;
        }

        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }
        out
    }

    pub(super) fn sync(&mut self, c: &mut Cursor) {
        c.bool(&mut self.enabled);
        c.u8(&mut self.period);
        c.bool(&mut self.negate);
        c.u8(&mut self.shift);
        c.u8(&mut self.divider);
        c.bool(&mut self.reload);
    }
}
