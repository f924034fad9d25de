//! Pulse (square wave) channel.

use super::{envelope::Envelope, length_counter::LengthCounter, sweep::Sweep};
use crate::state::Cursor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct Pulse {
    /// Pulse 1 uses ones'-complement sweep negation.
    ones_complement: bool,
    enabled: bool,

    duty: u8,
    sequence_pos: u8,
    timer_period: u16,
    timer: u16,

    envelope: Envelope,
    sweep: Sweep,
    length: LengthCounter,
}

impl Pulse {
    pub(super) fn new(ones_complement: bool) -> Self {
        Self {
            ones_complement,
            ..Self::default()
        }
    }

    pub(super) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x3 {
            0 => {
                self.duty = value >> 6;
                self.envelope.configure(value);
            }
            1 => self.sweep.configure(value),
            2 => {
                self.timer_period = (self.timer_period & 0x0700) | value as u16;
            }
            _ => {
                self.timer_period =
                    (self.timer_period & 0x00FF) | (((value & 0x07) as u16) << 8);
                self.length.load(value >> 3, self.enabled);
                self.sequence_pos = 0;
                self.envelope.restart();
            }
        }
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length.clear();
        }
    }

    pub(super) fn active(&self) -> bool {
        self.length.active()
    }

    /// Timer clock; called every other CPU cycle.
    pub(super) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            self.sequence_pos = (self.sequence_pos + 1) & 0x07;
        } else {
            self.timer -= 1;
        }
    }

    pub(super) fn clock_quarter(&mut self) {
        self.envelope.clock();
    }

    pub(super) fn clock_half(&mut self) {
        self.length.clock(self.envelope.halt_length());
        self.timer_period = self.sweep.clock(self.timer_period, self.ones_complement);
    }

    pub(super) fn sync(&mut self, c: &mut Cursor) {
        c.bool(&mut self.enabled);
        c.u8(&mut self.duty);
        c.u8(&mut self.sequence_pos);
        c.u16(&mut self.timer_period);
        c.u16(&mut self.timer);
        self.envelope.sync(c);
        self.sweep.sync(c);
        self.length.sync(c);
    }
}
