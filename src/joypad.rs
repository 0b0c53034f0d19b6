/// Game Boy joypad state.
///
/// Action and direction states are each a 4-bit nibble where 1 = released,
/// matching the JOYP register's own polarity, so the register read is a
/// plain bitwise select rather than an inversion per access.
pub struct Joypad {
    /// Start=bit3, Select=bit2, B=bit1, A=bit0. 1 = released.
    action: u8,
    /// Down=bit3, Up=bit2, Left=bit1, Right=bit0. 1 = released.
    direction: u8,

    /// Bits 5-4 as last written by the CPU; select which nibble reads into
    /// bits 3-0.
    select: u8,

    pub interrupt_requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoypadButton {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub fn new() -> Self {
        Joypad {
            action: 0x0F,
            direction: 0x0F,
            select: 0x00,
            interrupt_requested: false,
        }
    }

    fn bit(button: JoypadButton) -> (bool, u8) {
        match button {
            JoypadButton::A => (false, 0x01),
            JoypadButton::B => (false, 0x02),
            JoypadButton::Select => (false, 0x04),
            JoypadButton::Start => (false, 0x08),
            JoypadButton::Right => (true, 0x01),
            JoypadButton::Left => (true, 0x02),
            JoypadButton::Up => (true, 0x04),
            JoypadButton::Down => (true, 0x08),
        }
    }

    /// Press a button. Raises the Joypad interrupt unconditionally,
    /// regardless of which nibble is currently selected in JOYP.
    pub fn press(&mut self, button: JoypadButton) {
        let (is_direction, mask) = Self::bit(button);
        if is_direction {
            self.direction &= !mask;
        } else {
            self.action &= !mask;
        }
        self.interrupt_requested = true;
    }

    pub fn release(&mut self, button: JoypadButton) {
        let (is_direction, mask) = Self::bit(button);
        if is_direction {
            self.direction |= mask;
        } else {
            self.action |= mask;
        }
    }

    pub fn is_pressed(&self, button: JoypadButton) -> bool {
        let (is_direction, mask) = Self::bit(button);
        if is_direction {
            self.direction & mask == 0
        } else {
            self.action & mask == 0
        }
    }

    /// Read the JOYP register (bits 7-6 hardwired high).
    pub fn read(&self) -> u8 {
        let select_buttons = self.select & 0x20 == 0;
        let select_directions = self.select & 0x10 == 0;

        let low = match (select_buttons, select_directions) {
            (true, true) => self.action & self.direction,
            (true, false) => self.action,
            (false, true) => self.direction,
            (false, false) => 0x0F,
        };

        0xC0 | self.select | (low & 0x0F)
    }

    /// Write to JOYP: only bits 5-4 are CPU-writable.
    pub fn write(&mut self, value: u8) {
        self.select = value & 0x30;
    }

    pub fn clear_interrupt(&mut self) {
        self.interrupt_requested = false;
    }

    pub fn get_pressed_buttons(&self) -> Vec<JoypadButton> {
        use JoypadButton::*;
        [A, B, Select, Start, Right, Left, Up, Down]
            .into_iter()
            .filter(|&b| self.is_pressed(b))
            .collect()
    }
}
