use crate::interrupts;

/// Snapshot of the eight DMG buttons as the host sees them (`true` =
/// pressed). The frontend hands one of these to the core once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub a: bool,
    pub b: bool,
    pub start: bool,
    pub select: bool,
}

/// The joypad register P1/JOYP (`0xFF00`).
///
/// The register is a 2x4 key matrix: writing bit 5 low selects the action
/// buttons row, bit 4 low the direction row, and the low four bits read the
/// selected row(s) active-low. Selecting both rows ANDs them together.
pub struct Input {
    /// Row-select bits as last written (only bits 4-5 are kept).
    select: u8,
    state: Buttons,
}

impl Input {
    pub fn new() -> Self {
        Self {
            // Neither row selected at power-on.
            select: 0x30,
            state: Buttons::default(),
        }
    }

    /// Replace the button state, requesting the joypad interrupt on any
    /// released-to-pressed edge. Releases never interrupt.
    pub fn set_buttons(&mut self, next: Buttons, if_reg: &mut u8) {
        let prev = self.state;
        let pressed_edge = (!prev.up && next.up)
            || (!prev.down && next.down)
            || (!prev.left && next.left)
            || (!prev.right && next.right)
            || (!prev.a && next.a)
            || (!prev.b && next.b)
            || (!prev.start && next.start)
            || (!prev.select && next.select);
        self.state = next;
        if pressed_edge {
            *if_reg |= interrupts::JOYPAD;
        }
    }

    pub fn write(&mut self, val: u8) {
        self.select = val & 0x30;
    }

    pub fn read(&self) -> u8 {
        let mut nibble = 0x0F;
        if self.select & 0x20 == 0 {
            // Action row: bit 0 = A, 1 = B, 2 = Select, 3 = Start.
            nibble &= Self::row_bits(
                self.state.a,
                self.state.b,
                self.state.select,
                self.state.start,
            );
        }
        if self.select & 0x10 == 0 {
            // Direction row: bit 0 = Right, 1 = Left, 2 = Up, 3 = Down.
            nibble &= Self::row_bits(
                self.state.right,
                self.state.left,
                self.state.up,
                self.state.down,
            );
        }
        0xC0 | self.select | nibble
    }

    fn row_bits(b0: bool, b1: bool, b2: bool, b3: bool) -> u8 {
        let mut bits = 0x0F;
        if b0 {
            bits &= !0x01;
        }
        if b1 {
            bits &= !0x02;
        }
        if b2 {
            bits &= !0x04;
        }
        if b3 {
            bits &= !0x08;
        }
        bits
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
