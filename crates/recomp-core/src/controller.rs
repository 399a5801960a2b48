//! Two-port NES controller (joypad) interface.
//!
//! Implements the standard 8-button pad readable through `$4016/$4017`. Both
//! ports share a single strobe line written through `$4016`.

/// Button ordering follows the NES shift register bit layout (A first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    /// All buttons in shift-out order.
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Single-bit mask for this button.
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    /// Builds a mask from a list of pressed buttons.
    pub fn mask_of(buttons: &[Button]) -> u8 {
        buttons.iter().fold(0, |mask, b| mask | b.mask())
    }
}

/// Number of serial reads that carry button data before the open-bus tail.
const BUTTON_BITS: u8 = 8;

/// One controller's serial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controller {
    /// Live button mask as set by the driver.
    state: u8,
    /// Shift register snapshot exposed bit by bit.
    shift: u8,
    /// Shifts performed since the last latch.
    reads: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    fn latch(&mut self) {
        self.shift = self.state;
        self.reads = 0;
    }

    fn read(&mut self, strobe: bool) -> u8 {
        if strobe {
            self.latch();
            return self.shift & 0x01;
        }
        if self.reads >= BUTTON_BITS {
            return 0x01;
        }
        let bit = self.shift & 0x01;
        self.shift >>= 1;
        self.reads += 1;
        bit
    }

    fn peek(&self, strobe: bool) -> u8 {
        if strobe {
            self.state & 0x01
        } else if self.reads >= BUTTON_BITS {
            0x01
        } else {
            self.shift & 0x01
        }
    }

    /// Live button mask.
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Current shift register contents.
    pub fn shift_register(&self) -> u8 {
        self.shift
    }
}

/// Both controller ports plus the shared strobe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerPorts {
    ports: [Controller; 2],
    strobe: bool,
}

impl ControllerPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the mask for one port. Ports other than 0 and 1 are ignored.
    pub fn set_buttons(&mut self, port: usize, mask: u8) {
        let strobe = self.strobe;
        if let Some(pad) = self.ports.get_mut(port) {
            pad.state = mask;
            if strobe {
                pad.latch();
            }
        }
    }

    /// Update a single button's pressed state.
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        let Some(current) = self.ports.get(port).map(Controller::state) else {
            return;
        };
        let mask = if pressed {
            current | button.mask()
        } else {
            current & !button.mask()
        };
        self.set_buttons(port, mask);
    }

    /// Writes to `$4016`. A rising edge latches both ports.
    pub fn write_strobe(&mut self, data: u8) {
        let strobe = (data & 0x01) != 0;
        if strobe && !self.strobe {
            for pad in &mut self.ports {
                pad.latch();
            }
        }
        self.strobe = strobe;
    }

    /// Reads the next bit for `port`.
    ///
    /// Bits come out LSB first (A, B, Select, Start, Up, Down, Left, Right).
    /// While strobe is high the register keeps relatching, so every read
    /// returns the live A bit. Reads past the eighth return 1.
    pub fn read(&mut self, port: usize) -> u8 {
        let strobe = self.strobe;
        self.ports.get_mut(port).map_or(0, |pad| pad.read(strobe))
    }

    /// Side-effect-free variant of [`Self::read`].
    pub fn peek(&self, port: usize) -> u8 {
        self.ports.get(port).map_or(0, |pad| pad.peek(self.strobe))
    }

    pub fn strobe(&self) -> bool {
        self.strobe
    }

    pub fn port(&self, port: usize) -> Option<&Controller> {
        self.ports.get(port)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strobe(ports: &mut ControllerPorts) {
        ports.write_strobe(1);
        ports.write_strobe(0);
    }

    #[test]
    fn serial_read_is_lsb_first() {
        let mut ports = ControllerPorts::new();
        let mask = 0b1010_0110;
        ports.set_buttons(0, mask);
        strobe(&mut ports);

        for bit in 0..8 {
            assert_eq!(ports.read(0), (mask >> bit) & 1, "bit {bit}");
        }
        assert_eq!(ports.read(0), 1, "ninth read is open bus");
        assert_eq!(ports.read(0), 1);
    }

    #[test]
    fn strobe_high_never_advances() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(1, Button::A.mask() | Button::Start.mask());
        ports.write_strobe(1);
        for _ in 0..20 {
            assert_eq!(ports.read(1), 1);
        }

        // Relatch tracks the live state while strobe is held.
        ports.set_buttons(1, Button::B.mask());
        assert_eq!(ports.read(1), 0);
    }

    #[test]
    fn only_rising_edge_latches() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, 0xFF);
        strobe(&mut ports);
        assert_eq!(ports.read(0), 1);

        // Low -> low must not relatch: the register keeps shifting.
        ports.set_buttons(0, 0x00);
        ports.write_strobe(0);
        for _ in 1..8 {
            assert_eq!(ports.read(0), 1);
        }
        assert_eq!(ports.port(0).map(Controller::shift_register), Some(0));
    }

    #[test]
    fn ports_shift_independently() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, Button::Right.mask());
        ports.set_buttons(1, Button::A.mask());
        strobe(&mut ports);

        assert_eq!(ports.read(1), 1);
        for _ in 0..7 {
            assert_eq!(ports.read(0), 0);
        }
        assert_eq!(ports.read(0), 1);
        assert_eq!(ports.read(1), 0);
    }

    #[test]
    fn out_of_range_port_is_ignored() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(2, 0xFF);
        ports.set_button(7, Button::A, true);
        assert_eq!(ports, ControllerPorts::new());
        assert_eq!(ports.read(5), 0);
    }

    #[test]
    fn msb_first_reassembly_reverses_order() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, Button::Right.mask());
        strobe(&mut ports);

        let mut assembled = 0u8;
        for _ in 0..8 {
            assembled = (assembled << 1) | ports.read(0);
        }
        assert_eq!(assembled, 0x01);
    }

    #[test]
    fn reset_clears_open_bus_tail() {
        let mut ports = ControllerPorts::new();
        ports.set_buttons(0, 0xFF);
        strobe(&mut ports);
        for _ in 0..10 {
            ports.read(0);
        }
        ports.reset();
        assert!(!ports.strobe());
        for _ in 0..8 {
            assert_eq!(ports.read(0), 0);
        }
        assert_eq!(ports.read(0), 1);
    }

    #[test]
    fn set_button_updates_single_bit() {
        let mut ports = ControllerPorts::new();
        ports.set_button(0, Button::Up, true);
        ports.set_button(0, Button::B, true);
        ports.set_button(0, Button::Up, false);
        assert_eq!(ports.port(0).map(Controller::state), Some(Button::B.mask()));
        assert_eq!(Button::mask_of(&[Button::A, Button::Right]), 0x81);
    }
}
