use proptest::prelude::*;
use recomp_core::{
    ControllerPorts, Ppu,
    memory::ppu::Register as PpuRegister,
    ppu::{Control, Status},
};

#[derive(Debug, Clone)]
enum PadOp {
    SetButtons(usize, u8),
    Strobe(u8),
    Read(usize),
}

fn pad_op() -> impl Strategy<Value = PadOp> {
    prop_oneof![
        (0usize..3, any::<u8>()).prop_map(|(port, mask)| PadOp::SetButtons(port, mask)),
        any::<u8>().prop_map(PadOp::Strobe),
        (0usize..3).prop_map(PadOp::Read),
    ]
}

fn apply(ports: &mut ControllerPorts, op: &PadOp) {
    match *op {
        PadOp::SetButtons(port, mask) => ports.set_buttons(port, mask),
        PadOp::Strobe(value) => ports.write_strobe(value),
        PadOp::Read(port) => {
            ports.read(port);
        }
    }
}

/// Any CPU write into the register window, mirrors included.
fn register_write() -> impl Strategy<Value = (u16, u8)> {
    (0x2000u16..=0x3FFF, any::<u8>())
}

proptest! {
    #[test]
    fn strobe_pulse_shifts_out_latched_mask(
        history in prop::collection::vec(pad_op(), 0..40),
        port in 0usize..2,
        mask in any::<u8>(),
    ) {
        let mut ports = ControllerPorts::new();
        for op in &history {
            apply(&mut ports, op);
        }
        ports.set_buttons(port, mask);
        ports.write_strobe(1);
        ports.write_strobe(0);

        for bit in 0..8 {
            prop_assert_eq!(ports.read(port), (mask >> bit) & 1, "bit {}", bit);
        }
        prop_assert_eq!(ports.read(port), 1);
    }

    #[test]
    fn strobe_high_always_returns_live_a_bit(
        history in prop::collection::vec(pad_op(), 0..40),
        masks in prop::collection::vec(any::<u8>(), 1..20),
    ) {
        let mut ports = ControllerPorts::new();
        for op in &history {
            apply(&mut ports, op);
        }
        ports.write_strobe(1);
        for mask in masks {
            ports.set_buttons(0, mask);
            for _ in 0..3 {
                prop_assert_eq!(ports.read(0), mask & 1);
            }
        }
    }

    #[test]
    fn status_read_puts_next_scroll_write_in_x(
        writes in prop::collection::vec(register_write(), 0..64),
        x in any::<u8>(),
    ) {
        let mut ppu = Ppu::new();
        ppu.begin_vblank();
        for (addr, value) in writes {
            ppu.cpu_write(addr, value);
        }
        let (_, y_before) = ppu.scroll();

        let status = ppu.cpu_read(PpuRegister::Status.addr());
        prop_assert!(!ppu.write_toggle());
        prop_assert_ne!(status & Status::VERTICAL_BLANK.bits(), 0);
        prop_assert!(!ppu.status().contains(Status::VERTICAL_BLANK));

        ppu.cpu_write(PpuRegister::Scroll.addr(), x);
        prop_assert_eq!(ppu.scroll(), (x, y_before));
        prop_assert!(ppu.write_toggle());
    }

    #[test]
    fn increment_32_advances_by_32_per_byte(
        start in 0u16..0x4000,
        count in 0u16..600,
    ) {
        let mut ppu = Ppu::new();
        ppu.cpu_write(PpuRegister::Control.addr(), Control::INCREMENT_32.bits());
        ppu.cpu_write(PpuRegister::Addr.addr(), (start >> 8) as u8);
        ppu.cpu_write(PpuRegister::Addr.addr(), start as u8);
        prop_assert_eq!(ppu.vram_addr(), start);

        for i in 0..count {
            ppu.cpu_write(PpuRegister::Data.addr(), i as u8);
        }
        let expected = (u32::from(start) + 32 * u32::from(count)) & 0x3FFF;
        prop_assert_eq!(u32::from(ppu.vram_addr()), expected);
    }
}
