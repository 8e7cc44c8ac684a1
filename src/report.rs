//! Gamepad input report encoding.
//!
//! Layout (8 bytes, matching the Pokken controller descriptor):
//! ```text
//! Bytes 0-1: Button bitmask, little endian
//! Byte  2:   HAT switch, one nibble (high nibble unused, zero)
//! Byte  3:   Left  stick X
//! Byte  4:   Left  stick Y
//! Byte  5:   Right stick X
//! Byte  6:   Right stick Y
//! Byte  7:   Vendor byte, always zero
//! ```

use bitflags::bitflags;

use crate::planner::Intent;

/// Input report size in bytes.
pub const REPORT_SIZE: usize = 8;

pub const STICK_MIN: u8 = 0;
pub const STICK_CENTER: u8 = 128;
pub const STICK_MAX: u8 = 255;

bitflags! {
    /// The 16 logical buttons, in descriptor bit order.
    ///
    /// The console makes use of 14 of them; this program only ever presses
    /// A (stamp / confirm), L (shrink brush) and the left stick click
    /// (clear page).
    pub struct Buttons: u16 {
        const Y       = 0x0001;
        const B       = 0x0002;
        const A       = 0x0004;
        const X       = 0x0008;
        const L       = 0x0010;
        const R       = 0x0020;
        const ZL      = 0x0040;
        const ZR      = 0x0080;
        const MINUS   = 0x0100;
        const PLUS    = 0x0200;
        const LCLICK  = 0x0400;
        const RCLICK  = 0x0800;
        const HOME    = 0x1000;
        const CAPTURE = 0x2000;
    }
}

/// 8-way HAT switch value plus "centered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Hat {
    Top = 0x00,
    TopRight = 0x01,
    Right = 0x02,
    BottomRight = 0x03,
    Bottom = 0x04,
    BottomLeft = 0x05,
    Left = 0x06,
    TopLeft = 0x07,
    Center = 0x08,
}

impl Hat {
    /// Direction of travel from the previous cursor cell to the current
    /// one. No movement maps to `Center`.
    pub fn from_delta(dcol: i32, drow: i32) -> Self {
        match (dcol.signum(), drow.signum()) {
            (1, 1) => Self::BottomRight,
            (-1, 1) => Self::BottomLeft,
            (1, -1) => Self::TopRight,
            (-1, -1) => Self::TopLeft,
            (1, 0) => Self::Right,
            (-1, 0) => Self::Left,
            (0, 1) => Self::Bottom,
            (0, -1) => Self::Top,
            _ => Self::Center,
        }
    }
}

/// One controller input snapshot.
///
/// Transient: built from a planner intent, serialized, written, dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputReport {
    pub buttons: Buttons,
    pub hat: Hat,
    pub lx: u8,
    pub ly: u8,
    pub rx: u8,
    pub ry: u8,
}

impl InputReport {
    /// A report with nothing pressed and both sticks centered.
    ///
    /// Written once on the way out so the console is not left with a
    /// button held down.
    pub fn neutral() -> Self {
        InputReport {
            buttons: Buttons::empty(),
            hat: Hat::Center,
            lx: STICK_CENTER,
            ly: STICK_CENTER,
            rx: STICK_CENTER,
            ry: STICK_CENTER,
        }
    }

    /// Encode a planner intent.
    ///
    /// Pure and stateless: the same intent always encodes to the same
    /// report. During calibration the left stick is pinned to minimum so
    /// the cursor ends up in the top-left corner; the right stick never
    /// leaves center.
    pub fn from_intent(intent: &Intent) -> Self {
        let left = if intent.hold_origin {
            STICK_MIN
        } else {
            STICK_CENTER
        };
        InputReport {
            buttons: intent.buttons,
            hat: intent.hat,
            lx: left,
            ly: left,
            rx: STICK_CENTER,
            ry: STICK_CENTER,
        }
    }

    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let buttons = self.buttons.bits().to_le_bytes();
        [
            buttons[0],
            buttons[1],
            self.hat as u8,
            self.lx,
            self.ly,
            self.rx,
            self.ry,
            0x00, // vendor byte
        ]
    }
}

/// HID report descriptor the console expects.
///
/// Expanded from the original HORI descriptor to a full 16 buttons; the
/// output report is a mirror of the input and exists only because the
/// console requires the descriptor to be present.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    //
    // - Buttons (2 bytes) -
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x35, 0x00, //   Physical Minimum (0)
    0x45, 0x01, //   Physical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // - HAT switch (1 nibble + pad nibble) -
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x25, 0x07, //   Logical Maximum (7)
    0x46, 0x3B, 0x01, // Physical Maximum (315)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x65, 0x14, //   Unit (Degrees)
    0x09, 0x39, //   Usage (Hat Switch)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - pad nibble
    //
    // - Sticks (4 bytes) -
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x46, 0xFF, 0x00, // Physical Maximum (255)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // - Vendor specific (1 byte) -
    0x06, 0x00, 0xFF, // Usage Page (Vendor 0xFF00)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // - Output mirror (8 bytes) -
    0x0A, 0x21, 0x26, // Usage (0x2621)
    0x95, 0x08, //   Report Count (8)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Intent;

    const ALL_HATS: [Hat; 9] = [
        Hat::Top,
        Hat::TopRight,
        Hat::Right,
        Hat::BottomRight,
        Hat::Bottom,
        Hat::BottomLeft,
        Hat::Left,
        Hat::TopLeft,
        Hat::Center,
    ];

    #[test]
    fn test_neutral_report_bytes() {
        let bytes = InputReport::neutral().to_bytes();
        assert_eq!(bytes, [0x00, 0x00, 0x08, 128, 128, 128, 128, 0x00]);
    }

    #[test]
    fn test_hat_wire_values() {
        for (value, hat) in ALL_HATS.iter().enumerate().take(8) {
            assert_eq!(*hat as u8, value as u8);
        }
        assert_eq!(Hat::Center as u8, 0x08);
    }

    #[test]
    fn test_hat_from_delta_covers_all_combinations() {
        assert_eq!(Hat::from_delta(0, -1), Hat::Top);
        assert_eq!(Hat::from_delta(5, -2), Hat::TopRight);
        assert_eq!(Hat::from_delta(1, 0), Hat::Right);
        assert_eq!(Hat::from_delta(3, 1), Hat::BottomRight);
        assert_eq!(Hat::from_delta(0, 9), Hat::Bottom);
        assert_eq!(Hat::from_delta(-1, 1), Hat::BottomLeft);
        assert_eq!(Hat::from_delta(-4, 0), Hat::Left);
        assert_eq!(Hat::from_delta(-1, -1), Hat::TopLeft);
        assert_eq!(Hat::from_delta(0, 0), Hat::Center);
    }

    #[test]
    fn test_encode_exact_bits_across_intent_space() {
        let masks = [
            Buttons::empty(),
            Buttons::A,
            Buttons::L,
            Buttons::LCLICK,
            Buttons::A | Buttons::L,
        ];
        for hat in ALL_HATS.iter() {
            for buttons in masks.iter() {
                for hold_origin in [false, true].iter() {
                    let intent = Intent {
                        buttons: *buttons,
                        hat: *hat,
                        hold_origin: *hold_origin,
                    };
                    let bytes = InputReport::from_intent(&intent).to_bytes();
                    let wire_buttons = u16::from_le_bytes([bytes[0], bytes[1]]);
                    assert_eq!(wire_buttons, buttons.bits());
                    assert_eq!(bytes[2], *hat as u8);
                    assert_eq!(bytes[2] & 0xF0, 0, "high nibble must stay clear");
                    let expected = if *hold_origin { STICK_MIN } else { STICK_CENTER };
                    assert_eq!(bytes[3], expected);
                    assert_eq!(bytes[4], expected);
                    // right stick never moves
                    assert_eq!(bytes[5], STICK_CENTER);
                    assert_eq!(bytes[6], STICK_CENTER);
                    assert_eq!(bytes[7], 0, "vendor byte must stay zero");
                }
            }
        }
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let intent = Intent {
            buttons: Buttons::A,
            hat: Hat::BottomLeft,
            hold_origin: false,
        };
        assert_eq!(
            InputReport::from_intent(&intent),
            InputReport::from_intent(&intent)
        );
    }
}
