#![forbid(unsafe_code)]

//! Mouse report encoders for the two terminal wire formats.
//!
//! - **SGR** (DEC mode 1006): `ESC [ < Cb ; Cx ; Cy (M|m)` with decimal
//!   parameters, unbounded coordinates, and an explicit release terminator.
//! - **X10** (legacy, mode 1000 without 1006): `ESC [ M` followed by three raw
//!   bytes, each offset by 32.
//!
//! Both encoders are pure and deterministic. The button code is built the
//! same way in both: a base code for the button, plus modifier bits
//! (`shift=4`, `alt=8`, `ctrl=16`, SGR only) and the motion bit (`32`) for
//! drag/move reports.
//!
//! # X10 saturation
//!
//! X10 stores `32 + coordinate + 1` in a single byte, so coordinates past
//! 222 cannot be represented. Instead of wrapping, the 1-indexed coordinate
//! saturates at [`X10_MAX_COORD`], pinning the report to the last encodable
//! cell.

use crate::event::{Modifiers, MouseAction, MouseButton, MouseEvent};

/// Largest 1-indexed coordinate an X10 report can carry (`32 + 223 = 255`).
pub const X10_MAX_COORD: u16 = 223;

const SHIFT_BIT: u16 = 4;
const ALT_BIT: u16 = 8;
const CTRL_BIT: u16 = 16;
const MOTION_BIT: u16 = 32;
/// "No button" / legacy release code.
const NO_BUTTON: u16 = 3;

/// Which mouse wire format to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseFormat {
    /// Extended SGR reports (default).
    #[default]
    Sgr,
    /// Legacy X10 byte-offset reports.
    X10,
}

impl MouseFormat {
    /// Parse a format name (`sgr` / `x10`, case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sgr" | "1006" => Some(Self::Sgr),
            "x10" | "legacy" => Some(Self::X10),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sgr => "sgr",
            Self::X10 => "x10",
        }
    }
}

#[inline]
const fn button_base(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::ScrollUp => 64,
        MouseButton::ScrollDown => 65,
        MouseButton::None => NO_BUTTON,
    }
}

#[inline]
const fn motion_bit(action: MouseAction) -> u16 {
    match action {
        MouseAction::Drag | MouseAction::Move => MOTION_BIT,
        _ => 0,
    }
}

#[inline]
fn modifier_bits(modifiers: Modifiers) -> u16 {
    let mut bits = 0;
    if modifiers.contains(Modifiers::SHIFT) {
        bits += SHIFT_BIT;
    }
    if modifiers.contains(Modifiers::ALT) {
        bits += ALT_BIT;
    }
    if modifiers.contains(Modifiers::CTRL) {
        bits += CTRL_BIT;
    }
    bits
}

/// Encode an SGR mouse report.
///
/// `M` terminates press/click/drag/move reports, `m` terminates releases.
#[must_use]
pub fn encode_sgr(
    x: u16,
    y: u16,
    button: MouseButton,
    action: MouseAction,
    modifiers: Modifiers,
) -> Vec<u8> {
    let code = button_base(button) + modifier_bits(modifiers) + motion_bit(action);
    let terminator = if action == MouseAction::Release {
        'm'
    } else {
        'M'
    };
    format!(
        "\x1b[<{code};{};{}{terminator}",
        u32::from(x) + 1,
        u32::from(y) + 1
    )
    .into_bytes()
}

/// Encode a legacy X10 mouse report.
///
/// Releases carry the generic release code 3 because X10 cannot say which
/// button went up. Coordinates saturate at [`X10_MAX_COORD`].
#[must_use]
pub fn encode_x10(x: u16, y: u16, button: MouseButton, action: MouseAction) -> Vec<u8> {
    let base = if action == MouseAction::Release {
        NO_BUTTON
    } else {
        button_base(button)
    };
    let code = base + motion_bit(action);
    vec![
        0x1b,
        b'[',
        b'M',
        x10_byte(code),
        x10_byte(x.saturating_add(1).min(X10_MAX_COORD)),
        x10_byte(y.saturating_add(1).min(X10_MAX_COORD)),
    ]
}

#[inline]
fn x10_byte(value: u16) -> u8 {
    // value <= 223 for coordinates and <= 97 for button codes.
    u8::try_from(32 + value).unwrap_or(u8::MAX)
}

/// Encode a normalized mouse event in the given format.
#[must_use]
pub fn encode_mouse(format: MouseFormat, event: &MouseEvent) -> Vec<u8> {
    match format {
        MouseFormat::Sgr => encode_sgr(
            event.x,
            event.y,
            event.button,
            event.action,
            event.modifiers,
        ),
        MouseFormat::X10 => encode_x10(event.x, event.y, event.button, event.action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sgr(button: MouseButton, action: MouseAction) -> Vec<u8> {
        encode_sgr(10, 5, button, action, Modifiers::NONE)
    }

    // ── SGR ────────────────────────────────────────────────────────

    #[test]
    fn sgr_left_click() {
        assert_eq!(sgr(MouseButton::Left, MouseAction::Click), b"\x1b[<0;11;6M");
    }

    #[test]
    fn sgr_right_click() {
        assert_eq!(sgr(MouseButton::Right, MouseAction::Click), b"\x1b[<2;11;6M");
    }

    #[test]
    fn sgr_middle_press() {
        assert_eq!(sgr(MouseButton::Middle, MouseAction::Press), b"\x1b[<1;11;6M");
    }

    #[test]
    fn sgr_release_uses_lowercase_m() {
        assert_eq!(sgr(MouseButton::Left, MouseAction::Release), b"\x1b[<0;11;6m");
    }

    #[test]
    fn sgr_modifiers_add_bits() {
        let bytes = encode_sgr(
            10,
            5,
            MouseButton::Left,
            MouseAction::Click,
            Modifiers::CTRL | Modifiers::SHIFT,
        );
        assert_eq!(bytes, b"\x1b[<20;11;6M");

        let alt = encode_sgr(0, 0, MouseButton::Left, MouseAction::Press, Modifiers::ALT);
        assert_eq!(alt, b"\x1b[<8;1;1M");
    }

    #[test]
    fn sgr_drag_sets_motion_bit() {
        assert_eq!(sgr(MouseButton::Left, MouseAction::Drag), b"\x1b[<32;11;6M");
    }

    #[test]
    fn sgr_plain_motion_is_35() {
        assert_eq!(sgr(MouseButton::None, MouseAction::Move), b"\x1b[<35;11;6M");
    }

    #[test]
    fn sgr_scroll_codes() {
        assert_eq!(sgr(MouseButton::ScrollUp, MouseAction::Click), b"\x1b[<64;11;6M");
        assert_eq!(
            sgr(MouseButton::ScrollDown, MouseAction::Click),
            b"\x1b[<65;11;6M"
        );
    }

    #[test]
    fn sgr_coordinates_are_unbounded() {
        let bytes = encode_sgr(
            u16::MAX,
            999,
            MouseButton::Left,
            MouseAction::Press,
            Modifiers::NONE,
        );
        assert_eq!(bytes, b"\x1b[<0;65536;1000M");
    }

    // ── X10 ────────────────────────────────────────────────────────

    #[test]
    fn x10_left_click() {
        assert_eq!(
            encode_x10(10, 5, MouseButton::Left, MouseAction::Click),
            b"\x1b[M +&"
        );
    }

    #[test]
    fn x10_right_click() {
        assert_eq!(
            encode_x10(10, 5, MouseButton::Right, MouseAction::Click),
            b"\x1b[M\"+&"
        );
    }

    #[test]
    fn x10_release_is_code_three() {
        assert_eq!(
            encode_x10(0, 0, MouseButton::Left, MouseAction::Release),
            b"\x1b[M#!!"
        );
    }

    #[test]
    fn x10_saturates_large_coordinates() {
        let bytes = encode_x10(500, 222, MouseButton::Left, MouseAction::Press);
        assert_eq!(bytes, vec![0x1b, b'[', b'M', 32, 255, 255]);
        let edge = encode_x10(221, 0, MouseButton::Left, MouseAction::Press);
        assert_eq!(edge[4], 32 + 222);
    }

    #[test]
    fn encode_mouse_dispatches_on_format() {
        let event = MouseEvent::new(10, 5, MouseButton::Left, MouseAction::Click);
        assert_eq!(encode_mouse(MouseFormat::Sgr, &event), b"\x1b[<0;11;6M");
        assert_eq!(encode_mouse(MouseFormat::X10, &event), b"\x1b[M +&");
    }

    #[test]
    fn format_parse() {
        assert_eq!(MouseFormat::parse("SGR"), Some(MouseFormat::Sgr));
        assert_eq!(MouseFormat::parse("x10"), Some(MouseFormat::X10));
        assert_eq!(MouseFormat::parse("urxvt"), None);
        assert_eq!(MouseFormat::default().as_str(), "sgr");
    }
}
