#![forbid(unsafe_code)]

//! Outbound key and paste encoding.
//!
//! Converts logical key events into the byte sequences a terminal would send
//! to the application for them. This is the inverse of the key half of
//! [`InputParser`](crate::input_parser::InputParser):
//!
//! | Key | Bytes |
//! |-----|-------|
//! | plain char | the char, UTF-8 |
//! | `ctrl+<letter>` | `letter - 96` (`ctrl+a` = `0x01`) |
//! | `alt+<key>` | `ESC` + the key's bytes |
//! | Escape / Enter / Tab / Backspace | `1b` / `0d` / `09` / `7f` |
//! | arrows | `CSI A/B/C/D` (`CSI 1;<m> A` with modifiers) |
//! | Home / End | `CSI H` / `CSI F` |
//! | Insert / Delete / PgUp / PgDn | `CSI 2~` / `3~` / `5~` / `6~` |
//! | F1-F4 / F5-F12 | `SS3 P..S` / `CSI 15~ .. 24~` |

use crate::event::{KeyCode, KeyEvent, Modifiers};

/// Bracketed paste start marker.
pub const PASTE_START: &[u8] = b"\x1b[200~";
/// Bracketed paste end marker.
pub const PASTE_END: &[u8] = b"\x1b[201~";

/// Encode a key event as terminal input bytes.
#[must_use]
pub fn encode_key(key: &KeyEvent) -> Vec<u8> {
    let mods = key.modifiers;
    match key.code {
        KeyCode::Char(c) => encode_char(c, mods),
        KeyCode::Enter => alt_prefixed(b"\r", mods),
        KeyCode::Escape => alt_prefixed(b"\x1b", mods),
        KeyCode::Tab if mods.contains(Modifiers::SHIFT) => b"\x1b[Z".to_vec(),
        KeyCode::Tab => alt_prefixed(b"\t", mods),
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Backspace => alt_prefixed(b"\x7f", mods),
        KeyCode::Up => csi_letter(b'A', mods),
        KeyCode::Down => csi_letter(b'B', mods),
        KeyCode::Right => csi_letter(b'C', mods),
        KeyCode::Left => csi_letter(b'D', mods),
        KeyCode::Home => csi_letter(b'H', mods),
        KeyCode::End => csi_letter(b'F', mods),
        KeyCode::Insert => csi_tilde(2, mods),
        KeyCode::Delete => csi_tilde(3, mods),
        KeyCode::PageUp => csi_tilde(5, mods),
        KeyCode::PageDown => csi_tilde(6, mods),
        KeyCode::F(n) => encode_function_key(n, mods),
    }
}

/// Encode pasted text, wrapping it in `ESC[200~ … ESC[201~` when `bracketed`.
#[must_use]
pub fn encode_paste(text: &str, bracketed: bool) -> Vec<u8> {
    if !bracketed {
        return text.as_bytes().to_vec();
    }
    let mut out = Vec::with_capacity(PASTE_START.len() + text.len() + PASTE_END.len());
    out.extend_from_slice(PASTE_START);
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(PASTE_END);
    out
}

fn encode_char(c: char, mods: Modifiers) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    if mods.contains(Modifiers::ALT) {
        out.push(0x1b);
    }
    if mods.contains(Modifiers::CTRL)
        && let Some(byte) = ctrl_byte(c)
    {
        out.push(byte);
        return out;
    }
    let c = if mods.contains(Modifiers::SHIFT) && c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c
    };
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    out
}

/// Control byte for `ctrl+c`, or `None` when the char has no C0 mapping.
fn ctrl_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - 96),
        'A'..='Z' => Some(c.to_ascii_lowercase() as u8 - 96),
        ' ' | '@' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '8' | '?' => Some(0x7f),
        _ => None,
    }
}

fn alt_prefixed(bytes: &[u8], mods: Modifiers) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    if mods.contains(Modifiers::ALT) {
        out.push(0x1b);
    }
    out.extend_from_slice(bytes);
    out
}

/// xterm modifier parameter: `1 + shift(1) + alt(2) + ctrl(4) + super(8)`.
fn xterm_modifier_param(mods: Modifiers) -> Option<u8> {
    let mut bits = 0u8;
    if mods.contains(Modifiers::SHIFT) {
        bits |= 1;
    }
    if mods.contains(Modifiers::ALT) {
        bits |= 2;
    }
    if mods.contains(Modifiers::CTRL) {
        bits |= 4;
    }
    if mods.contains(Modifiers::SUPER) {
        bits |= 8;
    }
    (bits != 0).then_some(bits + 1)
}

fn csi_letter(letter: u8, mods: Modifiers) -> Vec<u8> {
    match xterm_modifier_param(mods) {
        Some(m) => {
            let mut out = format!("\x1b[1;{m}").into_bytes();
            out.push(letter);
            out
        }
        None => vec![0x1b, b'[', letter],
    }
}

fn csi_tilde(num: u8, mods: Modifiers) -> Vec<u8> {
    match xterm_modifier_param(mods) {
        Some(m) => format!("\x1b[{num};{m}~").into_bytes(),
        None => format!("\x1b[{num}~").into_bytes(),
    }
}

fn encode_function_key(n: u8, mods: Modifiers) -> Vec<u8> {
    match n {
        1..=4 => {
            let letter = b'P' + (n - 1);
            match xterm_modifier_param(mods) {
                Some(_) => csi_letter(letter, mods),
                None => vec![0x1b, b'O', letter],
            }
        }
        5 => csi_tilde(15, mods),
        6..=10 => csi_tilde(n + 11, mods),
        11 | 12 => csi_tilde(n + 12, mods),
        _ => Vec::new(),
    }
}
