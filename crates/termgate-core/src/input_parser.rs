#![forbid(unsafe_code)]

//! Input parser state machine.
//!
//! Decodes terminal input bytes (what a real terminal writes to the
//! application's stdin, or what [`encode_key`](crate::key_codec::encode_key)
//! and [`encode_mouse`](crate::mouse_codec::encode_mouse) synthesize) into
//! [`Event`] values.
//!
//! # Design
//!
//! The parser is a byte-driven state machine that handles:
//! - ASCII characters and C0 control codes (ctrl+letter)
//! - UTF-8 multi-byte sequences
//! - `ESC <char>` alt-prefixed keys
//! - CSI sequences: cursor/navigation keys, tilde keys, focus events
//! - SS3 sequences (F1-F4, application-mode arrows)
//! - Bracketed paste
//! - Mouse reports in SGR (`CSI < b;x;y M/m`) and X10 (`CSI M bxy`) format
//!
//! OSC sequences are consumed and dropped.
//!
//! Sequences split across successive [`parse`](InputParser::parse) calls
//! decode exactly as if they had arrived in one chunk.
//!
//! # DoS Protection
//!
//! - CSI sequences: 256 bytes max
//! - OSC sequences: 4KB max
//! - Paste content: 1MB max (excess is dropped, the end marker is still honored)

use crate::event::{
    Event, KeyCode, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent, PasteEvent,
};
use crate::key_codec::PASTE_END;

/// DoS protection: maximum CSI sequence length.
const MAX_CSI_LEN: usize = 256;

/// DoS protection: maximum OSC sequence length.
const MAX_OSC_LEN: usize = 4096;

/// DoS protection: maximum paste content length.
const MAX_PASTE_LEN: usize = 1024 * 1024; // 1MB

/// Parser state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParserState {
    /// Normal character input.
    #[default]
    Ground,
    /// After ESC (0x1B).
    Escape,
    /// After ESC [ (CSI introducer).
    Csi,
    /// Collecting CSI parameters.
    CsiParam,
    /// After ESC O (SS3 introducer).
    Ss3,
    /// Collecting OSC content.
    Osc,
    /// After ESC inside OSC (for ESC \ terminator).
    OscEscape,
    /// After `CSI M`: collecting the three raw X10 mouse bytes.
    X10Mouse { collected: u8 },
    /// Collecting UTF-8 multi-byte sequence.
    Utf8 {
        /// Bytes collected so far.
        collected: u8,
        /// Total bytes expected.
        expected: u8,
    },
}

/// Terminal input parser with DoS protection.
///
/// ```
/// use termgate_core::{Event, InputParser, KeyCode};
///
/// let mut parser = InputParser::new();
/// let events = parser.parse(b"\x1b[A");
/// assert!(matches!(events.as_slice(), [Event::Key(k)] if k.code == KeyCode::Up));
/// ```
#[derive(Debug)]
pub struct InputParser {
    /// Current parser state.
    state: ParserState,
    /// Buffer for accumulating sequence bytes.
    buffer: Vec<u8>,
    /// Buffer for collecting paste content.
    paste_buffer: Vec<u8>,
    /// UTF-8 bytes collected so far.
    utf8_buffer: [u8; 4],
    /// X10 mouse payload collected so far.
    x10_buffer: [u8; 3],
    /// Whether we're inside a bracketed paste.
    in_paste: bool,
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InputParser {
    /// Create a new input parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ParserState::Ground,
            buffer: Vec::with_capacity(64),
            paste_buffer: Vec::new(),
            utf8_buffer: [0; 4],
            x10_buffer: [0; 3],
            in_paste: false,
        }
    }

    /// Parse input bytes and return any completed events.
    pub fn parse(&mut self, input: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        for &byte in input {
            if let Some(event) = self.process_byte(byte) {
                events.push(event);
            }
        }
        events
    }

    /// Resolve a dangling lone `ESC` as the Escape key.
    ///
    /// A bare ESC is ambiguous until the next byte arrives; callers that know
    /// the input chunk is complete (e.g. after a read timeout) call this.
    pub fn flush(&mut self) -> Option<Event> {
        if self.state == ParserState::Escape {
            self.state = ParserState::Ground;
            return Some(Event::Key(KeyEvent::new(KeyCode::Escape)));
        }
        None
    }

    /// Whether the parser is mid-sequence (or mid-paste).
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_paste || self.state != ParserState::Ground
    }

    /// Process a single byte and optionally return an event.
    fn process_byte(&mut self, byte: u8) -> Option<Event> {
        // In paste mode, collect bytes until end sequence
        if self.in_paste {
            return self.process_paste_byte(byte);
        }

        match self.state {
            ParserState::Ground => self.process_ground(byte),
            ParserState::Escape => self.process_escape(byte),
            ParserState::Csi => self.process_csi(byte),
            ParserState::CsiParam => self.process_csi_param(byte),
            ParserState::Ss3 => self.process_ss3(byte),
            ParserState::Osc => self.process_osc(byte),
            ParserState::OscEscape => self.process_osc_escape(byte),
            ParserState::X10Mouse { collected } => self.process_x10_mouse(byte, collected),
            ParserState::Utf8 {
                collected,
                expected,
            } => self.process_utf8(byte, collected, expected),
        }
    }

    /// Process byte in ground state.
    fn process_ground(&mut self, byte: u8) -> Option<Event> {
        match byte {
            // ESC - start escape sequence
            0x1B => {
                self.state = ParserState::Escape;
                None
            }
            // NUL - Ctrl+Space
            0x00 => Some(Event::Key(
                KeyEvent::new(KeyCode::Char(' ')).with_modifiers(Modifiers::CTRL),
            )),
            // Tab (Ctrl+I) - check before generic Ctrl range
            0x09 => Some(Event::Key(KeyEvent::new(KeyCode::Tab))),
            // Enter (Ctrl+M) - check before generic Ctrl range
            0x0D => Some(Event::Key(KeyEvent::new(KeyCode::Enter))),
            // Other Ctrl+A through Ctrl+Z
            0x01..=0x08 | 0x0A..=0x0C | 0x0E..=0x1A => {
                let c = (byte + b'a' - 1) as char;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL),
                ))
            }
            // Backspace (DEL)
            0x7F => Some(Event::Key(KeyEvent::new(KeyCode::Backspace))),
            // Printable ASCII
            0x20..=0x7E => Some(Event::Key(KeyEvent::new(KeyCode::Char(byte as char)))),
            // UTF-8 lead bytes
            0xC2..=0xDF => self.start_utf8(byte, 2),
            0xE0..=0xEF => self.start_utf8(byte, 3),
            0xF0..=0xF4 => self.start_utf8(byte, 4),
            // Invalid or ignored bytes
            _ => None,
        }
    }

    fn start_utf8(&mut self, byte: u8, expected: u8) -> Option<Event> {
        self.utf8_buffer[0] = byte;
        self.state = ParserState::Utf8 {
            collected: 1,
            expected,
        };
        None
    }

    /// Process byte after ESC.
    fn process_escape(&mut self, byte: u8) -> Option<Event> {
        match byte {
            // CSI introducer
            b'[' => {
                self.state = ParserState::Csi;
                self.buffer.clear();
                None
            }
            // SS3 introducer
            b'O' => {
                self.state = ParserState::Ss3;
                None
            }
            // OSC introducer
            b']' => {
                self.state = ParserState::Osc;
                self.buffer.clear();
                None
            }
            // ESC ESC - Alt+Escape
            0x1B => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Escape).with_modifiers(Modifiers::ALT),
                ))
            }
            b'\r' => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Enter).with_modifiers(Modifiers::ALT),
                ))
            }
            0x7F => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Backspace).with_modifiers(Modifiers::ALT),
                ))
            }
            // Alt+Ctrl+letter
            0x01..=0x1A if byte != b'\t' => {
                self.state = ParserState::Ground;
                let c = (byte + b'a' - 1) as char;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::ALT | Modifiers::CTRL),
                ))
            }
            // Alt+letter or Alt+char
            0x20..=0x7E => {
                self.state = ParserState::Ground;
                Some(Event::Key(
                    KeyEvent::new(KeyCode::Char(byte as char)).with_modifiers(Modifiers::ALT),
                ))
            }
            // Invalid - return to ground
            _ => {
                self.state = ParserState::Ground;
                None
            }
        }
    }

    /// Process byte at start of CSI sequence.
    fn process_csi(&mut self, byte: u8) -> Option<Event> {
        // `CSI M` with no parameters introduces an X10 mouse report.
        if byte == b'M' {
            self.state = ParserState::X10Mouse { collected: 0 };
            return None;
        }

        self.buffer.push(byte);

        match byte {
            // Parameter bytes - continue collecting
            b'0'..=b'9' | b';' | b':' | b'<' | b'=' | b'>' | b'?' => {
                self.state = ParserState::CsiParam;
                None
            }
            // Final byte - parse and return
            b'A'..=b'Z' | b'a'..=b'z' | b'~' => {
                self.state = ParserState::Ground;
                self.parse_csi_sequence()
            }
            // Invalid
            _ => {
                self.state = ParserState::Ground;
                self.buffer.clear();
                None
            }
        }
    }

    /// Process byte while collecting CSI parameters.
    fn process_csi_param(&mut self, byte: u8) -> Option<Event> {
        // DoS protection
        if self.buffer.len() >= MAX_CSI_LEN {
            crate::warn!(len = self.buffer.len(), "input CSI sequence too long, dropped");
            self.state = ParserState::Ground;
            self.buffer.clear();
            return None;
        }

        self.buffer.push(byte);

        match byte {
            // Continue collecting parameters
            b'0'..=b'9' | b';' | b':' => None,
            // Final byte - parse and return (M and m are in A-Z and a-z ranges)
            b'A'..=b'Z' | b'a'..=b'z' | b'~' => {
                self.state = ParserState::Ground;
                self.parse_csi_sequence()
            }
            // Invalid
            _ => {
                self.state = ParserState::Ground;
                self.buffer.clear();
                None
            }
        }
    }

    /// Parse a complete CSI sequence from the buffer.
    fn parse_csi_sequence(&mut self) -> Option<Event> {
        let seq = std::mem::take(&mut self.buffer);
        let (&final_byte, params) = seq.split_last()?;

        match (params, final_byte) {
            // Focus events
            ([], b'I') => return Some(Event::Focus(true)),
            ([], b'O') => return Some(Event::Focus(false)),

            // Bracketed paste start
            (b"200", b'~') => {
                self.in_paste = true;
                self.paste_buffer.clear();
                return None;
            }
            // Stray paste end outside a paste
            (b"201", b'~') => return None,

            // SGR mouse protocol
            _ if params.starts_with(b"<") && (final_byte == b'M' || final_byte == b'm') => {
                return Self::parse_sgr_mouse(&params[1..], final_byte);
            }

            _ => {}
        }

        let mods = Self::parse_modifier_param(params);
        let code = match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => return Some(Event::Key(KeyEvent::new(KeyCode::BackTab))),
            b'~' => return Self::parse_csi_tilde(params),
            _ => {
                crate::trace!(final_byte, "unhandled input CSI sequence");
                return None;
            }
        };
        Some(Event::Key(KeyEvent::new(code).with_modifiers(mods)))
    }

    /// Parse CSI sequences ending in ~.
    fn parse_csi_tilde(params: &[u8]) -> Option<Event> {
        let num = Self::parse_first_param(params)?;
        let mods = Self::parse_modifier_param(params);

        let code = match num {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return None,
        };

        Some(Event::Key(KeyEvent::new(code).with_modifiers(mods)))
    }

    /// Parse the first numeric parameter from CSI params.
    fn parse_first_param(params: &[u8]) -> Option<u32> {
        let s = std::str::from_utf8(params).ok()?;
        s.split(';').next()?.parse().ok()
    }

    /// Parse modifier parameter (second param in CSI sequences).
    fn parse_modifier_param(params: &[u8]) -> Modifiers {
        let Ok(s) = std::str::from_utf8(params) else {
            return Modifiers::NONE;
        };

        let modifier_value: u32 = s
            .split(';')
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        // xterm modifier encoding: value = 1 + modifier_bits
        // Shift=1, Alt=2, Ctrl=4, Super=8
        let bits = modifier_value.saturating_sub(1);
        let mut mods = Modifiers::NONE;
        if bits & 1 != 0 {
            mods |= Modifiers::SHIFT;
        }
        if bits & 2 != 0 {
            mods |= Modifiers::ALT;
        }
        if bits & 4 != 0 {
            mods |= Modifiers::CTRL;
        }
        if bits & 8 != 0 {
            mods |= Modifiers::SUPER;
        }
        mods
    }

    /// Parse SGR mouse protocol events: `CSI < button ; x ; y M|m`.
    fn parse_sgr_mouse(params: &[u8], final_byte: u8) -> Option<Event> {
        let s = std::str::from_utf8(params).ok()?;
        let mut parts = s.split(';');

        let button_code: u16 = parts.next()?.parse().ok()?;
        let x: u16 = parts.next()?.parse().ok()?;
        let y: u16 = parts.next()?.parse().ok()?;

        let event = Self::decode_mouse(button_code, final_byte == b'm')?;
        Some(Event::Mouse(
            event.with_position(x.saturating_sub(1), y.saturating_sub(1)),
        ))
    }

    /// Collect the three raw bytes of an X10 report.
    fn process_x10_mouse(&mut self, byte: u8, collected: u8) -> Option<Event> {
        self.x10_buffer[collected as usize] = byte;
        if collected < 2 {
            self.state = ParserState::X10Mouse {
                collected: collected + 1,
            };
            return None;
        }
        self.state = ParserState::Ground;

        let [cb, cx, cy] = self.x10_buffer;
        let code = u16::from(cb.wrapping_sub(32));
        // X10 cannot name the released button; code 3 without motion is a release.
        let release = code & 0b11 == 3 && code & 32 == 0 && code & 64 == 0;
        let event = Self::decode_mouse(code, release)?;
        Some(Event::Mouse(event.with_position(
            u16::from(cx.wrapping_sub(32)).saturating_sub(1),
            u16::from(cy.wrapping_sub(32)).saturating_sub(1),
        )))
    }

    /// Decode a wire button code into button, action and modifiers.
    fn decode_mouse(code: u16, release: bool) -> Option<PendingMouse> {
        let mut modifiers = Modifiers::NONE;
        if code & 4 != 0 {
            modifiers |= Modifiers::SHIFT;
        }
        if code & 8 != 0 {
            modifiers |= Modifiers::ALT;
        }
        if code & 16 != 0 {
            modifiers |= Modifiers::CTRL;
        }
        let motion = code & 32 != 0;

        let (button, action) = if code & 64 != 0 {
            // Wheel: 64 = up, 65 = down; horizontal wheel (66/67) is ignored.
            let button = match code & 0b11 {
                0 => MouseButton::ScrollUp,
                1 => MouseButton::ScrollDown,
                _ => return None,
            };
            if release {
                return None;
            }
            (button, MouseAction::Press)
        } else {
            let button = match code & 0b11 {
                0 => MouseButton::Left,
                1 => MouseButton::Middle,
                2 => MouseButton::Right,
                _ => MouseButton::None,
            };
            let action = if release {
                MouseAction::Release
            } else if motion && button == MouseButton::None {
                MouseAction::Move
            } else if motion {
                MouseAction::Drag
            } else {
                MouseAction::Press
            };
            (button, action)
        };

        Some(PendingMouse {
            button,
            action,
            modifiers,
        })
    }

    /// Process SS3 (ESC O) sequences.
    fn process_ss3(&mut self, byte: u8) -> Option<Event> {
        self.state = ParserState::Ground;

        let code = match byte {
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            _ => return None,
        };

        Some(Event::Key(KeyEvent::new(code)))
    }

    /// Consume OSC content; no OSC input is surfaced as an event.
    fn process_osc(&mut self, byte: u8) -> Option<Event> {
        match byte {
            // BEL terminates
            0x07 => {
                self.state = ParserState::Ground;
                self.buffer.clear();
            }
            // ESC might start terminator
            0x1B => self.state = ParserState::OscEscape,
            _ => {
                if self.buffer.len() >= MAX_OSC_LEN {
                    crate::warn!("input OSC sequence too long, dropped");
                    self.state = ParserState::Ground;
                    self.buffer.clear();
                } else {
                    self.buffer.push(byte);
                }
            }
        }
        None
    }

    /// Process ESC inside OSC (checking for ST terminator).
    fn process_osc_escape(&mut self, byte: u8) -> Option<Event> {
        if byte == b'\\' {
            self.state = ParserState::Ground;
            self.buffer.clear();
            None
        } else {
            // Not a terminator: the OSC was abandoned, reprocess as a fresh escape.
            self.buffer.clear();
            self.state = ParserState::Escape;
            self.process_escape(byte)
        }
    }

    fn process_utf8(&mut self, byte: u8, collected: u8, expected: u8) -> Option<Event> {
        // Check for valid continuation byte
        if (byte & 0xC0) != 0x80 {
            // Invalid - drop the partial char and reprocess this byte
            self.state = ParserState::Ground;
            return self.process_ground(byte);
        }

        self.utf8_buffer[collected as usize] = byte;
        let new_collected = collected + 1;

        if new_collected == expected {
            self.state = ParserState::Ground;
            let s = std::str::from_utf8(&self.utf8_buffer[..expected as usize]).ok()?;
            let c = s.chars().next()?;
            Some(Event::Key(KeyEvent::new(KeyCode::Char(c))))
        } else {
            self.state = ParserState::Utf8 {
                collected: new_collected,
                expected,
            };
            None
        }
    }

    /// Process bytes while in paste mode.
    fn process_paste_byte(&mut self, byte: u8) -> Option<Event> {
        self.paste_buffer.push(byte);

        // DoS protection: keep the content capped but leave room to spot the end marker.
        if self.paste_buffer.len() > MAX_PASTE_LEN + PASTE_END.len() {
            self.paste_buffer.remove(MAX_PASTE_LEN);
        }

        if self.paste_buffer.ends_with(PASTE_END) {
            self.in_paste = false;
            let content_len = self.paste_buffer.len() - PASTE_END.len();
            let content = String::from_utf8_lossy(&self.paste_buffer[..content_len]).into_owned();
            self.paste_buffer.clear();
            return Some(Event::Paste(PasteEvent::bracketed(content)));
        }

        None
    }
}

/// Mouse report decoded up to (but excluding) its coordinates.
struct PendingMouse {
    button: MouseButton,
    action: MouseAction,
    modifiers: Modifiers,
}

impl PendingMouse {
    fn with_position(self, x: u16, y: u16) -> MouseEvent {
        MouseEvent::new(x, y, self.button, self.action).with_modifiers(self.modifiers)
    }
}
