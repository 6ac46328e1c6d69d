//! VT/ANSI parser.
//!
//! This parser is a deterministic state machine that converts an output byte
//! stream into a sequence of actions for the terminal. It covers:
//!
//! - printable characters (ASCII + full UTF-8) -> `Action::Print`
//! - C0 controls -> dedicated actions
//! - CSI sequences (cursor, erase, SGR, DEC private mode set/reset)
//! - OSC sequences (title)
//! - ESC-level sequences (cursor save/restore, reset)
//! - capture of unsupported sequences as `Action::Escape` so the caller can
//!   log and drop them
//!
//! Sequences may be split across [`Parser::feed`] calls at any byte.

/// DoS protection: maximum CSI sequence length (including `ESC [`).
const MAX_CSI_LEN: usize = 256;

/// DoS protection: maximum OSC sequence length (including `ESC ]`).
const MAX_OSC_LEN: usize = 4096;

/// Parser output actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a single character (ASCII or multi-byte UTF-8).
    Print(char),
    /// Newline (`\n`, VT, FF): column 0 of the next row.
    Newline,
    /// Carriage return (`\r`).
    CarriageReturn,
    /// Horizontal tab (`\t`).
    Tab,
    /// Backspace (`\x08`).
    Backspace,
    /// Bell (`\x07`).
    Bell,
    /// CUU (`CSI Ps A`): move cursor up by count (default 1).
    CursorUp(u16),
    /// CUD (`CSI Ps B`): move cursor down by count (default 1).
    CursorDown(u16),
    /// CUF (`CSI Ps C`): move cursor right by count (default 1).
    CursorRight(u16),
    /// CUB (`CSI Ps D`): move cursor left by count (default 1).
    CursorLeft(u16),
    /// CHA (`CSI Ps G`): move cursor to absolute column (0-indexed).
    CursorColumn(u16),
    /// CUP/HVP: move cursor to absolute 0-indexed row/col.
    CursorPosition { row: u16, col: u16 },
    /// ED mode (`CSI Ps J`): 0, 1, or 2.
    EraseInDisplay(u8),
    /// EL mode (`CSI Ps K`): 0, 1, or 2.
    EraseInLine(u8),
    /// SGR (`CSI ... m`): set graphics rendition parameters.
    Sgr(Vec<u16>),
    /// DECSET (`CSI ? Pm h`): enable DEC private mode(s).
    DecSet(Vec<u16>),
    /// DECRST (`CSI ? Pm l`): disable DEC private mode(s).
    DecRst(Vec<u16>),
    /// DECSC (`ESC 7`): save cursor state.
    SaveCursor,
    /// DECRC (`ESC 8`): restore cursor state.
    RestoreCursor,
    /// RIS (`ESC c`): full reset to initial state.
    FullReset,
    /// OSC 0/2: set terminal title.
    SetTitle(String),
    /// A raw escape/CSI/OSC sequence captured verbatim (starts with ESC).
    Escape(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Esc,
    /// `ESC` followed by one or more intermediates (0x20..=0x2F), e.g. the
    /// charset designation `ESC ( B`.
    EscIntermediate,
    Csi,
    Osc,
    OscEsc,
    /// Accumulating a multi-byte UTF-8 character.
    /// `bytes_remaining` counts how many continuation bytes are still expected.
    Utf8 {
        bytes_remaining: u8,
    },
}

/// VT/ANSI parser state.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    buf: Vec<u8>,
    /// Set when the current sequence blew its length limit; the rest of it
    /// is consumed without buffering and then dropped.
    overflow: bool,
    /// Accumulator for multi-byte UTF-8 character assembly.
    utf8_buf: [u8; 4],
    /// Number of bytes accumulated so far in `utf8_buf`.
    utf8_len: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            buf: Vec::new(),
            overflow: false,
            utf8_buf: [0; 4],
            utf8_len: 0,
        }
    }

    /// Feed a chunk of bytes and return parsed actions.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        for &b in bytes {
            if let Some(action) = self.advance(b) {
                out.push(action);
            }
        }
        out
    }

    /// Whether the parser is in the middle of a sequence or character.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Drop any partial sequence and return to ground state.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.buf.clear();
        self.overflow = false;
        self.utf8_len = 0;
    }

    /// Advance the parser by one byte.
    ///
    /// Returns an action when a complete token is recognized.
    pub fn advance(&mut self, b: u8) -> Option<Action> {
        match self.state {
            State::Ground => self.advance_ground(b),
            State::Esc => self.advance_esc(b),
            State::EscIntermediate => self.advance_esc_intermediate(b),
            State::Csi => self.advance_csi(b),
            State::Osc => self.advance_osc(b),
            State::OscEsc => self.advance_osc_esc(b),
            State::Utf8 { bytes_remaining } => self.advance_utf8(b, bytes_remaining),
        }
    }

    fn advance_ground(&mut self, b: u8) -> Option<Action> {
        match b {
            b'\n' | 0x0B | 0x0C => Some(Action::Newline), // LF, VT, FF all treated as newline
            b'\r' => Some(Action::CarriageReturn),
            b'\t' => Some(Action::Tab),
            0x08 => Some(Action::Backspace),
            0x07 => Some(Action::Bell),
            0x1b => {
                self.start_escape();
                None
            }
            0x20..=0x7E => Some(Action::Print(b as char)),
            // UTF-8 multi-byte sequence leading bytes:
            0xC2..=0xDF => self.start_utf8(b, 1),
            0xE0..=0xEF => self.start_utf8(b, 2),
            0xF0..=0xF4 => self.start_utf8(b, 3),
            _ => None, // ignore remaining C0 controls, DEL,
                       // and invalid UTF-8 leading bytes (0x80-0xC1, 0xF5-0xFF)
        }
    }

    fn start_escape(&mut self) {
        self.state = State::Esc;
        self.overflow = false;
        self.buf.clear();
        self.buf.push(0x1b);
    }

    fn start_utf8(&mut self, b: u8, bytes_remaining: u8) -> Option<Action> {
        self.utf8_buf[0] = b;
        self.utf8_len = 1;
        self.state = State::Utf8 { bytes_remaining };
        None
    }

    /// Accumulate continuation bytes for a multi-byte UTF-8 character.
    fn advance_utf8(&mut self, b: u8, bytes_remaining: u8) -> Option<Action> {
        // Continuation bytes must be in 0x80..=0xBF.
        if (0x80..=0xBF).contains(&b) {
            let idx = self.utf8_len as usize;
            if idx < 4 {
                self.utf8_buf[idx] = b;
                self.utf8_len += 1;
            }
            if bytes_remaining == 1 {
                self.state = State::Ground;
                let len = self.utf8_len as usize;
                let ch = core::str::from_utf8(&self.utf8_buf[..len])
                    .ok()
                    .and_then(|s| s.chars().next());
                self.utf8_len = 0;
                ch.map(Action::Print)
            } else {
                self.state = State::Utf8 {
                    bytes_remaining: bytes_remaining - 1,
                };
                None
            }
        } else {
            // Invalid continuation byte: drop the partial character and
            // reprocess this byte in ground state.
            self.state = State::Ground;
            self.utf8_len = 0;
            self.advance_ground(b)
        }
    }

    fn advance_esc(&mut self, b: u8) -> Option<Action> {
        self.buf.push(b);
        match b {
            b'[' => {
                self.state = State::Csi;
                None
            }
            b']' => {
                self.state = State::Osc;
                None
            }
            // DECSC: save cursor (ESC 7)
            b'7' => {
                self.state = State::Ground;
                self.buf.clear();
                Some(Action::SaveCursor)
            }
            // DECRC: restore cursor (ESC 8)
            b'8' => {
                self.state = State::Ground;
                self.buf.clear();
                Some(Action::RestoreCursor)
            }
            // RIS: full reset to initial state (ESC c)
            b'c' => {
                self.state = State::Ground;
                self.buf.clear();
                Some(Action::FullReset)
            }
            0x20..=0x2F => {
                self.state = State::EscIntermediate;
                None
            }
            _ => {
                self.state = State::Ground;
                Some(Action::Escape(self.take_buf()))
            }
        }
    }

    fn advance_esc_intermediate(&mut self, b: u8) -> Option<Action> {
        match b {
            0x1b => {
                let overflowed = self.overflow_reset();
                let abandoned = self.take_buf();
                self.start_escape();
                (!overflowed).then_some(Action::Escape(abandoned))
            }
            0x20..=0x2F => {
                self.buffer_byte(b, MAX_CSI_LEN);
                None
            }
            0x30..=0x7E => {
                self.state = State::Ground;
                let intact = self.buffer_byte(b, MAX_CSI_LEN);
                if self.overflow_reset() || !intact {
                    self.buf.clear();
                    return None;
                }
                Some(Action::Escape(self.take_buf()))
            }
            // C0 controls and DEL inside the sequence are ignored.
            _ => None,
        }
    }

    fn advance_csi(&mut self, b: u8) -> Option<Action> {
        // ESC inside a CSI abandons it and starts a new sequence.
        if b == 0x1b {
            let overflowed = self.overflow_reset();
            let abandoned = self.take_buf();
            self.start_escape();
            return (!overflowed).then_some(Action::Escape(abandoned));
        }

        // Final byte for CSI is in the 0x40..=0x7E range (ECMA-48).
        let is_final = (0x40..=0x7E).contains(&b);
        if self.buffer_byte(b, MAX_CSI_LEN) && is_final {
            self.state = State::Ground;
            let seq = self.take_buf();
            return Some(Self::decode_csi(&seq).unwrap_or(Action::Escape(seq)));
        }
        if is_final {
            self.state = State::Ground;
            self.overflow_reset();
        }
        None
    }

    fn advance_osc(&mut self, b: u8) -> Option<Action> {
        match b {
            0x07 => {
                // BEL terminator.
                self.state = State::Ground;
                self.finish_osc(b)
            }
            0x1b => {
                // ESC, possibly starting ST terminator (ESC \).
                self.state = State::OscEsc;
                None
            }
            _ => {
                self.buffer_byte(b, MAX_OSC_LEN);
                None
            }
        }
    }

    fn advance_osc_esc(&mut self, b: u8) -> Option<Action> {
        if b == b'\\' {
            // ST terminator.
            self.state = State::Ground;
            self.buffer_byte(0x1b, MAX_OSC_LEN + 1);
            return self.finish_osc(b);
        }
        // Any other ESC sequence aborts the OSC.
        self.buf.clear();
        self.overflow = false;
        self.start_escape();
        self.advance_esc(b)
    }

    fn finish_osc(&mut self, terminator: u8) -> Option<Action> {
        if self.overflow_reset() || !self.buffer_byte(terminator, MAX_OSC_LEN + 2) {
            self.buf.clear();
            return None;
        }
        let seq = self.take_buf();
        Some(Self::decode_osc(&seq).unwrap_or(Action::Escape(seq)))
    }

    /// Buffer `b` unless the sequence is over `limit`. Returns whether the
    /// sequence is still intact.
    fn buffer_byte(&mut self, b: u8, limit: usize) -> bool {
        if self.overflow {
            return false;
        }
        if self.buf.len() >= limit {
            termgate_core::warn!(len = self.buf.len(), "escape sequence too long, dropped");
            self.overflow = true;
            self.buf.clear();
            return false;
        }
        self.buf.push(b);
        true
    }

    /// Clear the overflow flag, returning its previous value.
    fn overflow_reset(&mut self) -> bool {
        std::mem::replace(&mut self.overflow, false)
    }

    fn take_buf(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    fn decode_csi(seq: &[u8]) -> Option<Action> {
        if seq.len() < 3 || seq[0] != 0x1b || seq[1] != b'[' {
            return None;
        }
        let final_byte = *seq.last()?;
        let param_bytes = &seq[2..seq.len().saturating_sub(1)];

        // Check for DEC private mode indicator `?` prefix.
        if param_bytes.first() == Some(&b'?') {
            let params = Self::parse_csi_params(&param_bytes[1..])?;
            return match final_byte {
                b'h' => Some(Action::DecSet(params)),
                b'l' => Some(Action::DecRst(params)),
                _ => None,
            };
        }

        let params = Self::parse_csi_params(param_bytes)?;
        let count = Self::csi_count_or_one(params.first().copied());

        match final_byte {
            b'A' => Some(Action::CursorUp(count)),
            b'B' => Some(Action::CursorDown(count)),
            b'C' => Some(Action::CursorRight(count)),
            b'D' => Some(Action::CursorLeft(count)),
            b'G' => Some(Action::CursorColumn(count - 1)),
            b'H' | b'f' => {
                // CUP/HVP use 1-indexed coordinates; 0 is treated as 1.
                let row = Self::csi_count_or_one(params.first().copied()) - 1;
                let col = Self::csi_count_or_one(params.get(1).copied()) - 1;
                Some(Action::CursorPosition { row, col })
            }
            b'J' => Self::erase_mode(&params).map(Action::EraseInDisplay),
            b'K' => Self::erase_mode(&params).map(Action::EraseInLine),
            b'm' => Some(Action::Sgr(params)),
            _ => None,
        }
    }

    fn decode_osc(seq: &[u8]) -> Option<Action> {
        if seq.len() < 4 || seq[0] != 0x1b || seq[1] != b']' {
            return None;
        }

        // Strip terminator (BEL or ST).
        let content = if *seq.last()? == 0x07 {
            &seq[2..seq.len() - 1]
        } else if seq.ends_with(b"\x1b\\") {
            &seq[2..seq.len() - 2]
        } else {
            return None;
        };

        let first_semi = content.iter().position(|&b| b == b';')?;
        let cmd = core::str::from_utf8(&content[..first_semi]).ok()?;
        let cmd: u16 = cmd.parse().ok()?;
        let rest = &content[first_semi + 1..];

        match cmd {
            0 | 2 => Some(Action::SetTitle(String::from_utf8_lossy(rest).into_owned())),
            _ => None,
        }
    }

    fn erase_mode(params: &[u16]) -> Option<u8> {
        match params.first().copied().unwrap_or(0) {
            mode @ 0..=2 => Some(mode as u8),
            _ => None,
        }
    }

    fn parse_csi_params(params: &[u8]) -> Option<Vec<u16>> {
        if params.is_empty() {
            return Some(Vec::new());
        }
        let s = core::str::from_utf8(params).ok()?;
        let mut out = Vec::new();
        for part in s.split(';') {
            if part.is_empty() {
                out.push(0);
                continue;
            }
            let value = part.parse::<u32>().ok()?;
            out.push(u16::try_from(value).unwrap_or(u16::MAX));
        }
        Some(out)
    }

    fn csi_count_or_one(value: Option<u16>) -> u16 {
        value.unwrap_or(1).max(1)
    }
}
