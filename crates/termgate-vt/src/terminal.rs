//! The terminal state machine.
//!
//! [`Terminal`] applies [`Parser`] actions to a [`Grid`] and [`Cursor`],
//! tracks mode flags and the window title, and synthesizes the bytes a real
//! terminal would send to the application for keyboard, mouse and paste
//! input. Synthesized bytes are appended to an output log and delivered to
//! subscribed listeners as [`TerminalEvent::Data`].
//!
//! ```
//! use termgate_vt::Terminal;
//!
//! let mut term = Terminal::new(80, 24);
//! term.write(b"\x1b[5;10H");
//! assert_eq!(term.cursor().position(), (9, 4));
//! ```

use std::fmt;

use termgate_core::{
    KeyEvent, KeySpecError, MouseEvent, MouseFormat, encode_key, encode_mouse, encode_paste,
    parse_key_spec,
};

use crate::cell::Cell;
use crate::config::TerminalConfig;
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::modes::{DecMode, Modes};
use crate::parser::{Action, Parser};

/// Notification delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Synthesized input bytes (what the application would read).
    Data(Vec<u8>),
    /// The screen was reallocated at a new size.
    Resize { cols: u16, rows: u16 },
}

/// Handle returned by [`Terminal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TerminalEvent)>;

/// Headless terminal: screen, cursor, modes and input synthesis.
pub struct Terminal {
    grid: Grid,
    cursor: Cursor,
    saved_cursor: Option<SavedCursor>,
    modes: Modes,
    title: String,
    parser: Parser,
    mouse_format: MouseFormat,
    output: Vec<u8>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("cols", &self.grid.cols())
            .field("rows", &self.grid.rows())
            .field("cursor", &self.cursor)
            .field("modes", &self.modes)
            .field("title", &self.title)
            .field("mouse_format", &self.mouse_format)
            .field("output_len", &self.output.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::with_config(TerminalConfig::default())
    }
}

impl Terminal {
    /// Create a terminal of `cols × rows` with default preferences.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_config(TerminalConfig::with_size(cols, rows))
    }

    #[must_use]
    pub fn with_config(config: TerminalConfig) -> Self {
        Self {
            grid: Grid::new(config.cols, config.rows),
            cursor: Cursor::new(),
            saved_cursor: None,
            modes: Modes::default(),
            title: String::new(),
            parser: Parser::new(),
            mouse_format: config.mouse_format,
            output: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // ── Listeners ───────────────────────────────────────────────────

    /// Register a callback for data and resize notifications.
    ///
    /// Callbacks run synchronously, in subscription order, before the
    /// emitting call returns.
    pub fn subscribe(&mut self, listener: impl FnMut(&TerminalEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &TerminalEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    fn emit_data(&mut self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        self.output.extend_from_slice(&bytes);
        self.emit(&TerminalEvent::Data(bytes));
    }

    // ── Inbound: application output ─────────────────────────────────

    /// Feed application output through the VT parser.
    pub fn write(&mut self, bytes: &[u8]) {
        for action in self.parser.feed(bytes) {
            self.apply(action);
        }
    }

    /// Convenience wrapper for [`write`](Self::write) with text.
    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    fn apply(&mut self, action: Action) {
        let (cols, rows) = (self.grid.cols(), self.grid.rows());
        match action {
            Action::Print(ch) => {
                self.grid
                    .put(self.cursor.row, self.cursor.col, ch, self.cursor.attrs);
                self.cursor.move_right(1, cols);
            }
            Action::Newline => {
                self.cursor.col = 0;
                self.cursor.move_down(1, rows);
            }
            Action::CarriageReturn => self.cursor.col = 0,
            Action::Tab => self.cursor.tab(cols),
            Action::Backspace => self.cursor.move_left(1),
            Action::Bell => {}
            Action::CursorUp(n) => self.cursor.move_up(n),
            Action::CursorDown(n) => self.cursor.move_down(n, rows),
            Action::CursorRight(n) => self.cursor.move_right(n, cols),
            Action::CursorLeft(n) => self.cursor.move_left(n),
            Action::CursorColumn(col) => {
                self.cursor.move_to(self.cursor.row, col, cols, rows);
            }
            Action::CursorPosition { row, col } => self.cursor.move_to(row, col, cols, rows),
            Action::EraseInDisplay(mode) => {
                let (row, col, bg) = (self.cursor.row, self.cursor.col, self.cursor.attrs.bg);
                match mode {
                    0 => self.grid.erase_below(row, col, bg),
                    1 => self.grid.erase_above(row, col, bg),
                    _ => self.grid.erase_all(bg),
                }
            }
            Action::EraseInLine(mode) => {
                let (row, col, bg) = (self.cursor.row, self.cursor.col, self.cursor.attrs.bg);
                match mode {
                    0 => self.grid.erase_line_right(row, col, bg),
                    1 => self.grid.erase_line_left(row, col, bg),
                    _ => self.grid.erase_line(row, bg),
                }
            }
            Action::Sgr(params) => self.cursor.attrs.apply_sgr(&params),
            Action::DecSet(params) => self.set_dec_modes(&params, true),
            Action::DecRst(params) => self.set_dec_modes(&params, false),
            Action::SaveCursor => self.saved_cursor = Some(self.cursor.save()),
            Action::RestoreCursor => {
                if let Some(saved) = self.saved_cursor {
                    self.cursor.restore(saved, cols, rows);
                }
            }
            Action::FullReset => self.reset(),
            Action::SetTitle(title) => self.title = title,
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            Action::Escape(raw) => {
                termgate_core::trace!(len = raw.len(), "discarding unsupported escape sequence");
            }
        }
    }

    fn set_dec_modes(&mut self, params: &[u16], enable: bool) {
        for &code in params {
            let Some(mode) = DecMode::from_code(code) else {
                termgate_core::trace!(code, "ignoring unknown DEC private mode");
                continue;
            };
            termgate_core::debug!(?mode, enable, "DEC private mode");
            match mode.flag() {
                Some(flag) => self.modes.set(flag, enable),
                None => self.cursor.visible = enable,
            }
        }
    }

    /// Reallocate a blank screen at `cols × rows` and notify listeners.
    ///
    /// Zero dimensions are allowed; writes are then clipped to nothing.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        termgate_core::debug!(cols, rows, "terminal resize");
        self.grid.resize(cols, rows);
        self.cursor.clamp(cols, rows);
        self.emit(&TerminalEvent::Resize { cols, rows });
    }

    /// Restore power-on state: blank screen, visible cursor at the origin,
    /// default attributes and modes, empty title.
    ///
    /// Size, mouse format, output log and listeners are kept.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.cursor = Cursor::new();
        self.saved_cursor = None;
        self.modes = Modes::default();
        self.title.clear();
        self.parser.reset();
    }

    // ── Outbound: synthesized input ─────────────────────────────────

    /// Emit the bytes for a key press.
    pub fn send_key(&mut self, key: KeyEvent) {
        self.emit_data(encode_key(&key));
    }

    /// Parse a key spec such as `"ctrl+c"` and emit it.
    pub fn send_key_spec(&mut self, spec: &str) -> Result<(), KeySpecError> {
        let key = parse_key_spec(spec)?;
        self.send_key(key);
        Ok(())
    }

    /// Emit `text` one character per data event, like typing.
    pub fn send_text(&mut self, text: &str) {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.emit_data(ch.encode_utf8(&mut buf).as_bytes().to_vec());
        }
    }

    /// Emit a mouse report in the configured format.
    ///
    /// Returns `false` (and emits nothing) while mouse tracking is off.
    pub fn send_mouse(&mut self, event: MouseEvent) -> bool {
        if !self.modes.mouse_tracking() {
            return false;
        }
        self.emit_data(encode_mouse(self.mouse_format, &event));
        true
    }

    /// Emit pasted text, bracketed when the application enabled mode 2004.
    pub fn send_paste(&mut self, text: &str) {
        let bytes = encode_paste(text, self.modes.bracketed_paste());
        self.emit_data(bytes);
    }

    pub fn set_mouse_format(&mut self, format: MouseFormat) {
        self.mouse_format = format;
    }

    #[must_use]
    pub fn mouse_format(&self) -> MouseFormat {
        self.mouse_format
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn screen(&self) -> &Grid {
        &self.grid
    }

    /// Text of row `y`, or `None` when out of range.
    #[must_use]
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.grid.row_text(y)
    }

    /// All rows joined with `\n`, trailing spaces trimmed.
    #[must_use]
    pub fn screen_text(&self) -> String {
        self.grid
            .rows_iter()
            .map(|row| {
                let line: String = row.iter().map(Cell::content).collect();
                line.trim_end().to_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cell at `(x, y)`, or `None` when out of range.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.grid.cell(y, x)
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub fn is_cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    /// Current mode flags.
    #[must_use]
    pub fn state(&self) -> Modes {
        self.modes
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `(cols, rows)`.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.grid.cols(), self.grid.rows())
    }

    /// Every byte emitted since construction or the last
    /// [`clear_output`](Self::clear_output).
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// The output log as text; X10 bytes above 0x7F are replaced.
    #[must_use]
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}
