//! Gesture simulator.
//!
//! Every gesture is expanded into the raw events a real terminal would
//! report: presses, releases and motion. Clicks are never emitted directly;
//! the receiving side recovers them from press/release pairs, exactly as it
//! does for live input.

use termgate_core::{
    KeyCode, KeyEvent, KeySpecError, Modifiers, MouseAction, MouseButton, MouseEvent,
    MouseFormat, parse_key_spec,
};

use crate::sink::InputSink;

/// Default number of intermediate motion events in a drag.
pub const DEFAULT_DRAG_STEPS: u16 = 5;

/// Wheel direction for [`GestureSimulator::scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    const fn button(self) -> MouseButton {
        match self {
            Self::Up => MouseButton::ScrollUp,
            Self::Down => MouseButton::ScrollDown,
        }
    }
}

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureConfig {
    /// Motion events between the press and release of a drag.
    pub drag_steps: u16,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_steps: DEFAULT_DRAG_STEPS,
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn drag_steps(mut self, steps: u16) -> Self {
        self.drag_steps = steps;
        self
    }
}

/// Drives an [`InputSink`] with pointer gestures and keystrokes.
///
/// Tracks the last pointer position. All operations run synchronously; no
/// time passes between the events of a gesture, so a [`double_click`]
/// always pairs unless the sink's clock is advanced in between.
///
/// Gesture methods return whether the sink accepted every event they sent
/// (a [`Terminal`](termgate_vt::Terminal) with mouse tracking off accepts
/// none).
///
/// [`double_click`]: Self::double_click
#[derive(Debug)]
pub struct GestureSimulator<S> {
    sink: S,
    config: GestureConfig,
    format: MouseFormat,
    position: (u16, u16),
}

impl<S: InputSink> GestureSimulator<S> {
    /// Wrap `sink` with default settings and the SGR mouse format.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, GestureConfig::default())
    }

    pub fn with_config(sink: S, config: GestureConfig) -> Self {
        Self {
            sink,
            config,
            format: MouseFormat::default(),
            position: (0, 0),
        }
    }

    /// Prefer `format` for mouse reports and forward it to the sink.
    #[must_use]
    pub fn mouse_format(mut self, format: MouseFormat) -> Self {
        self.set_mouse_format(format);
        self
    }

    pub fn set_mouse_format(&mut self, format: MouseFormat) {
        self.format = format;
        self.sink.set_mouse_format(format);
    }

    #[must_use]
    pub fn format(&self) -> MouseFormat {
        self.format
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Last pointer position as `(x, y)`.
    #[must_use]
    pub fn position(&self) -> (u16, u16) {
        self.position
    }

    /// Forget the pointer position (back to the origin).
    pub fn reset(&mut self) {
        self.position = (0, 0);
    }

    // ── Pointer ──────────────────────────────────────────────────────

    /// Left press and release at `(x, y)`.
    pub fn click(&mut self, x: u16, y: u16) -> bool {
        self.click_with(x, y, MouseButton::Left, Modifiers::empty())
    }

    pub fn right_click(&mut self, x: u16, y: u16) -> bool {
        self.click_with(x, y, MouseButton::Right, Modifiers::empty())
    }

    pub fn middle_click(&mut self, x: u16, y: u16) -> bool {
        self.click_with(x, y, MouseButton::Middle, Modifiers::empty())
    }

    /// Press and release `button` at `(x, y)` with `modifiers` held.
    pub fn click_with(
        &mut self,
        x: u16,
        y: u16,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> bool {
        let pressed = self.emit(x, y, button, MouseAction::Press, modifiers);
        let released = self.emit(x, y, button, MouseAction::Release, modifiers);
        pressed && released
    }

    /// Two left clicks at the same cell with no time in between.
    pub fn double_click(&mut self, x: u16, y: u16) -> bool {
        let first = self.click(x, y);
        let second = self.click(x, y);
        first && second
    }

    /// Left press only.
    pub fn mouse_down(&mut self, x: u16, y: u16) -> bool {
        self.emit(x, y, MouseButton::Left, MouseAction::Press, Modifiers::empty())
    }

    /// Left release only.
    pub fn mouse_up(&mut self, x: u16, y: u16) -> bool {
        self.emit(x, y, MouseButton::Left, MouseAction::Release, Modifiers::empty())
    }

    /// Drag with the configured number of steps.
    pub fn drag(&mut self, from: (u16, u16), to: (u16, u16)) -> bool {
        self.drag_with_steps(from, to, self.config.drag_steps)
    }

    /// Left press at `from`, `steps` drag events along the straight line
    /// ending at `to`, then a release at `to`.
    pub fn drag_with_steps(&mut self, from: (u16, u16), to: (u16, u16), steps: u16) -> bool {
        termgate_core::trace!(?from, ?to, steps, "drag");
        let none = Modifiers::empty();
        let mut ok = self.emit(from.0, from.1, MouseButton::Left, MouseAction::Press, none);
        for i in 1..=steps {
            let x = lerp(from.0, to.0, i, steps);
            let y = lerp(from.1, to.1, i, steps);
            ok &= self.emit(x, y, MouseButton::Left, MouseAction::Drag, none);
        }
        ok &= self.emit(to.0, to.1, MouseButton::Left, MouseAction::Release, none);
        ok
    }

    /// `amount` wheel notches at `(x, y)`.
    pub fn scroll(&mut self, x: u16, y: u16, direction: ScrollDirection, amount: u16) -> bool {
        let mut ok = true;
        for _ in 0..amount {
            ok &= self.emit(x, y, direction.button(), MouseAction::Press, Modifiers::empty());
        }
        self.position = (x, y);
        ok
    }

    /// Plain motion to `(x, y)` with no button held.
    pub fn hover(&mut self, x: u16, y: u16) -> bool {
        self.emit(x, y, MouseButton::None, MouseAction::Move, Modifiers::empty())
    }

    /// Same as [`hover`](Self::hover).
    pub fn move_to(&mut self, x: u16, y: u16) -> bool {
        self.hover(x, y)
    }

    fn emit(
        &mut self,
        x: u16,
        y: u16,
        button: MouseButton,
        action: MouseAction,
        modifiers: Modifiers,
    ) -> bool {
        self.position = (x, y);
        self.sink
            .send_mouse(MouseEvent::new(x, y, button, action).with_modifiers(modifiers))
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    pub fn key(&mut self, key: KeyEvent) {
        self.sink.send_key(key);
    }

    /// Send a key written as a spec such as `"ctrl+c"` or `"shift+tab"`.
    pub fn key_spec(&mut self, spec: &str) -> Result<(), KeySpecError> {
        let key = parse_key_spec(spec)?;
        self.sink.send_key(key);
        Ok(())
    }

    /// Type `text` one key per character.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.sink.send_key(KeyEvent::new(char_key(ch)));
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.sink.send_paste(text);
    }
}

fn char_key(ch: char) -> KeyCode {
    match ch {
        '\n' | '\r' => KeyCode::Enter,
        '\t' => KeyCode::Tab,
        c => KeyCode::Char(c),
    }
}

/// Point `i` of `n` on the segment `a..=b`.
fn lerp(a: u16, b: u16, i: u16, n: u16) -> u16 {
    if n == 0 {
        return b;
    }
    let delta = (i32::from(b) - i32::from(a)) * i32::from(i) / i32::from(n);
    u16::try_from(i32::from(a) + delta).unwrap_or(b)
}
