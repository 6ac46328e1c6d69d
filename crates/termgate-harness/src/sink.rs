//! Destinations for simulated input.

use std::time::{Duration, Instant};

use termgate_core::{KeyEvent, MouseEvent, MouseFormat, MouseNormalizer};
use termgate_hit::HitRegistry;
use termgate_vt::Terminal;

/// Something that accepts synthesized keyboard and mouse input.
pub trait InputSink {
    fn send_key(&mut self, key: KeyEvent);

    /// Deliver one raw mouse event. Returns whether the sink accepted it.
    fn send_mouse(&mut self, event: MouseEvent) -> bool;

    /// Choose the wire format for sinks that encode mouse reports.
    fn set_mouse_format(&mut self, _format: MouseFormat) {}

    /// Deliver pasted text. Sinks without a paste notion ignore it.
    fn send_paste(&mut self, _text: &str) {}
}

impl<S: InputSink + ?Sized> InputSink for &mut S {
    fn send_key(&mut self, key: KeyEvent) {
        (**self).send_key(key);
    }

    fn send_mouse(&mut self, event: MouseEvent) -> bool {
        (**self).send_mouse(event)
    }

    fn set_mouse_format(&mut self, format: MouseFormat) {
        (**self).set_mouse_format(format);
    }

    fn send_paste(&mut self, text: &str) {
        (**self).send_paste(text);
    }
}

impl InputSink for Terminal {
    fn send_key(&mut self, key: KeyEvent) {
        Terminal::send_key(self, key);
    }

    fn send_mouse(&mut self, event: MouseEvent) -> bool {
        Terminal::send_mouse(self, event)
    }

    fn set_mouse_format(&mut self, format: MouseFormat) {
        Terminal::set_mouse_format(self, format);
    }

    fn send_paste(&mut self, text: &str) {
        Terminal::send_paste(self, text);
    }
}

// ---------------------------------------------------------------------------
// DispatchSink
// ---------------------------------------------------------------------------

/// Dispatches mouse input directly into a [`HitRegistry`], skipping the wire.
///
/// Raw press/release pairs go through a [`MouseNormalizer`] first, so the
/// registry sees the same click stream a decoded terminal would produce.
/// Time is a manual clock: it only moves when [`advance`](Self::advance)
/// is called, which keeps double-click pairing deterministic.
#[derive(Debug)]
pub struct DispatchSink {
    registry: HitRegistry,
    normalizer: MouseNormalizer,
    now: Instant,
    keys: Vec<KeyEvent>,
    pastes: Vec<String>,
}

impl DispatchSink {
    #[must_use]
    pub fn new(registry: HitRegistry) -> Self {
        Self {
            registry,
            normalizer: MouseNormalizer::new(),
            now: Instant::now(),
            keys: Vec::new(),
            pastes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &HitRegistry {
        &self.registry
    }

    /// Mutable access, e.g. to rebuild the registry for the next frame.
    pub fn registry_mut(&mut self) -> &mut HitRegistry {
        &mut self.registry
    }

    /// Move the manual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Current reading of the manual clock.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Keys received so far, oldest first.
    pub fn keys(&self) -> &[KeyEvent] {
        &self.keys
    }

    /// Pastes received so far, oldest first.
    pub fn pastes(&self) -> &[String] {
        &self.pastes
    }

    pub fn into_registry(self) -> HitRegistry {
        self.registry
    }
}

impl InputSink for DispatchSink {
    fn send_key(&mut self, key: KeyEvent) {
        self.keys.push(key);
    }

    /// Returns whether any normalized event landed on an element.
    fn send_mouse(&mut self, event: MouseEvent) -> bool {
        let mut hit = false;
        for normalized in self.normalizer.normalize(event) {
            hit |= self.registry.handle_mouse_event_at(&normalized, self.now);
        }
        hit
    }

    fn send_paste(&mut self, text: &str) {
        self.pastes.push(text.to_owned());
    }
}
