//! Terminal loopback driver.
//!
//! [`Loopback`] closes the loop a real application sees: synthesized input
//! is encoded by a [`Terminal`], the emitted bytes are decoded by an
//! [`InputParser`], mouse reports are normalized into clicks, and the
//! result is dispatched into a [`HitRegistry`]. Keys, pastes and focus
//! changes are collected for inspection.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use termgate_core::{Event, InputParser, KeyEvent, MouseEvent, MouseFormat, MouseNormalizer};
use termgate_hit::HitRegistry;
use termgate_vt::{ListenerId, Terminal, TerminalEvent};

use crate::sink::InputSink;

const MOUSE_TRACKING_ON: &[u8] = b"\x1b[?1000h";
const MOUSE_TRACKING_OFF: &[u8] = b"\x1b[?1000l";

/// A [`Terminal`] wired back into an input decoder.
#[derive(Debug)]
pub struct Loopback {
    terminal: Terminal,
    listener: ListenerId,
    inbox: Rc<RefCell<Vec<u8>>>,
    parser: InputParser,
    normalizer: MouseNormalizer,
    received: Vec<Event>,
}

impl Loopback {
    /// Take over `terminal`, capturing every data event it emits from now on.
    pub fn new(mut terminal: Terminal) -> Self {
        let inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&inbox);
        let listener = terminal.subscribe(move |event| {
            if let TerminalEvent::Data(bytes) = event {
                sink.borrow_mut().extend_from_slice(bytes);
            }
        });
        Self {
            terminal,
            listener,
            inbox,
            parser: InputParser::new(),
            normalizer: MouseNormalizer::new(),
            received: Vec::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// Mutable access, e.g. to write application output.
    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    /// Detach from the terminal and hand it back.
    pub fn into_terminal(mut self) -> Terminal {
        self.terminal.unsubscribe(self.listener);
        self.terminal
    }

    /// Bytes emitted by the terminal and not yet pumped.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Toggle terminal mouse reporting to match whether `registry` has
    /// anything interactive, as a render loop does after each frame.
    ///
    /// Only writes when the mode actually changes. Returns the new state.
    pub fn sync_mouse_mode(&mut self, registry: &HitRegistry) -> bool {
        let wanted = registry.has_clickable_elements();
        if self.terminal.state().mouse_tracking() != wanted {
            termgate_core::debug!(enabled = wanted, "mouse reporting toggled");
            let toggle = if wanted {
                MOUSE_TRACKING_ON
            } else {
                MOUSE_TRACKING_OFF
            };
            self.terminal.write(toggle);
        }
        wanted
    }

    /// Decode pending bytes and dispatch mouse events, timestamped now.
    ///
    /// Returns how many dispatched events landed on an element.
    pub fn pump(&mut self, registry: &mut HitRegistry) -> usize {
        self.pump_at(registry, Instant::now())
    }

    /// Decode pending bytes and dispatch mouse events at `now`.
    ///
    /// The pending bytes are treated as a complete chunk: a trailing lone
    /// ESC resolves to the Escape key.
    pub fn pump_at(&mut self, registry: &mut HitRegistry, now: Instant) -> usize {
        let bytes = std::mem::take(&mut *self.inbox.borrow_mut());
        let mut events = self.parser.parse(&bytes);
        events.extend(self.parser.flush());
        termgate_core::trace!(bytes = bytes.len(), events = events.len(), "pump");

        let mut hits = 0;
        for event in events {
            match event {
                Event::Mouse(raw) => {
                    for mouse in self.normalizer.normalize(raw) {
                        if registry.handle_mouse_event_at(&mouse, now) {
                            hits += 1;
                        }
                    }
                }
                other => self.received.push(other),
            }
        }
        hits
    }

    /// Non-mouse events decoded so far, oldest first.
    pub fn received(&self) -> &[Event] {
        &self.received
    }

    pub fn take_received(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.received)
    }
}

impl InputSink for Loopback {
    fn send_key(&mut self, key: KeyEvent) {
        self.terminal.send_key(key);
    }

    fn send_mouse(&mut self, event: MouseEvent) -> bool {
        self.terminal.send_mouse(event)
    }

    fn set_mouse_format(&mut self, format: MouseFormat) {
        self.terminal.set_mouse_format(format);
    }

    fn send_paste(&mut self, text: &str) {
        self.terminal.send_paste(text);
    }
}
