#![forbid(unsafe_code)]

//! Click synthesis for decoded mouse reports.
//!
//! Terminals only report presses, releases and motion. The dispatcher works
//! in terms of clicks, so [`MouseNormalizer`] pairs a release with the press
//! that preceded it and appends a synthetic [`MouseAction::Click`].

use smallvec::SmallVec;

use crate::event::{MouseAction, MouseButton, MouseEvent};

/// Normalized events produced for one raw report (at most two).
pub type Normalized = SmallVec<[MouseEvent; 2]>;

/// Stateful press/release pairing.
#[derive(Debug, Clone, Default)]
pub struct MouseNormalizer {
    pending: Option<MouseEvent>,
}

impl MouseNormalizer {
    /// Create a normalizer with no pending press.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// The press currently awaiting its release, if any.
    #[must_use]
    pub const fn pending_press(&self) -> Option<&MouseEvent> {
        self.pending.as_ref()
    }

    /// Forget any pending press.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    /// Feed one raw report and return the normalized events it yields.
    ///
    /// - wheel press: a single `Click` carrying the scroll button
    /// - press: passes through, remembered for pairing
    /// - release at the pressed cell: `[Release, Click]`; X10 releases
    ///   (button `None`) inherit the pressed button
    /// - drag that leaves the pressed cell cancels the pending click
    /// - anything else passes through unchanged
    pub fn normalize(&mut self, event: MouseEvent) -> Normalized {
        let mut out = Normalized::new();
        match event.action {
            MouseAction::Press if event.button.is_scroll() => {
                out.push(MouseEvent {
                    action: MouseAction::Click,
                    ..event
                });
            }
            MouseAction::Press => {
                self.pending = Some(event);
                out.push(event);
            }
            MouseAction::Release => {
                let press = self.pending.take();
                let button = match (event.button, press) {
                    (MouseButton::None, Some(p)) => p.button,
                    (button, _) => button,
                };
                let release = MouseEvent { button, ..event };
                out.push(release);
                if let Some(p) = press
                    && p.button == button
                    && p.position() == event.position()
                {
                    crate::trace!(x = event.x, y = event.y, ?button, "synthesized click");
                    out.push(MouseEvent {
                        action: MouseAction::Click,
                        ..release
                    });
                }
            }
            MouseAction::Drag => {
                if self
                    .pending
                    .is_some_and(|p| p.position() != event.position())
                {
                    self.pending = None;
                }
                out.push(event);
            }
            MouseAction::Click | MouseAction::Move => out.push(event),
        }
        out
    }
}
