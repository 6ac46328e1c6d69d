//! DEC private modes tracked by the terminal.

use bitflags::bitflags;

bitflags! {
    /// Mode flags toggled by `CSI ? Pm h` / `CSI ? Pm l`.
    ///
    /// Cursor visibility (mode 25) lives on [`Cursor`](crate::Cursor).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modes: u8 {
        /// Mode 1000: report mouse buttons to the application.
        const MOUSE_TRACKING  = 1 << 0;
        /// Mode 2004: wrap pastes in `ESC[200~` / `ESC[201~`.
        const BRACKETED_PASTE = 1 << 1;
        /// Mode 1049: alternate screen active.
        const ALT_SCREEN      = 1 << 2;
    }
}

impl Modes {
    #[must_use]
    pub const fn mouse_tracking(self) -> bool {
        self.contains(Self::MOUSE_TRACKING)
    }

    #[must_use]
    pub const fn bracketed_paste(self) -> bool {
        self.contains(Self::BRACKETED_PASTE)
    }

    #[must_use]
    pub const fn alt_screen(self) -> bool {
        self.contains(Self::ALT_SCREEN)
    }
}

/// DEC private modes the terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecMode {
    /// 25: text cursor enable.
    CursorVisible,
    /// 1000: X11 mouse reporting.
    MouseTracking,
    /// 1049: alternate screen buffer.
    AltScreen,
    /// 2004: bracketed paste.
    BracketedPaste,
}

impl DecMode {
    /// Map a numeric mode to a known mode.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            25 => Some(Self::CursorVisible),
            1000 => Some(Self::MouseTracking),
            1049 => Some(Self::AltScreen),
            2004 => Some(Self::BracketedPaste),
            _ => None,
        }
    }

    /// The numeric mode parameter.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::CursorVisible => 25,
            Self::MouseTracking => 1000,
            Self::AltScreen => 1049,
            Self::BracketedPaste => 2004,
        }
    }

    /// The flag backing this mode, if it is kept in [`Modes`].
    #[must_use]
    pub const fn flag(self) -> Option<Modes> {
        match self {
            Self::CursorVisible => None,
            Self::MouseTracking => Some(Modes::MOUSE_TRACKING),
            Self::AltScreen => Some(Modes::ALT_SCREEN),
            Self::BracketedPaste => Some(Modes::BRACKETED_PASTE),
        }
    }
}
