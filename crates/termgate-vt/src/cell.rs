//! Terminal cell: the fundamental unit of the grid.
//!
//! Each cell stores one character and its SGR attributes. Attributes are
//! tracked so hosts can inspect them, but nothing in the engine branches on
//! them.

use bitflags::bitflags;

bitflags! {
    /// SGR text attribute flags.
    ///
    /// Maps directly to the ECMA-48 / VT100 SGR parameter values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SgrFlags: u8 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

/// Color representation for terminal cells.
///
/// Supports the standard terminal color model hierarchy:
/// default → 16 named → 256 indexed → 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (SGR 39 / SGR 49).
    #[default]
    Default,
    /// Named color index (0-15): standard 8 + bright 8.
    Named(u8),
    /// 256-color palette index (0-255).
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

/// SGR attributes for a cell: flags + foreground/background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SgrAttrs {
    pub flags: SgrFlags,
    pub fg: Color,
    pub bg: Color,
}

impl SgrAttrs {
    /// Reset all attributes to default (SGR 0).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply one `CSI ... m` parameter list.
    ///
    /// Extended colors (`38;5;n`, `38;2;r;g;b` and the `48` forms) consume
    /// their sub-parameters. Unknown codes are ignored.
    pub fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let code = params[i];
            i += 1;
            match code {
                0 => self.reset(),
                1 => self.flags.insert(SgrFlags::BOLD),
                2 => self.flags.insert(SgrFlags::DIM),
                3 => self.flags.insert(SgrFlags::ITALIC),
                4 => self.flags.insert(SgrFlags::UNDERLINE),
                5 => self.flags.insert(SgrFlags::BLINK),
                7 => self.flags.insert(SgrFlags::INVERSE),
                8 => self.flags.insert(SgrFlags::HIDDEN),
                9 => self.flags.insert(SgrFlags::STRIKETHROUGH),
                21 | 24 => self.flags.remove(SgrFlags::UNDERLINE),
                22 => self.flags.remove(SgrFlags::BOLD | SgrFlags::DIM),
                23 => self.flags.remove(SgrFlags::ITALIC),
                25 => self.flags.remove(SgrFlags::BLINK),
                27 => self.flags.remove(SgrFlags::INVERSE),
                28 => self.flags.remove(SgrFlags::HIDDEN),
                29 => self.flags.remove(SgrFlags::STRIKETHROUGH),
                30..=37 => self.fg = Color::Named((code - 30) as u8),
                39 => self.fg = Color::Default,
                40..=47 => self.bg = Color::Named((code - 40) as u8),
                49 => self.bg = Color::Default,
                90..=97 => self.fg = Color::Named((code - 90 + 8) as u8),
                100..=107 => self.bg = Color::Named((code - 100 + 8) as u8),
                38 | 48 => {
                    let (color, used) = parse_extended_color(&params[i..]);
                    i += used;
                    if let Some(color) = color {
                        if code == 38 {
                            self.fg = color;
                        } else {
                            self.bg = color;
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Parse the tail of an extended color (`5;n` or `2;r;g;b`).
///
/// Returns the color (if well-formed) and the number of params consumed.
fn parse_extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    let channel = |v: u16| u8::try_from(v).ok();
    match rest {
        [5, n, ..] => (channel(*n).map(Color::Indexed), 2),
        [2, r, g, b, ..] => {
            let color = match (channel(*r), channel(*g), channel(*b)) {
                (Some(r), Some(g), Some(b)) => Some(Color::Rgb(r, g, b)),
                _ => None,
            };
            (color, 4)
        }
        // Malformed: swallow the remainder so stray numbers are not
        // reinterpreted as attributes.
        _ => (None, rest.len()),
    }
}

/// A single cell in the terminal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character content. A space for empty/erased cells.
    content: char,
    /// SGR text attributes.
    pub attrs: SgrAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: ' ',
            attrs: SgrAttrs::default(),
        }
    }
}

impl Cell {
    /// Create a new cell with the given character and default attributes.
    pub fn new(ch: char) -> Self {
        Self {
            content: ch,
            attrs: SgrAttrs::default(),
        }
    }

    /// Create a new cell with the given character and attributes.
    pub fn with_attrs(ch: char, attrs: SgrAttrs) -> Self {
        Self { content: ch, attrs }
    }

    /// The character content of this cell.
    pub fn content(&self) -> char {
        self.content
    }

    /// Whether the cell holds nothing but a default-styled space.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Set the character content, keeping attributes.
    pub fn set_content(&mut self, ch: char) {
        self.content = ch;
    }

    /// Reset this cell to a blank space with the given background.
    ///
    /// Used by erase operations (ED, EL) which fill with the current
    /// background color but reset all other attributes.
    pub fn erase(&mut self, bg: Color) {
        self.content = ' ';
        self.attrs = SgrAttrs {
            bg,
            ..SgrAttrs::default()
        };
    }

    /// Reset this cell to a blank space with default attributes.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
