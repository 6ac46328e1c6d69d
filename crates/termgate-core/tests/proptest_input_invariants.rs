//! Property-based invariant tests for the input decoder and mouse codec.
//!
//! 1. The decoder never panics on arbitrary bytes.
//! 2. Chunking does not matter: any split of a byte stream decodes to the
//!    same events as the whole stream.
//! 3. SGR reports synthesized by the codec decode back to the same event.
//! 4. X10 reports never carry a byte above 255 and clamp at 223.
//! 5. Synthesized keys decode to the key that produced them.

use proptest::prelude::*;
use termgate_core::mouse_codec::X10_MAX_COORD;
use termgate_core::{
    Event, InputParser, KeyCode, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent,
    encode_key, encode_sgr, encode_x10,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn button_strategy() -> impl Strategy<Value = MouseButton> {
    prop_oneof![
        Just(MouseButton::Left),
        Just(MouseButton::Middle),
        Just(MouseButton::Right),
    ]
}

fn modifier_strategy() -> impl Strategy<Value = Modifiers> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(s, a, c)| {
        let mut m = Modifiers::NONE;
        m.set(Modifiers::SHIFT, s);
        m.set(Modifiers::ALT, a);
        m.set(Modifiers::CTRL, c);
        m
    })
}

fn decode_all(bytes: &[u8]) -> Vec<Event> {
    let mut parser = InputParser::new();
    let mut events = parser.parse(bytes);
    events.extend(parser.flush());
    events
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Never panics
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn decoder_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_all(&bytes);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Chunk boundaries are invisible
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_point_does_not_change_events(
        bytes in proptest::collection::vec(any::<u8>(), 0..256),
        split in any::<prop::sample::Index>(),
    ) {
        let whole = decode_all(&bytes);

        let at = split.index(bytes.len() + 1);
        let mut parser = InputParser::new();
        let mut parts = parser.parse(&bytes[..at]);
        parts.extend(parser.parse(&bytes[at..]));
        parts.extend(parser.flush());

        prop_assert_eq!(whole, parts, "split at {} changed decoding", at);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. SGR press/release survive the wire
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sgr_press_decodes_to_source(
        x in 0u16..2000,
        y in 0u16..2000,
        button in button_strategy(),
        release in any::<bool>(),
        mods in modifier_strategy(),
    ) {
        let action = if release { MouseAction::Release } else { MouseAction::Press };
        let bytes = encode_sgr(x, y, button, action, mods);
        let expected = MouseEvent::new(x, y, button, action).with_modifiers(mods);
        prop_assert_eq!(decode_all(&bytes), vec![Event::Mouse(expected)]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. X10 saturation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn x10_coordinates_saturate(x in any::<u16>(), y in any::<u16>(), button in button_strategy()) {
        let bytes = encode_x10(x, y, button, MouseAction::Press);
        prop_assert_eq!(bytes.len(), 6);
        prop_assert_eq!(&bytes[..3], b"\x1b[M");

        let cx = u16::from(bytes[4]) - 32;
        let cy = u16::from(bytes[5]) - 32;
        prop_assert_eq!(cx, (x.saturating_add(1)).min(X10_MAX_COORD));
        prop_assert_eq!(cy, (y.saturating_add(1)).min(X10_MAX_COORD));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Key synthesis agrees with key decoding
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ctrl_letters_decode(c in proptest::char::range('a', 'z')) {
        if c == 'i' || c == 'm' {
            // Ctrl+I and Ctrl+M are indistinguishable from Tab and Enter.
            return Ok(());
        }
        let key = KeyEvent::new(KeyCode::Char(c)).with_modifiers(Modifiers::CTRL);
        prop_assert_eq!(decode_all(&encode_key(&key)), vec![Event::Key(key)]);
    }

    #[test]
    fn printable_chars_decode(c in any::<char>().prop_filter("printable", |c| !c.is_control())) {
        let key = KeyEvent::new(KeyCode::Char(c));
        prop_assert_eq!(decode_all(&encode_key(&key)), vec![Event::Key(key)]);
    }
}
