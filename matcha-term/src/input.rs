//! Keyboard input encoding.
//!
//! Text input is forwarded as UTF-8; Backspace and Return synthesize the
//! matching control bytes. Everything else (modifiers, function keys) is
//! ignored by this terminal.

use winit::keyboard::{Key, NamedKey};

/// Bytes to send to the shell for a pressed key, if any.
pub fn encode_key(key: &Key) -> Option<Vec<u8>> {
    match key {
        Key::Named(NamedKey::Enter) => Some(b"\n".to_vec()),
        Key::Named(NamedKey::Backspace) => Some(b"\x08".to_vec()),
        Key::Named(NamedKey::Space) => Some(b" ".to_vec()),
        Key::Named(NamedKey::Tab) => Some(b"\t".to_vec()),
        Key::Character(text) => Some(text.as_str().as_bytes().to_vec()),
        _ => None,
    }
}
