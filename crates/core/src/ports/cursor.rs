//! Cursor codec port and the default base64 implementation.
//!
//! A cursor encodes a `(connection tag, order key)` pair. The codec is
//! pure: no process-local secrets, so cursors survive restarts.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::CursorError;

use super::pagination::Cursor;

/// Decoded cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    /// Connection the cursor was issued by.
    pub tag: String,
    /// Order key of the item, in text form.
    pub key: String,
}

impl CursorPosition {
    pub fn new(tag: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: key.into(),
        }
    }
}

/// Encodes and decodes opaque cursors.
pub trait CursorCodec: Send + Sync {
    /// Encode a position into an opaque cursor.
    fn encode(&self, position: &CursorPosition) -> Cursor;

    /// Decode an opaque cursor.
    fn decode(&self, cursor: &Cursor) -> Result<CursorPosition, CursorError>;

    /// Decode and require the cursor to belong to `tag`.
    fn decode_for(&self, cursor: &Cursor, tag: &str) -> Result<CursorPosition, CursorError> {
        let position = self.decode(cursor)?;
        if position.tag != tag {
            return Err(CursorError::TagMismatch {
                expected: tag.to_string(),
                found: position.tag,
            });
        }
        Ok(position)
    }
}

/// Standard base64 of `"{tag}:{key}"`.
///
/// Tags must not contain `:`; keys may.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64CursorCodec;

impl CursorCodec for Base64CursorCodec {
    fn encode(&self, position: &CursorPosition) -> Cursor {
        Cursor::new(STANDARD.encode(format!("{}:{}", position.tag, position.key)))
    }

    fn decode(&self, cursor: &Cursor) -> Result<CursorPosition, CursorError> {
        let bytes = STANDARD
            .decode(cursor.value.as_bytes())
            .map_err(|_| CursorError::InvalidEncoding)?;
        let text = String::from_utf8(bytes).map_err(|_| CursorError::InvalidUtf8)?;

        let (tag, key) = text
            .split_once(':')
            .ok_or_else(|| CursorError::Malformed("missing ':' separator".into()))?;
        if tag.is_empty() {
            return Err(CursorError::Malformed("empty connection tag".into()));
        }
        if key.is_empty() {
            return Err(CursorError::Malformed("empty order key".into()));
        }

        Ok(CursorPosition::new(tag, key))
    }
}

/// Order keys that can be written into and read back from a cursor.
pub trait CursorKey: Sized + Send + Sync {
    fn to_cursor_key(&self) -> String;
    fn from_cursor_key(raw: &str) -> Option<Self>;
}

impl CursorKey for i64 {
    fn to_cursor_key(&self) -> String {
        self.to_string()
    }

    fn from_cursor_key(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl CursorKey for String {
    fn to_cursor_key(&self) -> String {
        self.clone()
    }

    fn from_cursor_key(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}
