//! Record (de)serialization.
//!
//! The driver never looks inside a record. It hands the value to a [`Codec`]
//! and stores whatever bytes come back. [`JsonCodec`] is the default and
//! produces indented JSON with a trailing newline so files stay readable and
//! diff cleanly.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{CodecError, CodecErrorKind};

/// Default indentation: one tab per nesting level.
pub const DEFAULT_INDENT: &str = "\t";

/// Converts records to bytes and back.
pub trait Codec: Send + Sync {
    /// Serialize `value` to the on-disk representation.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecErrorKind::Encode`] error if the value cannot be
    /// represented (e.g., a map with non-string keys).
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserialize `bytes` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecErrorKind::Syntax`] for malformed input and
    /// [`CodecErrorKind::Shape`] when the data does not fit `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// Pretty-printed JSON codec.
///
/// # Example
///
/// ```
/// use filedb_store::{Codec, JsonCodec};
///
/// let codec = JsonCodec::with_indent("  ");
/// let bytes = codec.encode(&serde_json::json!({"name": "Alice"})).unwrap();
/// assert_eq!(bytes, b"{\n  \"name\": \"Alice\"\n}\n");
/// ```
#[derive(Debug, Clone)]
pub struct JsonCodec {
    indent: String,
}

impl JsonCodec {
    /// Create a codec that indents nested values with `indent`.
    #[must_use]
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Indentation string used for nested values.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::with_indent(DEFAULT_INDENT)
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| CodecError::new(CodecErrorKind::Encode, e))?;
        buf.push(b'\n');
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| {
            let kind = match e.classify() {
                Category::Data => CodecErrorKind::Shape,
                Category::Syntax | Category::Eof | Category::Io => CodecErrorKind::Syntax,
            };
            CodecError::new(kind, e)
        })
    }
}
