use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoWireError {
    /// WKT / EWKT grammar violation.
    #[error("malformed WKT: {message} (at {fragment:?})")]
    MalformedText { message: String, fragment: String },

    /// WKB / EWKB violation, including bad hex digits.
    #[error("malformed WKB: {message} (at byte {offset})")]
    MalformedBinary { message: String, offset: usize },

    #[error("geometry conversion error: {0}")]
    Conversion(String),
}

impl GeoWireError {
    pub(crate) fn text(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        GeoWireError::MalformedText {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    pub(crate) fn binary(message: impl Into<String>, offset: usize) -> Self {
        GeoWireError::MalformedBinary {
            message: message.into(),
            offset,
        }
    }

    /// True for errors raised while decoding text input.
    pub fn is_text(&self) -> bool {
        matches!(self, GeoWireError::MalformedText { .. })
    }

    /// True for errors raised while decoding binary or hex input.
    pub fn is_binary(&self) -> bool {
        matches!(self, GeoWireError::MalformedBinary { .. })
    }
}

pub type Result<T> = std::result::Result<T, GeoWireError>;
