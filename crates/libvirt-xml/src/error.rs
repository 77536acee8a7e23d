//! Error types for libvirt XML encoding and decoding.

use thiserror::Error;

/// Error categories reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Input is not well-formed markup, or has the wrong root
    MalformedMarkup,
    /// E002: Discriminant value outside the group's vocabulary
    UnknownDiscriminant,
    /// E003: Required discriminant absent and the group has no default
    MissingDiscriminant,
    /// E004: Numeric attribute or element text failed to parse
    MalformedScalar,
    /// E005: Required element or attribute absent
    StructuralMismatch,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MalformedMarkup => "E001",
            ErrorCode::UnknownDiscriminant => "E002",
            ErrorCode::MissingDiscriminant => "E003",
            ErrorCode::MalformedScalar => "E004",
            ErrorCode::StructuralMismatch => "E005",
        }
    }
}

/// Error during XML decoding.
///
/// Every variant that refers to a node carries the element path from the
/// document root, e.g. `/domain/devices/hostdev[2]/source`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: Malformed markup ===
    #[error("[E001] malformed markup at byte {position}: {message}")]
    MalformedMarkup { position: usize, message: String },

    #[error("[E001] expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    // === E002: Unknown discriminant ===
    #[error("[E002] unknown {group} {attr}={value:?} at {path}")]
    UnknownDiscriminant {
        group: &'static str,
        attr: &'static str,
        value: String,
        path: String,
    },

    // === E003: Missing discriminant ===
    #[error("[E003] missing {group} discriminant '{attr}' at {path}")]
    MissingDiscriminant {
        group: &'static str,
        attr: &'static str,
        path: String,
    },

    // === E004: Malformed scalar ===
    #[error("[E004] malformed {field} value {value:?} at {path}: {reason}")]
    MalformedScalar {
        field: String,
        value: String,
        path: String,
        reason: String,
    },

    // === E005: Structural mismatch ===
    #[error("[E005] missing required element <{element}> at {path}")]
    MissingElement { element: String, path: String },

    #[error("[E005] missing required attribute '{attr}' at {path}")]
    MissingAttribute { attr: String, path: String },

    #[error("[E005] unexpected content at {path}: {detail}")]
    UnexpectedContent { detail: String, path: String },
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::MalformedMarkup { .. } | DecodeError::UnexpectedRoot { .. } => {
                ErrorCode::MalformedMarkup
            }
            DecodeError::UnknownDiscriminant { .. } => ErrorCode::UnknownDiscriminant,
            DecodeError::MissingDiscriminant { .. } => ErrorCode::MissingDiscriminant,
            DecodeError::MalformedScalar { .. } => ErrorCode::MalformedScalar,
            DecodeError::MissingElement { .. }
            | DecodeError::MissingAttribute { .. }
            | DecodeError::UnexpectedContent { .. } => ErrorCode::StructuralMismatch,
        }
    }

    /// Returns the element path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::MalformedMarkup { .. } | DecodeError::UnexpectedRoot { .. } => None,
            DecodeError::UnknownDiscriminant { path, .. }
            | DecodeError::MissingDiscriminant { path, .. }
            | DecodeError::MalformedScalar { path, .. }
            | DecodeError::MissingElement { path, .. }
            | DecodeError::MissingAttribute { path, .. }
            | DecodeError::UnexpectedContent { path, .. } => Some(path),
        }
    }
}

/// Error during XML encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("xml writer failed: {0}")]
    Writer(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("encoded document is not valid UTF-8")]
    Utf8,
}

impl From<quick_xml::Error> for EncodeError {
    fn from(err: quick_xml::Error) -> Self {
        EncodeError::Writer(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_by_category() {
        let err = DecodeError::UnknownDiscriminant {
            group: "hostdev",
            attr: "type",
            value: "nosuchtype".to_string(),
            path: "/domain/devices/hostdev".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::UnknownDiscriminant);
        assert_eq!(err.code().code(), "E002");
        assert_eq!(err.path(), Some("/domain/devices/hostdev"));

        let err = DecodeError::MissingAttribute {
            attr: "name".to_string(),
            path: "/filter".to_string(),
        };
        assert_eq!(err.code().code(), "E005");
    }

    #[test]
    fn test_message_carries_path() {
        let err = DecodeError::MalformedScalar {
            field: "bus".to_string(),
            value: "zz".to_string(),
            path: "/domain/devices/disk/address".to_string(),
            reason: "invalid digit".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[E004]"));
        assert!(msg.contains("/domain/devices/disk/address"));
    }
}
