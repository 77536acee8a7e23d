//! Document entry points and codec options.

use tracing::trace;

use crate::codec::traits::{DecodeContext, XmlDecode, XmlEncode};
use crate::codec::tree::{parse, write};
use crate::error::{DecodeError, EncodeError};

/// Options for decoding documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip elements whose discriminant is outside the group's vocabulary.
    ///
    /// When enabled, the nearest optional or repeated element enclosing the
    /// unknown discriminant is dropped and a warning is logged. When
    /// disabled (the default), decoding fails with `UnknownDiscriminant`.
    pub lenient_discriminants: bool,

    /// Keep elements in unregistered namespaces so they are re-emitted on
    /// encode. Enabled by default.
    pub preserve_foreign: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            lenient_discriminants: false,
            preserve_foreign: true,
        }
    }
}

impl DecodeOptions {
    /// Creates default (strict) decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that skip unknown discriminants instead of failing.
    pub fn lenient() -> Self {
        Self {
            lenient_discriminants: true,
            ..Self::default()
        }
    }
}

/// Options for encoding documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indentation width in spaces, or `None` for single-line output.
    pub indent: Option<usize>,
    /// Emit an `<?xml version="1.0"?>` declaration.
    pub declaration: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: Some(2),
            declaration: false,
        }
    }
}

impl EncodeOptions {
    /// Creates default encoding options (two-space indent, no declaration).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for single-line output without a declaration.
    pub fn compact() -> Self {
        Self {
            indent: None,
            declaration: false,
        }
    }
}

/// A top-level libvirt document with a fixed root element.
pub trait Document: XmlDecode + XmlEncode {
    /// Name of the root element.
    const ROOT: &'static str;

    /// Decodes a document with default options.
    fn decode(text: &str) -> Result<Self, DecodeError> {
        decode_document(text, &DecodeOptions::default())
    }

    /// Decodes a document with the given options.
    fn decode_with_options(text: &str, options: &DecodeOptions) -> Result<Self, DecodeError> {
        decode_document(text, options)
    }

    /// Encodes a document with default options.
    fn encode(&self) -> Result<String, EncodeError> {
        encode_document(self, &EncodeOptions::default())
    }

    /// Encodes a document with the given options.
    fn encode_with_options(&self, options: &EncodeOptions) -> Result<String, EncodeError> {
        encode_document(self, options)
    }
}

/// Decodes a document of type `D` from its XML text.
pub fn decode_document<D: Document>(text: &str, options: &DecodeOptions) -> Result<D, DecodeError> {
    let root = parse(text)?;
    if root.namespace.is_some() || root.name != D::ROOT {
        return Err(DecodeError::UnexpectedRoot {
            expected: D::ROOT,
            found: root.qualified_name().into_owned(),
        });
    }
    trace!(root = D::ROOT, bytes = text.len(), "decoding document");
    let mut ctx = DecodeContext::new(options);
    ctx.decode_at(&root, D::ROOT)
}

/// Encodes a document to XML text.
pub fn encode_document<D: Document>(doc: &D, options: &EncodeOptions) -> Result<String, EncodeError> {
    let root = doc.to_element(D::ROOT)?;
    let text = write(&root, options)?;
    trace!(root = D::ROOT, bytes = text.len(), "encoded document");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_defaults() {
        let decode = DecodeOptions::new();
        assert!(!decode.lenient_discriminants);
        assert!(decode.preserve_foreign);
        assert!(DecodeOptions::lenient().lenient_discriminants);

        let encode = EncodeOptions::new();
        assert_eq!(encode.indent, Some(2));
        assert!(!encode.declaration);
        assert_eq!(EncodeOptions::compact().indent, None);
    }
}
