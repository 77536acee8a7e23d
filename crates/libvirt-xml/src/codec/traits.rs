//! Per-type codec hooks and the decode context.
//!
//! Every schema type implements [`XmlDecode`] and [`XmlEncode`] by hand over
//! the element tree. Plain records read their attributes and children through
//! the helpers on [`DecodeContext`]; variant records first select a
//! discriminant with [`Discriminant::select`](crate::codec::variant::Discriminant::select).

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::codec::document::DecodeOptions;
use crate::codec::scalar::{parse_int, parse_uint, Radix};
use crate::codec::tree::Element;
use crate::codec::variant::Discriminant;
use crate::error::{DecodeError, EncodeError};

/// Decodes a value from an element.
pub trait XmlDecode: Sized {
    fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError>;
}

/// Encodes a value as an element with the given name.
///
/// The name is supplied by the parent because the same record is used under
/// several element names (`memory`/`currentMemory`, `inbound`/`outbound`).
pub trait XmlEncode {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError>;
}

/// State threaded through a decode: the options and the element path.
#[derive(Debug)]
pub struct DecodeContext<'o> {
    options: &'o DecodeOptions,
    path: Vec<String>,
}

impl<'o> DecodeContext<'o> {
    /// Creates a context positioned at the document root.
    pub fn new(options: &'o DecodeOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    /// Returns the decode options.
    pub fn options(&self) -> &DecodeOptions {
        self.options
    }

    /// Returns the current element path, e.g. `/domain/devices/disk[2]`.
    pub fn path(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            out.push_str(segment);
        }
        out
    }

    /// Runs `f` with `segment` appended to the path.
    pub fn scoped<T>(
        &mut self,
        segment: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    /// Decodes `el` as `T` with its name appended to the path.
    pub fn decode_at<T: XmlDecode>(&mut self, el: &Element, segment: impl Into<String>) -> Result<T, DecodeError> {
        self.scoped(segment, |ctx| T::from_element(el, ctx))
    }

    // =========================================================================
    // CHILDREN
    // =========================================================================

    /// Decodes the first child named `name`, if present.
    ///
    /// In lenient mode an unknown discriminant anywhere below the child drops
    /// the child instead of failing the document.
    pub fn child<T: XmlDecode>(&mut self, el: &Element, name: &str) -> Result<Option<T>, DecodeError> {
        match el.child(name) {
            Some(child) => {
                let result = self.decode_at(child, name);
                self.skippable(result)
            }
            None => Ok(None),
        }
    }

    /// Decodes the first child named `name` with a custom decoder that may
    /// itself yield nothing.
    pub fn child_with<T>(
        &mut self,
        el: &Element,
        name: &str,
        f: impl FnOnce(&Element, &mut Self) -> Result<Option<T>, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        match el.child(name) {
            Some(child) => {
                let result = self.scoped(name, |ctx| f(child, ctx));
                Ok(self.skippable(result)?.flatten())
            }
            None => Ok(None),
        }
    }

    /// Decodes the first child named `name`, failing if it is absent.
    pub fn required_child<T: XmlDecode>(&mut self, el: &Element, name: &str) -> Result<T, DecodeError> {
        match el.child(name) {
            Some(child) => self.decode_at(child, name),
            None => Err(self.missing_element(name)),
        }
    }

    /// Decodes every child named `name`, in document order.
    pub fn children<T: XmlDecode>(&mut self, el: &Element, name: &str) -> Result<Vec<T>, DecodeError> {
        let mut out = Vec::new();
        for (index, child) in el.children_named(name).enumerate() {
            let result = self.decode_at(child, format!("{}[{}]", name, index + 1));
            if let Some(value) = self.skippable(result)? {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Decodes every child named `name` with a custom decoder that may skip
    /// individual children by yielding `None`.
    pub fn children_with<T>(
        &mut self,
        el: &Element,
        name: &str,
        mut f: impl FnMut(&Element, &mut Self) -> Result<Option<T>, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let mut out = Vec::new();
        for (index, child) in el.children_named(name).enumerate() {
            let result = self.scoped(format!("{}[{}]", name, index + 1), |ctx| f(child, ctx));
            if let Some(value) = self.skippable(result)?.flatten() {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Decodes every element child in document order, whatever its name.
    ///
    /// Each child is scoped as `name[i]`, counting siblings of the same
    /// name. `f` yields `None` for children it does not collect.
    pub fn elements_with<T>(
        &mut self,
        el: &Element,
        mut f: impl FnMut(&Element, &mut Self) -> Result<Option<T>, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let mut seen: FxHashMap<Cow<'_, str>, usize> = FxHashMap::default();
        let mut out = Vec::new();
        for child in el.elements() {
            let name = child.qualified_name();
            let count = seen.entry(name.clone()).or_default();
            *count += 1;
            let segment = format!("{}[{}]", name, count);
            let result = self.scoped(segment, |ctx| f(child, ctx));
            if let Some(value) = self.skippable(result)?.flatten() {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// Decodes the `item` children of the `wrapper` child, if present.
    pub fn wrapped_children<T: XmlDecode>(&mut self, el: &Element, wrapper: &str, item: &str) -> Result<Vec<T>, DecodeError> {
        match el.child(wrapper) {
            Some(inner) => self.scoped(wrapper, |ctx| ctx.children(inner, item)),
            None => Ok(Vec::new()),
        }
    }

    /// Reads the required attribute `attr` of every child named `name`.
    pub fn attr_list(&mut self, el: &Element, name: &str, attr: &str) -> Result<Vec<String>, DecodeError> {
        let mut out = Vec::new();
        for (index, child) in el.children_named(name).enumerate() {
            out.push(self.scoped(format!("{}[{}]", name, index + 1), |ctx| ctx.required_attr(child, attr))?);
        }
        Ok(out)
    }

    fn skippable<T>(&self, result: Result<T, DecodeError>) -> Result<Option<T>, DecodeError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(DecodeError::UnknownDiscriminant { group, attr, value, path })
                if self.options.lenient_discriminants =>
            {
                warn!(group, attr, %value, %path, "skipping element with unknown discriminant");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // ATTRIBUTES AND TEXT
    // =========================================================================

    /// Returns a required attribute.
    pub fn required_attr(&self, el: &Element, name: &str) -> Result<String, DecodeError> {
        el.attr_string(name).ok_or_else(|| DecodeError::MissingAttribute {
            attr: name.to_string(),
            path: self.path(),
        })
    }

    /// Parses an optional unsigned attribute.
    pub fn uint_attr<T: TryFrom<u64>>(&self, el: &Element, name: &str, radix: Radix) -> Result<Option<T>, DecodeError> {
        match el.attr(name) {
            Some(text) => self.parse_uint_value(name, text, radix).map(Some),
            None => Ok(None),
        }
    }

    /// Parses a required unsigned attribute.
    pub fn required_uint_attr<T: TryFrom<u64>>(&self, el: &Element, name: &str, radix: Radix) -> Result<T, DecodeError> {
        let text = self.required_attr(el, name)?;
        self.parse_uint_value(name, &text, radix)
    }

    /// Parses an optional signed decimal attribute.
    pub fn int_attr<T: TryFrom<i64>>(&self, el: &Element, name: &str) -> Result<Option<T>, DecodeError> {
        match el.attr(name) {
            Some(text) => self.parse_int_value(name, text).map(Some),
            None => Ok(None),
        }
    }

    /// Parses an optional decimal floating-point attribute.
    pub fn float_attr(&self, el: &Element, name: &str) -> Result<Option<f64>, DecodeError> {
        match el.attr(name) {
            Some(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|err| self.malformed(name, text, err.to_string())),
            None => Ok(None),
        }
    }

    /// Parses the text of the child `name` as an unsigned value.
    pub fn uint_text<T: TryFrom<u64>>(&mut self, el: &Element, name: &str, radix: Radix) -> Result<Option<T>, DecodeError> {
        match el.child(name) {
            Some(child) => {
                let text = child.text();
                self.scoped(name, |ctx| ctx.parse_uint_value(name, &text, radix))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    /// Returns the text of a required child element.
    pub fn required_text(&self, el: &Element, name: &str) -> Result<String, DecodeError> {
        el.child_text(name).ok_or_else(|| self.missing_element(name))
    }

    /// Parses the text of a required child element as an unsigned value.
    pub fn required_uint_text<T: TryFrom<u64>>(&mut self, el: &Element, name: &str, radix: Radix) -> Result<T, DecodeError> {
        match self.uint_text(el, name, radix)? {
            Some(value) => Ok(value),
            None => Err(self.missing_element(name)),
        }
    }

    /// Parses the text of the child `name` as a signed value.
    pub fn int_text<T: TryFrom<i64>>(&mut self, el: &Element, name: &str) -> Result<Option<T>, DecodeError> {
        match el.child(name) {
            Some(child) => {
                let text = child.text();
                self.scoped(name, |ctx| ctx.parse_int_value(name, &text))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    /// Parses the element's own text as an unsigned value.
    pub fn uint_content<T: TryFrom<u64>>(&self, el: &Element, radix: Radix) -> Result<Option<T>, DecodeError> {
        match el.text_opt() {
            Some(text) => self.parse_uint_value(&el.name, &text, radix).map(Some),
            None => Ok(None),
        }
    }

    pub fn parse_uint_value<T: TryFrom<u64>>(&self, field: &str, text: &str, radix: Radix) -> Result<T, DecodeError> {
        let value = parse_uint(text, radix).map_err(|err| self.malformed(field, text, err.to_string()))?;
        T::try_from(value).map_err(|_| self.malformed(field, text, "value out of range"))
    }

    pub fn parse_int_value<T: TryFrom<i64>>(&self, field: &str, text: &str) -> Result<T, DecodeError> {
        let value = parse_int(text).map_err(|err| self.malformed(field, text, err.to_string()))?;
        T::try_from(value).map_err(|_| self.malformed(field, text, "value out of range"))
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    pub fn malformed(&self, field: &str, value: &str, reason: impl Into<String>) -> DecodeError {
        DecodeError::MalformedScalar {
            field: field.to_string(),
            value: value.to_string(),
            path: self.path(),
            reason: reason.into(),
        }
    }

    pub fn missing_element(&self, name: &str) -> DecodeError {
        DecodeError::MissingElement {
            element: name.to_string(),
            path: self.path(),
        }
    }

    pub fn missing_discriminant(&self, group: &Discriminant) -> DecodeError {
        DecodeError::MissingDiscriminant {
            group: group.group,
            attr: group.attr,
            path: self.path(),
        }
    }

    /// Builds the error for a discriminant outside the group's vocabulary.
    pub fn unknown_discriminant(&self, group: &Discriminant, value: &str) -> DecodeError {
        DecodeError::UnknownDiscriminant {
            group: group.group,
            attr: group.attr,
            value: value.to_string(),
            path: self.path(),
        }
    }

    pub fn unexpected(&self, detail: impl Into<String>) -> DecodeError {
        DecodeError::UnexpectedContent {
            detail: detail.into(),
            path: self.path(),
        }
    }
}

/// Strings decode from the element's character data.
impl XmlDecode for String {
    fn from_element(el: &Element, _ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
        Ok(el.text())
    }
}

/// Strings encode as `<name>text</name>`.
impl XmlEncode for String {
    fn to_element(&self, name: &str) -> Result<Element, EncodeError> {
        let mut el = Element::new(name);
        el.push_text(self);
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tree::parse;

    #[test]
    fn test_path_tracking() {
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        assert_eq!(ctx.path(), "/");
        let path = ctx
            .scoped("domain", |ctx| ctx.scoped("devices", |ctx| Ok(ctx.path())))
            .unwrap();
        assert_eq!(path, "/domain/devices");
        assert_eq!(ctx.path(), "/");
    }

    #[test]
    fn test_uint_attr_presence() {
        let el = parse(r#"<address bus="0x01" slot="0"/>"#).unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        assert_eq!(ctx.uint_attr::<u32>(&el, "bus", Radix::Auto).unwrap(), Some(1));
        assert_eq!(ctx.uint_attr::<u32>(&el, "slot", Radix::Auto).unwrap(), Some(0));
        assert_eq!(ctx.uint_attr::<u32>(&el, "function", Radix::Auto).unwrap(), None);
    }

    #[test]
    fn test_uint_attr_range() {
        let el = parse(r#"<address bus="0x1ff"/>"#).unwrap();
        let options = DecodeOptions::default();
        let ctx = DecodeContext::new(&options);
        let err = ctx.uint_attr::<u8>(&el, "bus", Radix::Auto).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedScalar { .. }));
    }

    #[test]
    fn test_children_paths_in_errors() {
        struct Port(#[allow(dead_code)] u32);
        impl XmlDecode for Port {
            fn from_element(el: &Element, ctx: &mut DecodeContext<'_>) -> Result<Self, DecodeError> {
                let value = ctx.uint_attr(el, "n", Radix::Decimal)?;
                value.map(Port).ok_or_else(|| ctx.missing_element("n"))
            }
        }
        let el = parse(r#"<ports><port n="1"/><port n="x"/></ports>"#).unwrap();
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(&options);
        let err = ctx
            .scoped("ports", |ctx| ctx.children::<Port>(&el, "port"))
            .err()
            .unwrap();
        assert_eq!(err.path(), Some("/ports/port[2]"));
    }
}
