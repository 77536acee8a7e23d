//! Owned element tree over quick-xml events.
//!
//! Documents are small (kilobytes), so decoding first builds a tree and the
//! typed decoders then walk it. This keeps lookahead cheap: a variant group can
//! peek at a child element before committing to a variant.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rustc_hash::FxHashMap;

use crate::codec::document::EncodeOptions;
use crate::codec::scalar::{format_uint, UintFormat};
use crate::codec::traits::XmlEncode;
use crate::error::{DecodeError, EncodeError};

/// A single attribute, stored with its qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its resolved namespace.
///
/// `namespace` is the URI the element's prefix (or the default namespace)
/// resolved to during parsing; core libvirt elements have none.
/// `declarations` holds `xmlns` bindings introduced on this element; they are
/// not repeated in `attributes`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub declarations: Vec<(Option<String>, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an unqualified element.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Creates a namespace-qualified element written as `prefix:name`.
    pub fn qualified(prefix: &str, namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: Some(prefix.to_string()),
            namespace: Some(namespace.to_string()),
            ..Self::default()
        }
    }

    /// Returns `prefix:name`, or just `name`.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.name)),
            None => Cow::Borrowed(&self.name),
        }
    }

    /// Returns true if the element has no attributes and no children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Returns true if this is an unqualified element with the given name.
    pub fn is(&self, name: &str) -> bool {
        self.namespace.is_none() && self.name == name
    }

    // =========================================================================
    // READING
    // =========================================================================

    /// Returns the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Returns an attribute value as an owned string.
    pub fn attr_string(&self, name: &str) -> Option<String> {
        self.attr(name).map(str::to_string)
    }

    /// Iterates over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Returns the first unqualified child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(name))
    }

    /// Iterates over unqualified child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.is(name))
    }

    /// Returns true if this element is `name` in `namespace`.
    pub fn is_in(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// Iterates over child elements named `name` in `namespace`.
    pub fn children_in<'a>(&'a self, namespace: &'a str, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.is_in(namespace, name))
    }

    /// Returns true if an unqualified child with this name exists.
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Returns the concatenated character data of this element.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// Returns the character data of this element, or `None` if there is none.
    pub fn text_opt(&self) -> Option<String> {
        let text = self.text();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Returns the text of the first child element with the given name.
    ///
    /// A present but empty child yields `Some("")`.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Returns attribute `attr` of the first child named `name`.
    pub fn child_attr(&self, name: &str, attr: &str) -> Option<String> {
        self.child(name).and_then(|child| child.attr_string(attr))
    }

    // =========================================================================
    // BUILDING
    // =========================================================================

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Sets `name` as the first attribute of the element.
    ///
    /// Discriminants lead the attribute list so that a variant's payload can be
    /// encoded first and tagged afterwards.
    pub fn set_discriminant(&mut self, name: &str, value: &str) {
        self.attributes.retain(|attr| attr.name != name);
        self.attributes.insert(
            0,
            Attribute {
                name: name.to_string(),
                value: value.to_string(),
            },
        );
    }

    /// Sets an attribute if the value is present.
    pub fn set_opt_attr(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.set_attr(name, value);
        }
    }

    /// Sets a numeric attribute if the value is present.
    pub fn set_uint<T: Into<u64>>(&mut self, name: &str, value: Option<T>, format: UintFormat) {
        if let Some(value) = value {
            self.set_attr(name, format_uint(value.into(), format));
        }
    }

    /// Sets a signed decimal attribute if the value is present.
    pub fn set_int<T: Into<i64>>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set_attr(name, value.into().to_string());
        }
    }

    /// Adds a namespace declaration to this element.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let prefix = prefix.map(str::to_string);
        if !self.declarations.iter().any(|(p, _)| *p == prefix) {
            self.declarations.push((prefix, uri.to_string()));
        }
    }

    /// Appends a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends character data.
    pub fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Encodes `value` as a child element named `name`.
    pub fn push_child<T: XmlEncode>(&mut self, name: &str, value: &T) -> Result<(), EncodeError> {
        let child = value.to_element(name)?;
        self.push(child);
        Ok(())
    }

    /// Encodes `value` as a child element if present.
    pub fn push_opt<T: XmlEncode>(&mut self, name: &str, value: Option<&T>) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.push_child(name, value),
            None => Ok(()),
        }
    }

    /// Encodes every value as a child element named `name`.
    pub fn push_all<T: XmlEncode>(&mut self, name: &str, values: &[T]) -> Result<(), EncodeError> {
        for value in values {
            self.push_child(name, value)?;
        }
        Ok(())
    }

    /// Encodes `values` as `item` children of a `wrapper` child. An empty
    /// list writes nothing.
    pub fn push_wrapped<T: XmlEncode>(&mut self, wrapper: &str, item: &str, values: &[T]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut inner = Element::new(wrapper);
        inner.push_all(item, values)?;
        self.push(inner);
        Ok(())
    }

    /// Appends `<name>text</name>` if the text is present.
    pub fn push_text_child(&mut self, name: &str, text: Option<&str>) {
        if let Some(text) = text {
            let mut child = Element::new(name);
            child.push_text(text);
            self.push(child);
        }
    }

    /// Appends `<name attr="value"/>` if the value is present.
    pub fn push_attr_child(&mut self, name: &str, attr: &str, value: Option<&str>) {
        if let Some(value) = value {
            let mut child = Element::new(name);
            child.set_attr(attr, value);
            self.push(child);
        }
    }

    /// Appends `<name>value</name>` if the value is present.
    pub fn push_uint_child<T: Into<u64>>(&mut self, name: &str, value: Option<T>, format: UintFormat) {
        if let Some(value) = value {
            let mut child = Element::new(name);
            child.push_text(&format_uint(value.into(), format));
            self.push(child);
        }
    }

    /// Appends an empty `<name/>` marker element when `flag` is set.
    pub fn push_flag(&mut self, name: &str, flag: bool) {
        if flag {
            self.push(Element::new(name));
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn malformed(position: usize, message: impl Into<String>) -> DecodeError {
    DecodeError::MalformedMarkup {
        position,
        message: message.into(),
    }
}

/// Namespace bindings of the open elements, innermost last.
#[derive(Debug, Default)]
struct Scopes {
    frames: Vec<FxHashMap<String, String>>,
}

impl Scopes {
    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(prefix))
            .map(String::as_str)
    }
}

fn open_element(start: &BytesStart<'_>, scopes: &mut Scopes, position: usize) -> Result<Element, DecodeError> {
    let qname = std::str::from_utf8(start.name().as_ref())
        .map_err(|_| malformed(position, "element name is not valid UTF-8"))?
        .to_string();

    let mut element = Element::default();
    let mut frame = FxHashMap::default();

    for attr in start.attributes() {
        let attr = attr.map_err(|err| malformed(position, err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|_| malformed(position, "attribute name is not valid UTF-8"))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(position, err.to_string()))?
            .into_owned();

        if key == "xmlns" {
            frame.insert(String::new(), value.clone());
            element.declarations.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            frame.insert(prefix.to_string(), value.clone());
            element.declarations.push((Some(prefix.to_string()), value));
        } else {
            element.attributes.push(Attribute { name: key, value });
        }
    }
    scopes.frames.push(frame);

    let (prefix, local) = match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, qname),
    };
    element.namespace = match &prefix {
        Some(prefix) => Some(
            scopes
                .resolve(prefix)
                .ok_or_else(|| malformed(position, format!("unbound namespace prefix '{}'", prefix)))?
                .to_string(),
        ),
        None => scopes
            .resolve("")
            .filter(|uri| !uri.is_empty())
            .map(str::to_string),
    };
    element.prefix = prefix;
    element.name = local;
    Ok(element)
}

/// Parses a document into its root element.
///
/// Comments, processing instructions and the XML declaration are dropped.
/// Whitespace-only text is dropped; other character data is kept exactly as
/// written, including leading and trailing whitespace.
pub fn parse(text: &str) -> Result<Element, DecodeError> {
    let mut reader = Reader::from_str(text);

    let mut scopes = Scopes::default();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => return Err(malformed(reader.buffer_position(), err.to_string())),
        };

        match event {
            Event::Start(start) => {
                let element = open_element(&start, &mut scopes, position)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&start, &mut scopes, position)?;
                scopes.frames.pop();
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(position, "unbalanced end tag"))?;
                scopes.frames.pop();
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|err| malformed(position, err.to_string()))?;
                if text.trim().is_empty() {
                    continue;
                }
                push_character_data(&mut stack, &text, position)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8(data.into_inner().into_owned())
                    .map_err(|_| malformed(position, "CDATA is not valid UTF-8"))?;
                push_character_data(&mut stack, &text, position)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(reader.buffer_position(), "unexpected end of document"));
    }
    root.ok_or_else(|| malformed(0, "document has no root element"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: usize,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(element);
            Ok(())
        }
        None if root.is_some() => Err(malformed(position, "multiple root elements")),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_character_data(stack: &mut [Element], text: &str, position: usize) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed(position, "character data outside the root element")),
    }
}

// =============================================================================
// WRITING
// =============================================================================

/// Writes a tree rooted at `root` as a document.
pub fn write(root: &Element, options: &EncodeOptions) -> Result<String, EncodeError> {
    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };
    if options.declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    }
    write_element(&mut writer, root, &FxHashMap::default())?;
    String::from_utf8(writer.into_inner()).map_err(|_| EncodeError::Utf8)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    in_scope: &FxHashMap<String, String>,
) -> Result<(), EncodeError> {
    let mut scope = in_scope.clone();
    let mut declared: Vec<(String, String)> = Vec::new();

    for (prefix, uri) in &element.declarations {
        let key = prefix.clone().unwrap_or_default();
        if scope.get(&key) != Some(uri) {
            scope.insert(key.clone(), uri.clone());
            declared.push((key, uri.clone()));
        }
    }

    // The element's own namespace must be bound by the time it is written.
    let key = element.prefix.clone().unwrap_or_default();
    match &element.namespace {
        Some(uri) if scope.get(&key) != Some(uri) => {
            scope.insert(key.clone(), uri.clone());
            declared.push((key, uri.clone()));
        }
        None if element.prefix.is_none() && scope.get("").is_some_and(|uri| !uri.is_empty()) => {
            scope.insert(String::new(), String::new());
            declared.push((String::new(), String::new()));
        }
        _ => {}
    }

    let name = element.qualified_name();
    let mut start = BytesStart::new(name.as_ref());
    for (prefix, uri) in &declared {
        let attr = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        start.push_attribute((attr.as_str(), uri.as_str()));
    }
    for attr in &element.attributes {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(el) => write_element(writer, el, &scope)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_ref())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <!-- comment -->
            <domain type="kvm">
              <name>demo</name>
              <devices><disk type="file"/><disk type="block"/></devices>
            </domain>"#,
        )
        .unwrap();
        assert_eq!(root.name, "domain");
        assert_eq!(root.attr("type"), Some("kvm"));
        assert_eq!(root.child_text("name").as_deref(), Some("demo"));
        let devices = root.child("devices").unwrap();
        assert_eq!(devices.children_named("disk").count(), 2);
    }

    #[test]
    fn test_namespace_resolution() {
        let root = parse(
            r#"<domain xmlns:qemu="http://libvirt.org/schemas/domain/qemu/1.0">
                 <qemu:commandline><qemu:arg value="-s"/></qemu:commandline>
                 <commandline/>
               </domain>"#,
        )
        .unwrap();
        let qualified: Vec<_> = root.elements().collect();
        assert_eq!(qualified[0].name, "commandline");
        assert_eq!(
            qualified[0].namespace.as_deref(),
            Some("http://libvirt.org/schemas/domain/qemu/1.0")
        );
        assert!(qualified[1].is("commandline"));
        assert!(root.child("commandline").is_some_and(|el| el.namespace.is_none()));
    }

    #[test]
    fn test_unbound_prefix_rejected() {
        let err = parse("<domain><qemu:commandline/></domain>").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedMarkup { .. }));
    }

    #[test]
    fn test_malformed_inputs() {
        for text in ["", "<domain>", "<a></b>", "<a/><b/>", "text", "<a x=\"1\" x=\"2\"/>"] {
            assert!(
                matches!(parse(text), Err(DecodeError::MalformedMarkup { .. })),
                "accepted {:?}",
                text
            );
        }
    }

    #[test]
    fn test_entities_roundtrip() {
        let root = parse(r#"<a v="&lt;&amp;&quot;">x &amp; y</a>"#).unwrap();
        assert_eq!(root.attr("v"), Some("<&\""));
        assert_eq!(root.text(), "x & y");

        let text = write(&root, &EncodeOptions::compact()).unwrap();
        assert_eq!(parse(&text).unwrap(), root);
    }

    #[test]
    fn test_text_whitespace_kept() {
        let root = parse("<domain>\n  <description>  line one\n  line two  </description>\n  <title> </title>\n</domain>").unwrap();
        assert_eq!(root.child_text("description").as_deref(), Some("  line one\n  line two  "));
        assert_eq!(root.child("title").map(Element::is_empty), Some(true));
        assert_eq!(root.children.len(), 2);

        let indented = write(&root, &EncodeOptions::default()).unwrap();
        assert_eq!(parse(&indented).unwrap(), root);
    }

    #[test]
    fn test_write_declares_namespaces_once() {
        let mut root = Element::new("domain");
        root.declare_namespace(Some("qemu"), "urn:q");
        let mut block = Element::qualified("qemu", "urn:q", "commandline");
        block.push(Element::qualified("qemu", "urn:q", "arg"));
        root.push(block);

        let text = write(&root, &EncodeOptions::compact()).unwrap();
        assert_eq!(
            text,
            r#"<domain xmlns:qemu="urn:q"><qemu:commandline><qemu:arg/></qemu:commandline></domain>"#
        );
    }

    #[test]
    fn test_write_undeclared_namespace() {
        let mut root = Element::new("network");
        root.push(Element::qualified("dnsmasq", "urn:d", "options"));
        let text = write(&root, &EncodeOptions::compact()).unwrap();
        assert_eq!(text, r#"<network><dnsmasq:options xmlns:dnsmasq="urn:d"/></network>"#);
    }

    #[test]
    fn test_text_children() {
        let mut root = Element::new("os");
        root.push_text_child("kernel", Some("/boot/vmlinuz"));
        root.push_text_child("initrd", None);
        root.push_uint_child("port", Some(5u32), UintFormat::Decimal);
        let text = write(&root, &EncodeOptions::compact()).unwrap();
        assert_eq!(text, "<os><kernel>/boot/vmlinuz</kernel><port>5</port></os>");
    }
}
