use std::io::Cursor;

use anyhow::Context as _;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::foundation::core::Rect;
use crate::foundation::error::{SkinError, SkinResult};

/// One entry in an element's ordered child list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlChild {
    /// A nested element.
    Element(XmlElement),
    /// A plain text run.
    Text(String),
}

/// An element node: tag name, ordered attributes, ordered children.
///
/// Attribute order is preserved so that serialization round-trips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name, e.g. `rect` or `desc`.
    pub name: String,
    /// Attributes in document order. Keys are unique.
    pub attributes: Vec<(String, String)>,
    /// Ordered children (elements and text runs).
    pub children: Vec<XmlChild>,
}

impl XmlElement {
    /// An element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value or appending.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Read an attribute as a length value (`parseFloat` semantics: unit
    /// suffixes such as `px` or `%` are ignored).
    pub fn length_attribute(&self, name: &str) -> SkinResult<f64> {
        let raw = self.attribute(name).ok_or_else(|| {
            SkinError::geometry(format!("<{}> has no '{name}' attribute", self.name))
        })?;
        parse_length(raw).ok_or_else(|| {
            SkinError::geometry(format!(
                "<{}> attribute '{name}' is not numeric: '{raw}'",
                self.name
            ))
        })
    }
}

fn parse_length(raw: &str) -> Option<f64> {
    let trimmed = raw
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    trimmed.parse::<f64>().ok()
}

/// A structural path addressing a node: a sequence of child indices starting
/// at the document root.
///
/// Paths stay valid only as long as no structural edit happens at or before
/// the addressed index; replacing a subtree keeps sibling paths intact,
/// removing one shifts every later sibling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The path one level deeper, at child `index`.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// The path of the addressed node's parent, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Child indices from the root down.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for idx in &self.0 {
            write!(f, "/{idx}")?;
        }
        Ok(())
    }
}

/// A parsed vector document: the root element plus path-addressed access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: XmlElement,
}

impl Document {
    /// Wrap an already-built element tree.
    pub fn from_root(root: XmlElement) -> Self {
        Self { root }
    }

    /// Parse XML bytes into a document tree.
    ///
    /// Whitespace-only text runs are dropped and text is trimmed; comments,
    /// processing instructions and the XML declaration are discarded.
    pub fn parse(bytes: &[u8]) -> SkinResult<Self> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|err| SkinError::parse(format!("malformed xml: {err}")))?;
            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| SkinError::parse("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|err| SkinError::parse(format!("bad text escape: {err}")))?;
                    if let Some(top) = stack.last_mut() {
                        top.children.push(XmlChild::Text(value.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(top) = stack.last_mut() {
                        top.children.push(XmlChild::Text(value));
                    }
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(SkinError::parse("unclosed element at end of input"));
        }
        root.map(Self::from_root)
            .ok_or_else(|| SkinError::parse("document has no root element"))
    }

    /// Serialize the tree back to XML bytes.
    pub fn serialize(&self) -> SkinResult<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner().into_inner())
    }

    /// The root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Mutable access to the root element.
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// The child (element or text) at `path`, if the path resolves.
    pub fn get(&self, path: &NodePath) -> Option<&XmlChild> {
        let (last, rest) = path.indices().split_last()?;
        let mut current = &self.root;
        for idx in rest {
            match current.children.get(*idx)? {
                XmlChild::Element(el) => current = el,
                XmlChild::Text(_) => return None,
            }
        }
        current.children.get(*last)
    }

    /// The element at `path`. The root path addresses the root element.
    pub fn element_at(&self, path: &NodePath) -> Option<&XmlElement> {
        if path.is_root() {
            return Some(&self.root);
        }
        match self.get(path)? {
            XmlChild::Element(el) => Some(el),
            XmlChild::Text(_) => None,
        }
    }

    /// Replace the whole subtree at `path` with `replacement`.
    ///
    /// Sibling paths stay valid; paths into the replaced subtree do not.
    pub fn replace(&mut self, path: &NodePath, replacement: XmlElement) -> SkinResult<()> {
        let slot = self.child_slot(path)?;
        *slot = XmlChild::Element(replacement);
        Ok(())
    }

    /// Remove the subtree at `path`. Shifts all later siblings one index down.
    pub fn remove(&mut self, path: &NodePath) -> SkinResult<()> {
        let (last, rest) = path
            .indices()
            .split_last()
            .ok_or_else(|| SkinError::geometry("cannot remove the document root"))?;
        let parent = self.element_at_mut(rest).ok_or_else(|| {
            SkinError::geometry(format!("path {path} does not address a node"))
        })?;
        if *last >= parent.children.len() {
            return Err(SkinError::geometry(format!(
                "path {path} does not address a node"
            )));
        }
        parent.children.remove(*last);
        Ok(())
    }

    /// Declared document width, in document units.
    pub fn width(&self) -> SkinResult<f64> {
        self.root.length_attribute("width")
    }

    /// Declared document height, in document units.
    pub fn height(&self) -> SkinResult<f64> {
        self.root.length_attribute("height")
    }

    /// Read the placement rectangle from the element at `path`.
    pub fn rect_at(&self, path: &NodePath) -> SkinResult<Rect> {
        let element = self.element_at(path).ok_or_else(|| {
            SkinError::geometry(format!("path {path} does not address an element"))
        })?;
        Ok(Rect {
            x: element.length_attribute("x")?,
            y: element.length_attribute("y")?,
            width: element.length_attribute("width")?,
            height: element.length_attribute("height")?,
        })
    }

    fn child_slot(&mut self, path: &NodePath) -> SkinResult<&mut XmlChild> {
        let (last, rest) = path
            .indices()
            .split_last()
            .ok_or_else(|| SkinError::geometry("cannot replace the document root"))?;
        let parent = self.element_at_mut(rest).ok_or_else(|| {
            SkinError::geometry(format!("path {path} does not address a node"))
        })?;
        parent.children.get_mut(*last).ok_or_else(|| {
            SkinError::geometry(format!("path {path} does not address a node"))
        })
    }

    fn element_at_mut(&mut self, indices: &[usize]) -> Option<&mut XmlElement> {
        let mut current = &mut self.root;
        for idx in indices {
            match current.children.get_mut(*idx)? {
                XmlChild::Element(el) => current = el,
                XmlChild::Text(_) => return None,
            }
        }
        Some(current)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> SkinResult<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| SkinError::parse(format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| SkinError::parse(format!("bad attribute value: {err}")))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> SkinResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlChild::Element(element));
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(SkinError::parse("multiple root elements"));
            }
            *root = Some(element);
            Ok(())
        }
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &XmlElement,
) -> SkinResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .context("write xml event")?;
        return Ok(());
    }
    writer
        .write_event(Event::Start(start))
        .context("write xml event")?;
    for child in &element.children {
        match child {
            XmlChild::Element(el) => write_element(writer, el)?,
            XmlChild::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .context("write xml event")?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .context("write xml event")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: &str = r#"<svg width="100" height="50">
        <g id="layer">
            <rect x="10" y="20" width="30" height="40">
                <desc>@component/battery</desc>
            </rect>
            <rect x="1" y="2" width="3" height="4"/>
        </g>
    </svg>"#;

    #[test]
    fn parse_builds_ordered_tree() {
        let doc = Document::parse(CANVAS.as_bytes()).unwrap();
        assert_eq!(doc.root().name, "svg");
        let layer = doc.element_at(&NodePath::root().child(0)).unwrap();
        assert_eq!(layer.name, "g");
        assert_eq!(layer.children.len(), 2);
        let rect = doc
            .element_at(&NodePath::root().child(0).child(0))
            .unwrap();
        assert_eq!(rect.attribute("x"), Some("10"));
    }

    #[test]
    fn serialize_then_reparse_is_identity() {
        let doc = Document::parse(CANVAS.as_bytes()).unwrap();
        let bytes = doc.serialize().unwrap();
        let reparsed = Document::parse(&bytes).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn replace_keeps_sibling_paths_valid() {
        let mut doc = Document::parse(CANVAS.as_bytes()).unwrap();
        let first = NodePath::root().child(0).child(0);
        let second = NodePath::root().child(0).child(1);
        doc.replace(&first, XmlElement::new("image")).unwrap();
        assert_eq!(doc.element_at(&first).unwrap().name, "image");
        assert_eq!(doc.element_at(&second).unwrap().name, "rect");
    }

    #[test]
    fn remove_shifts_later_siblings() {
        let mut doc = Document::parse(CANVAS.as_bytes()).unwrap();
        doc.remove(&NodePath::root().child(0).child(0)).unwrap();
        let layer = doc.element_at(&NodePath::root().child(0)).unwrap();
        assert_eq!(layer.children.len(), 1);
    }

    #[test]
    fn dimensions_ignore_unit_suffixes() {
        let doc = Document::parse(br#"<svg width="12.5px" height="100%"/>"#).unwrap();
        assert_eq!(doc.width().unwrap(), 12.5);
        assert_eq!(doc.height().unwrap(), 100.0);
    }

    #[test]
    fn malformed_dimension_is_a_geometry_error() {
        let doc = Document::parse(br#"<svg width="wide" height="10"/>"#).unwrap();
        let err = doc.width().unwrap_err();
        assert!(matches!(err, SkinError::Geometry(_)));
    }

    #[test]
    fn rect_at_requires_all_four_attributes() {
        let doc = Document::parse(CANVAS.as_bytes()).unwrap();
        let rect = doc.rect_at(&NodePath::root().child(0).child(0)).unwrap();
        assert_eq!(rect.width, 30.0);
        assert!(
            doc.rect_at(&NodePath::root())
                .is_err_and(|err| matches!(err, SkinError::Geometry(_)))
        );
    }
}
