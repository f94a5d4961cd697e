use crate::document::tree::{Document, NodePath, XmlChild, XmlElement};

/// Container element holding annotation text in the authoring idiom
/// (`rect > desc > text`).
const DESCRIPTION_TAG: &str = "desc";

/// The two marker kinds understood by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// `@component/...`: substitutes a rendered sub-document into the tree.
    Component,
    /// `@element/...`: emits a configuration fragment, never mutates the tree.
    Element,
}

impl MarkerKind {
    /// The literal prefix of the marker grammar.
    pub fn prefix(self) -> &'static str {
        match self {
            MarkerKind::Component => "@component",
            MarkerKind::Element => "@element",
        }
    }
}

/// A parsed occurrence of the `@<kind>/<name>[/<qualifier>]` grammar.
///
/// Created fresh per scan; paths are valid until the first structural edit
/// that shifts or replaces the addressed nodes.
#[derive(Clone, Debug)]
pub struct Marker {
    /// Which grammar matched.
    pub kind: MarkerKind,
    /// Component or element name (alphanumeric).
    pub name: String,
    /// Optional qualifier, e.g. a side-car configuration name.
    pub qualifier: Option<String>,
    /// Path to the text run holding the literal.
    pub text_path: NodePath,
    /// Path to the placement ancestor: the parent of the `desc` element.
    pub target_path: NodePath,
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.prefix(), self.name)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "/{qualifier}")?;
        }
        Ok(())
    }
}

/// Find every marker of `kind` in the document, in document order.
///
/// A non-matching document is not an error; the result is simply empty.
/// Duplicate placement targets are not filtered here; uniqueness only
/// matters for component substitution and is enforced by the compositor.
pub fn scan(document: &Document, kind: MarkerKind) -> Vec<Marker> {
    let mut markers = Vec::new();
    visit(document.root(), &NodePath::root(), kind, &mut markers);
    markers
}

fn visit(element: &XmlElement, path: &NodePath, kind: MarkerKind, out: &mut Vec<Marker>) {
    for (index, child) in element.children.iter().enumerate() {
        let XmlChild::Element(child_el) = child else {
            continue;
        };
        let child_path = path.child(index);
        if child_el.name == DESCRIPTION_TAG {
            for (text_index, desc_child) in child_el.children.iter().enumerate() {
                let XmlChild::Text(text) = desc_child else {
                    continue;
                };
                if let Some((name, qualifier)) = parse_literal(text, kind) {
                    out.push(Marker {
                        kind,
                        name,
                        qualifier,
                        text_path: child_path.child(text_index),
                        target_path: path.clone(),
                    });
                }
            }
        }
        visit(child_el, &child_path, kind, out);
    }
}

/// Match `@<kind>/<name>[/<qualifier>]` anywhere inside `text`.
fn parse_literal(text: &str, kind: MarkerKind) -> Option<(String, Option<String>)> {
    let mut haystack = text;
    while let Some(at) = haystack.find(kind.prefix()) {
        let tail = &haystack[at + kind.prefix().len()..];
        if let Some(rest) = tail.strip_prefix('/') {
            let name = leading_word(rest);
            if !name.is_empty() {
                let qualifier = rest[name.len()..]
                    .strip_prefix('/')
                    .map(leading_word)
                    .filter(|q| !q.is_empty());
                return Some((name, qualifier));
            }
        }
        haystack = tail;
    }
    None
}

fn leading_word(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}
