use std::path::{Path, PathBuf};

use anyhow::Context as _;
use base64::Engine as _;
use tracing::debug;

use crate::annotate::scanner::Marker;
use crate::catalog::DIR_COMPONENTS;
use crate::document::tree::{Document, NodePath, XmlElement};
use crate::foundation::core::Rect;
use crate::foundation::error::SkinResult;
use crate::raster;

/// Reserved component name: remove the placeholder instead of substituting.
pub const CLEAR_NAME: &str = "clear";

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A named sub-document bound to a component marker.
///
/// Owned by one compositing pass and discarded after rendering.
#[derive(Clone, Debug)]
pub enum Component {
    /// The `@component/clear` sentinel: the placement ancestor is removed
    /// from the tree and no raster work happens.
    Clear,
    /// A loaded sub-document to rasterize into the placement rectangle.
    Loaded {
        name: String,
        document: Document,
    },
}

/// Path of a component sub-document inside the project.
pub fn component_file_path(project_dir: &Path, name: &str) -> PathBuf {
    project_dir.join(DIR_COMPONENTS).join(format!("{name}.svg"))
}

impl Component {
    /// Load the component a marker names. A referenced component is
    /// mandatory: a missing or unparsable file fails the compositing pass.
    pub fn load(project_dir: &Path, marker: &Marker) -> SkinResult<Self> {
        if marker.name == CLEAR_NAME {
            return Ok(Component::Clear);
        }
        let path = component_file_path(project_dir, &marker.name);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read component '{}'", path.display()))?;
        Ok(Component::Loaded {
            name: marker.name.clone(),
            document: Document::parse(&bytes)?,
        })
    }

    /// Substitute this component into `canvas` at the placement ancestor.
    ///
    /// The placement rectangle is read from the current tree state. The
    /// sub-document is rasterized to the rectangle's size (stretched, not
    /// letterboxed) and spliced in as an inline base64 `<image>` node,
    /// replacing the whole placeholder subtree.
    pub fn render_into(&self, canvas: &mut Document, target: &NodePath) -> SkinResult<()> {
        match self {
            Component::Clear => {
                debug!(%target, "clearing placeholder subtree");
                canvas.remove(target)
            }
            Component::Loaded { name, document } => {
                let rect = canvas.rect_at(target)?;
                let width = rect.width.round().max(1.0) as u32;
                let height = rect.height.round().max(1.0) as u32;
                debug!(component = %name, %target, %rect.x, %rect.y, width, height, "rendering component");

                let png = raster::rasterize_svg(&document.serialize()?, width, height)?;

                // Inline images need the xlink namespace; setting it again is
                // harmless.
                canvas.root_mut().set_attribute("xmlns:xlink", XLINK_NS);
                canvas.replace(target, image_element(&png, rect))
            }
        }
    }
}

/// Build an embeddable `<image>` node carrying the PNG inline.
fn image_element(png: &[u8], rect: Rect) -> XmlElement {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    let mut image = XmlElement::new("image");
    image.set_attribute("width", rect.width.to_string());
    image.set_attribute("height", rect.height.to_string());
    image.set_attribute("preserveAspectRatio", "none");
    image.set_attribute("xlink:href", format!("data:image/png;base64,{encoded}"));
    image.set_attribute("x", rect.x.to_string());
    image.set_attribute("y", rect.y.to_string());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::scanner::{MarkerKind, scan};
    use crate::foundation::error::SkinError;

    const CANVAS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400">
        <g>
            <rect x="50" y="60" width="200" height="100" fill="#333333">
                <desc>@component/battery</desc>
            </rect>
            <rect x="0" y="0" width="20" height="20" fill="#00ff00"/>
        </g>
    </svg>"##;

    const BATTERY: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
        <rect x="0" y="0" width="20" height="10" fill="#0000ff"/>
    </svg>"##;

    fn canvas_and_target() -> (Document, NodePath) {
        let doc = Document::parse(CANVAS.as_bytes()).unwrap();
        let markers = scan(&doc, MarkerKind::Component);
        assert_eq!(markers.len(), 1);
        let target = markers[0].target_path.clone();
        (doc, target)
    }

    #[test]
    fn substitutes_an_inline_image_at_the_placeholder() {
        let (mut doc, target) = canvas_and_target();
        let component = Component::Loaded {
            name: "battery".to_string(),
            document: Document::parse(BATTERY.as_bytes()).unwrap(),
        };
        component.render_into(&mut doc, &target).unwrap();

        let image = doc.element_at(&target).unwrap();
        assert_eq!(image.name, "image");
        assert_eq!(image.attribute("width"), Some("200"));
        assert_eq!(image.attribute("height"), Some("100"));
        assert_eq!(image.attribute("x"), Some("50"));
        assert_eq!(image.attribute("preserveAspectRatio"), Some("none"));
        assert!(
            image
                .attribute("xlink:href")
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
        assert_eq!(doc.root().attribute("xmlns:xlink"), Some(XLINK_NS));
    }

    #[test]
    fn substitution_is_deterministic() {
        let component = Component::Loaded {
            name: "battery".to_string(),
            document: Document::parse(BATTERY.as_bytes()).unwrap(),
        };
        let render = || {
            let (mut doc, target) = canvas_and_target();
            component.render_into(&mut doc, &target).unwrap();
            doc.serialize().unwrap()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn clear_removes_the_placeholder_without_rastering() {
        let (mut doc, target) = canvas_and_target();
        Component::Clear.render_into(&mut doc, &target).unwrap();
        let layer = doc.element_at(&NodePath::root().child(0)).unwrap();
        assert_eq!(layer.children.len(), 1);
    }

    #[test]
    fn missing_geometry_fails_only_this_substitution() {
        let mut doc = Document::parse(
            br#"<svg width="10" height="10"><g><desc>@component/battery</desc></g></svg>"#,
        )
        .unwrap();
        let markers = scan(&doc, MarkerKind::Component);
        let component = Component::Loaded {
            name: "battery".to_string(),
            document: Document::parse(BATTERY.as_bytes()).unwrap(),
        };
        let err = component
            .render_into(&mut doc, &markers[0].target_path)
            .unwrap_err();
        assert!(matches!(err, SkinError::Geometry(_)));
    }

    #[test]
    fn clear_marker_loads_without_touching_disk() {
        let doc = Document::parse(
            br#"<svg width="10" height="10"><rect x="0" y="0" width="1" height="1"><desc>@component/clear</desc></rect></svg>"#,
        )
        .unwrap();
        let markers = scan(&doc, MarkerKind::Component);
        let component = Component::load(Path::new("/nonexistent"), &markers[0]).unwrap();
        assert!(matches!(component, Component::Clear));
    }
}
