use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;
use tracing::{debug, info, warn};

use crate::annotate::scanner::{Marker, MarkerKind, scan};
use crate::catalog::Representation;
use crate::component::Component;
use crate::document::tree::Document;
use crate::element::{Element, ElementFamily, GameType};
use crate::foundation::core::Size;
use crate::foundation::error::SkinResult;
use crate::raster;

/// Asset pointers of one representation. All three densities reference the
/// single produced raster; per-density outputs were dropped deliberately.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AssetRefs {
    pub small: String,
    pub medium: String,
    pub large: String,
}

/// The per-representation leaf object of the aggregate configuration.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationConfig {
    pub assets: AssetRefs,
    pub items: Vec<serde_json::Value>,
    pub screens: Vec<serde_json::Value>,
    pub mapping_size: Size,
}

/// One representation's compositing pass: the loaded canvas document plus
/// its resolved components and elements.
///
/// Owns its own tree; nothing is shared across representations.
#[derive(Debug)]
pub struct Canvas {
    representation: Representation,
    document: Document,
    components: Vec<(Marker, Component)>,
    elements: Vec<Element>,
}

impl Canvas {
    /// Load the representation's canvas document and resolve all markers.
    ///
    /// A missing or unparsable canvas is fatal to this representation only;
    /// the assembler decides whether to skip it. Duplicate component markers
    /// on the same placement target are discarded here: the first
    /// substitution invalidates the paths of any second one.
    pub fn create(
        project_dir: &Path,
        representation: Representation,
        system: GameType,
    ) -> SkinResult<Self> {
        debug!(%representation, "creating canvas");
        let path = representation.canvas_file_path(project_dir);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read canvas '{}'", path.display()))?;
        let document = Document::parse(&bytes)?;

        let component_markers = scan(&document, MarkerKind::Component);
        info!(
            count = component_markers.len(),
            %representation,
            "found component annotations"
        );
        let mut claimed = HashSet::new();
        let mut components = Vec::new();
        for marker in component_markers {
            if !claimed.insert(marker.target_path.to_string()) {
                warn!(
                    %marker,
                    target = %marker.target_path,
                    "duplicate component for placement target, ignoring"
                );
                continue;
            }
            let component = Component::load(project_dir, &marker)?;
            components.push((marker, component));
        }

        let element_markers = scan(&document, MarkerKind::Element);
        info!(
            count = element_markers.len(),
            %representation,
            "found element annotations"
        );
        let mut elements = Vec::new();
        for marker in element_markers {
            let rect = match document.rect_at(&marker.target_path) {
                Ok(rect) => rect,
                Err(err) => {
                    warn!(%marker, %err, "skipping element without placement geometry");
                    continue;
                }
            };
            let Some(element) = Element::load(project_dir, &marker, system, rect) else {
                continue;
            };
            for issue in element.validate() {
                warn!(code = issue.code, "{}", issue.message);
            }
            elements.push(element);
        }

        Ok(Self {
            representation,
            document,
            components,
            elements,
        })
    }

    /// The representation this canvas renders.
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// Clone the tree and apply every component substitution.
    ///
    /// Replacements keep sibling paths stable, removals shift them; clears
    /// therefore run last, in reverse discovery order. A substitution whose
    /// placement geometry is broken is skipped with a warning.
    pub fn substituted_document(&self) -> Document {
        let mut copy = self.document.clone();
        for (marker, component) in &self.components {
            if matches!(component, Component::Clear) {
                continue;
            }
            if let Err(err) = component.render_into(&mut copy, &marker.target_path) {
                warn!(%marker, %err, "skipping component substitution");
            }
        }
        for (marker, component) in self.components.iter().rev() {
            if !matches!(component, Component::Clear) {
                continue;
            }
            if let Err(err) = component.render_into(&mut copy, &marker.target_path) {
                warn!(%marker, %err, "skipping component removal");
            }
        }
        copy
    }

    /// Render the composited canvas to PNG at the representation's exact
    /// catalog resolution (stretch fit).
    pub fn render(&self) -> SkinResult<Vec<u8>> {
        let copy = self.substituted_document();
        let target = self.representation.resolution;

        match (copy.width(), copy.height()) {
            (Ok(width), Ok(height)) => {
                if f64::from(target.width) > width || f64::from(target.height) > height {
                    warn!(
                        representation = %self.representation,
                        declared = %format!("{width}x{height}"),
                        target = %target,
                        "up-scaling picture during render"
                    );
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(representation = %self.representation, %err, "canvas has no usable declared size");
            }
        }

        info!(representation = %self.representation, resolution = %target, "rendering canvas");
        raster::rasterize_svg(&copy.serialize()?, target.width, target.height)
    }

    /// Build this representation's configuration fragment from every
    /// successfully generated element, partitioned by family.
    pub fn config_fragment(&self) -> RepresentationConfig {
        let mut items = Vec::new();
        let mut screens = Vec::new();
        for element in &self.elements {
            let fragment = element.generate(&self.representation);
            match element.family() {
                ElementFamily::Item => items.push(fragment),
                ElementFamily::Screen => screens.push(fragment),
            }
        }
        let asset = self.representation.output_file_name();
        RepresentationConfig {
            assets: AssetRefs {
                small: asset.clone(),
                medium: asset.clone(),
                large: asset,
            },
            items,
            screens,
            mapping_size: self.representation.mapping_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Orientation, RepresentationId};
    use crate::document::tree::NodePath;

    fn temp_project(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "skinforge_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(dir.join("representations/iphone-e2e")).unwrap();
        std::fs::create_dir_all(dir.join("components")).unwrap();
        std::fs::create_dir_all(dir.join("elements")).unwrap();
        dir
    }

    fn iphone_e2e() -> Representation {
        Representation::new(
            RepresentationId::IphoneEdgeToEdge,
            Orientation::Portrait,
            false,
        )
    }

    const COMPONENT_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4">
        <rect x="0" y="0" width="8" height="4" fill="#00ffff"/>
    </svg>"##;

    fn write_canvas(dir: &std::path::Path, body: &str) {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1242" height="2688">{body}</svg>"#
        );
        std::fs::write(dir.join("representations/iphone-e2e/portrait.svg"), svg).unwrap();
    }

    #[test]
    fn duplicate_placement_targets_keep_only_the_first_component() {
        let dir = temp_project("dup_guard");
        std::fs::write(dir.join("components/battery.svg"), COMPONENT_SVG).unwrap();
        write_canvas(
            &dir,
            r#"<rect x="10" y="10" width="60" height="30">
                <desc>@component/battery</desc>
                <desc>@component/battery</desc>
            </rect>"#,
        );
        let canvas = Canvas::create(&dir, iphone_e2e(), GameType::Gba).unwrap();
        assert_eq!(canvas.components.len(), 1);

        let doc = canvas.substituted_document();
        let substituted = doc.element_at(&NodePath::root().child(0)).unwrap();
        assert_eq!(substituted.name, "image");
    }

    #[test]
    fn clear_component_removes_the_placeholder() {
        let dir = temp_project("clear");
        write_canvas(
            &dir,
            r#"<rect x="10" y="10" width="60" height="30">
                <desc>@component/clear</desc>
            </rect>
            <rect x="0" y="0" width="5" height="5"/>"#,
        );
        let canvas = Canvas::create(&dir, iphone_e2e(), GameType::Gba).unwrap();
        let doc = canvas.substituted_document();
        assert_eq!(doc.root().children.len(), 1);
    }

    #[test]
    fn missing_canvas_file_is_fatal_for_this_representation() {
        let dir = temp_project("missing_canvas");
        assert!(Canvas::create(&dir, iphone_e2e(), GameType::Gba).is_err());
    }

    #[test]
    fn missing_component_file_is_fatal_for_the_pass() {
        let dir = temp_project("missing_component");
        write_canvas(
            &dir,
            r#"<rect x="10" y="10" width="60" height="30">
                <desc>@component/doesNotExist</desc>
            </rect>"#,
        );
        assert!(Canvas::create(&dir, iphone_e2e(), GameType::Gba).is_err());
    }

    #[test]
    fn config_fragment_partitions_elements_by_family() {
        let dir = temp_project("fragment");
        write_canvas(
            &dir,
            r#"<rect x="0" y="0" width="720" height="480">
                <desc>@element/screen</desc>
            </rect>
            <rect x="50" y="60" width="90" height="90">
                <desc>@element/a</desc>
            </rect>
            <rect x="50" y="200" width="90" height="90">
                <desc>@element/turbo</desc>
            </rect>"#,
        );
        let canvas = Canvas::create(&dir, iphone_e2e(), GameType::Gba).unwrap();
        let fragment = canvas.config_fragment();
        assert_eq!(fragment.screens.len(), 1);
        assert_eq!(fragment.items.len(), 1);
        assert_eq!(fragment.assets.large, "iphone-e2e_portrait.png");
        assert_eq!(fragment.assets.small, fragment.assets.large);
        assert_eq!(fragment.mapping_size, Size::new(414, 896));
        assert_eq!(
            fragment.items[0]["frame"],
            serde_json::json!({ "x": 17, "y": 20, "width": 30, "height": 30 })
        );
    }
}
