//! Skinforge composes annotated SVG canvases into distributable Delta skins.
//!
//! A skin project holds one canvas SVG per device representation, plus named
//! component sub-documents and side-car element configurations. Markers
//! embedded in `<desc>` nodes (`@component/<name>[/<qualifier>]`,
//! `@element/<name>[/<qualifier>]`) drive the pipeline:
//!
//! 1. **Scan**: find markers and resolve each to a placement rectangle
//!    (the `rect > desc > text` authoring idiom)
//! 2. **Substitute**: rasterize each component to its rectangle and splice
//!    it into the tree as an inline image; `@component/clear` removes the
//!    placeholder instead
//! 3. **Translate**: classify and validate element markers, emitting
//!    configuration fragments in logical mapping coordinates
//! 4. **Render**: rasterize the composited tree to the representation's
//!    exact catalog resolution
//! 5. **Assemble**: collect rasters and fragments across representations
//!    into one `.deltaskin` archive with an `info.json`
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: identical inputs produce byte-identical rasters.
//! - **Contained failures**: a broken representation is skipped with a
//!   warning; only archive finalization aborts a run.
#![forbid(unsafe_code)]

mod annotate;
mod archive;
mod canvas;
mod catalog;
mod component;
mod document;
mod element;
mod foundation;
mod raster;
mod skin;

pub use annotate::scanner::{Marker, MarkerKind, scan};
pub use archive::SkinArchive;
pub use canvas::{AssetRefs, Canvas, RepresentationConfig};
pub use catalog::{
    DIR_COMPONENTS, DIR_ELEMENTS, DIR_REPRESENTATIONS, Orientation, Representation,
    RepresentationId, expand_orientation_selector, expand_representation_selector,
    expand_selectors,
};
pub use component::{CLEAR_NAME, Component, component_file_path};
pub use document::tree::{Document, NodePath, XmlChild, XmlElement};
pub use element::{
    Element, ElementFamily, ElementKind, GameType, ValidationIssue, element_config_file_path,
};
pub use foundation::core::{LogicalRect, Rect, Size};
pub use foundation::error::{SkinError, SkinResult};
pub use raster::rasterize_svg;
pub use skin::{CONFIG_ENTRY, PROJECT_FILE, ProjectConfig, SKIN_EXT, Skin, SkinConfiguration};
