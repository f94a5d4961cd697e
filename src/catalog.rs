use std::path::{Path, PathBuf};

use crate::foundation::core::Size;
use crate::foundation::error::{SkinError, SkinResult};

/// Directory holding one canvas SVG per representation/orientation/variant.
pub const DIR_REPRESENTATIONS: &str = "representations";
/// Directory holding named component sub-documents.
pub const DIR_COMPONENTS: &str = "components";
/// Directory holding side-car element configuration files.
pub const DIR_ELEMENTS: &str = "elements";

/// One target device profile in the static catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepresentationId {
    IphoneStandard,
    IphoneEdgeToEdge,
    IpadStandard,
    IpadSplitView,
}

impl RepresentationId {
    /// All profiles, in the order they appear in output listings.
    pub const ALL: [RepresentationId; 4] = [
        RepresentationId::IphoneStandard,
        RepresentationId::IphoneEdgeToEdge,
        RepresentationId::IpadStandard,
        RepresentationId::IpadSplitView,
    ];

    /// Stable on-disk identifier, used in directory and file names.
    pub fn as_str(self) -> &'static str {
        match self {
            RepresentationId::IphoneStandard => "iphone-standard",
            RepresentationId::IphoneEdgeToEdge => "iphone-e2e",
            RepresentationId::IpadStandard => "ipad-standard",
            RepresentationId::IpadSplitView => "ipad-splitview",
        }
    }

    /// Device family key in the aggregate configuration.
    pub fn family(self) -> &'static str {
        match self {
            RepresentationId::IphoneStandard | RepresentationId::IphoneEdgeToEdge => "iphone",
            RepresentationId::IpadStandard | RepresentationId::IpadSplitView => "ipad",
        }
    }

    /// Subtype key under the family in the aggregate configuration.
    pub fn subtype(self) -> &'static str {
        match self {
            RepresentationId::IphoneStandard | RepresentationId::IpadStandard => "standard",
            RepresentationId::IphoneEdgeToEdge => "edgeToEdge",
            RepresentationId::IpadSplitView => "splitView",
        }
    }

    /// Canonical (portrait) pixel resolution of the rendered asset.
    pub fn resolution(self) -> Size {
        match self {
            RepresentationId::IphoneStandard => Size::new(1080, 1920),
            RepresentationId::IphoneEdgeToEdge => Size::new(1242, 2688),
            RepresentationId::IpadStandard => Size::new(2048, 2732),
            RepresentationId::IpadSplitView => Size::new(2048, 1366),
        }
    }

    /// Canonical (portrait) logical mapping size. Interactive region
    /// coordinates in the output configuration live in this space.
    pub fn mapping_size(self) -> Size {
        match self {
            RepresentationId::IphoneStandard => Size::new(360, 640),
            RepresentationId::IphoneEdgeToEdge => Size::new(414, 896),
            RepresentationId::IpadStandard => Size::new(1024, 1366),
            RepresentationId::IpadSplitView => Size::new(1024, 683),
        }
    }
}

impl std::fmt::Display for RepresentationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas orientation. Profiles are authored portrait-first; landscape swaps
/// width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Orientation key in file names and the aggregate configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete render target: profile, orientation and alt-skin variant,
/// with orientation already applied to both sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Representation {
    pub id: RepresentationId,
    pub orientation: Orientation,
    /// Alternate-variant flag: same geometry, distinct assets, selectable at
    /// runtime by the consumer.
    pub alt: bool,
    pub resolution: Size,
    pub mapping_size: Size,
}

impl Representation {
    /// Build a representation from the static catalog.
    pub fn new(id: RepresentationId, orientation: Orientation, alt: bool) -> Self {
        let (resolution, mapping_size) = match orientation {
            Orientation::Portrait => (id.resolution(), id.mapping_size()),
            Orientation::Landscape => {
                (id.resolution().transposed(), id.mapping_size().transposed())
            }
        };
        Self {
            id,
            orientation,
            alt,
            resolution,
            mapping_size,
        }
    }

    /// Ratio between raw canvas pixels and logical mapping units.
    ///
    /// Derived from the catalog rather than assumed constant; the iPhone
    /// profiles happen to be 3x, the iPad profiles are 2x.
    pub fn scale_factor(&self) -> f64 {
        f64::from(self.resolution.width) / f64::from(self.mapping_size.width)
    }

    /// Path of the input canvas document inside the project.
    pub fn canvas_file_path(&self, project_dir: &Path) -> PathBuf {
        let variant = if self.alt { "-alt" } else { "" };
        project_dir
            .join(DIR_REPRESENTATIONS)
            .join(self.id.as_str())
            .join(format!("{}{variant}.svg", self.orientation))
    }

    /// Name of the rendered raster inside the skin archive.
    pub fn output_file_name(&self) -> String {
        let variant = if self.alt { "_alt" } else { "" };
        format!("{}_{}{variant}.png", self.id, self.orientation)
    }

    /// Key path of this representation's fragment in the aggregate
    /// configuration: family, subtype, orientation.
    pub fn config_path(&self) -> [&'static str; 3] {
        [
            self.id.family(),
            self.id.subtype(),
            self.orientation.as_str(),
        ]
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.orientation)?;
        if self.alt {
            write!(f, " as alt skin")?;
        }
        Ok(())
    }
}

/// Expand a CLI representation selector into concrete profile ids.
pub fn expand_representation_selector(selector: &str) -> SkinResult<Vec<RepresentationId>> {
    Ok(match selector {
        "all" => RepresentationId::ALL.to_vec(),
        "iphone" => vec![
            RepresentationId::IphoneStandard,
            RepresentationId::IphoneEdgeToEdge,
        ],
        "ipad" => vec![
            RepresentationId::IpadStandard,
            RepresentationId::IpadSplitView,
        ],
        "iphone-standard" => vec![RepresentationId::IphoneStandard],
        "iphone-e2e" => vec![RepresentationId::IphoneEdgeToEdge],
        "ipad-standard" => vec![RepresentationId::IpadStandard],
        "ipad-splitview" => vec![RepresentationId::IpadSplitView],
        other => {
            return Err(SkinError::validation(format!(
                "unknown representation selector '{other}'"
            )));
        }
    })
}

/// Expand a CLI orientation selector.
pub fn expand_orientation_selector(selector: &str) -> SkinResult<Vec<Orientation>> {
    Ok(match selector {
        "all" => vec![Orientation::Portrait, Orientation::Landscape],
        "portrait" => vec![Orientation::Portrait],
        "landscape" => vec![Orientation::Landscape],
        other => {
            return Err(SkinError::validation(format!(
                "unknown orientation selector '{other}'"
            )));
        }
    })
}

/// Expand CLI selectors into the deduplicated, ordered representation list.
///
/// With `alt_skin` enabled every selected combination is attempted twice,
/// once primary and once as the alternate variant.
pub fn expand_selectors(
    representations: &[String],
    orientations: &[String],
    alt_skin: bool,
) -> SkinResult<Vec<Representation>> {
    let mut ids = Vec::new();
    for selector in representations {
        for id in expand_representation_selector(selector)? {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    let mut orients = Vec::new();
    for selector in orientations {
        for orientation in expand_orientation_selector(selector)? {
            if !orients.contains(&orientation) {
                orients.push(orientation);
            }
        }
    }

    let mut out = Vec::new();
    for id in &ids {
        for orientation in &orients {
            out.push(Representation::new(*id, *orientation, false));
            if alt_skin {
                out.push(Representation::new(*id, *orientation, true));
            }
        }
    }
    Ok(out)
}
