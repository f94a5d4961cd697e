use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::warn;

use crate::annotate::scanner::Marker;
use crate::catalog::{DIR_ELEMENTS, Representation};
use crate::foundation::core::{LogicalRect, Rect, Size};

/// Target system identifiers understood by the consumer application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GameType {
    #[serde(rename = "com.rileytestut.delta.game.gbc")]
    Gbc,
    #[serde(rename = "com.rileytestut.delta.game.gba")]
    Gba,
    #[serde(rename = "com.rileytestut.delta.game.ds")]
    Ds,
    #[serde(rename = "com.rileytestut.delta.game.nes")]
    Nes,
    #[serde(rename = "com.rileytestut.delta.game.snes")]
    Snes,
    #[serde(rename = "com.rileytestut.delta.game.n64")]
    N64,
    #[serde(rename = "com.rileytestut.delta.game.genesis")]
    Genesis,
}

impl GameType {
    /// Native screen resolution of the emulated system. Screen placement
    /// rectangles are expected to match this aspect ratio.
    pub fn screen_resolution(self) -> Size {
        match self {
            GameType::Gbc => Size::new(160, 144),
            GameType::Gba => Size::new(240, 160),
            GameType::Ds => Size::new(256, 192),
            GameType::Nes => Size::new(256, 240),
            GameType::Snes => Size::new(256, 224),
            GameType::N64 => Size::new(256, 224),
            GameType::Genesis => Size::new(320, 224),
        }
    }

    /// Whether the system exposes two independent display regions.
    pub fn has_touch_screen(self) -> bool {
        matches!(self, GameType::Ds)
    }
}

/// Closed vocabulary of interactive element kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Dpad,
    Thumbstick,
    Menu,
    A,
    B,
    C,
    X,
    Y,
    Z,
    Select,
    Start,
    Mode,
    L,
    R,
    CUp,
    CDown,
    CLeft,
    CRight,
    QuickSave,
    QuickLoad,
    FastForward,
    ToggleFastForward,
    ToggleAltRepresentations,
    Screen,
    TouchScreen,
    TouchScreenControls,
}

/// The two families an element kind can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementFamily {
    /// Produces an input/output frame pair in `screens`.
    Screen,
    /// Produces an input mapping plus a frame in `items`.
    Item,
}

impl ElementKind {
    /// Parse a marker name. `None` for anything outside the vocabulary.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "dpad" => ElementKind::Dpad,
            "thumbstick" => ElementKind::Thumbstick,
            "menu" => ElementKind::Menu,
            "a" => ElementKind::A,
            "b" => ElementKind::B,
            "c" => ElementKind::C,
            "x" => ElementKind::X,
            "y" => ElementKind::Y,
            "z" => ElementKind::Z,
            "select" => ElementKind::Select,
            "start" => ElementKind::Start,
            "mode" => ElementKind::Mode,
            "l" => ElementKind::L,
            "r" => ElementKind::R,
            "cUp" => ElementKind::CUp,
            "cDown" => ElementKind::CDown,
            "cLeft" => ElementKind::CLeft,
            "cRight" => ElementKind::CRight,
            "quickSave" => ElementKind::QuickSave,
            "quickLoad" => ElementKind::QuickLoad,
            "fastForward" => ElementKind::FastForward,
            "toggleFastForward" => ElementKind::ToggleFastForward,
            "toggleAltRepresentations" => ElementKind::ToggleAltRepresentations,
            "screen" => ElementKind::Screen,
            "touchScreen" => ElementKind::TouchScreen,
            "touchScreenControls" => ElementKind::TouchScreenControls,
            _ => return None,
        })
    }

    /// The input-descriptor name emitted for single-input kinds.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Dpad => "dpad",
            ElementKind::Thumbstick => "thumbstick",
            ElementKind::Menu => "menu",
            ElementKind::A => "a",
            ElementKind::B => "b",
            ElementKind::C => "c",
            ElementKind::X => "x",
            ElementKind::Y => "y",
            ElementKind::Z => "z",
            ElementKind::Select => "select",
            ElementKind::Start => "start",
            ElementKind::Mode => "mode",
            ElementKind::L => "l",
            ElementKind::R => "r",
            ElementKind::CUp => "cUp",
            ElementKind::CDown => "cDown",
            ElementKind::CLeft => "cLeft",
            ElementKind::CRight => "cRight",
            ElementKind::QuickSave => "quickSave",
            ElementKind::QuickLoad => "quickLoad",
            ElementKind::FastForward => "fastForward",
            ElementKind::ToggleFastForward => "toggleFastForward",
            ElementKind::ToggleAltRepresentations => "toggleAltRepresentations",
            ElementKind::Screen => "screen",
            ElementKind::TouchScreen => "touchScreen",
            ElementKind::TouchScreenControls => "touchScreenControls",
        }
    }

    /// Screen/item classification.
    pub fn family(self) -> ElementFamily {
        match self {
            ElementKind::Screen | ElementKind::TouchScreen => ElementFamily::Screen,
            _ => ElementFamily::Item,
        }
    }

    /// Whether a system physically exposes the control this kind maps to.
    pub fn compatible_with(self, system: GameType) -> bool {
        // Controls every supported system has, plus the pure software kinds.
        match self {
            ElementKind::A
            | ElementKind::B
            | ElementKind::Start
            | ElementKind::Dpad
            | ElementKind::Thumbstick
            | ElementKind::Menu
            | ElementKind::Screen
            | ElementKind::QuickSave
            | ElementKind::QuickLoad
            | ElementKind::FastForward
            | ElementKind::ToggleFastForward
            | ElementKind::ToggleAltRepresentations => return true,
            ElementKind::TouchScreen | ElementKind::TouchScreenControls => {
                return system.has_touch_screen();
            }
            _ => {}
        }
        match system {
            GameType::Gbc | GameType::Nes => matches!(self, ElementKind::Select),
            GameType::Gba => matches!(self, ElementKind::Select | ElementKind::L | ElementKind::R),
            GameType::Ds | GameType::Snes => matches!(
                self,
                ElementKind::Select
                    | ElementKind::X
                    | ElementKind::Y
                    | ElementKind::L
                    | ElementKind::R
            ),
            GameType::N64 => matches!(
                self,
                ElementKind::CUp
                    | ElementKind::CDown
                    | ElementKind::CLeft
                    | ElementKind::CRight
                    | ElementKind::L
                    | ElementKind::R
                    | ElementKind::Z
            ),
            GameType::Genesis => matches!(
                self,
                ElementKind::C
                    | ElementKind::X
                    | ElementKind::Y
                    | ElementKind::Z
                    | ElementKind::Mode
            ),
        }
    }
}

/// A non-fatal problem found while validating an element.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable context.
    pub message: String,
}

/// Fixed input-frame rectangles for the two DS display regions, in raw
/// device buffer coordinates.
const DS_TOP_SCREEN: LogicalRect = LogicalRect::new(0, 0, 256, 192);
const DS_BOTTOM_SCREEN: LogicalRect = LogicalRect::new(0, 192, 256, 192);

/// A classified element marker: kind, placement rectangle and optional
/// side-car configuration.
///
/// Elements never mutate the canvas tree; they only produce configuration
/// output.
#[derive(Clone, Debug)]
pub struct Element {
    /// Classified kind.
    pub kind: ElementKind,
    /// Target system, drives validation and input-frame selection.
    pub system: GameType,
    /// Raw pixel placement rectangle, captured at load time.
    pub rect: Rect,
    /// Arbitrary side-car data merged (shallow) into item output.
    pub config: Option<serde_json::Value>,
    label: String,
}

/// Path of a side-car element configuration inside the project.
pub fn element_config_file_path(project_dir: &Path, qualifier: &str) -> PathBuf {
    project_dir
        .join(DIR_ELEMENTS)
        .join(format!("{qualifier}.json"))
}

impl Element {
    /// Resolve a marker into an element.
    ///
    /// Returns `None` (logged, non-fatal) for names outside the closed
    /// vocabulary. A qualifier names a side-car JSON file; failing to load it
    /// is also non-fatal and leaves the element without extra configuration.
    pub fn load(
        project_dir: &Path,
        marker: &Marker,
        system: GameType,
        rect: Rect,
    ) -> Option<Self> {
        let Some(kind) = ElementKind::parse(&marker.name) else {
            warn!(%marker, "not loading annotation: unknown element");
            return None;
        };
        let config = marker.qualifier.as_deref().and_then(|qualifier| {
            let path = element_config_file_path(project_dir, qualifier);
            match std::fs::read(&path)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| Ok(serde_json::from_slice(&bytes)?))
            {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(%marker, %err, "ignoring element configuration");
                    None
                }
            }
        });
        Some(Self {
            kind,
            system,
            rect,
            config,
            label: marker.to_string(),
        })
    }

    /// The element's screen/item classification.
    pub fn family(&self) -> ElementFamily {
        self.kind.family()
    }

    /// Check the element against the target system profile.
    ///
    /// Issues are advisory: generation proceeds regardless, the issues are
    /// logged by the caller.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.family() == ElementFamily::Screen {
            let expected = self.system.screen_resolution();
            let expected_ratio = f64::from(expected.height) / f64::from(expected.width);
            match self.rect.aspect_ratio() {
                Ok(ratio) if (ratio - expected_ratio).abs() < 1e-9 => {}
                Ok(_) => issues.push(ValidationIssue {
                    code: "screen-aspect-ratio",
                    message: format!(
                        "aspect ratio of {} ({}x{}) does not match the {expected} screen",
                        self.label, self.rect.width, self.rect.height
                    ),
                }),
                Err(err) => issues.push(ValidationIssue {
                    code: "screen-aspect-ratio",
                    message: format!("cannot compute aspect ratio of {}: {err}", self.label),
                }),
            }
        }
        if !self.kind.compatible_with(self.system) {
            issues.push(ValidationIssue {
                code: "incompatible-element",
                message: format!("{} is not compatible with {:?}", self.label, self.system),
            });
        }
        issues
    }

    /// Produce this element's configuration fragment for one representation.
    ///
    /// Pixel coordinates are mapped into the representation's logical space
    /// by the catalog-derived scale factor.
    pub fn generate(&self, representation: &Representation) -> serde_json::Value {
        let frame = self.rect.to_logical(representation.scale_factor());
        match self.family() {
            ElementFamily::Screen => self.generate_screen(frame),
            ElementFamily::Item => self.generate_item(frame),
        }
    }

    fn generate_screen(&self, frame: LogicalRect) -> serde_json::Value {
        if !self.system.has_touch_screen() {
            // Single display region: the emulator picks the input side.
            return json!({ "outputFrame": frame });
        }
        let input_frame = if self.kind == ElementKind::TouchScreen {
            DS_BOTTOM_SCREEN
        } else {
            DS_TOP_SCREEN
        };
        json!({ "inputFrame": input_frame, "outputFrame": frame })
    }

    fn generate_item(&self, frame: LogicalRect) -> serde_json::Value {
        let inputs = match self.kind {
            ElementKind::Dpad => json!({
                "up": "up",
                "down": "down",
                "left": "left",
                "right": "right",
            }),
            ElementKind::Thumbstick | ElementKind::TouchScreenControls => json!({
                "up": "analogStickUp",
                "down": "analogStickDown",
                "left": "analogStickLeft",
                "right": "analogStickRight",
            }),
            kind => json!([kind.as_str()]),
        };

        let mut fragment = serde_json::Map::new();
        fragment.insert("inputs".to_string(), inputs);
        fragment.insert(
            "frame".to_string(),
            serde_json::to_value(frame).unwrap_or(serde_json::Value::Null),
        );
        // Side-car configuration merges last with object-spread semantics:
        // last write wins, no deep merge. Intentionally permissive.
        if let Some(serde_json::Value::Object(extra)) = &self.config {
            for (key, value) in extra {
                fragment.insert(key.clone(), value.clone());
            }
        }
        serde_json::Value::Object(fragment)
    }
}
