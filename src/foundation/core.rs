use crate::foundation::error::{SkinError, SkinResult};

/// A placement rectangle in raw canvas pixels, read from a placement
/// ancestor's `x`/`y`/`width`/`height` attributes.
///
/// Never stored across tree edits; always recomputed from the current tree.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Divide all coordinates by `factor` and round to whole logical units.
    pub fn to_logical(self, factor: f64) -> LogicalRect {
        LogicalRect {
            x: (self.x / factor).round() as i64,
            y: (self.y / factor).round() as i64,
            width: (self.width / factor).round() as i64,
            height: (self.height / factor).round() as i64,
        }
    }

    /// Width/height ratio. Errors on a degenerate rectangle.
    pub fn aspect_ratio(self) -> SkinResult<f64> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SkinError::geometry(format!(
                "degenerate rectangle {}x{}",
                self.width, self.height
            )));
        }
        Ok(self.height / self.width)
    }
}

/// A rectangle in the logical mapping coordinate space of one representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogicalRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl LogicalRect {
    /// Shorthand used by the fixed input-frame tables.
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Integer width/height pair used for pixel resolutions and mapping sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Swap width and height.
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_logical_divides_and_rounds() {
        let r = Rect {
            x: 50.0,
            y: 60.0,
            width: 200.0,
            height: 100.0,
        };
        let l = r.to_logical(3.0);
        assert_eq!(l, LogicalRect::new(17, 20, 67, 33));
    }

    #[test]
    fn aspect_ratio_rejects_degenerate_rects() {
        let r = Rect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 10.0,
        };
        assert!(r.aspect_ratio().is_err());
        let r = Rect {
            x: 0.0,
            y: 0.0,
            width: 256.0,
            height: 192.0,
        };
        assert!((r.aspect_ratio().unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn transposed_swaps_dimensions() {
        assert_eq!(Size::new(1080, 1920).transposed(), Size::new(1920, 1080));
    }
}
