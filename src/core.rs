//! Small geometry types shared by the composition model.

/// Integer pixel coordinate on the output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rule mapping a clip's `position` to an offset within its bounding box.
///
/// `TopLeft` (the default) places the box's top-left corner at `position`,
/// matching raw pixel placement; `Center` centers the box on `position`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AnchorPoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl AnchorPoint {
    /// Offset of this anchor within a `(width, height)` bounding box.
    pub fn offset(self, width: f64, height: f64) -> (f64, f64) {
        let x = match self {
            Self::TopLeft | Self::CenterLeft | Self::BottomLeft => 0.0,
            Self::TopCenter | Self::Center | Self::BottomCenter => width / 2.0,
            Self::TopRight | Self::CenterRight | Self::BottomRight => width,
        };
        let y = match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => 0.0,
            Self::CenterLeft | Self::Center | Self::CenterRight => height / 2.0,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => height,
        };
        (x, y)
    }

    /// Effective top-left draw origin for a box of `(width, height)` anchored
    /// at `position`.
    pub fn resolve(self, position: Point, width: f64, height: f64) -> (f64, f64) {
        let (dx, dy) = self.offset(width, height);
        (f64::from(position.x) - dx, f64::from(position.y) - dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_anchor_is_raw_pixel_placement() {
        let origin = AnchorPoint::default().resolve(Point::new(10, 20), 100.0, 50.0);
        assert_eq!(origin, (10.0, 20.0));
    }

    #[test]
    fn center_anchor_centers_the_box() {
        let origin = AnchorPoint::Center.resolve(Point::new(100, 100), 40.0, 20.0);
        assert_eq!(origin, (80.0, 90.0));
    }

    #[test]
    fn bottom_right_anchor_offsets_by_full_box() {
        let origin = AnchorPoint::BottomRight.resolve(Point::new(100, 100), 40.0, 20.0);
        assert_eq!(origin, (60.0, 80.0));
    }
}
