use serde::{Deserialize, Serialize};

use crate::movetree::MoveTree;
use crate::point::Point;

/// Inclusive rectangle of intersections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bot_right: Point,
}

impl BoundingBox {
    /// `None` when the corners are out of order.
    pub fn new(top_left: Point, bot_right: Point) -> Option<Self> {
        (top_left.x <= bot_right.x && top_left.y <= bot_right.y).then_some(Self {
            top_left,
            bot_right,
        })
    }

    /// Smallest box containing every point, `None` for no points.
    pub fn around(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bbox = Self {
            top_left: first,
            bot_right: first,
        };
        for point in points {
            bbox.expand(point);
        }
        Some(bbox)
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.top_left.x..=self.bot_right.x).contains(&point.x)
            && (self.top_left.y..=self.bot_right.y).contains(&point.y)
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(other.top_left) && self.contains(other.bot_right)
    }

    pub fn expand(&mut self, point: Point) {
        self.top_left.x = self.top_left.x.min(point.x);
        self.top_left.y = self.top_left.y.min(point.y);
        self.bot_right.x = self.bot_right.x.max(point.x);
        self.bot_right.y = self.bot_right.y.max(point.y);
    }

    /// Number of columns covered.
    pub fn width(&self) -> u8 {
        self.bot_right.x - self.top_left.x + 1
    }

    /// Number of rows covered.
    pub fn height(&self) -> u8 {
        self.bot_right.y - self.top_left.y + 1
    }
}

/// Convenience regions of the board for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CroppingPreset {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    All,
}

impl CroppingPreset {
    /// Presets from the smallest region to the whole board.
    pub const BY_AREA: [CroppingPreset; 9] = [
        CroppingPreset::TopLeft,
        CroppingPreset::TopRight,
        CroppingPreset::BottomLeft,
        CroppingPreset::BottomRight,
        CroppingPreset::Top,
        CroppingPreset::Bottom,
        CroppingPreset::Left,
        CroppingPreset::Right,
        CroppingPreset::All,
    ];
}

/// A bounding box that is a subset of a board of `original_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub bbox: BoundingBox,
    pub original_size: u8,
}

impl CropBox {
    pub fn full(size: u8) -> Self {
        Self::from_preset(CroppingPreset::All, size)
    }

    /// Half-board presets reach one line past the middle; corners reach two lines across.
    pub fn from_preset(preset: CroppingPreset, size: u8) -> Self {
        let last = size.saturating_sub(1);
        let half = size / 2;
        let near_end = (half + 1).min(last);
        let far_start = half.saturating_sub(1);
        let corner_end = (half + 2).min(last);
        let corner_start = half.saturating_sub(2);

        let (mut top, mut left, mut bot, mut right) = (0, 0, last, last);
        match preset {
            CroppingPreset::All => {}
            CroppingPreset::Left => right = near_end,
            CroppingPreset::Right => left = far_start,
            CroppingPreset::Top => bot = near_end,
            CroppingPreset::Bottom => top = far_start,
            CroppingPreset::TopLeft => {
                bot = near_end;
                right = corner_end;
            }
            CroppingPreset::TopRight => {
                bot = near_end;
                left = corner_start;
            }
            CroppingPreset::BottomLeft => {
                top = far_start;
                right = corner_end;
            }
            CroppingPreset::BottomRight => {
                top = far_start;
                left = corner_start;
            }
        }
        Self {
            bbox: BoundingBox {
                top_left: Point::new(left, top),
                bot_right: Point::new(right, bot),
            },
            original_size: size,
        }
    }

    pub fn preset_for(&self) -> Option<CroppingPreset> {
        CroppingPreset::BY_AREA
            .into_iter()
            .find(|&preset| Self::from_preset(preset, self.original_size) == *self)
    }
}

/// Smallest preset region containing every stone and move in the tree.
pub fn auto_crop(tree: &MoveTree) -> CropBox {
    let size = tree.board_size();
    let mut points = Vec::new();
    tree.traverse(tree.root(), |_, node| {
        points.extend(node.placements.iter().filter_map(|mv| mv.point));
        points.extend(node.mv.and_then(|mv| mv.point));
    });
    let Some(used) = BoundingBox::around(points) else {
        return CropBox::full(size);
    };
    CroppingPreset::BY_AREA
        .into_iter()
        .map(|preset| CropBox::from_preset(preset, size))
        .find(|crop| crop.bbox.contains_box(&used))
        .unwrap_or_else(|| CropBox::full(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgf;

    #[test]
    fn presets_on_nineteen() {
        let top_right = CropBox::from_preset(CroppingPreset::TopRight, 19);
        assert_eq!(top_right.bbox.top_left, Point::new(7, 0));
        assert_eq!(top_right.bbox.bot_right, Point::new(18, 10));
        assert_eq!(top_right.bbox.width(), 12);
        assert_eq!(top_right.bbox.height(), 11);

        let bottom = CropBox::from_preset(CroppingPreset::Bottom, 19);
        assert_eq!(bottom.bbox.top_left, Point::new(0, 8));
        assert_eq!(bottom.bbox.bot_right, Point::new(18, 18));

        let all = CropBox::full(19);
        assert_eq!(all.bbox.width(), 19);
        assert_eq!(all.preset_for(), Some(CroppingPreset::All));
    }

    #[test]
    fn presets_stay_on_tiny_boards() {
        let crop = CropBox::from_preset(CroppingPreset::BottomRight, 3);
        assert!(crop.bbox.bot_right.x <= 2 && crop.bbox.bot_right.y <= 2);
        assert!(crop.bbox.top_left.x <= crop.bbox.bot_right.x);
    }

    #[test]
    fn bounding_box_basics() {
        assert!(BoundingBox::new(Point::new(3, 3), Point::new(1, 5)).is_none());
        let bbox = BoundingBox::around([Point::new(4, 2), Point::new(1, 7), Point::new(3, 3)])
            .expect("non-empty");
        assert_eq!(bbox.top_left, Point::new(1, 2));
        assert_eq!(bbox.bot_right, Point::new(4, 7));
        assert!(bbox.contains(Point::new(2, 5)));
        assert!(!bbox.contains(Point::new(0, 5)));
        assert!(BoundingBox::around(Vec::new()).is_none());
    }

    #[test]
    fn auto_crop_picks_corner() {
        let tree = sgf::parse("(;SZ[19]AB[pc][qd]AW[oc](;B[rc]))").expect("parses");
        assert_eq!(auto_crop(&tree).preset_for(), Some(CroppingPreset::TopRight));

        let spread = sgf::parse("(;SZ[19]AB[aa][ss])").expect("parses");
        assert_eq!(auto_crop(&spread).preset_for(), Some(CroppingPreset::All));

        let empty = sgf::parse("(;SZ[9])").expect("parses");
        assert_eq!(auto_crop(&empty), CropBox::full(9));
    }
}
