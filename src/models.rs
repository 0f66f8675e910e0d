use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::raster::RasterImage;

/// Axis-aligned rectangle in pixel coordinates.
///
/// `x2`/`y2` are exclusive when used as a crop region. Coordinates are signed so
/// that clearance arithmetic can go negative before it is clamped; it saturates
/// instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: i64,
    pub x2: i64,
    pub y1: i64,
    pub y2: i64,
}

impl Rectangle {
    pub fn new(x1: i64, x2: i64, y1: i64, y2: i64) -> Self {
        Self { x1, x2, y1, y2 }
    }

    pub fn width(&self) -> i64 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i64 {
        self.y2.saturating_sub(self.y1)
    }

    /// Shift by `(dx, dy)`
    pub fn translate(&self, dx: i64, dy: i64) -> Self {
        Self {
            x1: self.x1.saturating_add(dx),
            x2: self.x2.saturating_add(dx),
            y1: self.y1.saturating_add(dy),
            y2: self.y2.saturating_add(dy),
        }
    }

    /// Grow every side outward by `amount` pixels
    pub fn expand(&self, amount: i64) -> Self {
        Self {
            x1: self.x1.saturating_sub(amount),
            x2: self.x2.saturating_add(amount),
            y1: self.y1.saturating_sub(amount),
            y2: self.y2.saturating_add(amount),
        }
    }

    /// Intersect with `outer`, keeping every side inside it
    pub fn clamp_to(&self, outer: &Rectangle) -> Self {
        Self {
            x1: self.x1.max(outer.x1),
            x2: self.x2.min(outer.x2),
            y1: self.y1.max(outer.y1),
            y2: self.y2.min(outer.y2),
        }
    }

    /// Whether `other` lies completely inside this rectangle
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.x1 >= self.x1 && other.x2 <= self.x2 && other.y1 >= self.y1 && other.y2 <= self.y2
    }

    pub fn is_well_formed(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }
}

/// A single front/back card cut out of a sheet
#[derive(Debug, Clone)]
pub struct Flashcard {
    pub front: RasterImage,
    pub back: RasterImage,
    pub id: Uuid,
}

impl Flashcard {
    pub fn new(front: RasterImage, back: RasterImage) -> Self {
        Self {
            front,
            back,
            id: Uuid::new_v4(),
        }
    }

    /// Swap front and back, keeping the id
    pub fn switch(self) -> Self {
        Self {
            front: self.back,
            back: self.front,
            id: self.id,
        }
    }

    pub fn front_file_name(&self) -> String {
        format!("{}-front.png", self.id)
    }

    pub fn back_file_name(&self) -> String {
        format!("{}-back.png", self.id)
    }
}
