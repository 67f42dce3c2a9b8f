//! Rect, Quad - Half-open rectangle regions
//!
//! A [`Rect`] covers `[x_min, x_max) × [y_min, y_max)`. Every square a
//! quadtree visits is a `Rect`, and every leaf it reports is a [`Quad`]:
//! a rectangle plus the leaf value (absent when nothing was ever written).

use crate::error::{Error, Result};

/// A half-open rectangle region
///
/// This is a small `Copy` type; the coordinate ranges are
/// `x_min..x_max` and `y_min..y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate (inclusive)
    pub x_min: u32,
    /// Right x coordinate (exclusive)
    pub x_max: u32,
    /// Top y coordinate (inclusive)
    pub y_min: u32,
    /// Bottom y coordinate (exclusive)
    pub y_max: u32,
}

impl Rect {
    /// Create a new rect
    ///
    /// # Errors
    ///
    /// Returns an error if `x_min > x_max` or `y_min > y_max`.
    pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Result<Self> {
        if x_min > x_max || y_min > y_max {
            return Err(Error::InvalidParameter(format!(
                "rect bounds are inverted: x {}..{}, y {}..{}",
                x_min, x_max, y_min, y_max
            )));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Create a rect without validation
    pub const fn new_unchecked(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Create the square with top-left corner `(x_min, y_min)` and side `size`
    pub const fn square(x_min: u32, y_min: u32, size: u32) -> Self {
        Self {
            x_min,
            x_max: x_min + size,
            y_min,
            y_max: y_min + size,
        }
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Check if the rect is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.y_min >= self.y_max
    }

    /// Check if a point is inside the rect
    #[inline]
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }

    /// Check if this rect contains another rect
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x_min >= self.x_min
            && other.y_min >= self.y_min
            && other.x_max <= self.x_max
            && other.y_max <= self.y_max
    }

    /// Check if this rect overlaps with another
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x_min < other.x_max
            && self.x_max > other.x_min
            && self.y_min < other.y_max
            && self.y_max > other.y_min
    }

    /// Compute the intersection of two rects
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect {
            x_min: self.x_min.max(other.x_min),
            x_max: self.x_max.min(other.x_max),
            y_min: self.y_min.max(other.y_min),
            y_max: self.y_max.min(other.y_max),
        };
        (!rect.is_empty()).then_some(rect)
    }

    /// Clip the rect to `[0, width) × [0, height)`
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::new_unchecked(0, width, 0, height))
    }

    /// Split a square rect into its four quadrants
    ///
    /// Order is top-left, top-right, bottom-left, bottom-right. For odd
    /// sides the right and bottom quadrants take the extra row/column.
    pub fn quadrants(&self) -> [Rect; 4] {
        let x_mid = self.x_min + self.width() / 2;
        let y_mid = self.y_min + self.height() / 2;
        [
            Rect::new_unchecked(self.x_min, x_mid, self.y_min, y_mid),
            Rect::new_unchecked(x_mid, self.x_max, self.y_min, y_mid),
            Rect::new_unchecked(self.x_min, x_mid, y_mid, self.y_max),
            Rect::new_unchecked(x_mid, self.x_max, y_mid, self.y_max),
        ]
    }
}

/// A leaf region reported by a quadtree
///
/// `value` is `None` for cells nothing has been written to (including the
/// padding outside a non-power-of-two raster).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad<V> {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
    pub value: Option<V>,
}

impl<V> Quad<V> {
    /// Create a quad covering `rect`
    pub fn new(rect: Rect, value: Option<V>) -> Self {
        Self {
            x_min: rect.x_min,
            x_max: rect.x_max,
            y_min: rect.y_min,
            y_max: rect.y_max,
            value,
        }
    }

    /// Get the covered rectangle
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new_unchecked(self.x_min, self.x_max, self.y_min, self.y_max)
    }

    /// Get the covered area
    #[inline]
    pub fn area(&self) -> u64 {
        self.rect().area()
    }

    /// Borrow the value
    pub fn borrowed(&self) -> Quad<&V> {
        Quad::new(self.rect(), self.value.as_ref())
    }

    /// Map the value, keeping the rectangle
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Quad<U> {
        let rect = self.rect();
        Quad::new(rect, self.value.map(f))
    }
}

impl<V: Clone> Quad<&V> {
    /// Clone the borrowed value into an owned quad
    pub fn cloned(self) -> Quad<V> {
        let rect = self.rect();
        Quad::new(rect, self.value.cloned())
    }
}
