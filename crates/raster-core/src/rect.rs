//! Rectangles in image coordinates.
//!
//! Origin `(0, 0)` is the top-left pixel; X grows right, Y grows down. The
//! origin may be negative, which lets callers describe regions that hang off
//! an image and rely on per-pixel clipping.
//!
//! ```rust
//! use raster_core::Rect;
//!
//! // corners given in either order describe the same rectangle
//! let a = Rect::from_corners(10, 20, 2, 4);
//! assert_eq!(a, Rect::new(2, 4, 8, 16));
//! assert!(a.contains(2, 4));
//! assert!(!a.contains(10, 20));
//! ```

/// A rectangle defined by origin and size, exclusive on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: i32,
    /// Y coordinate of the top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at `(0, 0)`.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Creates a rectangle from two corners, `(x2, y2)` exclusive.
    ///
    /// Reversed corners are swapped first.
    #[inline]
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (min_x, max_x) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (min_y, max_y) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self::new(
            min_x,
            min_y,
            max_x.abs_diff(min_x),
            max_y.abs_diff(min_y),
        )
    }

    /// X coordinate of the right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if `(px, py)` lies inside.
    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Intersection with another rectangle, `None` if they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right.abs_diff(x), bottom.abs_diff(y)))
        } else {
            None
        }
    }
}
