//! Distinct color counting.
//!
//! [`count_colors`] feeds every pixel's RGB triple into a [`ColorOctree`], a
//! set keyed one bit per level from the most significant bit down. Counting
//! stops as soon as the limit is passed, so asking whether an image fits a
//! 256-entry palette never walks a full-color photo to the end.

use raster_core::{Color, RasterImage, RasterError};
use tracing::{debug, trace};

use crate::error::scratch;
use crate::OpsResult;

/// Result of [`count_colors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCount {
    /// The image holds exactly this many distinct RGB triples.
    Exact(usize),
    /// The image holds more distinct colors than the limit.
    TooMany,
}

impl ColorCount {
    /// The exact count, if the limit was not passed.
    pub fn exact(self) -> Option<usize> {
        match self {
            Self::Exact(n) => Some(n),
            Self::TooMany => None,
        }
    }
}

// bits 7..=1 are interior levels; bit 0 selects a leaf slot
const DEPTH: u32 = 8;
const LEAF: u32 = u32::MAX;
const EMPTY: u32 = 0;

/// Set of RGB triples stored as an octree of node indices.
///
/// Node 0 is the root, so index 0 doubles as "no child". Slots on the last
/// level hold [`LEAF`] instead of a node.
#[derive(Debug, Clone)]
pub struct ColorOctree {
    nodes: Vec<[u32; 8]>,
    len: usize,
}

impl Default for ColorOctree {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorOctree {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            nodes: vec![[EMPTY; 8]],
            len: 0,
        }
    }

    /// Number of distinct triples inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing was inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `(r, g, b)`, returning `true` if it was not present.
    ///
    /// # Errors
    ///
    /// [`RasterError::AllocationFailed`] if a new node cannot be allocated.
    pub fn insert(&mut self, r: u8, g: u8, b: u8) -> Result<bool, RasterError> {
        let mut node = 0usize;
        for level in (0..DEPTH).rev() {
            let slot = octant(r, g, b, level);
            let child = self.nodes[node][slot];
            if level == 0 {
                if child == LEAF {
                    return Ok(false);
                }
                self.nodes[node][slot] = LEAF;
                self.len += 1;
                return Ok(true);
            }
            node = if child == EMPTY {
                let next = self.grow()?;
                self.nodes[node][slot] = next as u32;
                next
            } else {
                child as usize
            };
        }
        Ok(false)
    }

    /// Returns `true` if `(r, g, b)` was inserted.
    pub fn contains(&self, r: u8, g: u8, b: u8) -> bool {
        let mut node = 0usize;
        for level in (0..DEPTH).rev() {
            let child = self.nodes[node][octant(r, g, b, level)];
            if level == 0 {
                return child == LEAF;
            }
            if child == EMPTY {
                return false;
            }
            node = child as usize;
        }
        false
    }

    fn grow(&mut self) -> Result<usize, RasterError> {
        self.nodes.try_reserve(1).map_err(|e| {
            RasterError::allocation_failed(std::mem::size_of::<[u32; 8]>(), e.to_string())
        })?;
        self.nodes.push([EMPTY; 8]);
        Ok(self.nodes.len() - 1)
    }
}

fn octant(r: u8, g: u8, b: u8, level: u32) -> usize {
    let bit = |v: u8| ((v >> level) & 1) as usize;
    (bit(r) << 2) | (bit(g) << 1) | bit(b)
}

/// Counts distinct RGB triples in `image`, giving up once there are more
/// than `max`.
///
/// Only the first three channels are compared; gray images count their
/// gray level through channel 0.
///
/// # Example
///
/// ```rust
/// use raster_core::{Color, Image, RasterImage};
/// use raster_ops::colors::{count_colors, ColorCount};
///
/// let mut img = Image::new_rgb(2, 1).unwrap();
/// img.put_pixel(1, 0, &Color::new(255, 0, 0, 0));
/// assert_eq!(count_colors(&img, 10).unwrap(), ColorCount::Exact(2));
/// assert_eq!(count_colors(&img, 1).unwrap(), ColorCount::TooMany);
/// ```
///
/// # Errors
///
/// Fails only if the row buffer or octree cannot grow.
pub fn count_colors(image: &dyn RasterImage, max: usize) -> OpsResult<ColorCount> {
    let (width, height) = (image.width(), image.height());
    trace!(width, height, max, "colors::count_colors");

    let mut set = ColorOctree::new();
    let mut row: Vec<Color> = scratch(width as usize)?;
    for y in 0..height as i32 {
        let n = image.get_line(0, width as i32, y, &mut row);
        for px in &row[..n] {
            set.insert(px.0[0], px.0[1], px.0[2])?;
            if set.len() > max {
                debug!(y, max, "count_colors: limit passed");
                return Ok(ColorCount::TooMany);
            }
        }
    }
    Ok(ColorCount::Exact(set.len()))
}
