//! Sample depth: how a channel value is stored.
//!
//! - [`SampleDepth::U8`] - one byte per sample, the default
//! - [`SampleDepth::U16`], [`SampleDepth::F16`], [`SampleDepth::F32`] - the
//!   "wide" depths, backed by a [`WideBuffer`]
//!
//! Wide samples are addressed in the float domain. [`WideSample`] describes
//! how each storage type maps to and from `f64`.
//!
//! ```rust
//! use raster_core::depth::{SampleDepth, WideSample};
//!
//! assert!(SampleDepth::F16.is_wide());
//! assert_eq!(<u16 as WideSample>::from_f64(1.0), 65535);
//! ```

use half::f16;
use std::fmt;

/// Storage depth of each sample in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleDepth {
    /// 8-bit unsigned integer.
    #[default]
    U8,
    /// 16-bit unsigned integer, normalized to `[0, 1]`.
    U16,
    /// 16-bit half-precision float.
    F16,
    /// 32-bit float.
    F32,
}

impl SampleDepth {
    /// Number of bits per sample.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 | Self::F16 => 16,
            Self::F32 => 32,
        }
    }

    /// Bytes per sample.
    #[inline]
    pub const fn bytes_per_sample(&self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Whether samples are stored wider than 8 bits.
    #[inline]
    pub const fn is_wide(&self) -> bool {
        !matches!(self, Self::U8)
    }

    /// Whether samples are stored as floating point.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F16 | Self::F32)
    }
}

impl fmt::Display for SampleDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::F16 => "f16",
            Self::F32 => "f32",
        };
        write!(f, "{s}")
    }
}

/// A storage type for wide samples.
pub trait WideSample: Copy + Default + Send + Sync + 'static {
    /// Depth tag for this storage type.
    const DEPTH: SampleDepth;

    /// Converts the stored value to the float domain.
    fn to_f64(self) -> f64;

    /// Converts a float-domain value to storage.
    fn from_f64(v: f64) -> Self;
}

impl WideSample for u16 {
    const DEPTH: SampleDepth = SampleDepth::U16;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64 / 65535.0
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        if v.is_nan() {
            return 0;
        }
        (v.clamp(0.0, 1.0) * 65535.0).round() as u16
    }
}

impl WideSample for f16 {
    const DEPTH: SampleDepth = SampleDepth::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
}

impl WideSample for f32 {
    const DEPTH: SampleDepth = SampleDepth::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

/// Sample storage for a wide direct image.
#[derive(Debug, Clone)]
pub enum WideBuffer {
    /// 16-bit integer samples.
    U16(Vec<u16>),
    /// Half-float samples.
    F16(Vec<f16>),
    /// Single-float samples.
    F32(Vec<f32>),
}

impl WideBuffer {
    /// Depth of the stored samples.
    pub fn depth(&self) -> SampleDepth {
        match self {
            Self::U16(_) => SampleDepth::U16,
            Self::F16(_) => SampleDepth::F16,
            Self::F32(_) => SampleDepth::F32,
        }
    }

    /// Number of samples stored.
    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::F16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// Returns `true` if no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads sample `i` in the float domain.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        match self {
            Self::U16(v) => v.get(i).map(|s| s.to_f64()),
            Self::F16(v) => v.get(i).map(|s| WideSample::to_f64(*s)),
            Self::F32(v) => v.get(i).map(|s| s.to_f64()),
        }
    }

    /// Writes sample `i` from the float domain. Returns `false` if `i` is
    /// outside the buffer.
    #[inline]
    pub fn set(&mut self, i: usize, value: f64) -> bool {
        fn store<T: WideSample>(buf: &mut [T], i: usize, value: f64) -> bool {
            match buf.get_mut(i) {
                Some(slot) => {
                    *slot = T::from_f64(value);
                    true
                }
                None => false,
            }
        }
        match self {
            Self::U16(v) => store(v, i, value),
            Self::F16(v) => store(v, i, value),
            Self::F32(v) => store(v, i, value),
        }
    }
}
