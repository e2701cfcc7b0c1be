use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// Floating-point sample type of an [`ImageBuffer`].
///
/// Implemented for `f32` (single precision, the default) and `f64` for long
/// accumulation runs where single-precision rounding drift matters.
pub trait Sample:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;

    fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }
}

impl Sample for f32 {
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }
    fn to_f64(self) -> f64 {
        self
    }
}

/// `(height, width, channels)` of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl Shape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

/// A dense image: rows top to bottom, pixels left to right, channels
/// interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer<T> {
    shape: Shape,
    data: Vec<T>,
}

impl<T: Sample> ImageBuffer<T> {
    pub fn new(shape: Shape, data: Vec<T>) -> Result<Self, ImageError> {
        if shape.is_empty() {
            return Err(ImageError::EmptyShape(shape));
        }
        if data.len() != shape.len() {
            return Err(ImageError::InvalidShape {
                shape,
                len: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn zeros(shape: Shape) -> Result<Self, ImageError> {
        Self::filled(shape, T::default())
    }

    pub fn filled(shape: Shape, value: T) -> Result<Self, ImageError> {
        Self::new(shape, vec![value; shape.len()])
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Channel values of the pixel at `(row, col)`.
    pub fn pixel(&self, row: usize, col: usize) -> &[T] {
        let c = self.shape.channels;
        let start = (row * self.shape.width + col) * c;
        &self.data[start..start + c]
    }

    pub fn pixels(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.shape.channels)
    }

    pub fn map<U: Sample>(&self, f: impl Fn(T) -> U) -> ImageBuffer<U> {
        ImageBuffer {
            shape: self.shape,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn ensure_same_shape(&self, other: &ImageBuffer<T>) -> Result<(), ImageError> {
        if self.shape != other.shape {
            return Err(ImageError::ShapeMismatch {
                expected: self.shape,
                got: other.shape,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },
    #[error("buffer of {len} samples does not fit shape {shape}")]
    InvalidShape { shape: Shape, len: usize },
    #[error("image shape {0} has no samples")]
    EmptyShape(Shape),
    #[error("expected at least 3 channels for RGB, got {channels}")]
    NotRgb { channels: usize },
}
