use tracing::trace;

use crate::buffer::{ImageBuffer, ImageError, Sample, Shape};

/// Fold `sample` into the running mean `buffer`.
///
/// `sample_index` is the number of samples already averaged into `buffer`
/// (0 for the first call). Returns
/// `(buffer * sample_index + sample) / (sample_index + 1)` elementwise,
/// i.e. the mean of all `sample_index + 1` samples seen so far.
pub fn accumulate<T: Sample>(
    buffer: &ImageBuffer<T>,
    sample: &ImageBuffer<T>,
    sample_index: u32,
) -> Result<ImageBuffer<T>, ImageError> {
    buffer.ensure_same_shape(sample)?;

    let n = T::from_f64(f64::from(sample_index));
    let denom = T::from_f64(f64::from(sample_index) + 1.0);
    let data = buffer
        .as_slice()
        .iter()
        .zip(sample.as_slice())
        .map(|(&acc, &new)| (acc * n + new) / denom)
        .collect();
    ImageBuffer::new(buffer.shape(), data)
}

/// Running mean of a frame sequence, owned by whoever drives the sequence.
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    mean: ImageBuffer<T>,
    samples: u32,
}

impl<T: Sample> Accumulator<T> {
    pub fn new(shape: Shape) -> Result<Self, ImageError> {
        Ok(Self {
            mean: ImageBuffer::zeros(shape)?,
            samples: 0,
        })
    }

    /// Number of frames folded in so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn mean(&self) -> &ImageBuffer<T> {
        &self.mean
    }

    /// Fold the next frame in. On error the state is left untouched.
    pub fn push(&mut self, frame: &ImageBuffer<T>) -> Result<&ImageBuffer<T>, ImageError> {
        self.mean = accumulate(&self.mean, frame, self.samples)?;
        self.samples += 1;
        trace!(samples = self.samples, "frame accumulated");
        Ok(&self.mean)
    }
}
