use crate::buffer::{ImageBuffer, ImageError, Sample};

/// Root-mean-square error over every element of two same-shaped buffers.
pub fn rmse<T: Sample>(estimate: &ImageBuffer<T>, reference: &ImageBuffer<T>) -> Result<f64, ImageError> {
    reference.ensure_same_shape(estimate)?;

    let sum_sq: f64 = estimate
        .as_slice()
        .iter()
        .zip(reference.as_slice())
        .map(|(&e, &r)| {
            let diff = e.to_f64() - r.to_f64();
            diff * diff
        })
        .sum();
    // Buffers are never empty, see `ImageBuffer::new`.
    Ok((sum_sq / estimate.len() as f64).sqrt())
}
