use std::path::{Path, PathBuf};

use image::ColorType;
use tracing::debug;

use crate::buffer::{ImageBuffer, ImageError, Sample, Shape};
use crate::pfm::{self, PfmError};

/// Load an image from disk and divide every raw sample by `divisor`.
///
/// `.pfm` files go through the built-in reader and keep their channel count
/// (1 or 3). Everything else is decoded by the `image` crate into RGB: float
/// formats yield their stored values, 16-bit formats 0..65535 and all other
/// formats 0..255, so a divisor of 255 maps 8-bit images onto [0, 1].
pub fn load_image<T: Sample>(path: &Path, divisor: f64) -> Result<ImageBuffer<T>, LoadError> {
    let raw = if is_pfm(path) {
        pfm::read_pfm(path).map_err(|e| LoadError::Pfm(path.to_path_buf(), e))?
    } else {
        decode_with_image_crate(path)?
    };

    debug!(
        path = %path.display(),
        shape = %raw.shape(),
        "image loaded"
    );
    Ok(raw.map(|v| T::from_f64(f64::from(v) / divisor)))
}

fn is_pfm(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pfm"))
}

fn decode_with_image_crate(path: &Path) -> Result<ImageBuffer<f32>, LoadError> {
    let img = image::open(path).map_err(|e| LoadError::Decode(path.to_path_buf(), e))?;

    let (width, height, data) = match img.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            let rgb = img.to_rgb32f();
            (rgb.width(), rgb.height(), rgb.into_raw())
        }
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            let rgb = img.to_rgb16();
            let data = rgb.as_raw().iter().map(|&v| f32::from(v)).collect();
            (rgb.width(), rgb.height(), data)
        }
        _ => {
            let rgb = img.to_rgb8();
            let data = rgb.as_raw().iter().map(|&v| f32::from(v)).collect();
            (rgb.width(), rgb.height(), data)
        }
    };

    let shape = Shape::new(height as usize, width as usize, 3);
    ImageBuffer::new(shape, data).map_err(|e| LoadError::Shape(path.to_path_buf(), e))
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {0}: {1}")]
    Pfm(PathBuf, PfmError),
    #[error("failed to decode {0}: {1}")]
    Decode(PathBuf, image::ImageError),
    #[error("unusable image {0}: {1}")]
    Shape(PathBuf, ImageError),
}
