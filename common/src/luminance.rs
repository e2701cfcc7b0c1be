use crate::buffer::{ImageBuffer, ImageError, Sample};

/// ITU-R BT.709 luma weights for linear R, G, B.
pub const BT709_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// A 2-D scalar field, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceField<T> {
    pub height: usize,
    pub width: usize,
    pub values: Vec<T>,
}

/// Per-pixel BT.709 luminance. Channels past the third (alpha) are ignored.
pub fn luminance<T: Sample>(image: &ImageBuffer<T>) -> Result<LuminanceField<T>, ImageError> {
    let shape = image.shape();
    if shape.channels < 3 {
        return Err(ImageError::NotRgb {
            channels: shape.channels,
        });
    }

    let [wr, wg, wb] = BT709_WEIGHTS.map(T::from_f64);
    let values = image
        .pixels()
        .map(|px| wr * px[0] + wg * px[1] + wb * px[2])
        .collect();
    Ok(LuminanceField {
        height: shape.height,
        width: shape.width,
        values,
    })
}

/// Population variance (denominator = count). Returns 0 for an empty field.
pub fn variance<T: Sample>(field: &LuminanceField<T>) -> f64 {
    population_variance(&field.values)
}

pub fn population_variance<T: Sample>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|v| v.to_f64()).sum::<f64>() / n;
    values
        .iter()
        .map(|v| {
            let d = v.to_f64() - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Shape;

    fn single_pixel(px: [f32; 3]) -> ImageBuffer<f32> {
        ImageBuffer::new(Shape::new(1, 1, 3), px.to_vec()).unwrap()
    }

    #[test]
    fn primaries_map_to_weights() {
        for (px, expected) in [
            ([1.0, 0.0, 0.0], 0.2126),
            ([0.0, 1.0, 0.0], 0.7152),
            ([0.0, 0.0, 1.0], 0.0722),
        ] {
            let field = luminance(&single_pixel(px)).unwrap();
            assert_eq!(field.values.len(), 1);
            assert!((field.values[0] as f64 - expected).abs() < 1e-6, "{px:?}");
        }
    }

    #[test]
    fn white_is_one() {
        let field = luminance(&single_pixel([1.0, 1.0, 1.0])).unwrap();
        assert!((field.values[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn field_keeps_spatial_shape_and_ignores_alpha() {
        let data = vec![
            1.0, 0.0, 0.0, 0.3, //
            0.0, 1.0, 0.0, 0.3, //
            0.0, 0.0, 1.0, 0.3, //
            0.0, 0.0, 0.0, 0.3,
        ];
        let img = ImageBuffer::<f64>::new(Shape::new(2, 2, 4), data).unwrap();
        let field = luminance(&img).unwrap();
        assert_eq!((field.height, field.width), (2, 2));
        assert_eq!(field.values, vec![0.2126, 0.7152, 0.0722, 0.0]);
    }

    #[test]
    fn grayscale_is_rejected() {
        let img = ImageBuffer::<f32>::zeros(Shape::new(2, 2, 1)).unwrap();
        assert!(matches!(luminance(&img), Err(ImageError::NotRgb { channels: 1 })));
    }

    #[test]
    fn constant_field_has_zero_variance() {
        let field = LuminanceField {
            height: 2,
            width: 2,
            values: vec![0.42f32; 4],
        };
        assert_eq!(variance(&field), 0.0);

        let single = luminance(&single_pixel([0.3, 0.6, 0.9])).unwrap();
        assert_eq!(variance(&single), 0.0);
    }

    #[test]
    fn population_variance_of_one_to_four() {
        let field = LuminanceField {
            height: 2,
            width: 2,
            values: vec![1.0f64, 2.0, 3.0, 4.0],
        };
        assert_eq!(variance(&field), 1.25);
    }
}
