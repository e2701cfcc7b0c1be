use sample_eval_common::buffer::ImageError;
use sample_eval_common::config::Config;
use sample_eval_common::loader::{load_image, LoadError};
use sample_eval_common::luminance::{luminance, variance};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum VarianceError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0}: {1}")]
    Luminance(PathBuf, ImageError),
}

fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let image_override = args.next().map(PathBuf::from);

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    let image_path = image_override.unwrap_or_else(|| config.variance.image.clone());
    info!(
        image = %image_path.display(),
        normalize_divisor = config.variance.normalize_divisor,
        "computing luminance variance"
    );

    match luminance_variance(&image_path, config.variance.normalize_divisor) {
        Ok(v) => println!("Variance: {v}"),
        Err(e) => {
            error!(error = %e, "variance computation failed");
            std::process::exit(1);
        }
    }
}

fn luminance_variance(path: &Path, divisor: f64) -> Result<f64, VarianceError> {
    let image = load_image::<f32>(path, divisor)?;
    let field = luminance(&image).map_err(|e| VarianceError::Luminance(path.to_path_buf(), e))?;
    Ok(variance(&field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_eval_common::buffer::{ImageBuffer, Shape};
    use sample_eval_common::pfm::write_pfm;

    #[test]
    fn variance_of_two_tone_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accumulate_Uniform_frame0005.pfm");
        // Two white pixels and two black ones: luminance 1, 1, 0, 0.
        let data = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        write_pfm(&path, &ImageBuffer::<f32>::new(Shape::new(2, 2, 3), data).unwrap()).unwrap();

        let v = luminance_variance(&path, 1.0).unwrap();
        assert!((v - 0.25).abs() < 1e-6, "{v}");
    }

    #[test]
    fn grayscale_pfm_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.pfm");
        write_pfm(&path, &ImageBuffer::<f32>::zeros(Shape::new(2, 2, 1)).unwrap()).unwrap();

        let err = luminance_variance(&path, 1.0).unwrap_err();
        assert!(matches!(err, VarianceError::Luminance(_, ImageError::NotRgb { channels: 1 })));
    }

    #[test]
    fn missing_image_is_load_error() {
        let err = luminance_variance(Path::new("/nonexistent/image.pfm"), 1.0).unwrap_err();
        assert!(matches!(err, VarianceError::Load(_)));
    }
}
