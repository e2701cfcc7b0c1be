use sample_eval_common::buffer::{ImageBuffer, Sample};
use sample_eval_common::config::{CompareConfig, TechniqueConfig};
use sample_eval_common::loader::{load_image, LoadError};

/// Where the driver gets its images from.
pub trait FrameSource<T: Sample> {
    fn reference(&mut self) -> Result<ImageBuffer<T>, LoadError>;

    fn frame(&mut self, technique: &TechniqueConfig, index: u32) -> Result<ImageBuffer<T>, LoadError>;
}

/// Reads frames from the folder layout described by [`CompareConfig`].
pub struct DiskFrameSource<'a> {
    config: &'a CompareConfig,
}

impl<'a> DiskFrameSource<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self { config }
    }
}

impl<T: Sample> FrameSource<T> for DiskFrameSource<'_> {
    fn reference(&mut self) -> Result<ImageBuffer<T>, LoadError> {
        load_image(&self.config.reference_path(), self.config.normalize_divisor)
    }

    fn frame(&mut self, technique: &TechniqueConfig, index: u32) -> Result<ImageBuffer<T>, LoadError> {
        load_image(
            &self.config.frame_path(technique, index),
            self.config.normalize_divisor,
        )
    }
}
