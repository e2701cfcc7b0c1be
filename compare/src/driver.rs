use std::path::PathBuf;

use sample_eval_common::accumulate::Accumulator;
use sample_eval_common::buffer::{ImageError, Sample};
use sample_eval_common::config::CompareConfig;
use sample_eval_common::loader::LoadError;
use sample_eval_common::metrics::rmse;
use sample_eval_common::pfm::{self, PfmError};
use tracing::{debug, info};

use crate::report::{ErrorReport, ErrorSeries, ReportError};
use crate::source::FrameSource;

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("technique {technique}, frame {index}: {source}")]
    Frame {
        technique: String,
        index: u32,
        source: ImageError,
    },
    #[error("failed to save accumulated image {0}: {1}")]
    SaveAccumulated(PathBuf, PfmError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One technique's running mean and its RMSE history.
pub struct TechniqueRun<T> {
    pub name: String,
    pub accumulator: Accumulator<T>,
    pub rmse: Vec<f64>,
}

pub struct Comparison<T> {
    pub runs: Vec<TechniqueRun<T>>,
}

/// Accumulate every technique's frames in index order and track the RMSE of
/// each running mean against the reference.
///
/// Any load failure or shape mismatch aborts the whole run.
pub fn run<T: Sample, S: FrameSource<T>>(
    config: &CompareConfig,
    source: &mut S,
) -> Result<Comparison<T>, CompareError> {
    let reference = source.reference()?;
    info!(
        path = %config.reference_path().display(),
        shape = %reference.shape(),
        "reference loaded"
    );

    let mut runs = Vec::with_capacity(config.techniques.len());
    for technique in &config.techniques {
        runs.push(TechniqueRun {
            name: technique.name.clone(),
            accumulator: Accumulator::new(reference.shape())?,
            rmse: Vec::with_capacity(config.frame_count as usize),
        });
    }

    for index in 0..config.frame_count {
        info!(frame = index + 1, total = config.frame_count, "processing frame");

        for (technique, run) in config.techniques.iter().zip(runs.iter_mut()) {
            let frame = source.frame(technique, index)?;
            let frame_err = |source| CompareError::Frame {
                technique: technique.name.clone(),
                index,
                source,
            };

            let mean = run.accumulator.push(&frame).map_err(frame_err)?;
            let error = rmse(mean, &reference).map_err(frame_err)?;
            debug!(technique = technique.name, frame = index, rmse = error, "rmse");
            run.rmse.push(error);
        }
    }

    for run in &runs {
        if let Some(last) = run.rmse.last() {
            info!(technique = run.name, final_rmse = last, "technique done");
        }
    }
    Ok(Comparison { runs })
}

impl<T: Sample> Comparison<T> {
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            series: self
                .runs
                .iter()
                .map(|run| ErrorSeries {
                    technique: run.name.clone(),
                    rmse: run.rmse.clone(),
                })
                .collect(),
        }
    }

    /// Write each technique's final running mean as a PFM next to its frames.
    pub fn save_accumulated(&self, config: &CompareConfig) -> Result<(), CompareError> {
        for (technique, run) in config.techniques.iter().zip(&self.runs) {
            let path = config.accumulated_path(technique);
            pfm::write_pfm(&path, run.accumulator.mean())
                .map_err(|e| CompareError::SaveAccumulated(path.clone(), e))?;
            info!(technique = run.name, path = %path.display(), "accumulated image saved");
        }
        Ok(())
    }
}
