pub mod json;
pub mod svg;
pub mod text;
pub mod traits;

use std::path::PathBuf;

use sample_eval_common::config::{OutputConfig, Precision};
use serde::Serialize;

pub use traits::ReportSink;

/// RMSE history of one technique, one value per processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorSeries {
    pub technique: String,
    pub rmse: Vec<f64>,
}

/// Everything a sink gets to see once a comparison run has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub series: Vec<ErrorSeries>,
}

impl ErrorReport {
    pub fn frame_count(&self) -> usize {
        self.series.iter().map(|s| s.rmse.len()).max().unwrap_or(0)
    }

    /// Largest finite RMSE, 0 if there is none.
    pub fn max_rmse(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.rmse.iter().copied())
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build the sinks enabled in `[output]`. The text report is always written.
pub fn sinks_from_config(output: &OutputConfig, precision: Precision) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> =
        vec![Box::new(text::TextReport::new(output.report_path.clone()))];
    if output.plot {
        sinks.push(Box::new(svg::SvgPlot::new(
            output.plot_path.clone(),
            output.plot_title.clone(),
        )));
    }
    if let Some(path) = &output.summary_path {
        sinks.push(Box::new(json::JsonSummary::new(path.clone(), precision)));
    }
    sinks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_and_max() {
        let report = ErrorReport {
            series: vec![
                ErrorSeries {
                    technique: "A".into(),
                    rmse: vec![0.3, 0.2],
                },
                ErrorSeries {
                    technique: "B".into(),
                    rmse: vec![0.5, 0.1],
                },
            ],
        };
        assert_eq!(report.frame_count(), 2);
        assert_eq!(report.max_rmse(), 0.5);
    }

    #[test]
    fn max_rmse_skips_non_finite() {
        let report = ErrorReport {
            series: vec![ErrorSeries {
                technique: "Uniform".into(),
                rmse: vec![0.5, f64::INFINITY, f64::NAN],
            }],
        };
        assert_eq!(report.max_rmse(), 0.5);
    }

    #[test]
    fn sinks_follow_output_config() {
        let mut output = OutputConfig::default();
        let names = |o: &OutputConfig| {
            sinks_from_config(o, Precision::Single)
                .iter()
                .map(|s| s.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&output), ["text", "svg"]);

        output.plot = false;
        output.summary_path = Some(PathBuf::from("summary.json"));
        assert_eq!(names(&output), ["text", "json"]);
    }
}
