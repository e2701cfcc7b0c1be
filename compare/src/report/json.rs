use std::path::PathBuf;

use sample_eval_common::config::Precision;
use serde::Serialize;
use tracing::info;

use super::{ErrorReport, ErrorSeries, ReportError, ReportSink};

/// Machine-readable dump of a comparison run.
pub struct JsonSummary {
    path: PathBuf,
    precision: Precision,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    generated_at: String,
    frame_count: usize,
    precision: &'static str,
    techniques: Vec<TechniqueSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct TechniqueSummary<'a> {
    #[serde(flatten)]
    series: &'a ErrorSeries,
    final_rmse: Option<f64>,
}

impl JsonSummary {
    pub fn new(path: PathBuf, precision: Precision) -> Self {
        Self { path, precision }
    }

    fn render(&self, report: &ErrorReport) -> Result<String, ReportError> {
        let summary = Summary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            frame_count: report.frame_count(),
            precision: self.precision.as_str(),
            techniques: report
                .series
                .iter()
                .map(|series| TechniqueSummary {
                    series,
                    final_rmse: series.rmse.last().copied(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

impl ReportSink for JsonSummary {
    fn write(&mut self, report: &ErrorReport) -> Result<(), ReportError> {
        let json = self.render(report)?;
        std::fs::write(&self.path, json).map_err(|e| ReportError::Write(self.path.clone(), e))?;
        info!(path = %self.path.display(), "JSON summary written");
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
