use std::path::PathBuf;

use tracing::info;

use super::{ErrorReport, ReportError, ReportSink};

/// Comma-separated RMSE table, one line per frame.
///
/// Values use Rust's shortest round-trip float formatting (`0.25`, `1.0`);
/// non-finite values come out as `inf` and `NaN`.
///
/// ```text
/// Frame Number,Uniform RMSE,RIS RMSE,ReSTIR RMSE
/// 0,0.0713,0.0522,0.0317
/// ```
pub struct TextReport {
    path: PathBuf,
}

impl TextReport {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Render the table. Numbers are printed with `{:?}`, so `1.0` keeps its
/// decimal point and non-finite values appear as `inf` and `NaN`.
pub fn render(report: &ErrorReport) -> String {
    let mut out = String::from("Frame Number");
    for series in &report.series {
        out.push_str(&format!(",{} RMSE", series.technique));
    }
    out.push('\n');

    for frame in 0..report.frame_count() {
        out.push_str(&frame.to_string());
        for series in &report.series {
            out.push(',');
            if let Some(v) = series.rmse.get(frame) {
                out.push_str(&format!("{v:?}"));
            }
        }
        out.push('\n');
    }
    out
}

impl ReportSink for TextReport {
    fn write(&mut self, report: &ErrorReport) -> Result<(), ReportError> {
        std::fs::write(&self.path, render(report))
            .map_err(|e| ReportError::Write(self.path.clone(), e))?;
        info!(path = %self.path.display(), rows = report.frame_count(), "RMSE table written");
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ErrorSeries;

    fn report() -> ErrorReport {
        let series = |name: &str, rmse: Vec<f64>| ErrorSeries {
            technique: name.into(),
            rmse,
        };
        ErrorReport {
            series: vec![
                series("Uniform", vec![1.0, 0.25]),
                series("RIS", vec![0.5, 0.125]),
                series("ReSTIR", vec![0.1, 0.0]),
            ],
        }
    }

    #[test]
    fn renders_fixed_header_and_rows() {
        assert_eq!(
            render(&report()),
            "Frame Number,Uniform RMSE,RIS RMSE,ReSTIR RMSE\n\
             0,1.0,0.5,0.1\n\
             1,0.25,0.125,0.0\n"
        );
    }

    #[test]
    fn empty_run_is_header_only() {
        let mut r = report();
        r.series.iter_mut().for_each(|s| s.rmse.clear());
        assert_eq!(render(&r), "Frame Number,Uniform RMSE,RIS RMSE,ReSTIR RMSE\n");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmse_values.txt");
        TextReport::new(path.clone()).write(&report()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.starts_with("Frame Number,"));
    }

    #[test]
    fn unwritable_path_is_error() {
        let mut sink = TextReport::new(PathBuf::from("/nonexistent/dir/rmse.txt"));
        assert!(matches!(sink.write(&report()), Err(ReportError::Write(..))));
    }
}
