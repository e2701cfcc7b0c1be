use super::{ErrorReport, ReportError};

/// Consumer of a finished comparison run.
///
/// Sinks only see the computed series, never the accumulators, so each can
/// be tested without running a comparison.
pub trait ReportSink {
    fn write(&mut self, report: &ErrorReport) -> Result<(), ReportError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}
