mod driver;
mod report;
mod source;

use driver::CompareError;
use sample_eval_common::buffer::Sample;
use sample_eval_common::config::{Config, Precision};
use source::DiskFrameSource;
use std::path::PathBuf;
use tracing::{error, info};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

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

    info!(
        source_folder = %config.compare.source_folder.display(),
        reference = config.compare.reference,
        frame_count = config.compare.frame_count,
        techniques = config.compare.techniques.len(),
        precision = config.compare.precision.as_str(),
        "starting sampling comparison"
    );

    let result = match config.compare.precision {
        Precision::Single => run::<f32>(&config),
        Precision::Double => run::<f64>(&config),
    };

    if let Err(e) = result {
        error!(error = %e, "comparison aborted");
        std::process::exit(1);
    }
}

fn run<T: Sample>(config: &Config) -> Result<(), CompareError> {
    let mut source = DiskFrameSource::new(&config.compare);
    let comparison = driver::run::<T, _>(&config.compare, &mut source)?;

    if config.output.save_accumulated {
        comparison.save_accumulated(&config.compare)?;
    }

    let report = comparison.report();
    for mut sink in report::sinks_from_config(&config.output, config.compare.precision) {
        sink.write(&report)?;
    }
    info!("comparison finished");
    Ok(())
}
