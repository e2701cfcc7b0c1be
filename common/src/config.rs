use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub variance: VarianceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Numeric precision of image buffers and accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Single => "single",
            Precision::Double => "double",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_source_folder")]
    pub source_folder: PathBuf,
    /// Reference image, relative to `source_folder`.
    #[serde(default = "default_reference")]
    pub reference: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    /// Zero-padding width of the frame index in file names.
    #[serde(default = "default_index_width")]
    pub index_width: usize,
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Every loaded sample is divided by this value.
    #[serde(default = "default_compare_divisor")]
    pub normalize_divisor: f64,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "default_techniques")]
    pub techniques: Vec<TechniqueConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TechniqueConfig {
    pub name: String,
    /// Folder holding this technique's frames, relative to `source_folder`.
    pub folder: String,
    /// File name prefix preceding the zero-padded frame index.
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    #[serde(default = "default_true")]
    pub plot: bool,
    #[serde(default = "default_plot_path")]
    pub plot_path: PathBuf,
    #[serde(default = "default_plot_title")]
    pub plot_title: String,
    #[serde(default)]
    pub summary_path: Option<PathBuf>,
    /// Write each technique's final running mean next to its frames.
    #[serde(default)]
    pub save_accumulated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VarianceConfig {
    #[serde(default = "default_variance_image")]
    pub image: PathBuf,
    #[serde(default = "default_variance_divisor")]
    pub normalize_divisor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            source_folder: default_source_folder(),
            reference: default_reference(),
            frame_count: default_frame_count(),
            index_width: default_index_width(),
            extension: default_extension(),
            normalize_divisor: default_compare_divisor(),
            precision: Precision::default(),
            techniques: default_techniques(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            plot: true,
            plot_path: default_plot_path(),
            plot_title: default_plot_title(),
            summary_path: None,
            save_accumulated: false,
        }
    }
}

impl Default for VarianceConfig {
    fn default() -> Self {
        Self {
            image: default_variance_image(),
            normalize_divisor: default_variance_divisor(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let compare = &self.compare;
        if compare.techniques.is_empty() {
            return Err(ConfigError::Invalid("no techniques configured".into()));
        }
        let mut seen = HashSet::new();
        for technique in &compare.techniques {
            if !seen.insert(technique.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate technique name {:?}",
                    technique.name
                )));
            }
        }
        if compare.index_width == 0 {
            return Err(ConfigError::Invalid("index_width must be at least 1".into()));
        }
        check_divisor("compare.normalize_divisor", compare.normalize_divisor)?;
        check_divisor("variance.normalize_divisor", self.variance.normalize_divisor)?;
        Ok(())
    }
}

fn check_divisor(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value == 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{field} must be finite and non-zero, got {value}"
        )));
    }
    Ok(())
}

impl CompareConfig {
    pub fn reference_path(&self) -> PathBuf {
        self.source_folder.join(&self.reference)
    }

    pub fn technique_dir(&self, technique: &TechniqueConfig) -> PathBuf {
        self.source_folder.join(&technique.folder)
    }

    /// e.g. `../images/cornell_box/uniform_500/Uniform_frame0007.pfm`
    pub fn frame_path(&self, technique: &TechniqueConfig, index: u32) -> PathBuf {
        self.technique_dir(technique).join(format!(
            "{prefix}{index:0width$}.{ext}",
            prefix = technique.prefix,
            width = self.index_width,
            ext = self.extension,
        ))
    }

    /// Destination of a technique's final running mean.
    pub fn accumulated_path(&self, technique: &TechniqueConfig) -> PathBuf {
        self.technique_dir(technique).join(format!(
            "manual_accumulate_{prefix}{count:0width$}.pfm",
            prefix = technique.prefix,
            count = self.frame_count,
            width = self.index_width,
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_source_folder() -> PathBuf {
    PathBuf::from("../images/cornell_box")
}
fn default_reference() -> String {
    "reference.pfm".into()
}
fn default_frame_count() -> u32 {
    20
}
fn default_index_width() -> usize {
    4
}
fn default_extension() -> String {
    "pfm".into()
}
fn default_compare_divisor() -> f64 {
    255.0
}
fn default_techniques() -> Vec<TechniqueConfig> {
    [
        ("Uniform", "uniform_500", "Uniform_frame"),
        ("RIS", "ris_500", "RIS_frame"),
        ("ReSTIR", "restir_500", "ReSTIR_frame"),
    ]
    .into_iter()
    .map(|(name, folder, prefix)| TechniqueConfig {
        name: name.into(),
        folder: folder.into(),
        prefix: prefix.into(),
    })
    .collect()
}
fn default_report_path() -> PathBuf {
    PathBuf::from("rmse_values.txt")
}
fn default_true() -> bool {
    true
}
fn default_plot_path() -> PathBuf {
    PathBuf::from("rmse_comparison.svg")
}
fn default_plot_title() -> String {
    "RMSE per frame".into()
}
fn default_variance_image() -> PathBuf {
    PathBuf::from("accumulate_Uniform_frame0005.pfm")
}
fn default_variance_divisor() -> f64 {
    1.0
}
fn default_log_level() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.compare.frame_count, 20);
        assert_eq!(config.compare.precision, Precision::Single);
        assert_eq!(config.compare.normalize_divisor, 255.0);
        assert_eq!(config.variance.normalize_divisor, 1.0);
        assert_eq!(config.logging.level, "info");
        assert!(config.output.plot);
        assert!(config.output.summary_path.is_none());
        let names: Vec<_> = config.compare.techniques.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Uniform", "RIS", "ReSTIR"]);
    }

    #[test]
    fn frame_path_is_zero_padded() {
        let config = CompareConfig::default();
        let path = config.frame_path(&config.techniques[1], 7);
        assert_eq!(
            path,
            PathBuf::from("../images/cornell_box/ris_500/RIS_frame0007.pfm")
        );
    }

    #[test]
    fn accumulated_path_uses_frame_count() {
        let config = CompareConfig::default();
        let path = config.accumulated_path(&config.techniques[2]);
        assert_eq!(
            path,
            PathBuf::from("../images/cornell_box/restir_500/manual_accumulate_ReSTIR_frame0020.pfm")
        );
    }

    #[test]
    fn parses_custom_sections() {
        let config = Config::parse(
            r#"
            [compare]
            source_folder = "renders"
            frame_count = 5
            precision = "double"
            extension = "exr"

            [[compare.techniques]]
            name = "Uniform"
            folder = "u"
            prefix = "U_"

            [output]
            plot = false
            plot_path = "plot.svg"
            save_accumulated = true

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.compare.precision, Precision::Double);
        assert_eq!(config.compare.techniques.len(), 1);
        assert_eq!(
            config.compare.frame_path(&config.compare.techniques[0], 3),
            PathBuf::from("renders/u/U_0003.exr")
        );
        assert!(!config.output.plot);
        assert_eq!(config.output.plot_path, PathBuf::from("plot.svg"));
        assert!(config.output.save_accumulated);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn rejects_duplicate_techniques() {
        let result = Config::parse(
            r#"
            [[compare.techniques]]
            name = "RIS"
            folder = "a"
            prefix = "a"

            [[compare.techniques]]
            name = "RIS"
            folder = "b"
            prefix = "b"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_divisor() {
        let result = Config::parse("[variance]\nnormalize_divisor = 0.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unknown_precision() {
        let result = Config::parse("[compare]\nprecision = \"half\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = Config::load(Path::new("/nonexistent/sample-eval.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile(..))));
    }
}
