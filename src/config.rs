use crate::error::{NovelsubError, NovelsubResult};
use crate::subtitle::{GenerateOptions, SyncOptions, MAX_TIMING_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "novelsub.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub subtitles: GenerateOptions,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Maximum scripts processed concurrently by `batch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_jobs: Option<usize>,
}

fn default_output_dir() -> String {
    "./data/subtitles".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            parallel_jobs: None,
        }
    }
}

impl ProjectConfig {
    /// Check option ranges before any subtitles are generated.
    pub fn validate(&self) -> NovelsubResult<()> {
        let s = &self.subtitles;
        check_range("subtitles.max_chars_per_line", s.max_chars_per_line as f64, 20.0, 80.0)?;
        check_range("subtitles.max_lines", s.max_lines as f64, 1.0, 4.0)?;
        check_range("subtitles.min_duration_ms", s.min_duration_ms as f64, 500.0, 3000.0)?;
        check_range("subtitles.max_duration_ms", s.max_duration_ms as f64, 3000.0, 15000.0)?;
        check_range("subtitles.reading_speed", s.reading_speed.0, 2.0, 10.0)?;
        if s.min_duration_ms > s.max_duration_ms {
            return Err(NovelsubError::ConfigInvalid(format!(
                "subtitles.min_duration_ms ({}) exceeds max_duration_ms ({})",
                s.min_duration_ms, s.max_duration_ms
            )));
        }

        let y = &self.sync;
        if !(y.min_duration.is_finite() && y.min_duration >= 0.0) {
            return Err(NovelsubError::ConfigInvalid(
                "sync.min_duration must be a non-negative number of seconds".into(),
            ));
        }
        if !(y.max_duration.is_finite() && y.max_duration >= y.min_duration) {
            return Err(NovelsubError::ConfigInvalid(format!(
                "sync.max_duration ({}) must be at least min_duration ({})",
                y.max_duration, y.min_duration
            )));
        }
        if !(y.reading_speed.0.is_finite() && y.reading_speed.0 > 0.0) {
            return Err(NovelsubError::ConfigInvalid(
                "sync.reading_speed must be a positive number of characters per minute".into(),
            ));
        }
        if !y.start_time_offset.is_finite() || y.start_time_offset.abs() > MAX_TIMING_SECS {
            return Err(NovelsubError::InvalidOffset(y.start_time_offset));
        }
        if y.max_chars_per_line == 0 || y.max_lines == 0 {
            return Err(NovelsubError::ConfigInvalid(
                "sync.max_chars_per_line and sync.max_lines must be at least 1".into(),
            ));
        }

        if self.output.parallel_jobs == Some(0) {
            return Err(NovelsubError::ConfigInvalid(
                "output.parallel_jobs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Output directory resolved against the project directory.
    pub fn output_dir(&self, project_path: &Path) -> PathBuf {
        let rel = self
            .output
            .directory
            .strip_prefix("./")
            .unwrap_or(&self.output.directory);
        project_path.join(rel)
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> NovelsubResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(NovelsubError::ConfigInvalid(format!(
            "{name} = {value} is outside {min}-{max}"
        )))
    }
}

/// Save a `ProjectConfig` to `project_path/novelsub.toml`.
pub fn save_config(project_path: &Path, config: &ProjectConfig) -> NovelsubResult<()> {
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| NovelsubError::ConfigParse(e.to_string()))?;
    std::fs::write(project_path.join(CONFIG_FILE), toml_str)?;
    Ok(())
}

pub fn load_config(project_path: &Path) -> NovelsubResult<ProjectConfig> {
    let config_path = project_path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Err(NovelsubError::ConfigNotFound(config_path));
    }
    let content = std::fs::read_to_string(&config_path)?;
    toml::from_str(&content).map_err(|e| NovelsubError::ConfigParse(e.to_string()))
}

/// Load the project config if one exists, otherwise fall back to defaults.
pub fn load_or_default(project_path: &Path) -> NovelsubResult<ProjectConfig> {
    if project_path.join(CONFIG_FILE).exists() {
        load_config(project_path)
    } else {
        Ok(ProjectConfig::default())
    }
}
