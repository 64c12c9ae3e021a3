//! JSON configuration and report helpers for downsampling runs.

use crate::{DownsampleError, DownsampleParams, DownsampleStats};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Scale applied to both source dimensions when no explicit target is given.
pub const DEFAULT_SCALE: f32 = 0.35;

#[derive(thiserror::Error, Debug)]
pub enum DsampleIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid target size: {0}")]
    InvalidTarget(String),
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

/// Configuration of one image downsampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsampleConfig {
    pub input_path: String,
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Explicit destination width; must be given together with `dst_height`.
    #[serde(default)]
    pub dst_width: Option<usize>,
    #[serde(default)]
    pub dst_height: Option<usize>,
    /// Used when no explicit destination size is set.
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub params: Option<DownsampleParams>,
}

impl DownsampleConfig {
    /// Config with default scale and parameters.
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: None,
            dst_width: None,
            dst_height: None,
            scale: DEFAULT_SCALE,
            params: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DsampleIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DsampleIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the directory for stage images and the report.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dsample_out"))
    }

    /// Destination size for a source of `src_width x src_height`.
    ///
    /// Explicit dimensions win; otherwise each side is `(side * scale)`
    /// truncated.
    pub fn target_dims(
        &self,
        src_width: usize,
        src_height: usize,
    ) -> Result<(usize, usize), DsampleIoError> {
        let dims = match (self.dst_width, self.dst_height) {
            (Some(w), Some(h)) => (w, h),
            (None, None) => {
                if !self.scale.is_finite() || self.scale <= 0.0 {
                    return Err(DsampleIoError::InvalidTarget(format!(
                        "scale must be finite and positive, got {}",
                        self.scale
                    )));
                }
                (
                    (src_width as f32 * self.scale) as usize,
                    (src_height as f32 * self.scale) as usize,
                )
            }
            _ => {
                return Err(DsampleIoError::InvalidTarget(
                    "dst_width and dst_height must be set together".to_string(),
                ))
            }
        };
        if dims.0 == 0 || dims.1 == 0 {
            return Err(DsampleIoError::InvalidTarget(format!(
                "{}x{} from a {}x{} source",
                dims.0, dims.1, src_width, src_height
            )));
        }
        Ok(dims)
    }

    /// Session parameters, falling back to defaults.
    pub fn build_params(&self) -> DownsampleParams {
        self.params.clone().unwrap_or_default()
    }
}

/// Summary of one run, written next to the stage images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsampleReport {
    pub input_path: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub src_width: usize,
    pub src_height: usize,
    pub dst_width: usize,
    pub dst_height: usize,
    pub params: DownsampleParams,
    #[serde(default)]
    pub stats: Option<DownsampleStats>,
    /// Files written by the run.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DownsampleReport {
    pub fn new(
        input_path: impl Into<String>,
        src_dims: (usize, usize),
        dst_dims: (usize, usize),
        params: DownsampleParams,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            config_path: None,
            src_width: src_dims.0,
            src_height: src_dims.1,
            dst_width: dst_dims.0,
            dst_height: dst_dims.1,
            params,
            stats: None,
            outputs: Vec::new(),
            error: None,
        }
    }

    /// Populate report fields from a successful run.
    pub fn set_stats(&mut self, stats: DownsampleStats) {
        self.stats = Some(stats);
        self.error = None;
    }

    pub fn add_output(&mut self, path: impl AsRef<Path>) {
        self.outputs
            .push(path.as_ref().to_string_lossy().into_owned());
    }

    /// Record a pipeline error.
    pub fn set_error(&mut self, err: &DownsampleError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DsampleIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DsampleIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
