//! Analysis pass configuration.
//!
//! Configs are plain serde structs loadable from JSON documents, so hosts
//! can ship per-parameter presets (pressure isobars every 4 hPa, extrema
//! suppression over 1000 km, ...) next to their style files.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for isoline extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolineConfig {
    /// Threshold spacing between contour levels, in data units.
    pub interval: f32,
    /// Polylines whose integer pixel bbox spans fewer than this many
    /// pixels on both axes are dropped as noise.
    #[serde(default = "default_min_feature_px")]
    pub min_feature_px: i64,
    /// Optional major level spacing for the caller's major/minor split.
    #[serde(default)]
    pub major_interval: Option<f32>,
}

fn default_min_feature_px() -> i64 {
    4
}

impl IsolineConfig {
    /// Create a config with the default noise filter.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            min_feature_px: default_min_feature_px(),
            major_interval: None,
        }
    }

    /// Load from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::ConfigIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(AnalysisError::invalid_config(format!(
                "isoline interval {} must be a positive finite number",
                self.interval
            )));
        }
        if self.min_feature_px < 0 {
            return Err(AnalysisError::invalid_config(format!(
                "min_feature_px {} must be non-negative",
                self.min_feature_px
            )));
        }
        if let Some(major) = self.major_interval {
            if !major.is_finite() || major <= 0.0 {
                return Err(AnalysisError::invalid_config(format!(
                    "major_interval {major} must be a positive finite number"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for extrema detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremaConfig {
    /// Geodesic suppression radius in kilometers: of two same-kind extrema
    /// closer than this, only the stronger survives.
    pub radius_km: f64,
}

impl ExtremaConfig {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    /// Load from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::ConfigIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(AnalysisError::invalid_config(format!(
                "suppression radius {} km must be a non-negative finite number",
                self.radius_km
            )));
        }
        Ok(())
    }
}
