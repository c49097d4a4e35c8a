//! Placement configuration

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

/// Trial budget and acceptance thresholds for one region kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Candidates drawn per region
    pub trials: usize,
    /// IoU at which two boxes count as colliding
    pub iou_threshold: f64,
    /// Lowest score that is still committed
    pub worst_score: i64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { trials: 20, iou_threshold: 0.1, worst_score: -10 }
    }
}

impl SamplingConfig {
    fn validate(&self, kind: &str) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::Invalid(format!("{kind}.trials must be positive")));
        }
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!("{kind}.iou_threshold must be in (0, 1]")));
        }
        Ok(())
    }
}

/// # Placement Configuration
///
/// Catalogs and thresholds for a placement session. Distances are in
/// simulator units.
///
/// ```toml
/// floor_catalog = ["/Game/Props/SM_Plant1.SM_Plant1"]
/// table_catalog = ["/Game/Props/SM_Mug.SM_Mug"]
/// seed = 7
///
/// [table]
/// trials = 40
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Catalog ids placed on floors
    pub floor_catalog: Vec<String>,
    /// Catalog ids placed on tables
    pub table_catalog: Vec<String>,
    /// Bottom of the cleared slab, relative to the table top
    pub table_margin_low: f64,
    /// Top of the cleared slab, relative to the table top
    pub table_margin_high: f64,
    /// Share of an object's volume inside the slab at which it is cleared
    pub table_ioa_threshold: f64,
    /// Floor sampling
    pub floor: SamplingConfig,
    /// Table sampling
    pub table: SamplingConfig,
    /// Share of the region extent the sampling window covers
    pub footprint_fraction: f64,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            floor_catalog: Vec::new(),
            table_catalog: Vec::new(),
            table_margin_low: -30.0,
            table_margin_high: 50.0,
            table_ioa_threshold: 0.75,
            floor: SamplingConfig::default(),
            table: SamplingConfig::default(),
            footprint_fraction: 0.9,
            seed: None,
        }
    }
}

impl PlacementConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.floor.validate("floor")?;
        self.table.validate("table")?;
        if self.table_margin_low >= self.table_margin_high {
            return Err(ConfigError::Invalid(
                "table_margin_low must be below table_margin_high".to_string(),
            ));
        }
        if !(self.table_ioa_threshold > 0.0 && self.table_ioa_threshold <= 1.0) {
            return Err(ConfigError::Invalid("table_ioa_threshold must be in (0, 1]".to_string()));
        }
        if !(self.footprint_fraction > 0.0 && self.footprint_fraction <= 1.0) {
            return Err(ConfigError::Invalid("footprint_fraction must be in (0, 1]".to_string()));
        }
        Ok(())
    }

    /// Random source for a run: seeded when `seed` is set, from entropy otherwise
    pub fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}

impl Config for PlacementConfig {}
