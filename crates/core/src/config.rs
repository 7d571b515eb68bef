//! Calibration constants for the crown fire pipeline.
//!
//! Loaded from `crown_fire_config.json` with support for an environment
//! variable override. Every constant the formulas use lives here so another
//! regional calibration can be swapped in without touching the stages.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core_types::units::{Degrees, Percent};
use crate::error::{CrownFireError, Result};

pub const BUILTIN_CROWN_FIRE_CONFIG: &str = include_str!("data/crown_fire_config.json");

/// Environment variable naming a JSON file that replaces the builtin config.
pub const CONFIG_PATH_ENV: &str = "CROWN_FIRE_CONFIG_PATH";

/// Broadleaf mean foliar moisture (Kozlowski & Clausen 1965), used for any
/// species code missing from the table.
pub const DEFAULT_DECIDUOUS_FMC: f64 = 199.7;

/// Scale constant `k` in `CSI = k · CBH^1.5 · (460 + 25.9·FMC)^1.5`.
pub const DEFAULT_CSI_SCALE: f64 = 0.001;

/// Divisor in `ROS = CSI / (divisor · SFC)`.
pub const DEFAULT_ROS_DIVISOR: f64 = 300.0;

/// Exponent coefficient in `CFB = 1 − exp(−coefficient · Δ)`.
pub const DEFAULT_CFB_COEFFICIENT: f64 = 0.23;

/// CFB at or above which a crowning cell is classified active.
pub const DEFAULT_ACTIVE_CFB_THRESHOLD: f64 = 0.9;

/// Foliar moisture constant for one canopy species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesFoliarMoisture {
    /// Code as it appears in the species raster
    pub code: i64,
    pub name: String,
    pub fmc: Percent,
}

impl SpeciesFoliarMoisture {
    fn new(code: i64, name: &str, fmc: f64) -> Self {
        Self {
            code,
            name: name.to_string(),
            fmc: Percent::new(fmc),
        }
    }
}

fn default_species() -> Vec<SpeciesFoliarMoisture> {
    vec![
        SpeciesFoliarMoisture::new(0, "Pinus densiflora (Gangwon)", 105.8),
        SpeciesFoliarMoisture::new(1, "Pinus densiflora (central)", 110.3),
        SpeciesFoliarMoisture::new(2, "Pinus koraiensis", 114.8),
        SpeciesFoliarMoisture::new(3, "Pinus rigida", 107.8),
        SpeciesFoliarMoisture::new(4, "Pinus thunbergii", 112.6),
    ]
}

/// Strategy used to derive the FMC grid.
///
/// The two models are alternatives; a run uses exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FoliarMoistureModel {
    /// Per-cell lookup of the species table with deciduous fallback
    #[default]
    SpeciesLookup,
    /// Forestry Canada (1992) seasonal curve for a single site and date,
    /// applied uniformly to every cell
    Seasonal {
        latitude: Degrees,
        longitude: Degrees,
        /// Meters above sea level, negative below it
        #[serde(default)]
        elevation: Option<f64>,
        day_of_year: u16,
    },
}

/// Root configuration for the crown fire pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrownFireConfig {
    pub species: Vec<SpeciesFoliarMoisture>,
    pub deciduous_fmc: Percent,
    pub foliar_moisture_model: FoliarMoistureModel,
    pub csi_scale: f64,
    pub ros_divisor: f64,
    pub cfb_coefficient: f64,
    pub active_cfb_threshold: f64,
    /// Force CFB to zero wherever the crowning mask is 0. Off by default, so
    /// CFB is evaluated for every cell.
    pub zero_cfb_without_crowning: bool,
}

impl Default for CrownFireConfig {
    fn default() -> Self {
        Self {
            species: default_species(),
            deciduous_fmc: Percent::new(DEFAULT_DECIDUOUS_FMC),
            foliar_moisture_model: FoliarMoistureModel::default(),
            csi_scale: DEFAULT_CSI_SCALE,
            ros_divisor: DEFAULT_ROS_DIVISOR,
            cfb_coefficient: DEFAULT_CFB_COEFFICIENT,
            active_cfb_threshold: DEFAULT_ACTIVE_CFB_THRESHOLD,
            zero_cfb_without_crowning: false,
        }
    }
}

impl CrownFireConfig {
    /// Parse the config embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CROWN_FIRE_CONFIG)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| CrownFireError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load the file named by [`CONFIG_PATH_ENV`], falling back to the builtin
    /// config when the variable is unset or the file cannot be used.
    pub fn load_from_env() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "crown_fire_config.loaded=file");
                    return Ok(config);
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "crown_fire_config.load_failed"
                    );
                }
            }
        }

        let config = Self::builtin()?;
        tracing::info!("crown_fire_config.loaded=builtin");
        Ok(config)
    }

    /// Enable or disable zeroing CFB outside the crowning mask.
    pub fn with_zero_cfb_without_crowning(mut self, enabled: bool) -> Self {
        self.zero_cfb_without_crowning = enabled;
        self
    }

    /// Replace the foliar moisture strategy.
    pub fn with_foliar_moisture_model(mut self, model: FoliarMoistureModel) -> Self {
        self.foliar_moisture_model = model;
        self
    }

    /// Check the invariants the formulas rely on.
    ///
    /// # Errors
    ///
    /// Returns [`CrownFireError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for entry in &self.species {
            if !(*entry.fmc > 0.0 && entry.fmc.is_finite()) {
                return Err(invalid(format!(
                    "species {} ({}) has non-positive FMC {}",
                    entry.code, entry.name, *entry.fmc
                )));
            }
            if !seen.insert(entry.code) {
                return Err(invalid(format!("species code {} listed twice", entry.code)));
            }
        }
        if !(*self.deciduous_fmc > 0.0 && self.deciduous_fmc.is_finite()) {
            return Err(invalid(format!(
                "deciduous_fmc must be positive, got {}",
                *self.deciduous_fmc
            )));
        }
        for (name, value) in [
            ("csi_scale", self.csi_scale),
            ("ros_divisor", self.ros_divisor),
            ("cfb_coefficient", self.cfb_coefficient),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.active_cfb_threshold > 0.0 && self.active_cfb_threshold <= 1.0) {
            return Err(invalid(format!(
                "active_cfb_threshold must be in (0, 1], got {}",
                self.active_cfb_threshold
            )));
        }
        if let FoliarMoistureModel::Seasonal {
            latitude,
            longitude,
            elevation,
            day_of_year,
        } = self.foliar_moisture_model
        {
            if !(-90.0..=90.0).contains(&*latitude) {
                return Err(invalid(format!("latitude out of range: {}", *latitude)));
            }
            if !(-180.0..=180.0).contains(&*longitude) {
                return Err(invalid(format!("longitude out of range: {}", *longitude)));
            }
            if let Some(elevation) = elevation.filter(|e| !e.is_finite()) {
                return Err(invalid(format!("elevation must be finite, got {elevation}")));
            }
            if !(1..=366).contains(&day_of_year) {
                return Err(invalid(format!("day_of_year out of range: {day_of_year}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> CrownFireError {
    CrownFireError::InvalidConfig(message)
}
