//! Combined entry point chaining the five crown fire stages
//!
//! FMC → CSI → crowning mask → masked ROS → CFB / crowning type. Each stage
//! consumes the complete output of the previous one.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::config::CrownFireConfig;
use crate::error::Result;
use crate::physics::crown_fire::CrowningType;
use crate::solver::crown_fire::{
    compute_cfb, compute_csi_from_fmc, compute_fmc, compute_masked_ros, CrownFractionBurned,
    MaskedRos,
};
use crate::solver::fields::Grid;

/// Borrowed input rasters. All five must share one shape.
#[derive(Debug, Clone, Copy)]
pub struct CrownFireInputs<'a> {
    /// Species codes (coerced to whole numbers)
    pub species: &'a Grid<f64>,
    /// Canopy base height (m), non-negative
    pub canopy_base_height: &'a Grid<f64>,
    /// Surface fire intensity (kW/m)
    pub surface_intensity: &'a Grid<f64>,
    /// Fire danger spread component
    pub spread_component: &'a Grid<f64>,
    /// Critical crown spread rate (m/min)
    pub critical_ros: &'a Grid<f64>,
}

/// Every grid produced by a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CrownFireOutputs {
    pub fmc: Grid<f64>,
    pub csi: Grid<f64>,
    pub crowning: Grid<bool>,
    /// Crown ROS, zero outside the crowning mask
    pub ros: Grid<f64>,
    pub cfb: Grid<f64>,
    pub crowning_type: Grid<CrowningType>,
}

/// Aggregate view of a run, for logging and reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrowningSummary {
    pub cells: usize,
    pub none_cells: usize,
    pub partial_cells: usize,
    pub active_cells: usize,
    /// Mean CFB over crowning cells (0 when nothing crowns)
    pub mean_crowning_cfb: f64,
    pub max_ros: f64,
}

impl CrownFireOutputs {
    #[must_use]
    pub fn summary(&self) -> CrowningSummary {
        let crowning_cfb: Vec<f64> = self
            .cfb
            .as_slice()
            .iter()
            .zip(self.crowning.as_slice())
            .filter_map(|(&cfb, &crowns)| crowns.then_some(cfb))
            .collect();
        let mean_crowning_cfb = if crowning_cfb.is_empty() {
            0.0
        } else {
            crowning_cfb.iter().sum::<f64>() / crowning_cfb.len() as f64
        };

        CrowningSummary {
            cells: self.crowning_type.len(),
            none_cells: self.crowning_type.count(|t| t == CrowningType::None),
            partial_cells: self.crowning_type.count(|t| t == CrowningType::Partial),
            active_cells: self.crowning_type.count(|t| t == CrowningType::Active),
            mean_crowning_cfb,
            max_ros: self.ros.as_slice().iter().copied().fold(0.0, f64::max),
        }
    }
}

impl fmt::Display for CrowningSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cells: {} none, {} partial, {} active (mean CFB {:.3}, max ROS {:.2} m/min)",
            self.cells,
            self.none_cells,
            self.partial_cells,
            self.active_cells,
            self.mean_crowning_cfb,
            self.max_ros
        )
    }
}

/// Stateless runner holding a validated configuration.
#[derive(Debug, Clone)]
pub struct CrownFirePipeline {
    config: CrownFireConfig,
}

impl Default for CrownFirePipeline {
    fn default() -> Self {
        Self {
            config: CrownFireConfig::default(),
        }
    }
}

impl CrownFirePipeline {
    /// # Errors
    ///
    /// Returns [`crate::CrownFireError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: CrownFireConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &CrownFireConfig {
        &self.config
    }

    /// Run all five stages.
    ///
    /// # Errors
    ///
    /// Shape mismatch between any two inputs, negative canopy base height, or
    /// a NaN produced by any stage.
    pub fn run(&self, inputs: &CrownFireInputs<'_>) -> Result<CrownFireOutputs> {
        let shape = inputs.species.shape();
        debug!(?shape, "crown fire pipeline started");

        let fmc = compute_fmc(inputs.species, &self.config);
        let csi = compute_csi_from_fmc(inputs.canopy_base_height, &fmc, &self.config)?;
        let MaskedRos { ros, crowning } = compute_masked_ros(
            inputs.surface_intensity,
            &csi,
            inputs.spread_component,
            &self.config,
        )?;
        let CrownFractionBurned { cfb, crowning_type } =
            compute_cfb(&ros, inputs.critical_ros, &crowning, &self.config)?;

        let outputs = CrownFireOutputs {
            fmc,
            csi,
            crowning,
            ros,
            cfb,
            crowning_type,
        };
        let summary = outputs.summary();
        info!(
            ?shape,
            partial = summary.partial_cells,
            active = summary.active_cells,
            mean_crowning_cfb = summary.mean_crowning_cfb,
            "crown fire pipeline finished"
        );
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrownFireError;

    #[test]
    fn test_pipeline_single_cell_active() {
        let species = Grid::filled(1, 1, 1.0);
        let cbh = Grid::filled(1, 1, 1.0);
        let intensity = Grid::filled(1, 1, 1.0e6);
        let sfc = Grid::filled(1, 1, 0.01);
        let critical = Grid::filled(1, 1, 5.0);

        let outputs = CrownFirePipeline::default()
            .run(&CrownFireInputs {
                species: &species,
                canopy_base_height: &cbh,
                surface_intensity: &intensity,
                spread_component: &sfc,
                critical_ros: &critical,
            })
            .unwrap();

        assert!(outputs.crowning.get(0, 0));
        assert_eq!(outputs.crowning_type.get(0, 0), CrowningType::Active);
        let summary = outputs.summary();
        assert_eq!(summary.active_cells, 1);
        assert_eq!(summary.none_cells, 0);
        assert!(summary.max_ros > 5.0);
    }

    #[test]
    fn test_pipeline_rejects_mismatched_driver() {
        let grid = Grid::filled(2, 2, 1.0);
        let wide = Grid::filled(3, 2, 1.0);
        let err = CrownFirePipeline::default()
            .run(&CrownFireInputs {
                species: &grid,
                canopy_base_height: &grid,
                surface_intensity: &grid,
                spread_component: &wide,
                critical_ros: &grid,
            })
            .unwrap_err();
        match err {
            CrownFireError::ShapeMismatch { stage, .. } => assert_eq!(stage, "compute_ros"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let config = CrownFireConfig {
            cfb_coefficient: -0.23,
            ..CrownFireConfig::default()
        };
        assert!(CrownFirePipeline::new(config).is_err());
    }

    #[test]
    fn test_pipeline_keeps_validated_config() {
        let config = CrownFireConfig::default().with_zero_cfb_without_crowning(true);
        let pipeline = CrownFirePipeline::new(config.clone()).unwrap();
        assert_eq!(pipeline.config(), &config);
    }

    #[test]
    fn test_summary_with_no_crowning() {
        let grid = Grid::filled(3, 3, 0.0);
        let cbh = Grid::filled(3, 3, 10.0);
        let outputs = CrownFirePipeline::default()
            .run(&CrownFireInputs {
                species: &grid,
                canopy_base_height: &cbh,
                surface_intensity: &grid,
                spread_component: &grid,
                critical_ros: &grid,
            })
            .unwrap();
        let summary = outputs.summary();
        assert_eq!(summary.none_cells, 9);
        assert_eq!(summary.mean_crowning_cfb, 0.0);
        assert_eq!(summary.max_ros, 0.0);
        assert!(summary.to_string().starts_with("9 cells: 9 none"));
    }
}
