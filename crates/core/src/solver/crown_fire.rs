//! Grid-level crown fire transition stages.
//!
//! Each stage is a pure function from input grids to freshly allocated output
//! grids of the same shape. Cells are evaluated independently in parallel, so
//! the result does not depend on evaluation order. Any stage that combines
//! grids checks their shapes first and fails with
//! [`CrownFireError::ShapeMismatch`] instead of broadcasting.

use tracing::debug;

use crate::config::{CrownFireConfig, FoliarMoistureModel};
use crate::core_types::units::{KwPerMeter, Meters, MetersPerMinute, Percent};
use crate::error::{CrownFireError, Result};
use crate::physics::crown_fire::{
    classify_crowning_type, critical_surface_intensity, crown_fraction_burned, crown_spread_rate,
    is_crowning, CrowningType,
};
use crate::physics::foliar_moisture::{seasonal_foliar_moisture, FoliarMoistureTable};
use crate::solver::fields::Grid;

/// Masked crown spread rate together with the crowning mask it was gated by.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedRos {
    /// Crown ROS where crowning occurs, 0 elsewhere (m/min)
    pub ros: Grid<f64>,
    /// `true` where surface intensity strictly exceeds CSI
    pub crowning: Grid<bool>,
}

/// Crown fraction burned and the per-cell classification derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CrownFractionBurned {
    /// CFB in [0, 1]
    pub cfb: Grid<f64>,
    pub crowning_type: Grid<CrowningType>,
}

/// Fail with a domain error at the first NaN cell of `output`.
///
/// The reported value is the first non-finite input at that cell, or the
/// first input's value when every input there is finite.
fn ensure_real(stage: &'static str, output: &Grid<f64>, inputs: &[&Grid<f64>]) -> Result<()> {
    let Some(index) = output.position(f64::is_nan) else {
        return Ok(());
    };
    let at = |input: &&Grid<f64>| input.as_slice()[index];
    let value = inputs
        .iter()
        .map(at)
        .find(|v| !v.is_finite())
        .or_else(|| inputs.first().map(at))
        .unwrap_or(f64::NAN);
    Err(CrownFireError::domain_at(stage, index, output.width(), value))
}

/// Foliar moisture content for every cell of a species raster.
///
/// With [`FoliarMoistureModel::SpeciesLookup`] each cell's code is truncated
/// and looked up, unknown codes taking the deciduous fallback. With
/// [`FoliarMoistureModel::Seasonal`] the site value fills the whole grid.
#[must_use]
pub fn compute_fmc(species: &Grid<f64>, config: &CrownFireConfig) -> Grid<f64> {
    match config.foliar_moisture_model {
        FoliarMoistureModel::SpeciesLookup => {
            let table = FoliarMoistureTable::from_config(config);
            let fmc = species.map(|code| table.lookup_raw(code));
            debug!(
                shape = ?species.shape(),
                fallback_cells = species.count(|code| !table.is_known(code)),
                "foliar moisture from species lookup"
            );
            fmc
        }
        FoliarMoistureModel::Seasonal {
            latitude,
            longitude,
            elevation,
            day_of_year,
        } => {
            let fmc = seasonal_foliar_moisture(latitude, longitude, elevation, day_of_year);
            debug!(
                shape = ?species.shape(),
                fmc = *fmc,
                day_of_year,
                "foliar moisture from seasonal model"
            );
            Grid::filled(species.width(), species.height(), *fmc)
        }
    }
}

/// Critical surface intensity from canopy base height and an FMC grid.
///
/// # Errors
///
/// - [`CrownFireError::ShapeMismatch`] if the grids differ in shape
/// - [`CrownFireError::Domain`] at the first negative or NaN canopy base height
pub fn compute_csi_from_fmc(
    canopy_base_height: &Grid<f64>,
    fmc: &Grid<f64>,
    config: &CrownFireConfig,
) -> Result<Grid<f64>> {
    const STAGE: &str = "compute_csi";

    canopy_base_height.ensure_same_shape(STAGE, fmc)?;
    if let Some(index) = canopy_base_height.position(|cbh| cbh.is_nan() || cbh < 0.0) {
        return Err(CrownFireError::domain_at(
            STAGE,
            index,
            canopy_base_height.width(),
            canopy_base_height.as_slice()[index],
        ));
    }

    let scale = config.csi_scale;
    let csi = canopy_base_height.zip_map(STAGE, fmc, |cbh, moisture| {
        *critical_surface_intensity(Meters::new(cbh), Percent::new(moisture), scale)
    })?;
    ensure_real(STAGE, &csi, &[fmc, canopy_base_height])?;
    Ok(csi)
}

/// Critical surface intensity from canopy base height and species.
///
/// Derives FMC with [`compute_fmc`] and then applies
/// [`compute_csi_from_fmc`].
///
/// # Errors
///
/// See [`compute_csi_from_fmc`].
pub fn compute_csi(
    canopy_base_height: &Grid<f64>,
    species: &Grid<f64>,
    config: &CrownFireConfig,
) -> Result<Grid<f64>> {
    canopy_base_height.ensure_same_shape("compute_csi", species)?;
    let fmc = compute_fmc(species, config);
    compute_csi_from_fmc(canopy_base_height, &fmc, config)
}

/// Binary crowning mask: `true` where intensity strictly exceeds CSI.
///
/// # Errors
///
/// [`CrownFireError::ShapeMismatch`] if the grids differ in shape.
pub fn classify_crowning(intensity: &Grid<f64>, csi: &Grid<f64>) -> Result<Grid<bool>> {
    let crowning = intensity.zip_map("classify_crowning", csi, |surface, critical| {
        is_crowning(KwPerMeter::new(surface), KwPerMeter::new(critical))
    })?;
    debug!(
        shape = ?crowning.shape(),
        crowning_cells = crowning.count(|c| c),
        "crowning classified"
    );
    Ok(crowning)
}

/// Raw crown ROS for every cell, ignoring the crowning mask.
///
/// Cells whose spread component is zero, negative or NaN get a zero rate.
///
/// # Errors
///
/// - [`CrownFireError::ShapeMismatch`] if the grids differ in shape
/// - [`CrownFireError::Domain`] if a cell evaluates to NaN
pub fn compute_ros(
    csi: &Grid<f64>,
    spread_component: &Grid<f64>,
    config: &CrownFireConfig,
) -> Result<Grid<f64>> {
    const STAGE: &str = "compute_ros";

    let divisor = config.ros_divisor;
    let ros = csi.zip_map(STAGE, spread_component, |critical, sfc| {
        *crown_spread_rate(KwPerMeter::new(critical), sfc, divisor)
    })?;
    debug!(
        shape = ?ros.shape(),
        no_spread_cells = spread_component.count(|sfc| {
            let denominator = divisor * sfc;
            denominator.is_nan() || denominator <= 0.0
        }),
        "raw crown spread rate computed"
    );
    ensure_real(STAGE, &ros, &[csi, spread_component])?;
    Ok(ros)
}

/// Zero every cell of `ros` where `crowning` is false.
///
/// # Errors
///
/// [`CrownFireError::ShapeMismatch`] if the grids differ in shape.
pub fn apply_crowning_mask(ros: &Grid<f64>, crowning: &Grid<bool>) -> Result<Grid<f64>> {
    ros.zip_map("apply_crowning_mask", crowning, |rate, crowns| {
        if crowns {
            rate
        } else {
            0.0
        }
    })
}

/// Crown ROS restricted to crowning cells, plus the crowning mask itself.
///
/// Classifies crowning from intensity and CSI, computes the raw rate from CSI
/// and the spread component, then masks it.
///
/// # Errors
///
/// Shape mismatch between any two inputs, or a NaN raw rate.
pub fn compute_masked_ros(
    intensity: &Grid<f64>,
    csi: &Grid<f64>,
    spread_component: &Grid<f64>,
    config: &CrownFireConfig,
) -> Result<MaskedRos> {
    let crowning = classify_crowning(intensity, csi)?;
    let raw = compute_ros(csi, spread_component, config)?;
    let ros = apply_crowning_mask(&raw, &crowning)?;
    Ok(MaskedRos { ros, crowning })
}

/// Crown fraction burned and crowning type.
///
/// CFB is evaluated for every cell, so a non-crowning cell can carry a nonzero
/// CFB when its masked rate of 0 still exceeds a negative critical rate. Set
/// `zero_cfb_without_crowning` in the config to force those cells to 0. The
/// type is always `None` outside the mask.
///
/// # Errors
///
/// - [`CrownFireError::ShapeMismatch`] if the grids differ in shape
/// - [`CrownFireError::Domain`] if a cell's CFB is NaN
pub fn compute_cfb(
    masked_ros: &Grid<f64>,
    critical_ros: &Grid<f64>,
    crowning: &Grid<bool>,
    config: &CrownFireConfig,
) -> Result<CrownFractionBurned> {
    const STAGE: &str = "compute_cfb";

    masked_ros.ensure_same_shape(STAGE, crowning)?;
    let coefficient = config.cfb_coefficient;
    let mut cfb = masked_ros.zip_map(STAGE, critical_ros, |ros, critical| {
        crown_fraction_burned(
            MetersPerMinute::new(ros),
            MetersPerMinute::new(critical),
            coefficient,
        )
    })?;
    ensure_real(STAGE, &cfb, &[masked_ros, critical_ros])?;

    if config.zero_cfb_without_crowning {
        cfb = cfb.zip_map(STAGE, crowning, |fraction, crowns| {
            if crowns {
                fraction
            } else {
                0.0
            }
        })?;
    }

    let threshold = config.active_cfb_threshold;
    let crowning_type = cfb.zip_map(STAGE, crowning, |fraction, crowns| {
        classify_crowning_type(crowns, fraction, threshold)
    })?;
    debug!(
        shape = ?cfb.shape(),
        active_cells = crowning_type.count(|t| t == CrowningType::Active),
        partial_cells = crowning_type.count(|t| t == CrowningType::Partial),
        "crown fraction burned computed"
    );
    Ok(CrownFractionBurned { cfb, crowning_type })
}
