//! Grid-level crown fire solver
//!
//! Lifts the scalar formulas in [`crate::physics`] over whole rasters. Stages
//! are pure functions on [`Grid`] values; [`CrownFirePipeline`] chains them.
//!
//! # Example
//!
//! ```rust
//! use crown_fire_core::solver::{CrownFireInputs, CrownFirePipeline, Grid};
//!
//! let species = Grid::filled(4, 4, 1.0);
//! let cbh = Grid::filled(4, 4, 5.0);
//! let intensity = Grid::filled(4, 4, 3000.0);
//! let sfc = Grid::filled(4, 4, 1.5);
//! let critical_ros = Grid::filled(4, 4, 2.0);
//!
//! let outputs = CrownFirePipeline::default()
//!     .run(&CrownFireInputs {
//!         species: &species,
//!         canopy_base_height: &cbh,
//!         surface_intensity: &intensity,
//!         spread_component: &sfc,
//!         critical_ros: &critical_ros,
//!     })
//!     .unwrap();
//! assert_eq!(outputs.summary().cells, 16);
//! ```

pub mod crown_fire;
mod fields;
mod pipeline;

// Re-exports
pub use crown_fire::{
    apply_crowning_mask, classify_crowning, compute_cfb, compute_csi, compute_csi_from_fmc,
    compute_fmc, compute_masked_ros, compute_ros, CrownFractionBurned, MaskedRos,
};
pub use fields::Grid;
pub use pipeline::{CrownFireInputs, CrownFireOutputs, CrownFirePipeline, CrowningSummary};
