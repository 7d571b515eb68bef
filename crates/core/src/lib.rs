//! Crown Fire Transition Core Library
//!
//! Decides, cell by cell over a raster, whether a surface fire transitions into
//! the canopy and how intensely. The five-stage pipeline:
//!
//! 1. Foliar moisture content from species (or a seasonal site model)
//! 2. Critical surface intensity from canopy base height and FMC
//! 3. Crowning mask where surface intensity strictly exceeds the threshold
//! 4. Crown rate of spread, kept only where crowning occurs
//! 5. Crown fraction burned and none / partial / active classification
//!
//! Loading rasters, persisting results and fire propagation are left to callers.

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod error;
pub mod physics;
pub mod solver;

// Re-export core types
pub use core_types::{Degrees, KwPerMeter, Meters, MetersPerMinute, Percent};

pub use config::{CrownFireConfig, FoliarMoistureModel, SpeciesFoliarMoisture};
pub use error::{CrownFireError, Result};
pub use physics::CrowningType;
pub use solver::{CrownFireInputs, CrownFireOutputs, CrownFirePipeline, CrowningSummary, Grid};
