//! Scalar crown fire physics

pub mod crown_fire;
pub mod foliar_moisture;

pub use crown_fire::{
    classify_crowning_type, critical_surface_intensity, crown_fraction_burned, crown_spread_rate,
    is_crowning, CrowningType,
};
pub use foliar_moisture::{minimum_fmc_day, seasonal_foliar_moisture, FoliarMoistureTable};
