//! Van Wagner Crown Fire Initiation and Cruz & Alexander Crown Fraction Burned
//!
//! Scalar, per-cell forms of the crown fire transition:
//! - Critical surface intensity from canopy base height and foliar moisture
//! - Strict crowning test against that threshold
//! - Crown rate of spread from the threshold and the spread component
//! - Crown fraction burned and the none / partial / active classification
//!
//! # Scientific References
//! - Van Wagner, C.E. (1977). "Conditions for the start and spread of crown fire"
//!   Canadian Journal of Forest Research, 7(1), 23-34
//! - Cruz, M.G., Alexander, M.E. (2010). "Assessing crown fire potential in coniferous forests"
//!   Forest Ecology and Management, 259(3), 562-570

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::units::{KwPerMeter, Meters, MetersPerMinute, Percent};

/// Crowning classification for a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CrowningType {
    /// Surface fire did not reach the canopy
    #[default]
    None = 0,
    /// Crowning with CFB below the active threshold (torching)
    Partial = 1,
    /// Crowning with CFB at or above the active threshold
    Active = 2,
}

impl CrowningType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for CrowningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calculate critical surface fire intensity for crown fire initiation
///
/// Van Wagner (1977) form used by this model:
/// ```text
/// CSI = k × CBH^1.5 × (460 + 25.9 × FMC)^1.5
/// ```
///
/// # Arguments
/// * `crown_base_height` - Height to base of crown (m)
/// * `foliar_moisture_content` - Foliar moisture content (%)
/// * `scale` - Empirical scale constant `k` (0.001 by default)
///
/// # Returns
/// Critical surface fire intensity in kW/m. Zero canopy base height gives zero.
#[must_use]
pub fn critical_surface_intensity(
    crown_base_height: Meters,
    foliar_moisture_content: Percent,
    scale: f64,
) -> KwPerMeter {
    let heat_of_ignition = 460.0 + 25.9 * *foliar_moisture_content;
    KwPerMeter::new(scale * crown_base_height.powf(1.5) * heat_of_ignition.powf(1.5))
}

/// Crown fire initiation test.
///
/// Crowning occurs only when surface intensity strictly exceeds the critical
/// intensity; a tie stays on the surface.
#[must_use]
pub fn is_crowning(surface_intensity: KwPerMeter, critical_intensity: KwPerMeter) -> bool {
    *surface_intensity > *critical_intensity
}

/// Crown fire rate of spread
///
/// ```text
/// ROS = CSI / (divisor × SFC)
/// ```
///
/// A non-positive denominator means no spread potential and yields zero
/// instead of an infinite or negative rate.
#[must_use]
pub fn crown_spread_rate(
    critical_intensity: KwPerMeter,
    spread_component: f64,
    divisor: f64,
) -> MetersPerMinute {
    let denominator = divisor * spread_component;
    if denominator > 0.0 {
        MetersPerMinute::new(*critical_intensity / denominator)
    } else {
        MetersPerMinute::ZERO
    }
}

/// Calculate crown fraction burned (CFB)
///
/// Cruz & Alexander (2010) formula:
/// ```text
/// CFB = clamp(1 − exp(−c × (R − R_critical)), 0, 1)
/// ```
///
/// Evaluated for any spread rate; a rate below critical gives a negative raw
/// value that clamps to zero.
#[must_use]
pub fn crown_fraction_burned(
    spread_rate: MetersPerMinute,
    critical_spread_rate: MetersPerMinute,
    coefficient: f64,
) -> f64 {
    let rate_diff = spread_rate - critical_spread_rate;
    let cfb = 1.0 - (-coefficient * *rate_diff).exp();
    cfb.clamp(0.0, 1.0)
}

/// Classify a cell from its crowning flag and CFB.
///
/// The crowning flag takes precedence: a non-crowning cell is `None` whatever
/// its CFB.
#[must_use]
pub fn classify_crowning_type(crowning: bool, cfb: f64, active_threshold: f64) -> CrowningType {
    if !crowning {
        CrowningType::None
    } else if cfb >= active_threshold {
        CrowningType::Active
    } else {
        CrowningType::Partial
    }
}
