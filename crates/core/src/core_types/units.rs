//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers keep canopy heights, moisture percentages, fire intensities
//! and spread rates from being mixed up in the scalar crown fire formulas.
//!
//! # Design Philosophy
//! - All types use f64: the critical surface intensity raises large sums to the
//!   1.5 power, and grid outputs are compared to 1e-6 against reference values
//! - Implements common traits (Deref, Ord, Display, From) for ergonomic use
//! - Serde support so calibration files can carry typed values
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//!
//! # Usage
//! ```
//! use crown_fire_core::core_types::units::{Meters, Percent};
//!
//! let cbh = Meters::new(5.0);
//! let fmc = Percent::new(110.3);
//! assert!(*cbh < *fmc);
//! assert_eq!(f64::from(fmc), 110.3);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Implements the trait set shared by every unit newtype.
macro_rules! float_unit {
    ($name:ident) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }
    };
}

// ============================================================================
// LENGTH
// ============================================================================

/// Height above the ground in meters (canopy base height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64")]
#[repr(transparent)]
pub struct Meters(f64);

float_unit!(Meters);

impl Meters {
    /// Create a new distance in meters. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Meters::new: negative distance is invalid");
        Meters(value)
    }
}

// Deserialization goes through here so config files obey the same bound
impl TryFrom<f64> for Meters {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value >= 0.0 {
            Ok(Meters(value))
        } else {
            Err(format!("negative distance {value} m is invalid"))
        }
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m", self.0)
    }
}

// ============================================================================
// MOISTURE
// ============================================================================

/// Percentage value (foliar moisture content is expressed as % of dry weight,
/// so values above 100 are normal)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

float_unit!(Percent);

impl Percent {
    /// Create a new percentage
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Percent(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// ============================================================================
// FIRE BEHAVIOUR
// ============================================================================

/// Fireline intensity in kW/m
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KwPerMeter(f64);

float_unit!(KwPerMeter);

impl KwPerMeter {
    /// Create a new fireline intensity
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        KwPerMeter(value)
    }
}

impl fmt::Display for KwPerMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kW/m", self.0)
    }
}

/// Rate of spread in m/min
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerMinute(f64);

float_unit!(MetersPerMinute);

impl MetersPerMinute {
    /// Zero spread
    pub const ZERO: MetersPerMinute = MetersPerMinute(0.0);

    /// Create a new spread rate
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        MetersPerMinute(value)
    }
}

// Difference between an actual and a critical spread rate
impl Sub for MetersPerMinute {
    type Output = MetersPerMinute;
    fn sub(self, rhs: MetersPerMinute) -> MetersPerMinute {
        MetersPerMinute(self.0 - rhs.0)
    }
}

impl fmt::Display for MetersPerMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m/min", self.0)
    }
}

// ============================================================================
// GEOGRAPHY
// ============================================================================

/// Angle in decimal degrees (latitude / longitude)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

float_unit!(Degrees);

impl Degrees {
    /// Create a new angle
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°", self.0)
    }
}
