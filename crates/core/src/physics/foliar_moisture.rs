//! Foliar Moisture Content (FMC) of the live canopy
//!
//! Two alternative models, selected through [`FoliarMoistureModel`]:
//! - Species lookup: a fixed literature value per conifer species, with the
//!   broadleaf mean for every code the table does not list
//! - Seasonal: the Forestry Canada (1992) curve driven by site latitude,
//!   longitude, optional elevation and the Julian day
//!
//! # Scientific References
//! - Kozlowski, T.T., Clausen, J.J. (1965). "Changes in moisture contents and dry weights
//!   of buds and leaves of forest trees". Botanical Gazette, 126(1), 20-26
//! - Forestry Canada Fire Danger Group (1992). "Development and structure of the
//!   Canadian Forest Fire Behavior Prediction System". Information Report ST-X-3
//!
//! [`FoliarMoistureModel`]: crate::config::FoliarMoistureModel

use rustc_hash::FxHashMap;

use crate::config::CrownFireConfig;
use crate::core_types::units::{Degrees, Percent};

/// Species code → FMC lookup built from the configured species table.
#[derive(Debug, Clone)]
pub struct FoliarMoistureTable {
    by_code: FxHashMap<i64, f64>,
    fallback: f64,
}

impl FoliarMoistureTable {
    /// Build the lookup from a (validated) config.
    #[must_use]
    pub fn from_config(config: &CrownFireConfig) -> Self {
        Self {
            by_code: config
                .species
                .iter()
                .map(|entry| (entry.code, *entry.fmc))
                .collect(),
            fallback: *config.deciduous_fmc,
        }
    }

    /// FMC for a raw raster value.
    ///
    /// The value is truncated to a whole species code. Codes missing from the
    /// table, negative codes and non-finite values all take the deciduous
    /// fallback, so the lookup is defined for every input.
    #[must_use]
    pub fn lookup(&self, raw_code: f64) -> Percent {
        Percent::new(self.lookup_raw(raw_code))
    }

    pub(crate) fn lookup_raw(&self, raw_code: f64) -> f64 {
        if !raw_code.is_finite() {
            return self.fallback;
        }
        self.by_code
            .get(&(raw_code.trunc() as i64))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// True when `raw_code` resolves to a listed species
    #[must_use]
    pub fn is_known(&self, raw_code: f64) -> bool {
        raw_code.is_finite() && self.by_code.contains_key(&(raw_code.trunc() as i64))
    }

    /// The deciduous fallback value
    #[must_use]
    pub fn fallback(&self) -> Percent {
        Percent::new(self.fallback)
    }
}

/// Julian day of minimum foliar moisture for a site.
///
/// FBP System (1992) equations 1-4. Longitude is taken by magnitude; the
/// curve was fitted on positive western longitudes.
///
/// - Without elevation: `LATN = 46 + 23.4·exp(−0.0360·(150 − LON))`,
///   `D0 = 151 · LAT / LATN`
/// - With elevation: `LATN = 43 + 33.7·exp(−0.0351·(150 − LON))`,
///   `D0 = 142.1 · LAT / LATN + 0.0172 · ELV`
///
/// `elevation` is meters above sea level and may be negative.
#[must_use]
pub fn minimum_fmc_day(latitude: Degrees, longitude: Degrees, elevation: Option<f64>) -> f64 {
    let lat = latitude.abs();
    let lon = longitude.abs();
    let d0 = match elevation {
        None => {
            let latn = 46.0 + 23.4 * (-0.0360 * (150.0 - lon)).exp();
            151.0 * (lat / latn)
        }
        Some(elv) => {
            let latn = 43.0 + 33.7 * (-0.0351 * (150.0 - lon)).exp();
            142.1 * (lat / latn) + 0.0172 * elv
        }
    };
    d0.round()
}

/// Seasonal foliar moisture content (FBP System 1992, equations 5-8).
///
/// ```text
/// ND  = |DJ − D0|
/// FMC = 85 + 0.0189·ND²                 ND < 30
///     = 32.9 + 3.17·ND − 0.0288·ND²     30 ≤ ND < 50
///     = 120                             ND ≥ 50
/// ```
#[must_use]
pub fn seasonal_foliar_moisture(
    latitude: Degrees,
    longitude: Degrees,
    elevation: Option<f64>,
    day_of_year: u16,
) -> Percent {
    let d0 = minimum_fmc_day(latitude, longitude, elevation);
    let nd = (f64::from(day_of_year) - d0).abs();

    let fmc = if nd < 30.0 {
        85.0 + 0.0189 * nd * nd
    } else if nd < 50.0 {
        32.9 + 3.17 * nd - 0.0288 * nd * nd
    } else {
        120.0
    };
    Percent::new(fmc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeciesFoliarMoisture;

    #[test]
    fn test_known_species_values() {
        let table = FoliarMoistureTable::from_config(&CrownFireConfig::default());
        assert_eq!(*table.lookup(0.0), 105.8);
        assert_eq!(*table.lookup(1.0), 110.3);
        assert_eq!(*table.lookup(2.0), 114.8);
        assert_eq!(*table.lookup(3.0), 107.8);
        assert_eq!(*table.lookup(4.0), 112.6);
    }

    #[test]
    fn test_codes_are_truncated() {
        let table = FoliarMoistureTable::from_config(&CrownFireConfig::default());
        assert_eq!(*table.lookup(2.9), 114.8);
        assert!(table.is_known(4.5));
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        let table = FoliarMoistureTable::from_config(&CrownFireConfig::default());
        for code in [-1.0, -7.0, 5.0, 99.0, f64::NAN, f64::INFINITY] {
            assert_eq!(*table.lookup(code), 199.7, "code {code}");
            assert!(!table.is_known(code));
        }
        assert_eq!(*table.fallback(), 199.7);
    }

    #[test]
    fn test_non_contiguous_regional_table() {
        let mut config = CrownFireConfig::default();
        config.species = vec![SpeciesFoliarMoisture {
            code: 42,
            name: "Pinus banksiana".to_string(),
            fmc: Percent::new(97.0),
        }];
        let table = FoliarMoistureTable::from_config(&config);
        assert_eq!(*table.lookup(42.0), 97.0);
        assert_eq!(*table.lookup(0.0), 199.7);
    }

    /// At 46°N 120°W the minimum falls near day 129.
    ///
    /// LATN = 46 + 23.4 × e^(−0.036 × 30) ≈ 53.95
    /// D0 = 151 × 46 / 53.95 ≈ 128.8
    #[test]
    fn test_minimum_fmc_day() {
        let d0 = minimum_fmc_day(Degrees::new(46.0), Degrees::new(-120.0), None);
        assert_eq!(d0, 129.0);
    }

    #[test]
    fn test_seasonal_curve_shape() {
        let lat = Degrees::new(46.0);
        let lon = Degrees::new(120.0);

        let at_minimum = seasonal_foliar_moisture(lat, lon, None, 129);
        assert!((*at_minimum - 85.0).abs() < 1e-9);

        // 20 days away: 85 + 0.0189 × 400
        let near = seasonal_foliar_moisture(lat, lon, None, 149);
        assert!((*near - 92.56).abs() < 1e-9);

        // 40 days away: 32.9 + 126.8 − 46.08
        let mid = seasonal_foliar_moisture(lat, lon, None, 169);
        assert!((*mid - 113.62).abs() < 1e-9);

        let far = seasonal_foliar_moisture(lat, lon, None, 300);
        assert_eq!(*far, 120.0);
    }

    #[test]
    fn test_elevation_shifts_minimum_later() {
        let lat = Degrees::new(50.0);
        let lon = Degrees::new(115.0);
        let low = minimum_fmc_day(lat, lon, Some(0.0));
        let high = minimum_fmc_day(lat, lon, Some(2000.0));
        assert!(high > low, "low {low}, high {high}");
    }

    #[test]
    fn test_below_sea_level_shifts_minimum_earlier() {
        let lat = Degrees::new(50.0);
        let lon = Degrees::new(115.0);
        let sea_level = minimum_fmc_day(lat, lon, Some(0.0));
        let below = minimum_fmc_day(lat, lon, Some(-400.0));
        assert!(below < sea_level, "sea level {sea_level}, below {below}");
    }
}
