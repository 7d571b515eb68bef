//! Randomised property checks for crown fraction burned
//!
//! Uses a seeded RNG so failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crown_fire_core::physics::crown_fraction_burned;
use crown_fire_core::solver::compute_cfb;
use crown_fire_core::{CrownFireConfig, CrowningType, Grid, MetersPerMinute};

const SEED: u64 = 0x00C0_FFEE;
const SAMPLES: usize = 10_000;

/// Draw a spread rate spanning ordinary values and extreme magnitudes.
fn sample_rate(rng: &mut StdRng) -> f64 {
    match rng.random_range(0..4) {
        0 => rng.random_range(-100.0..100.0),
        1 => rng.random_range(-1.0e6..1.0e6),
        2 => rng.random_range(-1.0e300..1.0e300),
        _ => rng.random_range(0.0..50.0),
    }
}

#[test]
fn test_cfb_always_within_unit_interval() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let width = 100;
    let height = SAMPLES / width;

    let masked_ros: Vec<f64> = (0..SAMPLES).map(|_| sample_rate(&mut rng)).collect();
    let critical: Vec<f64> = (0..SAMPLES).map(|_| sample_rate(&mut rng)).collect();
    let crowning: Vec<bool> = (0..SAMPLES).map(|_| rng.random_bool(0.5)).collect();

    let masked_ros = Grid::from_vec(width, height, masked_ros).unwrap();
    let critical = Grid::from_vec(width, height, critical).unwrap();
    let crowning = Grid::from_vec(width, height, crowning).unwrap();

    let config = CrownFireConfig::default();
    let result = compute_cfb(&masked_ros, &critical, &crowning, &config).unwrap();

    for (index, &cfb) in result.cfb.as_slice().iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(&cfb),
            "CFB {cfb} out of range at cell {index}"
        );
    }

    for (index, (&kind, &crowns)) in result
        .crowning_type
        .as_slice()
        .iter()
        .zip(crowning.as_slice())
        .enumerate()
    {
        let cfb = result.cfb.as_slice()[index];
        let expected = match (crowns, cfb >= 0.9) {
            (false, _) => CrowningType::None,
            (true, true) => CrowningType::Active,
            (true, false) => CrowningType::Partial,
        };
        assert_eq!(kind, expected, "cell {index}: cfb {cfb}, crowning {crowns}");
    }
}

#[test]
fn test_cfb_monotone_in_rate_difference() {
    let mut rng = StdRng::seed_from_u64(SEED ^ 0xA5A5);
    let critical = MetersPerMinute::new(10.0);

    let mut rates: Vec<f64> = (0..SAMPLES).map(|_| rng.random_range(-50.0..200.0)).collect();
    rates.sort_by(f64::total_cmp);

    let fractions: Vec<f64> = rates
        .iter()
        .map(|&rate| crown_fraction_burned(MetersPerMinute::new(rate), critical, 0.23))
        .collect();

    for pair in fractions.windows(2) {
        assert!(pair[1] >= pair[0], "CFB decreased: {pair:?}");
    }
}

#[test]
fn test_cfb_zeroed_outside_mask_when_enabled() {
    let mut rng = StdRng::seed_from_u64(SEED.rotate_left(7));
    let width = 50;
    let height = 20;
    let cells = width * height;

    let masked_ros: Vec<f64> = (0..cells).map(|_| sample_rate(&mut rng)).collect();
    let critical: Vec<f64> = (0..cells).map(|_| sample_rate(&mut rng)).collect();
    let crowning: Vec<bool> = (0..cells).map(|_| rng.random_bool(0.3)).collect();

    let masked_ros = Grid::from_vec(width, height, masked_ros).unwrap();
    let critical = Grid::from_vec(width, height, critical).unwrap();
    let crowning = Grid::from_vec(width, height, crowning).unwrap();

    let config = CrownFireConfig::default().with_zero_cfb_without_crowning(true);
    let result = compute_cfb(&masked_ros, &critical, &crowning, &config).unwrap();

    for (&cfb, &crowns) in result.cfb.as_slice().iter().zip(crowning.as_slice()) {
        if !crowns {
            assert_eq!(cfb, 0.0);
        }
        assert!((0.0..=1.0).contains(&cfb));
    }
}
