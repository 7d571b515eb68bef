use std::path::PathBuf;

use clap::Parser;
use crown_fire_core::{
    CrownFireConfig, CrownFireInputs, CrownFirePipeline, CrowningType, Degrees,
    FoliarMoistureModel, Grid,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Crown fire transition demo on a synthetic landscape
///
/// Canopy base height rises from west to east, surface intensity rises from
/// north to south, and each row cycles through the species table (the last
/// code in the cycle is unlisted and falls back to the broadleaf FMC).
#[derive(Parser, Debug)]
#[command(name = "crown-fire-demo")]
#[command(about = "Crown fire initiation and spread over a synthetic raster", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 48)]
    width: usize,

    /// Grid height in cells
    #[arg(long, default_value_t = 24)]
    height: usize,

    /// Canopy base height at the western edge (m)
    #[arg(long, default_value_t = 0.5)]
    cbh_min: f64,

    /// Canopy base height at the eastern edge (m)
    #[arg(long, default_value_t = 12.0)]
    cbh_max: f64,

    /// Surface fire intensity at the southern edge (kW/m)
    #[arg(short, long, default_value_t = 12000.0)]
    intensity_max: f64,

    /// Fire danger spread component (uniform)
    #[arg(short, long, default_value_t = 0.5)]
    spread_component: f64,

    /// Critical crown spread rate (m/min, uniform)
    #[arg(short, long, default_value_t = 3.0)]
    critical_ros: f64,

    /// JSON calibration file (defaults to $CROWN_FIRE_CONFIG_PATH or builtin)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the seasonal FMC model for this day of year instead of species lookup
    #[arg(long)]
    seasonal_day: Option<u16>,

    /// Site latitude for the seasonal model
    #[arg(long, default_value_t = 37.5)]
    latitude: f64,

    /// Site longitude for the seasonal model
    #[arg(long, default_value_t = 127.0)]
    longitude: f64,

    /// Site elevation for the seasonal model (m above sea level, may be negative)
    #[arg(long, allow_negative_numbers = true)]
    elevation: Option<f64>,

    /// Zero CFB outside the crowning mask
    #[arg(long)]
    zero_cfb_without_crowning: bool,

    /// Print the summary as JSON instead of the text map
    #[arg(long)]
    json: bool,
}

/// Linear ramp from `min` to `max` over `steps` cells
fn ramp(min: f64, max: f64, index: usize, steps: usize) -> f64 {
    if steps <= 1 {
        return min;
    }
    min + (max - min) * index as f64 / (steps - 1) as f64
}

fn load_config(args: &Args) -> crown_fire_core::Result<CrownFireConfig> {
    let mut config = match &args.config {
        Some(path) => CrownFireConfig::from_file(path)?,
        None => CrownFireConfig::load_from_env()?,
    };

    if let Some(day_of_year) = args.seasonal_day {
        config = config.with_foliar_moisture_model(FoliarMoistureModel::Seasonal {
            latitude: Degrees::new(args.latitude),
            longitude: Degrees::new(args.longitude),
            elevation: args.elevation,
            day_of_year,
        });
    }
    if args.zero_cfb_without_crowning {
        config = config.with_zero_cfb_without_crowning(true);
    }
    Ok(config)
}

fn type_symbol(kind: CrowningType) -> char {
    match kind {
        CrowningType::None => '.',
        CrowningType::Partial => 'p',
        CrowningType::Active => 'A',
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let pipeline = CrownFirePipeline::new(load_config(&args)?)?;
    let species_count = pipeline.config().species.len().max(1) + 1;

    info!(
        width = args.width,
        height = args.height,
        "building synthetic landscape"
    );

    let (width, height) = (args.width, args.height);
    let mut species = Grid::filled(width, height, 0.0);
    let mut cbh = Grid::filled(width, height, 0.0);
    let mut intensity = Grid::filled(width, height, 0.0);
    for row in 0..height {
        let code = (row % species_count) as f64;
        let row_intensity = ramp(0.0, args.intensity_max, row, height);
        for col in 0..width {
            species.set(row, col, code);
            cbh.set(row, col, ramp(args.cbh_min, args.cbh_max, col, width));
            intensity.set(row, col, row_intensity);
        }
    }
    let spread_component = Grid::filled(width, height, args.spread_component);
    let critical_ros = Grid::filled(width, height, args.critical_ros);

    let outputs = pipeline.run(&CrownFireInputs {
        species: &species,
        canopy_base_height: &cbh,
        surface_intensity: &intensity,
        spread_component: &spread_component,
        critical_ros: &critical_ros,
    })?;
    let summary = outputs.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== Crown Fire Transition Demo ===\n");
    println!(
        "CBH {:.1}-{:.1} m (west→east), intensity 0-{:.0} kW/m (north→south)",
        args.cbh_min, args.cbh_max, args.intensity_max
    );
    println!(
        "Spread component {:.2}, critical ROS {:.2} m/min\n",
        args.spread_component, args.critical_ros
    );

    for row in outputs.crowning_type.to_rows() {
        let line: String = row.into_iter().map(type_symbol).collect();
        println!("  {line}");
    }
    println!("\n  . none   p partial   A active\n");
    println!("{summary}");

    Ok(())
}
