//! Baseline network adjustment
use std::path::Path;

use log::{info, warn};
use nalgebra::Vector3;

mod contribution;
mod estimate;
mod solver;
mod system;

pub use contribution::{Contribution, ObservationCase};
pub use estimate::Estimate;
pub use solver::{solve_normal_equations, Solution};
pub use system::LinearSystem;

use crate::{baseline::Baseline, catalog::StationCatalog, cfg::Config, error::Error};

/// Makes sure the catalog splits stations exactly like the configuration does.
fn check_fixed_stations(catalog: &StationCatalog, cfg: &Config) -> Result<(), Error> {
    for code in cfg.fixed_stations.iter() {
        if !catalog.is_fixed(code) {
            return Err(Error::FixedStationMismatch(code.to_string()));
        }
    }
    for station in catalog.fixed() {
        if !cfg.is_fixed(&station.code) {
            return Err(Error::FixedStationMismatch(station.code.to_string()));
        }
    }
    Ok(())
}

/// Runs the least squares adjustment of this baseline network.
/// ## Input
/// - baselines: ordered list of [Baseline]s
/// - catalog: [StationCatalog], built with the fixed stations of `cfg`
/// - cfg: [Config] preset
/// ## Returns
/// - [Estimate] of all unknown stations
/// - [Error] on invalid network topology or singular system
pub fn run_adjustment(
    baselines: &[Baseline],
    catalog: &StationCatalog,
    cfg: &Config,
) -> Result<Estimate, Error> {
    check_fixed_stations(catalog, cfg)?;

    for station in catalog.unknowns() {
        let observed = baselines
            .iter()
            .any(|bl| bl.code1() == station.code || bl.code2() == station.code);
        if !observed {
            warn!("{} is not observed by any baseline", station.code);
        }
    }

    for baseline in baselines.iter().filter(|bl| bl.is_degenerate()) {
        warn!("{} has null covariance", baseline);
    }

    let system = LinearSystem::assemble(baselines, catalog, cfg.weighting)?;
    let solution = solve_normal_equations(&system, cfg.singularity_threshold)?;
    let estimate = Estimate::new(catalog, solution);

    info!(
        "adjusted {} stations from {} baselines ({} fixed, {} weighting)",
        estimate.len(),
        baselines.len(),
        catalog.len() - catalog.num_unknowns(),
        cfg.weighting,
    );

    Ok(estimate)
}

/// [Adjustment] ties a [StationCatalog] to its [Config]uration,
/// ready to process baseline networks.
#[derive(Debug, Clone)]
pub struct Adjustment {
    /// [Config] preset
    pub cfg: Config,
    /// [StationCatalog]
    catalog: StationCatalog,
}

impl Adjustment {
    /// Creates a new [Adjustment] from approximate coordinates (in catalog order).
    /// Fixed stations are selected by the [Config].
    pub fn new(stations: Vec<(String, Vector3<f64>)>, cfg: Config) -> Result<Self, Error> {
        let catalog = StationCatalog::new(stations, &cfg.fixed_stations)?;
        Ok(Self { cfg, catalog })
    }

    /// Creates a new [Adjustment] from a `code; X; Y; Z` coordinates file.
    pub fn from_path<P: AsRef<Path>>(path: P, cfg: Config) -> Result<Self, Error> {
        let catalog = StationCatalog::from_path(path, &cfg.fixed_stations)?;
        Ok(Self { cfg, catalog })
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// Adjusts this baseline network, see [run_adjustment].
    pub fn run(&self, baselines: &[Baseline]) -> Result<Estimate, Error> {
        run_adjustment(baselines, &self.catalog, &self.cfg)
    }
}
