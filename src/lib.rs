#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod adjustment;
mod baseline;
mod catalog;
mod cfg;
mod error;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::adjustment::{
        run_adjustment, solve_normal_equations, Adjustment, Contribution, Estimate, LinearSystem,
        ObservationCase, Solution,
    };
    pub use crate::baseline::{covariance_from_packed, parse_baselines, read_baselines, Baseline};
    pub use crate::catalog::{Station, StationCatalog, StationStatus};
    pub use crate::cfg::{Config, Error as ConfigError, Weighting};
    pub use crate::error::{Error, ParsingError};
    // re-export
    pub use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
}

// pub export
pub use adjustment::run_adjustment;
pub use error::Error;
