use std::collections::HashMap;

use nalgebra::{DVector, Vector3};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{adjustment::solver::Solution, catalog::StationCatalog, error::Error};

/// [Estimate] is the outcome of a network adjustment:
/// the estimated coordinates of every unknown station.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Estimate {
    /// Estimated stations, in unknown index order
    stations: Vec<String>,
    /// Station code to offset in [Self::xchap]
    offsets: HashMap<String, usize>,
    /// Estimated unknowns (3 per station)
    xchap: DVector<f64>,
    /// Post-fit residuals (3 per baseline)
    residuals: DVector<f64>,
    /// Weighted residuals square sum
    vtpv: f64,
    /// Degrees of freedom
    degrees_of_freedom: usize,
}

impl Estimate {
    pub(crate) fn new(catalog: &StationCatalog, solution: Solution) -> Self {
        let stations = catalog
            .unknowns()
            .map(|sta| sta.code.clone())
            .collect::<Vec<_>>();

        let offsets = catalog
            .unknowns()
            .filter_map(|sta| Some((sta.code.clone(), 3 * sta.unknown_index()?)))
            .collect();

        Self {
            stations,
            offsets,
            xchap: solution.xchap,
            residuals: solution.residuals,
            vtpv: solution.vtpv,
            degrees_of_freedom: solution.degrees_of_freedom,
        }
    }

    /// Raw estimate vector, of length 3 x number of unknown stations
    pub fn xchap(&self) -> &DVector<f64> {
        &self.xchap
    }

    /// Offset of this station's coordinates in [Self::xchap]
    pub fn offset_of(&self, code: &str) -> Result<usize, Error> {
        self.offsets
            .get(code)
            .copied()
            .ok_or_else(|| Error::UnknownStation(code.to_string()))
    }

    /// Estimated ECEF coordinates (m) of this station
    pub fn coordinates(&self, code: &str) -> Result<Vector3<f64>, Error> {
        let offset = self.offset_of(code)?;
        Ok(Vector3::new(
            self.xchap[offset],
            self.xchap[offset + 1],
            self.xchap[offset + 2],
        ))
    }

    /// Iterates estimated stations and their coordinates, in unknown index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vector3<f64>)> + '_ {
        self.stations.iter().enumerate().map(|(nth, code)| {
            let offset = 3 * nth;
            (
                code.as_str(),
                Vector3::new(
                    self.xchap[offset],
                    self.xchap[offset + 1],
                    self.xchap[offset + 2],
                ),
            )
        })
    }

    /// Number of estimated stations
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Post-fit residual of this baseline, identified by its order index
    pub fn residuals(&self, order_index: usize) -> Option<Vector3<f64>> {
        let offset = 3 * order_index;
        if offset + 3 > self.residuals.nrows() {
            return None;
        }
        Some(Vector3::new(
            self.residuals[offset],
            self.residuals[offset + 1],
            self.residuals[offset + 2],
        ))
    }

    /// Weighted residuals square sum `Vt.P.V`
    pub fn weighted_square_sum(&self) -> f64 {
        self.vtpv
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    /// Reference variance `Vt.P.V / r`, undefined without redundancy.
    pub fn reference_variance(&self) -> Option<f64> {
        if self.degrees_of_freedom > 0 {
            Some(self.vtpv / self.degrees_of_freedom as f64)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (code, coords) in self.iter() {
            writeln!(
                f,
                "{:<8} X={:.4}m Y={:.4}m Z={:.4}m",
                code, coords[0], coords[1], coords[2]
            )?;
        }
        match self.reference_variance() {
            Some(s0) => write!(f, "dof={} s0²={:.6E}", self.degrees_of_freedom, s0),
            None => write!(f, "dof=0"),
        }
    }
}
