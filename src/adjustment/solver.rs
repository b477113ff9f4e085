//! Normal equations solver
use log::{debug, error};
use nalgebra::{DMatrix, DVector};

use crate::{adjustment::system::LinearSystem, error::Error};

/// Least squares [Solution]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Estimated unknowns vector
    pub xchap: DVector<f64>,
    /// Post-fit residuals `V = A.Xchap - B`
    pub residuals: DVector<f64>,
    /// Weighted residuals square sum `Vt.P.V`
    pub vtpv: f64,
    /// Degrees of freedom: number of observations minus number of unknowns
    pub degrees_of_freedom: usize,
}

/// Numerical rank of a symmetric matrix: number of singular values
/// above `threshold * max(singular values)`.
pub(crate) fn numerical_rank(n: &DMatrix<f64>, threshold: f64) -> usize {
    let singular_values = n.singular_values();
    let max = singular_values.max();

    if !(max > 0.0) {
        return 0;
    }

    singular_values
        .iter()
        .filter(|sigma| **sigma > threshold * max)
        .count()
}

/// Forms and solves the normal equations `At.P.A.Xchap = At.P.B`.
/// ## Input
/// - system: assembled [LinearSystem]
/// - threshold: relative singular value threshold, to detect rank deficiency
/// ## Returns
/// - [Solution] on success
/// - [Error::SingularSystem] when the normal matrix is not invertible
pub fn solve_normal_equations(system: &LinearSystem, threshold: f64) -> Result<Solution, Error> {
    let (n, k) = system.normal_equations();
    let dimension = n.nrows();

    let xchap = if dimension == 0 {
        DVector::zeros(0)
    } else {
        let rank = numerical_rank(&n, threshold);
        debug!("normal matrix: {}x{} rank={}", dimension, dimension, rank);

        if rank < dimension {
            error!("rank deficient normal matrix: {} < {}", rank, dimension);
            return Err(Error::SingularSystem { rank, dimension });
        }

        match n.clone().cholesky() {
            Some(cholesky) => cholesky.solve(&k),
            None => {
                debug!("normal matrix is not positive definite: using LU decomposition");
                n.lu()
                    .solve(&k)
                    .ok_or(Error::SingularSystem { rank, dimension })?
            },
        }
    };

    let residuals = system.a() * &xchap - system.b();
    let vtpv = residuals.dot(&(system.p() * &residuals));

    Ok(Solution {
        xchap,
        residuals,
        vtpv,
        degrees_of_freedom: system.a().nrows().saturating_sub(dimension),
    })
}
