//! GNSS baseline observations
use nalgebra::{Matrix3, Vector3};

mod parsing;

pub use parsing::{parse_baselines, read_baselines};

pub(crate) use parsing::parse_f64;

/// Rebuilds a symmetric covariance matrix from its six packed components
/// `[σx², σxy, σxz, σy², σyz, σz²]`.
pub fn covariance_from_packed(packed: [f64; 6]) -> Matrix3<f64> {
    let [c11, c12, c13, c22, c23, c33] = packed;
    Matrix3::new(
        c11, c12, c13, //
        c12, c22, c23, //
        c13, c23, c33,
    )
}

/// [Baseline] is one relative position observation `X(code2) - X(code1)`,
/// along with its covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    /// Position in the baseline sequence, defines the row block
    /// `[3k, 3k+3)` in all global matrices.
    order_index: usize,
    /// Origin station
    code1: String,
    /// Destination station
    code2: String,
    /// Measured position difference (m)
    delta: Vector3<f64>,
    /// Symmetric covariance (m²)
    covariance: Matrix3<f64>,
}

impl Baseline {
    /// Builds a new [Baseline] from its packed covariance components
    /// `[σx², σxy, σxz, σy², σyz, σz²]`.
    pub fn new(
        order_index: usize,
        code1: &str,
        code2: &str,
        delta: Vector3<f64>,
        packed_covariance: [f64; 6],
    ) -> Self {
        Self {
            order_index,
            code1: code1.to_string(),
            code2: code2.to_string(),
            delta,
            covariance: covariance_from_packed(packed_covariance),
        }
    }

    pub fn order_index(&self) -> usize {
        self.order_index
    }

    pub fn code1(&self) -> &str {
        &self.code1
    }

    pub fn code2(&self) -> &str {
        &self.code2
    }

    pub fn delta(&self) -> Vector3<f64> {
        self.delta
    }

    pub fn covariance(&self) -> Matrix3<f64> {
        self.covariance
    }

    /// Returns true when covariance is null: such a baseline does not
    /// carry any weight with the legacy convention.
    pub fn is_degenerate(&self) -> bool {
        self.covariance.iter().all(|c| *c == 0.0)
    }
}

impl std::fmt::Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {}->{} dX={:.4}m dY={:.4}m dZ={:.4}m σ²=({:.6E}, {:.6E}, {:.6E})",
            self.order_index,
            self.code1,
            self.code2,
            self.delta[0],
            self.delta[1],
            self.delta[2],
            self.covariance[(0, 0)],
            self.covariance[(1, 1)],
            self.covariance[(2, 2)],
        )
    }
}
