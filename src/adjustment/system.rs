use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::{
    adjustment::contribution::Contribution, baseline::Baseline, catalog::StationCatalog,
    cfg::Weighting, error::Error,
};

/// [LinearSystem] gathers the global observation system `A.x = B`
/// and its block diagonal weight matrix `P`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// Design matrix (3.n_baselines x 3.n_unknowns)
    a: DMatrix<f64>,
    /// Observation vector (3.n_baselines)
    b: DVector<f64>,
    /// Weight matrix (3.n_baselines x 3.n_baselines)
    p: DMatrix<f64>,
}

impl LinearSystem {
    /// Null system
    fn zeros(num_baselines: usize, num_unknowns: usize) -> Self {
        Self {
            a: DMatrix::zeros(3 * num_baselines, 3 * num_unknowns),
            b: DVector::zeros(3 * num_baselines),
            p: DMatrix::zeros(3 * num_baselines, 3 * num_baselines),
        }
    }

    /// Writes this [Contribution] into its own row block.
    fn apply(mut self, contribution: &Contribution) -> Self {
        let row = 3 * contribution.row_block;

        for (unknown, block) in contribution.design_blocks() {
            self.a
                .fixed_view_mut::<3, 3>(row, 3 * unknown)
                .copy_from(&block);
        }

        self.b
            .fixed_rows_mut::<3>(row)
            .copy_from(&contribution.observation);

        self.p
            .fixed_view_mut::<3, 3>(row, row)
            .copy_from(&contribution.weight);

        self
    }

    /// Assembles the [LinearSystem] from the list of [Baseline]s.
    /// Each [Baseline] is stored in the row block selected by its order index.
    /// ## Input
    /// - baselines: [Baseline]s, whose order indices must cover `0..baselines.len()`
    /// - catalog: [StationCatalog]
    /// - weighting: [Weighting] convention
    pub fn assemble(
        baselines: &[Baseline],
        catalog: &StationCatalog,
        weighting: Weighting,
    ) -> Result<Self, Error> {
        let num_baselines = baselines.len();
        let mut placed = vec![false; num_baselines];

        for baseline in baselines.iter() {
            let order_index = baseline.order_index();
            match placed.get_mut(order_index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::InvalidOrderIndex {
                        order_index,
                        num_baselines,
                    });
                },
            }
        }

        let contributions = baselines
            .iter()
            .map(|baseline| Contribution::new(baseline.order_index(), baseline, catalog, weighting))
            .collect::<Result<Vec<_>, _>>()?;

        let system = contributions.iter().fold(
            Self::zeros(num_baselines, catalog.num_unknowns()),
            |system, contribution| system.apply(contribution),
        );

        debug!(
            "linear system: A={}x{} B={} P={}x{} ({} weighting)",
            system.a.nrows(),
            system.a.ncols(),
            system.b.nrows(),
            system.p.nrows(),
            system.p.ncols(),
            weighting,
        );

        Ok(system)
    }

    /// Design matrix
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Observation vector
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    /// Weight matrix
    pub fn p(&self) -> &DMatrix<f64> {
        &self.p
    }

    pub fn num_baselines(&self) -> usize {
        self.a.nrows() / 3
    }

    pub fn num_unknowns(&self) -> usize {
        self.a.ncols() / 3
    }

    /// Forms the normal equations: returns `N = At.P.A` and `K = At.P.B`
    pub fn normal_equations(&self) -> (DMatrix<f64>, DVector<f64>) {
        let at_p = self.a.transpose() * &self.p;
        let n = &at_p * &self.a;
        let k = &at_p * &self.b;
        (n, k)
    }
}
