use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::{baseline::Baseline, catalog::StationCatalog, cfg::Weighting, error::Error};

/// How a [Baseline] ties into the network, with respect to the
/// fixed stations. Each case holds the unknown index of the
/// estimated end(s).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObservationCase {
    /// Fixed origin, estimated destination
    FixedToUnknown { to: usize },
    /// Estimated origin, fixed destination
    UnknownToFixed { from: usize },
    /// Both ends are estimated
    UnknownToUnknown { from: usize, to: usize },
}

impl ObservationCase {
    /// Classifies this [Baseline].
    /// Fails if one station is missing from the catalog, or if this
    /// [Baseline] does not connect any unknown station.
    pub fn classify(baseline: &Baseline, catalog: &StationCatalog) -> Result<Self, Error> {
        let (code1, code2) = (baseline.code1(), baseline.code2());

        let sta1 = catalog.station(code1)?;
        let sta2 = catalog.station(code2)?;

        if code1 == code2 {
            return Err(Error::SelfBaseline {
                order_index: baseline.order_index(),
                code: code1.to_string(),
            });
        }

        match (sta1.unknown_index(), sta2.unknown_index()) {
            (None, Some(to)) => Ok(Self::FixedToUnknown { to }),
            (Some(from), None) => Ok(Self::UnknownToFixed { from }),
            (Some(from), Some(to)) => Ok(Self::UnknownToUnknown { from, to }),
            (None, None) => Err(Error::FixedBaseline {
                order_index: baseline.order_index(),
                code1: code1.to_string(),
                code2: code2.to_string(),
            }),
        }
    }

    /// Non null sub-blocks of this observation's design row block,
    /// as (unknown index, block).
    pub fn design_blocks(&self) -> Vec<(usize, Matrix3<f64>)> {
        let identity = Matrix3::<f64>::identity();
        match self {
            Self::FixedToUnknown { to } => vec![(*to, identity)],
            Self::UnknownToFixed { from } => vec![(*from, -identity)],
            Self::UnknownToUnknown { from, to } => vec![(*from, -identity), (*to, identity)],
        }
    }
}

/// [Contribution] of a single [Baseline] to the linear system.
/// It only concerns this [Baseline]'s row block, so contributions
/// are independent from one another.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    /// Row block index
    pub row_block: usize,
    /// [ObservationCase]
    pub case: ObservationCase,
    /// Observation vector row block: measured delta, with the
    /// fixed coordinates moved to this side when one end is fixed.
    pub observation: Vector3<f64>,
    /// Weight matrix diagonal block
    pub weight: Matrix3<f64>,
}

impl Contribution {
    /// Forms the [Contribution] of this [Baseline], stored at `row_block`.
    pub fn new(
        row_block: usize,
        baseline: &Baseline,
        catalog: &StationCatalog,
        weighting: Weighting,
    ) -> Result<Self, Error> {
        let case = ObservationCase::classify(baseline, catalog)?;

        let observation = match case {
            ObservationCase::FixedToUnknown { .. } => {
                baseline.delta() + catalog.coordinate_of(baseline.code1())?
            },
            ObservationCase::UnknownToFixed { .. } => {
                baseline.delta() - catalog.coordinate_of(baseline.code2())?
            },
            ObservationCase::UnknownToUnknown { .. } => baseline.delta(),
        };

        let weight = match weighting {
            Weighting::Covariance => baseline.covariance(),
            Weighting::InverseCovariance => {
                baseline
                    .covariance()
                    .try_inverse()
                    .ok_or(Error::SingularCovariance {
                        order_index: baseline.order_index(),
                    })?
            },
        };

        debug!("{} ({:?})", baseline, case);

        Ok(Self {
            row_block,
            case,
            observation,
            weight,
        })
    }

    /// Design row block sub-blocks, see [ObservationCase::design_blocks].
    pub fn design_blocks(&self) -> Vec<(usize, Matrix3<f64>)> {
        self.case.design_blocks()
    }
}

#[cfg(test)]
mod test {
    use super::{Contribution, ObservationCase};
    use crate::{baseline::Baseline, catalog::StationCatalog, cfg::Weighting, error::Error};
    use nalgebra::{Matrix3, Vector3};
    use rstest::*;

    #[fixture]
    fn catalog() -> StationCatalog {
        StationCatalog::new(
            vec![
                ("F1".to_string(), Vector3::new(100.0, 200.0, 300.0)),
                ("U1".to_string(), Vector3::new(1.0, 1.0, 1.0)),
                ("F2".to_string(), Vector3::new(-10.0, -20.0, -30.0)),
                ("U2".to_string(), Vector3::new(2.0, 2.0, 2.0)),
            ],
            &["F1", "F2"],
        )
        .unwrap()
    }

    fn baseline(code1: &str, code2: &str) -> Baseline {
        Baseline::new(
            7,
            code1,
            code2,
            Vector3::new(1.0, 2.0, 3.0),
            [4.0, 1.0, 0.0, 2.0, 0.0, 1.0],
        )
    }

    #[rstest]
    #[case("F1", "U1", ObservationCase::FixedToUnknown { to: 0 })]
    #[case("F2", "U2", ObservationCase::FixedToUnknown { to: 1 })]
    #[case("U2", "F1", ObservationCase::UnknownToFixed { from: 1 })]
    #[case("U1", "U2", ObservationCase::UnknownToUnknown { from: 0, to: 1 })]
    #[case("U2", "U1", ObservationCase::UnknownToUnknown { from: 1, to: 0 })]
    fn classification(
        catalog: StationCatalog,
        #[case] code1: &str,
        #[case] code2: &str,
        #[case] expected: ObservationCase,
    ) {
        let case = ObservationCase::classify(&baseline(code1, code2), &catalog).unwrap();
        assert_eq!(case, expected);

        let blocks = case.design_blocks();
        match case {
            ObservationCase::UnknownToUnknown { .. } => assert_eq!(blocks.len(), 2),
            _ => assert_eq!(blocks.len(), 1),
        }

        for (_, block) in blocks {
            assert!(block == Matrix3::identity() || block == -Matrix3::identity());
        }
    }

    #[rstest]
    fn fixed_to_fixed_is_rejected(catalog: StationCatalog) {
        match ObservationCase::classify(&baseline("F1", "F2"), &catalog) {
            Err(Error::FixedBaseline {
                order_index,
                code1,
                code2,
            }) => {
                assert_eq!(order_index, 7);
                assert_eq!(code1, "F1");
                assert_eq!(code2, "F2");
            },
            other => panic!("invalid result: {:?}", other),
        }
    }

    #[rstest]
    fn self_baseline_is_rejected(catalog: StationCatalog) {
        match ObservationCase::classify(&baseline("U1", "U1"), &catalog) {
            Err(Error::SelfBaseline { order_index, code }) => {
                assert_eq!(order_index, 7);
                assert_eq!(code, "U1");
            },
            other => panic!("invalid result: {:?}", other),
        }
    }

    #[rstest]
    fn missing_station(catalog: StationCatalog) {
        match ObservationCase::classify(&baseline("U1", "XX"), &catalog) {
            Err(Error::UnknownStation(code)) => assert_eq!(code, "XX"),
            other => panic!("invalid result: {:?}", other),
        }
    }

    #[rstest]
    fn observation_vector(catalog: StationCatalog) {
        let c =
            Contribution::new(0, &baseline("F1", "U1"), &catalog, Weighting::Covariance).unwrap();
        assert_eq!(c.observation, Vector3::new(101.0, 202.0, 303.0));

        let c =
            Contribution::new(0, &baseline("U1", "F2"), &catalog, Weighting::Covariance).unwrap();
        assert_eq!(c.observation, Vector3::new(11.0, 22.0, 33.0));

        let c =
            Contribution::new(0, &baseline("U1", "U2"), &catalog, Weighting::Covariance).unwrap();
        assert_eq!(c.observation, Vector3::new(1.0, 2.0, 3.0));
    }

    #[rstest]
    fn weight_conventions(catalog: StationCatalog) {
        let bl = baseline("F1", "U1");

        let c = Contribution::new(3, &bl, &catalog, Weighting::Covariance).unwrap();
        assert_eq!(c.row_block, 3);
        assert_eq!(c.weight, bl.covariance());

        let c = Contribution::new(3, &bl, &catalog, Weighting::InverseCovariance).unwrap();
        let product = c.weight * bl.covariance();
        assert!((product - Matrix3::identity()).norm() < 1.0E-12);
    }

    #[rstest]
    fn singular_covariance(catalog: StationCatalog) {
        let bl = Baseline::new(2, "F1", "U1", Vector3::zeros(), [0.0; 6]);

        assert!(Contribution::new(2, &bl, &catalog, Weighting::Covariance).is_ok());

        match Contribution::new(2, &bl, &catalog, Weighting::InverseCovariance) {
            Err(Error::SingularCovariance { order_index }) => assert_eq!(order_index, 2),
            other => panic!("invalid result: {:?}", other),
        }
    }
}
