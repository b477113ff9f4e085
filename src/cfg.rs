use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Configuration Error
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("unknown weighting convention \"{0}\"")]
    UnknownWeighting(String),
}

/// Describes what each baseline contributes to the weight matrix.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Weighting {
    /// Baseline covariance is used as is, in the weight slot.
    /// This reproduces the historical processing of our baseline networks.
    #[default]
    Covariance,
    /// Baseline covariance is inverted, which is the usual weighted
    /// least squares formulation. Requires invertible covariances.
    InverseCovariance,
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Covariance => write!(fmt, "covariance"),
            Self::InverseCovariance => write!(fmt, "inverse-covariance"),
        }
    }
}

impl std::str::FromStr for Weighting {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "covariance" | "cov" => Ok(Self::Covariance),
            "inverse-covariance" | "inverse" | "inv" => Ok(Self::InverseCovariance),
            _ => Err(Error::UnknownWeighting(s.to_string())),
        }
    }
}

fn default_singularity_threshold() -> f64 {
    1.0E-12
}

/// Network adjustment [Config]uration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Codes of the reference stations. Their coordinates are
    /// considered perfectly known and are not solved for.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixed_stations: Vec<String>,
    /// [Weighting] convention
    #[cfg_attr(feature = "serde", serde(default))]
    pub weighting: Weighting,
    /// Normal matrix singular values below `threshold * max(singular values)`
    /// are considered null. A single null singular value rejects the system.
    #[cfg_attr(feature = "serde", serde(default = "default_singularity_threshold"))]
    pub singularity_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixed_stations: Default::default(),
            weighting: Default::default(),
            singularity_threshold: default_singularity_threshold(),
        }
    }
}

impl Config {
    /// Returns [Config] with given list of fixed stations
    pub fn with_fixed_stations<S: AsRef<str>>(&self, codes: &[S]) -> Self {
        let mut s = self.clone();
        s.fixed_stations = codes.iter().map(|code| code.as_ref().to_string()).collect();
        s
    }

    /// Returns [Config] with desired [Weighting] convention
    pub fn with_weighting(&self, weighting: Weighting) -> Self {
        let mut s = self.clone();
        s.weighting = weighting;
        s
    }

    /// Returns [Config] with updated singularity threshold
    pub fn with_singularity_threshold(&self, threshold: f64) -> Self {
        let mut s = self.clone();
        s.singularity_threshold = threshold;
        s
    }

    pub(crate) fn is_fixed(&self, code: &str) -> bool {
        self.fixed_stations.iter().any(|fixed| fixed == code)
    }
}
