use thiserror::Error;

/// Errors raised while reading baseline or coordinate files.
/// Line and row numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsingError {
    /// A baseline line does not carry the expected number of fields.
    #[error("line {line}: expecting {expected} fields, got {found}")]
    TokenCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Field is not a valid floating point number.
    #[error("line {line}: invalid number \"{token}\"")]
    InvalidNumber { line: usize, token: String },

    /// Baseline records span exactly four lines: any other total means
    /// the file was truncated (or has extra content).
    #[error("truncated baseline record: {lines} lines is not a multiple of 4")]
    TruncatedRecord { lines: usize },

    /// Coordinates rows are `code; X; Y; Z`.
    #[error("row {row}: expecting 4 fields (code; X; Y; Z), got {found}")]
    CatalogFieldCount { row: usize, found: usize },

    /// Station codes must be unique within the catalog.
    #[error("row {row}: duplicate station \"{code}\"")]
    DuplicateStation { row: usize, code: String },

    /// Underlying CSV reader failure.
    #[error("coordinates file: {0}")]
    Csv(String),
}

impl From<csv::Error> for ParsingError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed baseline or coordinates file.
    /// The whole load is aborted, no partial content is returned.
    #[error("parsing error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Station code is not part of the catalog.
    #[error("unknown station \"{0}\"")]
    UnknownStation(String),

    /// An unknown index was requested for a fixed station.
    #[error("station \"{0}\" is fixed: it has no unknown index")]
    NotAnUnknown(String),

    /// Catalog and configuration disagree on the set of fixed stations.
    #[error("station \"{0}\" fixed status does not match the configuration")]
    FixedStationMismatch(String),

    /// Baseline between two fixed stations: nothing to solve for.
    #[error("baseline #{order_index} {code1}->{code2} connects two fixed stations")]
    FixedBaseline {
        order_index: usize,
        code1: String,
        code2: String,
    },

    /// Order indices must enumerate the baselines exactly once, from 0 on,
    /// since each one selects the row block of its baseline.
    #[error("invalid baseline order index #{order_index} (expecting 0..{num_baselines}, once)")]
    InvalidOrderIndex {
        order_index: usize,
        num_baselines: usize,
    },

    /// Baseline from a station to itself.
    #[error("baseline #{order_index} connects \"{code}\" to itself")]
    SelfBaseline { order_index: usize, code: String },

    /// Inverse weighting was requested but this covariance block is not invertible.
    #[error("baseline #{order_index}: covariance is not invertible")]
    SingularCovariance { order_index: usize },

    /// Normal matrix is rank deficient. Happens when an unknown station is not
    /// observed, or when part of the network is not tied to a fixed station.
    #[error("singular normal matrix: rank {rank} < {dimension}")]
    SingularSystem { rank: usize, dimension: usize },
}
