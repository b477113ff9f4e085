//! Station catalog
use std::{collections::HashMap, io::Read, path::Path};

use itertools::Itertools;
use log::debug;
use nalgebra::Vector3;

use crate::{
    baseline::parse_f64,
    error::{Error, ParsingError},
};

/// [StationStatus] tells whether a station is being solved for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StationStatus {
    /// Reference station with known coordinates, treated as error free.
    Fixed,
    /// Station whose coordinates are estimated. Holds the station's
    /// unknown index, which defines its 3 column block in the design matrix.
    Unknown(usize),
}

/// Network [Station]
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Station code
    pub code: String,
    /// Approximate ECEF coordinates (m)
    pub approx_coord: Vector3<f64>,
    /// [StationStatus]
    pub status: StationStatus,
}

impl Station {
    pub fn is_fixed(&self) -> bool {
        self.status == StationStatus::Fixed
    }

    /// Returns unknown index, if this station is being solved for.
    pub fn unknown_index(&self) -> Option<usize> {
        match self.status {
            StationStatus::Fixed => None,
            StationStatus::Unknown(index) => Some(index),
        }
    }
}

/// [StationCatalog] gathers every [Station] of the network, in catalog order,
/// and splits them between fixed and unknown stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationCatalog {
    /// [Station]s in catalog order
    stations: Vec<Station>,
    /// Station code to position in the catalog
    lut: HashMap<String, usize>,
    /// Number of unknown stations
    num_unknowns: usize,
}

impl StationCatalog {
    /// Builds a new [StationCatalog].
    /// ## Input
    /// - stations: (code, approximate coordinates) in catalog order
    /// - fixed_codes: codes of the reference stations
    /// ## Returns
    /// - [StationCatalog] where each remaining station is given
    ///   a dense unknown index, in catalog order
    /// - [ParsingError::DuplicateStation] if a code appears twice,
    ///   `row` being the 1-based position of its second occurrence
    /// - [Error::UnknownStation] if a fixed code has no coordinates
    pub fn new<S: AsRef<str>>(
        stations: Vec<(String, Vector3<f64>)>,
        fixed_codes: &[S],
    ) -> Result<Self, Error> {
        if let Some(code) = stations.iter().map(|(code, _)| code).duplicates().next() {
            let row = stations
                .iter()
                .positions(|(c, _)| c == code)
                .nth(1)
                .unwrap_or_default()
                + 1;

            return Err(ParsingError::DuplicateStation {
                row,
                code: code.to_string(),
            }
            .into());
        }

        for fixed in fixed_codes {
            let fixed = fixed.as_ref();
            if !stations.iter().any(|(code, _)| code == fixed) {
                return Err(Error::UnknownStation(fixed.to_string()));
            }
        }

        let mut num_unknowns = 0;
        let mut lut = HashMap::with_capacity(stations.len());

        let stations = stations
            .into_iter()
            .enumerate()
            .map(|(nth, (code, approx_coord))| {
                let status = if fixed_codes.iter().any(|fixed| fixed.as_ref() == code) {
                    StationStatus::Fixed
                } else {
                    num_unknowns += 1;
                    StationStatus::Unknown(num_unknowns - 1)
                };

                lut.insert(code.clone(), nth);

                Station {
                    code,
                    approx_coord,
                    status,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "station catalog: {} stations ({} fixed: {})",
            stations.len(),
            stations.len() - num_unknowns,
            stations
                .iter()
                .filter(|sta| sta.is_fixed())
                .map(|sta| &sta.code)
                .join(", "),
        );

        Ok(Self {
            stations,
            lut,
            num_unknowns,
        })
    }

    /// Builds a new [StationCatalog] from `code; X; Y; Z` rows.
    /// Row order defines catalog order.
    pub fn from_reader<R: Read, S: AsRef<str>>(
        reader: R,
        fixed_codes: &[S],
    ) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stations = Vec::<(String, Vector3<f64>)>::new();

        for (nth, record) in rdr.records().enumerate() {
            let row = nth + 1;
            let record = record.map_err(ParsingError::from)?;

            if record.len() != 4 {
                return Err(ParsingError::CatalogFieldCount {
                    row,
                    found: record.len(),
                }
                .into());
            }

            let code = record[0].to_string();

            let mut coords = [0.0_f64; 3];
            for (i, coord) in coords.iter_mut().enumerate() {
                *coord = parse_f64(&record[i + 1], row)?;
            }

            stations.push((code, Vector3::from(coords)));
        }

        Self::new(stations, fixed_codes)
    }

    /// Reads a coordinates file, see [Self::from_reader].
    pub fn from_path<P: AsRef<Path>, S: AsRef<str>>(
        path: P,
        fixed_codes: &[S],
    ) -> Result<Self, Error> {
        let fd = std::fs::File::open(path)?;
        Self::from_reader(fd, fixed_codes)
    }

    /// Total number of stations
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Number of stations being solved for
    pub fn num_unknowns(&self) -> usize {
        self.num_unknowns
    }

    /// Returns [Station] identified by code
    pub fn station(&self, code: &str) -> Result<&Station, Error> {
        self.lut
            .get(code)
            .map(|nth| &self.stations[*nth])
            .ok_or_else(|| Error::UnknownStation(code.to_string()))
    }

    /// Returns true if this station is a fixed reference.
    /// Stations absent from the catalog are not fixed.
    pub fn is_fixed(&self, code: &str) -> bool {
        self.station(code).is_ok_and(|sta| sta.is_fixed())
    }

    /// Approximate coordinates of any station of the catalog.
    pub fn coordinate_of(&self, code: &str) -> Result<Vector3<f64>, Error> {
        Ok(self.station(code)?.approx_coord)
    }

    /// Unknown index of a station being solved for.
    /// Fails if this station is fixed or absent from the catalog.
    pub fn unknown_index_of(&self, code: &str) -> Result<usize, Error> {
        self.station(code)?
            .unknown_index()
            .ok_or_else(|| Error::NotAnUnknown(code.to_string()))
    }

    /// Iterates all [Station]s in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter()
    }

    /// Iterates unknown [Station]s, in unknown index order
    pub fn unknowns(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter().filter(|sta| !sta.is_fixed())
    }

    /// Iterates fixed [Station]s
    pub fn fixed(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter().filter(|sta| sta.is_fixed())
    }
}

#[cfg(test)]
mod test {
    use super::{StationCatalog, StationStatus};
    use crate::error::{Error, ParsingError};
    use nalgebra::Vector3;

    const COORDS: &str = "BANON; 4578071.0000; 457896.3000; 4403217.1000
CTA2 ;4582135.1010; 470185.4400; 4405757.0200
VLX1; 4579231.5500; 462033.9800; 4408154.9100
MLXC; 4586341.4870; 457895.9030; 4403216.4010
";

    #[test]
    fn catalog_from_coordinates_file() {
        let catalog = StationCatalog::from_reader(COORDS.as_bytes(), &["BANON", "VLX1"]).unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.num_unknowns(), 2);

        assert!(catalog.is_fixed("BANON"));
        assert!(catalog.is_fixed("VLX1"));
        assert!(!catalog.is_fixed("CTA2"));
        assert!(!catalog.is_fixed("MLXC"));
        assert!(!catalog.is_fixed("NONE"));

        assert_eq!(catalog.unknown_index_of("CTA2").unwrap(), 0);
        assert_eq!(catalog.unknown_index_of("MLXC").unwrap(), 1);

        assert_eq!(
            catalog.coordinate_of("BANON").unwrap(),
            Vector3::new(4578071.0, 457896.3, 4403217.1)
        );
        assert_eq!(
            catalog.coordinate_of("CTA2").unwrap(),
            Vector3::new(4582135.101, 470185.44, 4405757.02)
        );

        let unknowns = catalog.unknowns().map(|sta| sta.code.as_str()).collect::<Vec<_>>();
        assert_eq!(unknowns, vec!["CTA2", "MLXC"]);

        let fixed = catalog.fixed().map(|sta| sta.code.as_str()).collect::<Vec<_>>();
        assert_eq!(fixed, vec!["BANON", "VLX1"]);

        assert_eq!(
            catalog.station("MLXC").unwrap().status,
            StationStatus::Unknown(1)
        );
    }

    #[test]
    fn unknown_index_lookup_failures() {
        let catalog = StationCatalog::from_reader(COORDS.as_bytes(), &["BANON"]).unwrap();

        match catalog.unknown_index_of("BANON") {
            Err(Error::NotAnUnknown(code)) => assert_eq!(code, "BANON"),
            other => panic!("invalid result: {:?}", other),
        }

        match catalog.unknown_index_of("XXXX") {
            Err(Error::UnknownStation(code)) => assert_eq!(code, "XXXX"),
            other => panic!("invalid result: {:?}", other),
        }

        assert!(catalog.coordinate_of("XXXX").is_err());
    }

    #[test]
    fn no_fixed_stations() {
        let catalog = StationCatalog::from_reader(COORDS.as_bytes(), &[] as &[&str]).unwrap();
        assert_eq!(catalog.num_unknowns(), 4);
        assert_eq!(catalog.unknown_index_of("BANON").unwrap(), 0);
        assert_eq!(catalog.unknown_index_of("MLXC").unwrap(), 3);
    }

    #[test]
    fn fixed_station_without_coordinates() {
        match StationCatalog::from_reader(COORDS.as_bytes(), &["ZZZZ"]) {
            Err(Error::UnknownStation(code)) => assert_eq!(code, "ZZZZ"),
            other => panic!("invalid result: {:?}", other),
        }
    }

    #[test]
    fn malformed_coordinates_file() {
        let content = COORDS.replace("457896.3000", "45x896");
        match StationCatalog::from_reader(content.as_bytes(), &["BANON"]) {
            Err(Error::Parsing(ParsingError::InvalidNumber { line, token })) => {
                assert_eq!(line, 1);
                assert_eq!(token, "45x896");
            },
            other => panic!("invalid result: {:?}", other),
        }

        let content = COORDS.replace("; 462033.9800", "");
        match StationCatalog::from_reader(content.as_bytes(), &["BANON"]) {
            Err(Error::Parsing(ParsingError::CatalogFieldCount { row, found })) => {
                assert_eq!(row, 3);
                assert_eq!(found, 3);
            },
            other => panic!("invalid result: {:?}", other),
        }

        let content = format!("{}MLXC; 1.0; 2.0; 3.0\n", COORDS);
        match StationCatalog::from_reader(content.as_bytes(), &["BANON"]) {
            Err(Error::Parsing(ParsingError::DuplicateStation { row, code })) => {
                assert_eq!(row, 5);
                assert_eq!(code, "MLXC");
            },
            other => panic!("invalid result: {:?}", other),
        }

        for token in ["NaN", "inf", "-Infinity"] {
            let content = COORDS.replace("4408154.9100", token);
            match StationCatalog::from_reader(content.as_bytes(), &["BANON"]) {
                Err(Error::Parsing(ParsingError::InvalidNumber { line, token: found })) => {
                    assert_eq!(line, 3);
                    assert_eq!(found, token);
                },
                other => panic!("\"{}\" should have been rejected: {:?}", token, other),
            }
        }
    }

    #[test]
    fn duplicate_station_codes() {
        let stations = vec![
            ("F".to_string(), Vector3::zeros()),
            ("U".to_string(), Vector3::new(1.0, 2.0, 3.0)),
            ("U".to_string(), Vector3::new(4.0, 5.0, 6.0)),
        ];

        match StationCatalog::new(stations, &["F"]) {
            Err(Error::Parsing(ParsingError::DuplicateStation { row, code })) => {
                assert_eq!(row, 3);
                assert_eq!(code, "U");
            },
            other => panic!("invalid result: {:?}", other),
        }
    }
}
