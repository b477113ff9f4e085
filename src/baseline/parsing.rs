use std::path::Path;

use itertools::Itertools;
use log::debug;
use nalgebra::Vector3;

use crate::{
    baseline::Baseline,
    error::{Error, ParsingError},
};

/// Number of lines per baseline record
const RECORD_LINES: usize = 4;

/// Expected number of fields on each line of a record
const RECORD_FIELDS: [usize; RECORD_LINES] = [5, 3, 2, 1];

/// Splits a line into its fields, making sure the count is correct.
fn fields(line: &str, line_number: usize, expected: usize) -> Result<Vec<&str>, ParsingError> {
    let fields = line.split_whitespace().collect_vec();
    if fields.len() == expected {
        Ok(fields)
    } else {
        Err(ParsingError::TokenCount {
            line: line_number,
            expected,
            found: fields.len(),
        })
    }
}

/// Parses a finite number: `NaN` and infinities are rejected.
pub(crate) fn parse_f64(token: &str, line_number: usize) -> Result<f64, ParsingError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParsingError::InvalidNumber {
            line: line_number,
            token: token.to_string(),
        })
}

impl Baseline {
    /// Parses one [Baseline] from its four lines:
    /// ```text
    /// MLXC         CTA2            -4206.3904    12289.6029     2539.9962
    /// 26.661961940862E-08     17.774641293908E-09     14.219713035126E-08
    /// 71.098565175632E-09     17.774641293908E-09
    /// 23.107033682080E-08
    /// ```
    /// - order_index: position in the baseline sequence
    /// - first_line: 1-based line number of the first line, for error reports
    pub fn from_lines(
        order_index: usize,
        first_line: usize,
        lines: [&str; RECORD_LINES],
    ) -> Result<Self, ParsingError> {
        let mut values = Vec::with_capacity(9);
        let mut codes = ("", "");

        for (nth, (line, expected)) in lines.iter().zip(RECORD_FIELDS).enumerate() {
            let line_number = first_line + nth;
            let fields = fields(line, line_number, expected)?;

            let numbers = if nth == 0 {
                codes = (fields[0], fields[1]);
                &fields[2..]
            } else {
                &fields[..]
            };

            for token in numbers {
                values.push(parse_f64(token, line_number)?);
            }
        }

        let delta = Vector3::new(values[0], values[1], values[2]);
        let packed = [
            values[3], values[4], values[5], values[6], values[7], values[8],
        ];

        Ok(Self::new(order_index, codes.0, codes.1, delta, packed))
    }
}

/// Parses a baseline file content into an ordered list of [Baseline]s.
/// Order of appearance defines each [Baseline] order index.
/// Trailing blank lines are ignored, any other irregularity aborts the whole
/// parsing process.
pub fn parse_baselines(content: &str) -> Result<Vec<Baseline>, ParsingError> {
    let mut lines = content.lines().collect_vec();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() % RECORD_LINES != 0 {
        return Err(ParsingError::TruncatedRecord { lines: lines.len() });
    }

    let baselines = lines
        .chunks_exact(RECORD_LINES)
        .enumerate()
        .map(|(order_index, record)| {
            Baseline::from_lines(
                order_index,
                order_index * RECORD_LINES + 1,
                [record[0], record[1], record[2], record[3]],
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("parsed {} baselines", baselines.len());
    Ok(baselines)
}

/// Reads and parses a baseline file, see [parse_baselines].
pub fn read_baselines<P: AsRef<Path>>(path: P) -> Result<Vec<Baseline>, Error> {
    let content = std::fs::read_to_string(path)?;
    let baselines = parse_baselines(&content)?;
    Ok(baselines)
}
