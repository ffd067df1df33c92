//! Parser for the delimited airport dataset.
//!
//! The dataset is a delimited text file with a header row followed by one
//! airport per row:
//!
//! ```text
//! name;country;region;municipality;latitude;longitude;type;primary_code[;secondary_code]
//! ```
//!
//! Fields may be quoted, in which case they can contain the delimiter. The
//! secondary code column is optional. Rows with the wrong number of columns
//! or coordinates that do not parse are reported and skipped.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{Airport, AirportClass};

/// Column delimiter used by the bundled dataset.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Columns every row must carry.
const REQUIRED_COLUMNS: usize = 8;
/// Columns when the optional secondary code is present.
const MAX_COLUMNS: usize = 9;

/// Error type for dataset parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map_or(0, |p| p.line() as usize);
        match e.into_kind() {
            csv::ErrorKind::Io(io) => ParseError::Io(io),
            kind => ParseError::MalformedRow {
                line,
                message: format!("{:?}", kind),
            },
        }
    }
}

/// Parser for the delimited airport dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetParser {
    delimiter: u8,
}

impl DatasetParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Parse airports from a reader.
    ///
    /// This is a streaming parser; the header row is consumed and never
    /// yielded. Malformed rows are yielded as errors so callers decide
    /// whether to stop.
    pub fn parse<R: Read>(&self, reader: R) -> impl Iterator<Item = Result<Airport, ParseError>> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader)
            .into_records()
            .map(|record| parse_record(&record?))
    }

    /// Parse all airports into a vector.
    ///
    /// Skips malformed rows and logs a warning for each of them.
    pub fn parse_all<R: Read>(&self, reader: R) -> Result<Vec<Airport>, ParseError> {
        let mut airports = Vec::new();
        let mut skipped = 0usize;
        for result in self.parse(reader) {
            match result {
                Ok(airport) => airports.push(airport),
                Err(ParseError::Io(e)) => return Err(ParseError::Io(e)),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping dataset row: {}", e);
                }
            }
        }
        if skipped > 0 {
            tracing::warn!(skipped, parsed = airports.len(), "Dataset contained malformed rows");
        }
        Ok(airports)
    }
}

impl Default for DatasetParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

fn parse_record(record: &StringRecord) -> Result<Airport, ParseError> {
    let line = record.position().map_or(0, |p| p.line() as usize);
    let malformed = |message: String| ParseError::MalformedRow { line, message };

    if !(REQUIRED_COLUMNS..=MAX_COLUMNS).contains(&record.len()) {
        return Err(malformed(format!(
            "expected {} or {} columns, found {}",
            REQUIRED_COLUMNS,
            MAX_COLUMNS,
            record.len()
        )));
    }

    let latitude = parse_coordinate(&record[4], "latitude", 90.0).map_err(&malformed)?;
    let longitude = parse_coordinate(&record[5], "longitude", 180.0).map_err(&malformed)?;
    let class = record[6]
        .parse::<AirportClass>()
        .unwrap_or_else(|never| match never {});

    Ok(Airport {
        name: record[0].to_string(),
        country: record[1].to_string(),
        region: record[2].to_string(),
        municipality: record[3].to_string(),
        latitude,
        longitude,
        class,
        primary_code: non_empty(&record[7]),
        secondary_code: record.get(8).and_then(non_empty),
    })
}

fn parse_coordinate(raw: &str, what: &str, limit: f64) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("unparseable {} '{}'", what, raw))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(format!("{} {} out of range", what, value));
    }
    Ok(value)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
