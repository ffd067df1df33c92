//! Loader for precomputed airport distance matrices.
//!
//! A matrix file is comma separated: a header row of airport codes followed
//! by one row of distances (kilometres) per code, in header order.
//!
//! ```text
//! SOF,BOJ,LHR
//! 0,335.4,2029.1
//! 335.4,0,2320.6
//! 2029.1,2320.6,0
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

/// Error type for matrix loading.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("Distance matrix not found at: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read distance matrix: {0}")]
    Csv(#[from] csv::Error),
    #[error("Distance matrix has no header row")]
    MissingHeader,
}

/// Square table of distances between airport codes.
///
/// Row `i` always belongs to `codes[i]`; a row that failed to load is a hole,
/// never a shift.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    codes: Vec<String>,
    rows: Vec<Option<Vec<f64>>>,
}

impl DistanceMatrix {
    /// Load a matrix from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MatrixError::NotFound(path.to_path_buf()));
        }
        Self::from_reader(File::open(path)?)
    }

    /// Load a matrix from a reader.
    ///
    /// Rows whose length differs from the header, or that contain values
    /// that do not parse as numbers, are skipped with a warning and their
    /// code has no distances. Rows past the last header code are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MatrixError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let codes: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if codes.iter().all(String::is_empty) {
            return Err(MatrixError::MissingHeader);
        }

        let mut rows: Vec<Option<Vec<f64>>> = Vec::with_capacity(codes.len());
        let mut extra = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable matrix row");
                    if rows.len() < codes.len() {
                        rows.push(None);
                    } else {
                        extra += 1;
                    }
                    continue;
                }
            };
            if rows.len() == codes.len() {
                extra += 1;
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            let code = &codes[rows.len()];

            if record.len() != codes.len() {
                tracing::warn!(
                    line,
                    code = %code,
                    found = record.len(),
                    expected = codes.len(),
                    "Skipping malformed matrix row"
                );
                rows.push(None);
                continue;
            }
            match record
                .iter()
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(row) => rows.push(Some(row)),
                Err(e) => {
                    tracing::warn!(line, code = %code, error = %e, "Skipping unparseable matrix row");
                    rows.push(None);
                }
            }
        }

        if extra > 0 {
            tracing::warn!(
                extra,
                expected = codes.len(),
                "Distance matrix has more rows than header codes, ignoring the rest"
            );
        } else if rows.len() < codes.len() {
            tracing::warn!(
                rows = rows.len(),
                expected = codes.len(),
                "Distance matrix row count does not match header"
            );
        }

        Ok(Self { codes, rows })
    }

    /// Airport codes in header order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Number of codes in the header.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Distance from `a` to `b`, if both codes and the row are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.codes.iter().position(|c| c == a)?;
        let col = self.codes.iter().position(|c| c == b)?;
        self.rows.get(row)?.as_ref()?.get(col).copied()
    }

    /// Every off-diagonal cell of the loaded rows as
    /// `(row_code, column_code, km)`.
    ///
    /// Both orientations of a pair are yielded; callers canonicalise.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.codes
            .iter()
            .zip(&self.rows)
            .enumerate()
            .filter_map(|(r, (code, row))| row.as_ref().map(|row| (r, code.as_str(), row)))
            .flat_map(move |(r, code, row)| {
                self.codes
                    .iter()
                    .zip(row)
                    .enumerate()
                    .filter(move |(c, _)| *c != r)
                    .map(move |(_, (other, km))| (code, other.as_str(), *km))
            })
    }
}
