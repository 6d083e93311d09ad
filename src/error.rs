//! Error types for the vector search core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("malformed CSV {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path:?} row {row}: expected {expected} fields, got {got}")]
    FieldCount {
        path: PathBuf,
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("{path:?} row {row}: unparseable value {value:?}")]
    Parse {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("cluster {index}: dimension {got} does not match metadata dimension {expected}")]
    DimensionMismatch { index: u64, expected: u64, got: u64 },

    #[error("cluster {index}: precision {got} does not match requested {expected}")]
    PrecisionMismatch { index: u64, expected: u64, got: u64 },

    #[error("total vector count {got} does not match metadata count {expected}")]
    VectorCountMismatch { expected: u64, got: u64 },

    #[error("precBits must be in 1..=7 to fit i8, got {0}")]
    UnsupportedPrecision(u64),

    #[error("no clusters given")]
    EmptyDatabase,

    #[error("failed to pick PIR parameters: {0}")]
    ParamSelection(String),

    #[error("query has {got} components, database dimension is {expected}")]
    QueryDimension { expected: u64, got: u64 },

    #[error("unknown cluster id {0}")]
    UnknownCluster(u64),

    #[error("cluster {0} yielded no scores")]
    EmptyReconstruction(u64),
}

impl Error {
    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Error::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
