use crate::matrix::Matrix;
use crate::params::LweParams;

/// Public shape of a PIR database: dimensions and plaintext space. Everything
/// the client needs to size queries and decode answers.
#[derive(Debug, Clone, Copy)]
pub struct DbInfo {
    /// Rows in the plaintext matrix
    pub l: usize,
    /// Columns in the plaintext matrix
    pub m: usize,
    /// Plaintext modulus
    pub p: u64,
    /// log2 of the ciphertext modulus
    pub logq: u64,
    /// log2 of the plaintext modulus the records were packed for
    pub record_len: u64,
}

/// A frozen PIR database: an `l × m` matrix of plaintexts, each `< p`.
#[derive(Debug)]
pub struct Database {
    pub info: DbInfo,
    pub data: Matrix,
}

impl Database {
    /// Build a database from a flat row-major payload of `l·m` plaintexts
    /// using caller-fixed parameters.
    pub fn new_fixed_params(
        l: usize,
        m: usize,
        record_len: u64,
        vals: Vec<u64>,
        params: &LweParams,
    ) -> Self {
        assert_eq!(vals.len(), l * m, "payload must hold l·m values");
        assert!(
            params.p >= (1u64 << record_len),
            "plaintext modulus too small for {record_len}-bit records"
        );
        debug_assert!(vals.iter().all(|&v| v < params.p), "value exceeds modulus");

        Database {
            info: DbInfo {
                l,
                m,
                p: params.p,
                logq: params.logq,
                record_len,
            },
            data: Matrix {
                data: vals,
                rows: l,
                cols: m,
            },
        }
    }
}
