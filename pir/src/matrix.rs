use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

/// Seed used to derive public matrices; client and server expand the same
/// seed into the same matrix, so only 32 bytes travel on the wire.
pub type MatrixSeed = [u8; 32];

/// Dense row-major matrix over ℤ_q with q = 2^64 (wrapping arithmetic).
#[derive(Clone, Debug)]
pub struct Matrix {
    pub data: Vec<u64>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0u64; rows * cols],
            rows,
            cols,
        }
    }

    /// Uniformly random matrix
    pub fn random(rows: usize, cols: usize, rng: &mut impl Rng) -> Self {
        let data: Vec<u64> = (0..rows * cols).map(|_| rng.random()).collect();
        Self { data, rows, cols }
    }

    /// Expand a matrix from a 32-byte seed with the ChaCha20 PRG. The same
    /// seed always yields the same matrix.
    pub fn from_seed(seed: &MatrixSeed, rows: usize, cols: usize) -> Self {
        let mut rng = ChaCha20Rng::from_seed(*seed);
        let data: Vec<u64> = (0..rows * cols).map(|_| rng.random()).collect();
        Self { data, rows, cols }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[u64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Matrix-vector product `self · v`, wrapping mod 2^64.
    pub fn mul_vec(&self, v: &[u64]) -> Vec<u64> {
        assert_eq!(v.len(), self.cols, "vector length must match columns");
        self.data
            .chunks_exact(self.cols)
            .map(|row| {
                row.iter()
                    .zip(v)
                    .fold(0u64, |acc, (&a, &b)| acc.wrapping_add(a.wrapping_mul(b)))
            })
            .collect()
    }

    /// Matrix product `self · rhs`, wrapping mod 2^64. Parallelized over rows
    /// of the left operand; this is the hint construction workhorse.
    pub fn mul_mat(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols, rhs.rows, "inner dimensions must match");
        let out_cols = rhs.cols;
        let data: Vec<u64> = self
            .data
            .par_chunks_exact(self.cols)
            .flat_map_iter(|row| {
                let mut out = vec![0u64; out_cols];
                for (k, &a) in row.iter().enumerate() {
                    if a == 0 {
                        continue;
                    }
                    let rhs_row = rhs.row(k);
                    for (o, &b) in out.iter_mut().zip(rhs_row) {
                        *o = o.wrapping_add(a.wrapping_mul(b));
                    }
                }
                out
            })
            .collect();
        Matrix {
            data,
            rows: self.rows,
            cols: out_cols,
        }
    }
}
