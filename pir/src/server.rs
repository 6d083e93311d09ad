use rand::Rng;
use rayon::prelude::*;

use crate::{
    database::Database,
    matrix::{Matrix, MatrixSeed},
    params::LweParams,
    pir::{HintAnswer, HintQuery, PirAnswer, PirQuery, SetupMessage},
    regev::{gadget_digit, KS_DIGITS},
};

/// Server state: the frozen database, the seed of the public matrix `A`, and
/// the precomputed hint `DB · A`. Immutable after construction, so a single
/// server can answer concurrent queries.
pub struct PirServer {
    db: Database,
    matrix_seed: MatrixSeed,
    params: LweParams,
    /// `l × n` hint matrix; applied per-session in `hint_answer`, never shipped
    hint: Matrix,
}

impl PirServer {
    /// Setup: sample the matrix seed, expand `A ∈ ℤ_q^{m×n}`, and precompute
    /// the hint `DB · A ∈ ℤ_q^{l×n}`.
    pub fn new(db: Database, params: &LweParams, rng: &mut impl Rng) -> Self {
        let matrix_seed: MatrixSeed = rng.random();
        let a = Matrix::from_seed(&matrix_seed, db.info.m, params.n);
        let hint = db.data.mul_mat(&a);
        Self {
            db,
            matrix_seed,
            params: *params,
            hint,
        }
    }

    pub fn setup_message(&self) -> SetupMessage {
        SetupMessage {
            matrix_seed: self.matrix_seed,
            info: self.db.info,
            params: self.params,
        }
    }

    /// Apply the hint to the client's gadget-encrypted secret.
    ///
    /// Each hint entry is decomposed into base-2^16 digits; the digits weight
    /// the client's ciphertexts, so row `i` of the answer decrypts (under the
    /// transport secret) to `hint[i] · s` plus gadget noise.
    pub fn hint_answer(&self, query: &HintQuery) -> HintAnswer {
        let n = self.params.n;
        assert_eq!(
            query.b.len(),
            n * KS_DIGITS,
            "hint query length must be n·{KS_DIGITS}"
        );
        let a_t = Matrix::from_seed(&query.transport_seed, n * KS_DIGITS, n);

        let l = self.db.info.l;
        let rows: Vec<(Vec<u64>, u64)> = (0..l)
            .into_par_iter()
            .map(|i| {
                let hint_row = self.hint.row(i);
                let mut c_row = vec![0u64; n];
                let mut b = 0u64;
                for (j, &h) in hint_row.iter().enumerate() {
                    for level in 0..KS_DIGITS {
                        let d = gadget_digit(h, level);
                        if d == 0 {
                            continue;
                        }
                        let idx = j * KS_DIGITS + level;
                        b = b.wrapping_add(d.wrapping_mul(query.b[idx]));
                        for (c, &a) in c_row.iter_mut().zip(a_t.row(idx)) {
                            *c = c.wrapping_add(d.wrapping_mul(a));
                        }
                    }
                }
                (c_row, b)
            })
            .collect();

        let mut c_data = Vec::with_capacity(l * n);
        let mut b_out = Vec::with_capacity(l);
        for (c_row, b) in rows {
            c_data.extend_from_slice(&c_row);
            b_out.push(b);
        }
        HintAnswer {
            c: Matrix {
                data: c_data,
                rows: l,
                cols: n,
            },
            b: b_out,
        }
    }

    /// Online answer: `DB · query`.
    pub fn answer(&self, query: &PirQuery) -> PirAnswer {
        PirAnswer(self.db.data.mul_vec(&query.0))
    }
}
