use rand::Rng;

use crate::{
    database::DbInfo,
    matrix::{Matrix, MatrixSeed},
    params::LweParams,
    pir::{HintAnswer, HintQuery, PirAnswer, PirQuery, SetupMessage},
    regev::{dot_product, round_decode, sample_noise, KS_BASE_LOG, KS_DIGITS},
};

/// Client state. Holds the per-session secrets, so it must not be shared
/// across concurrent queries; spawn one client per session.
///
/// Call order per session: `new` → `preprocess_query` → (server hint answer)
/// → `process_hint_apply`, then any number of `query` → (server answer) →
/// `recover` rounds under the same session secret.
pub struct PirClient {
    /// `m × n` public matrix, regenerated from the setup seed
    a: Matrix,
    info: DbInfo,
    params: LweParams,
    /// Session secret `s`, fresh per offline round
    secret: Option<Vec<u64>>,
    /// Transport secret `t`; dropped once the hint answer is folded in
    transport: Option<Vec<u64>>,
    /// Compact hint state `hs[i] = hint[i]·s + err`, length `l`
    hint_state: Option<Vec<u64>>,
}

impl PirClient {
    /// Initialize from the server's setup message. Regenerates `A` locally
    /// from the seed using the ChaCha20 PRG.
    pub fn new(msg: &SetupMessage) -> Self {
        let a = Matrix::from_seed(&msg.matrix_seed, msg.info.m, msg.params.n);
        Self {
            a,
            info: msg.info,
            params: msg.params,
            secret: None,
            transport: None,
            hint_state: None,
        }
    }

    pub fn info(&self) -> DbInfo {
        self.info
    }

    /// Start an offline round: sample a fresh session secret and ship it to
    /// the server gadget-encrypted under a one-shot transport secret.
    ///
    /// The query carries one ciphertext body per (secret coordinate, gadget
    /// level); the masks are derived from `transport_seed` on both sides.
    pub fn preprocess_query(&mut self, rng: &mut impl Rng) -> HintQuery {
        let n = self.params.n;
        let secret: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        let transport: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        let transport_seed: MatrixSeed = rng.random();
        let a_t = Matrix::from_seed(&transport_seed, n * KS_DIGITS, n);

        let mut b = Vec::with_capacity(n * KS_DIGITS);
        for (j, &s) in secret.iter().enumerate() {
            for level in 0..KS_DIGITS {
                let idx = j * KS_DIGITS + level;
                let body = dot_product(a_t.row(idx), &transport)
                    .wrapping_add(sample_noise(self.params.noise_stddev, rng))
                    .wrapping_add(s << (KS_BASE_LOG * level as u64));
                b.push(body);
            }
        }

        self.secret = Some(secret);
        self.transport = Some(transport);
        self.hint_state = None;
        HintQuery { transport_seed, b }
    }

    /// Fold the server's offline answer into the compact hint state
    /// `hs[i] = b[i] − c[i]·t (= hint[i]·s + err)`, then discard the
    /// transport secret. After this, recovery needs no further round-trips.
    pub fn process_hint_apply(&mut self, ans: &HintAnswer) {
        let transport = self
            .transport
            .take()
            .expect("preprocess_query must run before process_hint_apply");
        assert_eq!(ans.b.len(), self.info.l, "hint answer rows must match l");
        assert_eq!(ans.c.cols, self.params.n, "hint answer width must match n");

        let hint_state = ans
            .b
            .iter()
            .enumerate()
            .map(|(i, &b)| b.wrapping_sub(dot_product(ans.c.row(i), &transport)))
            .collect();
        self.hint_state = Some(hint_state);
    }

    /// Online query: LWE-encrypt `payload` into the column window
    /// `[col_start, col_start + payload.len())`. Every other column encrypts
    /// zero, so query length and structure are independent of the window.
    pub fn query(&self, col_start: usize, payload: &[u64], rng: &mut impl Rng) -> PirQuery {
        let secret = self
            .secret
            .as_ref()
            .expect("preprocess_query must run before query");
        let m = self.info.m;
        assert!(
            col_start + payload.len() <= m,
            "payload exceeds database width"
        );
        let delta = self.params.delta();

        let data = (0..m)
            .map(|j| {
                let mut v = dot_product(self.a.row(j), secret)
                    .wrapping_add(sample_noise(self.params.noise_stddev, rng));
                if j >= col_start && j < col_start + payload.len() {
                    let msg = payload[j - col_start];
                    debug_assert!(msg < self.params.p, "payload value exceeds modulus");
                    v = v.wrapping_add(delta.wrapping_mul(msg));
                }
                v
            })
            .collect();
        PirQuery(data)
    }

    /// Recover the plaintext at `row`: cancel the hint term, round away the
    /// noise, reduce mod p.
    pub fn recover(&self, row: usize, ans: &PirAnswer) -> u64 {
        let hint_state = self
            .hint_state
            .as_ref()
            .expect("process_hint_apply must run before recover");
        let noisy = ans.0[row].wrapping_sub(hint_state[row]);
        round_decode(noisy, &self.params)
    }
}
