//! Protocol messages and wire-size accounting.

use crate::database::DbInfo;
use crate::matrix::{Matrix, MatrixSeed};
use crate::params::LweParams;

/// One-time setup message from server to client. The public matrix travels as
/// a seed; the hint matrix never travels at all (see `HintQuery`).
#[derive(Clone)]
pub struct SetupMessage {
    pub matrix_seed: MatrixSeed,
    pub info: DbInfo,
    pub params: LweParams,
}

/// Offline query: the client's fresh session secret, gadget-encrypted under a
/// one-shot transport secret. `b` holds `n · KS_DIGITS` ciphertext bodies;
/// the mask vectors are derived from `transport_seed` on both sides.
#[derive(Clone)]
pub struct HintQuery {
    pub transport_seed: MatrixSeed,
    pub b: Vec<u64>,
}

/// Offline answer: for each database row, an LWE encryption of
/// `hint[row] · secret` under the transport secret.
#[derive(Clone)]
pub struct HintAnswer {
    /// Accumulated mask vectors, one row per database row (`l × n`)
    pub c: Matrix,
    /// Accumulated ciphertext bodies (`l`)
    pub b: Vec<u64>,
}

/// Online query: one LWE sample per database column.
#[derive(Clone, Debug)]
pub struct PirQuery(pub Vec<u64>);

/// Online answer: `DB · query`, one value per database row.
#[derive(Clone)]
pub struct PirAnswer(pub Vec<u64>);

// ============================================================================
// Communication cost
// ============================================================================

/// Bytes a message occupies on the wire.
pub trait CommunicationCost {
    fn size_bytes(&self) -> usize;
}

impl CommunicationCost for SetupMessage {
    fn size_bytes(&self) -> usize {
        // seed + five DbInfo fields + four parameter fields
        32 + 5 * 8 + 4 * 8
    }
}

impl CommunicationCost for HintQuery {
    fn size_bytes(&self) -> usize {
        32 + self.b.len() * std::mem::size_of::<u64>()
    }
}

impl CommunicationCost for HintAnswer {
    fn size_bytes(&self) -> usize {
        (self.c.data.len() + self.b.len()) * std::mem::size_of::<u64>()
    }
}

impl CommunicationCost for PirQuery {
    fn size_bytes(&self) -> usize {
        self.0.len() * std::mem::size_of::<u64>()
    }
}

impl CommunicationCost for PirAnswer {
    fn size_bytes(&self) -> usize {
        self.0.len() * std::mem::size_of::<u64>()
    }
}
