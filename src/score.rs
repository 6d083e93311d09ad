//! Signed score recovery and ranking

/// A reconstructed similarity: which vector, and its exact quantized inner
/// product with the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorScore {
    pub cluster_id: u64,
    pub id_within_cluster: u64,
    pub score: i64,
}

/// Map a mod-p residue back to its signed value: residues above p/2 are
/// negative. Exact as long as the true score stays within (-p/2, p/2].
#[inline]
pub fn signed_score(raw: u64, p: u64) -> i64 {
    if raw > p / 2 {
        raw as i64 - p as i64
    } else {
        raw as i64
    }
}

/// Sort descending by score; ties break by (cluster id, id within cluster)
/// ascending. Top-k truncation happens at the caller.
pub fn sort_scores(scores: &mut [VectorScore]) {
    scores.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.cluster_id.cmp(&b.cluster_id))
            .then(a.id_within_cluster.cmp(&b.id_within_cluster))
    });
}
