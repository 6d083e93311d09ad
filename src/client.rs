//! Search client: query encoding and score reconstruction

use pir::client::PirClient;
use pir::database::DbInfo;
use pir::pir::{HintAnswer, HintQuery, PirAnswer, PirQuery};
use rand::Rng;

use crate::cluster::Metadata;
use crate::database::ClusterMap;
use crate::score::{signed_score, sort_scores, VectorScore};
use crate::server::SearchHint;
use crate::Error;

/// A client session. Holds the PIR session secrets, so spawn one client per
/// session; the server side can be shared freely.
pub struct Client {
    metadata: Metadata,
    index_map: ClusterMap,
    cluster_sizes: Vec<u64>,
    pir: PirClient,
}

impl Client {
    /// Internalize the server hint: metadata, origin map, per-cluster sizes,
    /// and the PIR setup message.
    pub fn setup(hint: &SearchHint) -> Self {
        Client {
            metadata: hint.metadata.clone(),
            index_map: hint.index_map.clone(),
            cluster_sizes: hint.cluster_sizes.clone(),
            pir: PirClient::new(&hint.pir),
        }
    }

    /// Database shape and plaintext space, as captured from the hint.
    pub fn db_info(&self) -> DbInfo {
        self.pir.info()
    }

    /// Start an offline round (fresh session secret).
    pub fn preprocess_query(&mut self, rng: &mut impl Rng) -> HintQuery {
        self.pir.preprocess_query(rng)
    }

    /// Fold the server's hint answer into session state; later
    /// reconstructions need no further offline round-trips.
    pub fn process_hint_apply(&mut self, answer: &HintAnswer) {
        self.pir.process_hint_apply(answer)
    }

    /// Build the online query: the quantized query vector, encoded mod p,
    /// encrypted into the column stripe holding `cluster_index`. The server's
    /// matrix-vector product then yields, per row of that stripe, the inner
    /// product of the row with the query. Row information is never revealed.
    pub fn query_embeddings(
        &self,
        query: &[i8],
        cluster_index: u64,
        rng: &mut impl Rng,
    ) -> Result<PirQuery, Error> {
        let dim = self.metadata.dim;
        if query.len() as u64 != dim {
            return Err(Error::QueryDimension {
                expected: dim,
                got: query.len() as u64,
            });
        }
        let origin = self.origin(cluster_index)?;
        let info = self.db_info();
        let col_start = origin % info.m as u64;

        // Two's-complement encoding mod p; matches the database packing.
        let mask = info.p - 1;
        let payload: Vec<u64> = query.iter().map(|&q| (q as u64) & mask).collect();
        Ok(self.pir.query(col_start as usize, &payload, rng))
    }

    /// Recover the scores for the probed cluster only, sorted descending.
    pub fn reconstruct_within_cluster(
        &self,
        answer: &PirAnswer,
        cluster_index: u64,
        p: u64,
    ) -> Result<Vec<VectorScore>, Error> {
        let origin = self.origin(cluster_index)?;
        let row_base = origin / self.db_info().m as u64;
        let mut scores = self.recover_rows(answer, cluster_index, row_base, p)?;
        if scores.is_empty() {
            return Err(Error::EmptyReconstruction(cluster_index));
        }
        sort_scores(&mut scores);
        Ok(scores)
    }

    /// Recover the scores for every cluster sharing the probed cluster's
    /// stripe, annotated with their owning cluster, sorted descending.
    pub fn reconstruct_within_bin(
        &self,
        answer: &PirAnswer,
        cluster_index: u64,
        p: u64,
    ) -> Result<Vec<VectorScore>, Error> {
        let origin = self.origin(cluster_index)?;
        let m = self.db_info().m as u64;
        let dim = self.metadata.dim;
        let stripe = (origin % m) / dim;

        // Inverse of the origin map restricted to this stripe, by first row
        let mut members: Vec<(u64, u64)> = self
            .index_map
            .0
            .iter()
            .filter(|&(_, &offset)| (offset % m) / dim == stripe)
            .map(|(&cid, &offset)| (offset / m, cid))
            .collect();
        members.sort_unstable();

        let mut scores = Vec::new();
        for (row_base, cid) in members {
            scores.extend(self.recover_rows(answer, cid, row_base, p)?);
        }
        if scores.is_empty() {
            return Err(Error::EmptyReconstruction(cluster_index));
        }
        sort_scores(&mut scores);
        Ok(scores)
    }

    fn origin(&self, cluster_index: u64) -> Result<u64, Error> {
        self.index_map
            .0
            .get(&cluster_index)
            .copied()
            .ok_or(Error::UnknownCluster(cluster_index))
    }

    fn recover_rows(
        &self,
        answer: &PirAnswer,
        cluster_id: u64,
        row_base: u64,
        p: u64,
    ) -> Result<Vec<VectorScore>, Error> {
        let len = self
            .cluster_sizes
            .get(cluster_id as usize)
            .copied()
            .ok_or(Error::UnknownCluster(cluster_id))?;
        let scores = (0..len)
            .map(|i| {
                let raw = self.pir.recover((row_base + i) as usize, answer);
                VectorScore {
                    cluster_id,
                    id_within_cluster: i,
                    score: signed_score(raw, p),
                }
            })
            .collect();
        Ok(scores)
    }
}
