//! Search server: builds the PIR database from clusters and answers queries

use pir::params::LweParams;
use pir::pir::{HintAnswer, HintQuery, PirAnswer, PirQuery, SetupMessage};
use pir::server::PirServer;
use rand::Rng;

use crate::cluster::{Cluster, Metadata};
use crate::database::{build_vector_database, build_vector_database_with_params, ClusterMap};
use crate::Error;

/// Everything a client session needs: database metadata, the PIR setup
/// message, and the packed layout (origin map plus per-cluster sizes).
/// Shipped to each client once.
#[derive(Clone)]
pub struct SearchHint {
    pub metadata: Metadata,
    pub pir: SetupMessage,
    pub index_map: ClusterMap,
    /// Packer snapshot: `cluster_sizes[cid]` is cluster `cid`'s vector count
    pub cluster_sizes: Vec<u64>,
}

/// The search server. Stateless across queries: the database and hint are
/// frozen at construction, so concurrent queries are safe.
pub struct Server {
    hint: SearchHint,
    pir: PirServer,
}

impl Server {
    /// Build the PIR database from pre-built clusters and retain the hint.
    /// LWE parameters are selected for the packed width.
    pub fn process_vectors_from_clusters(
        metadata: &Metadata,
        clusters: &[Cluster],
        hint_sz: u64,
        prec_bits: u64,
        rng: &mut impl Rng,
    ) -> Result<Self, Error> {
        let (db, index_map, params) =
            build_vector_database(metadata, clusters, hint_sz, prec_bits)?;
        Ok(Self::assemble(metadata, clusters, db, index_map, &params, rng))
    }

    /// As `process_vectors_from_clusters`, but with caller-fixed LWE
    /// parameters.
    pub fn process_vectors_with_params(
        metadata: &Metadata,
        clusters: &[Cluster],
        hint_sz: u64,
        prec_bits: u64,
        params: &LweParams,
        rng: &mut impl Rng,
    ) -> Result<Self, Error> {
        let (db, index_map) =
            build_vector_database_with_params(metadata, clusters, hint_sz, prec_bits, params)?;
        Ok(Self::assemble(metadata, clusters, db, index_map, params, rng))
    }

    fn assemble(
        metadata: &Metadata,
        clusters: &[Cluster],
        db: pir::database::Database,
        index_map: ClusterMap,
        params: &LweParams,
        rng: &mut impl Rng,
    ) -> Self {
        let cluster_sizes = clusters.iter().map(|c| c.num_vectors).collect();
        let pir = PirServer::new(db, params, rng);
        let hint = SearchHint {
            metadata: metadata.clone(),
            pir: pir.setup_message(),
            index_map,
            cluster_sizes,
        };
        Server { hint, pir }
    }

    pub fn hint(&self) -> &SearchHint {
        &self.hint
    }

    /// Offline phase: pure delegation to the PIR backend.
    pub fn hint_answer(&self, query: &HintQuery) -> HintAnswer {
        self.pir.hint_answer(query)
    }

    /// Online phase: pure delegation. The server never inspects the query.
    pub fn answer(&self, query: &PirQuery) -> PirAnswer {
        self.pir.answer(query)
    }
}
