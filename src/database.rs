//! Building the PIR plaintext matrix from packed clusters

use std::collections::HashMap;

use pir::database::Database;
use pir::params::{params_fixed_p, LweParams};
use tracing::info;

use crate::cluster::{Cluster, Metadata};
use crate::pack::{pack_clusters, PackedLayout};
use crate::Error;

/// log2 of the PIR plaintext modulus the scores are packed for.
pub const RECORD_LEN: u64 = 15;

/// Rows-per-stripe target per unit of hint size. Empirical backend
/// rule of thumb; treat as a tuning knob together with the hint size.
pub const ROWS_PER_HINT_UNIT: u64 = 125;

/// Map from cluster id to its origin offset `row·M + stripe·dim` in the
/// plaintext matrix.
#[derive(Debug, Clone, Default)]
pub struct ClusterMap(pub HashMap<u64, u64>);

/// Flat index of (row, col) in a row-major `l × m` matrix.
#[inline]
pub fn db_index(row: u64, col: u64, m: u64) -> u64 {
    row * m + col
}

/// Pack the clusters and populate the PIR database, selecting LWE parameters
/// for the resulting width. Returns the selected parameters alongside the
/// database and origin map.
pub fn build_vector_database(
    metadata: &Metadata,
    clusters: &[Cluster],
    hint_sz: u64,
    prec_bits: u64,
) -> Result<(Database, ClusterMap, LweParams), Error> {
    let layout = pack_clusters(clusters, hint_sz * ROWS_PER_HINT_UNIT)?;
    let m = layout.cols.len() as u64 * metadata.dim;
    let params = params_fixed_p(64, m as usize, 1 << RECORD_LEN).ok_or_else(|| {
        Error::ParamSelection(format!("no parameter set for logQ = 64, m = {m}"))
    })?;
    let (db, index_map) = build_from_layout(metadata, clusters, &layout, prec_bits, &params)?;
    Ok((db, index_map, params))
}

/// As `build_vector_database`, but with caller-fixed LWE parameters.
pub fn build_vector_database_with_params(
    metadata: &Metadata,
    clusters: &[Cluster],
    hint_sz: u64,
    prec_bits: u64,
    params: &LweParams,
) -> Result<(Database, ClusterMap), Error> {
    let layout = pack_clusters(clusters, hint_sz * ROWS_PER_HINT_UNIT)?;
    build_from_layout(metadata, clusters, &layout, prec_bits, params)
}

fn build_from_layout(
    metadata: &Metadata,
    clusters: &[Cluster],
    layout: &PackedLayout,
    prec_bits: u64,
    params: &LweParams,
) -> Result<(Database, ClusterMap), Error> {
    if params.logq != 64 || prec_bits >= 64 || params.p < (1u64 << prec_bits) {
        return Err(Error::ParamSelection(format!(
            "P = {}; logQ = {} (need P ≥ 2^precBits and logQ = 64)",
            params.p, params.logq
        )));
    }
    if !(1..=7).contains(&prec_bits) {
        return Err(Error::UnsupportedPrecision(prec_bits));
    }

    let dim = metadata.dim;
    let l = layout.num_rows();
    let m = layout.cols.len() as u64 * dim;
    info!(
        "database is {l} x {m} -- best possible would be {}",
        metadata.num_vectors * dim
    );

    // Values are stored mod p. p is a power of two, so masking preserves the
    // two's-complement encoding of negative components; unused slots stay 0.
    let mask = params.p - 1;
    let mut vals = vec![0u64; (l * m) as usize];
    let mut index_map = ClusterMap::default();

    for (stripe, contents) in layout.cols.iter().enumerate() {
        let col_base = stripe as u64 * dim;
        let mut row = 0u64;
        for &cid in contents {
            let cluster = &clusters[cid as usize];
            debug_assert_eq!(cluster.index, cid, "cluster ids must match positions");

            let previous = index_map.0.insert(cid, db_index(row, col_base, m));
            assert!(previous.is_none(), "cluster {cid} packed twice");

            for i in 0..cluster.num_vectors {
                for j in 0..dim {
                    let value = cluster.vectors[(i * dim + j) as usize];
                    vals[db_index(row, col_base + j, m) as usize] = (value as u64) & mask;
                }
                row += 1;
                assert!(row <= l, "stripe overflows the matrix height");
            }
        }
    }

    let db = Database::new_fixed_params(l as usize, m as usize, RECORD_LEN, vals, params);
    Ok((db, index_map))
}
