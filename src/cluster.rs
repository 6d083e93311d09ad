//! Cluster model and ingestion: metadata sidecar, per-cluster CSV files, and
//! the query CSV

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::quantize::quantize_clamp;
use crate::Error;

/// Database-level metadata, deserialized from `<prefix>_metadata.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub num_vectors: u64,
    pub dim: u64,
    pub num_clusters: u64,
}

/// One pre-built cluster of quantized vectors, row-major.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Stable id, matching file ordering
    pub index: u64,
    pub num_vectors: u64,
    pub dim: u64,
    pub prec_bits: u64,
    pub vectors: Vec<i8>,
}

/// A query row: the cluster to probe and the quantized query vector.
#[derive(Debug, Clone)]
pub struct QueryVector {
    pub cluster_index: u64,
    pub components: Vec<i8>,
}

fn parse_f64(field: &str, path: &Path, row: usize) -> Result<f64, Error> {
    field.trim().parse::<f64>().map_err(|_| Error::Parse {
        path: path.to_path_buf(),
        row,
        value: field.to_string(),
    })
}

/// Read one cluster file: one vector per row, exactly `dim` float fields,
/// each quantized to `prec_bits`.
pub fn read_cluster_from_csv(
    path: &Path,
    index: u64,
    dim: u64,
    prec_bits: u64,
) -> Result<Cluster, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let mut vectors = Vec::new();
    let mut num_vectors = 0u64;
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        if record.len() != dim as usize {
            return Err(Error::FieldCount {
                path: path.to_path_buf(),
                row,
                expected: dim as usize,
                got: record.len(),
            });
        }
        for field in record.iter() {
            let value = parse_f64(field, path, row)?;
            vectors.push(quantize_clamp(value, prec_bits));
        }
        num_vectors += 1;
    }

    Ok(Cluster {
        index,
        num_vectors,
        dim,
        prec_bits,
        vectors,
    })
}

/// Read the metadata sidecar plus every `<prefix>_cluster_<i>.csv`, checking
/// per-cluster dimension/precision agreement and the total vector count.
pub fn read_all_clusters(preamble: &Path, prec_bits: u64) -> Result<(Metadata, Vec<Cluster>), Error> {
    if !(1..=7).contains(&prec_bits) {
        return Err(Error::UnsupportedPrecision(prec_bits));
    }

    let metadata_path = PathBuf::from(format!("{}_metadata.json", preamble.display()));
    let metadata: Metadata = serde_json::from_reader(File::open(&metadata_path)?)?;

    info!(
        "building database with {} {}-dim {}-bit vectors, organized in {} clusters",
        metadata.num_vectors, metadata.dim, prec_bits, metadata.num_clusters
    );

    let mut clusters = Vec::with_capacity(metadata.num_clusters as usize);
    let mut total = 0u64;
    for i in 0..metadata.num_clusters {
        let path = PathBuf::from(format!("{}_cluster_{}.csv", preamble.display(), i));
        let cluster = read_cluster_from_csv(&path, i, metadata.dim, prec_bits)?;

        if cluster.dim != metadata.dim {
            return Err(Error::DimensionMismatch {
                index: i,
                expected: metadata.dim,
                got: cluster.dim,
            });
        }
        if cluster.prec_bits != prec_bits {
            return Err(Error::PrecisionMismatch {
                index: i,
                expected: prec_bits,
                got: cluster.prec_bits,
            });
        }
        total += cluster.num_vectors;
        clusters.push(cluster);
    }

    if total != metadata.num_vectors {
        return Err(Error::VectorCountMismatch {
            expected: metadata.num_vectors,
            got: total,
        });
    }

    Ok((metadata, clusters))
}

/// Read the query file: each row is a leading cluster index followed by `dim`
/// float fields. Unparseable fields are errors, never silently quantized.
pub fn read_query_csv(path: &Path, dim: u64, prec_bits: u64) -> Result<Vec<QueryVector>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let mut queries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        if record.len() != dim as usize + 1 {
            return Err(Error::FieldCount {
                path: path.to_path_buf(),
                row,
                expected: dim as usize + 1,
                got: record.len(),
            });
        }
        let cluster_index = record[0].trim().parse::<u64>().map_err(|_| Error::Parse {
            path: path.to_path_buf(),
            row,
            value: record[0].to_string(),
        })?;
        let mut components = Vec::with_capacity(dim as usize);
        for field in record.iter().skip(1) {
            let value = parse_f64(field, path, row)?;
            components.push(quantize_clamp(value, prec_bits));
        }
        queries.push(QueryVector {
            cluster_index,
            components,
        });
    }
    Ok(queries)
}
