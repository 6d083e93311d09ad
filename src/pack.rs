//! Bin-packing of clusters into column stripes

use tracing::info;

use crate::cluster::Cluster;
use crate::Error;

/// Result of packing: each inner list is one column stripe, holding cluster
/// ids in packing order; `col_row_counts[c]` is the stripe's total row count.
#[derive(Debug, Clone)]
pub struct PackedLayout {
    pub cols: Vec<Vec<u64>>,
    pub col_row_counts: Vec<u64>,
}

impl PackedLayout {
    /// Height of the plaintext matrix: the tallest stripe.
    pub fn num_rows(&self) -> u64 {
        self.col_row_counts.iter().copied().max().unwrap_or(0)
    }
}

/// First-fit decreasing: sort clusters by size descending (ties keep original
/// index order), then place each into the first stripe with room, opening a
/// new stripe when none fits.
///
/// The capacity comparison is strict: a cluster that would exactly fill a
/// stripe opens a new one instead.
pub fn pack_clusters(clusters: &[Cluster], max_capacity: u64) -> Result<PackedLayout, Error> {
    if clusters.is_empty() {
        return Err(Error::EmptyDatabase);
    }

    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| clusters[b].num_vectors.cmp(&clusters[a].num_vectors));

    let largest = clusters[order[0]].num_vectors;
    let mut cap = max_capacity;
    if largest > cap {
        info!("largest cluster has {largest} vectors, raising stripe capacity from {cap}");
        cap = largest;
    }

    let mut cols: Vec<Vec<u64>> = vec![vec![clusters[order[0]].index]];
    let mut col_row_counts: Vec<u64> = vec![largest];

    for &ci in &order[1..] {
        let size = clusters[ci].num_vectors;
        match col_row_counts.iter().position(|&count| count + size < cap) {
            Some(j) => {
                col_row_counts[j] += size;
                cols[j].push(clusters[ci].index);
            }
            None => {
                cols.push(vec![clusters[ci].index]);
                col_row_counts.push(size);
            }
        }
    }

    Ok(PackedLayout {
        cols,
        col_row_counts,
    })
}
