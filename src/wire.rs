//! Byte-size accounting for the search-layer messages

use pir::pir::CommunicationCost;

use crate::server::SearchHint;

impl CommunicationCost for SearchHint {
    fn size_bytes(&self) -> usize {
        // metadata: three u64 fields
        let metadata = 3 * 8;
        // origin map: (cluster id, offset) pairs
        let index_map = self.index_map.0.len() * 16;
        let sizes = self.cluster_sizes.len() * 8;
        metadata + self.pir.size_bytes() + index_map + sizes
    }
}
