//! Private nearest-neighbor vector search over single-server LWE PIR.
//!
//! The server holds a large quantized vector database, pre-grouped into
//! clusters and bin-packed into the column stripes of a PIR plaintext matrix.
//! A client quantizes its query vector, encrypts it into the stripe holding
//! its target cluster, and receives the exact quantized inner product of the
//! query with every row of that stripe, without the server learning which
//! cluster was probed. Reconstruction de-biases the mod-p scores and
//! ranks them; top-k truncation happens at the caller.
//!
//! Per session: `Client::setup` → `preprocess_query` → `Server::hint_answer`
//! → `process_hint_apply`, then any number of `query_embeddings` →
//! `Server::answer` → `reconstruct_within_{cluster,bin}` rounds.

pub mod client;
pub mod cluster;
pub mod database;
pub mod error;
pub mod pack;
pub mod quantize;
pub mod score;
pub mod server;
pub mod wire;

pub use client::Client;
pub use error::Error;
pub use quantize::quantize_clamp;
pub use score::VectorScore;
pub use server::{SearchHint, Server};
