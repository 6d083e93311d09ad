//! Single-server PIR over LWE with an offloaded hint.
//!
//! The scheme is the classic square-database construction specialised to a
//! rectangular `L × M` plaintext matrix over `q = 2^64`: the server answers a
//! query with one matrix-vector product, and the client cancels the
//! `hint · secret` term to decrypt its row of interest.
//!
//! Two things distinguish this backend from the textbook version:
//!
//! - **The hint never ships.** The client sends its fresh session secret to
//!   the server gadget-encrypted under a one-shot transport secret
//!   ([`client::PirClient::preprocess_query`]); the server applies the hint
//!   matrix homomorphically ([`server::PirServer::hint_answer`]) and the
//!   client folds the result into a compact length-`L` hint state.
//! - **Queries carry payloads, not just unit vectors.** [`client::PirClient::query`]
//!   encrypts an arbitrary plaintext vector into a chosen column window, so a
//!   single answer can return a linear function of every database row (e.g.
//!   an inner product) instead of one record.

pub mod client;
pub mod database;
pub mod matrix;
pub mod params;
pub mod pir;
pub mod regev;
pub mod server;
