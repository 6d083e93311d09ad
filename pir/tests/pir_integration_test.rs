//! Integration tests for the PIR protocol
//!
//! Tests the complete flow:
//! 1. Server setup (expand A from seed, precompute hint = DB · A)
//! 2. Client offline round (preprocess → hint answer → hint apply)
//! 3. Client encrypts a payload into a column window
//! 4. Server computes answer = DB · query
//! 5. Client recovers the plaintext result per row

use pir::client::PirClient;
use pir::database::Database;
use pir::params::LweParams;
use pir::pir::{CommunicationCost, PirQuery};
use pir::server::PirServer;

fn params(n: usize, noise_stddev: f64) -> LweParams {
    LweParams {
        n,
        logq: 64,
        p: 1 << 15,
        noise_stddev,
    }
}

fn build_db(l: usize, m: usize, params: &LweParams) -> (Database, Vec<u64>) {
    // Deterministic small plaintexts, all < p
    let vals: Vec<u64> = (0..l * m).map(|i| (i as u64 * 37 + 5) % 1000).collect();
    (
        Database::new_fixed_params(l, m, 15, vals.clone(), params),
        vals,
    )
}

fn offline_round(client: &mut PirClient, server: &PirServer, rng: &mut impl rand::Rng) {
    let hint_query = client.preprocess_query(rng);
    let hint_answer = server.hint_answer(&hint_query);
    client.process_hint_apply(&hint_answer);
}

/// Retrieving single cells with unit payloads (deterministic, zero noise)
#[test]
fn test_pir_round_trip() {
    let mut rng = rand::rng();
    let params = params(16, 0.0);
    let (l, m) = (3, 4);
    let (db, vals) = build_db(l, m, &params);

    let server = PirServer::new(db, &params, &mut rng);
    let mut client = PirClient::new(&server.setup_message());
    offline_round(&mut client, &server, &mut rng);

    for col in 0..m {
        let query = client.query(col, &[1], &mut rng);
        let answer = server.answer(&query);
        for row in 0..l {
            assert_eq!(
                client.recover(row, &answer),
                vals[row * m + col],
                "cell ({row}, {col})"
            );
        }
    }
}

/// The same round trip with realistic noise: the accumulated error stays far
/// below Δ/2, so recovery is still exact.
#[test]
fn test_pir_round_trip_with_noise() {
    let mut rng = rand::rng();
    let params = params(32, 3.0);
    let (l, m) = (4, 6);
    let (db, vals) = build_db(l, m, &params);

    let server = PirServer::new(db, &params, &mut rng);
    let mut client = PirClient::new(&server.setup_message());
    offline_round(&mut client, &server, &mut rng);

    let query = client.query(2, &[1], &mut rng);
    let answer = server.answer(&query);
    for row in 0..l {
        assert_eq!(client.recover(row, &answer), vals[row * m + 2]);
    }
}

/// A non-unit payload recovers, per row, the inner product of that row's
/// window with the payload (mod p).
#[test]
fn test_pir_inner_product_payload() {
    let mut rng = rand::rng();
    let params = params(16, 0.0);
    let (l, m) = (5, 6);
    let (db, vals) = build_db(l, m, &params);

    let server = PirServer::new(db, &params, &mut rng);
    let mut client = PirClient::new(&server.setup_message());
    offline_round(&mut client, &server, &mut rng);

    let payload = [3u64, 0, 7, 2];
    let col_start = 1;
    let query = client.query(col_start, &payload, &mut rng);
    let answer = server.answer(&query);

    for row in 0..l {
        let expected: u64 = payload
            .iter()
            .enumerate()
            .map(|(j, &q)| vals[row * m + col_start + j] * q)
            .sum::<u64>()
            % (1 << 15);
        assert_eq!(client.recover(row, &answer), expected, "row {row}");
    }
}

/// Multiple online queries under one offline round, then a second offline
/// round; all must recover correctly.
#[test]
fn test_pir_multiple_rounds() {
    let mut rng = rand::rng();
    let params = params(16, 0.0);
    let (l, m) = (3, 4);
    let (db, vals) = build_db(l, m, &params);

    let server = PirServer::new(db, &params, &mut rng);
    let mut client = PirClient::new(&server.setup_message());

    for _ in 0..2 {
        offline_round(&mut client, &server, &mut rng);
        for col in [0, 3] {
            let query = client.query(col, &[1], &mut rng);
            let answer = server.answer(&query);
            assert_eq!(client.recover(0, &answer), vals[col]);
        }
    }
}

/// Query size and structure depend only on the database width, never on the
/// column window being targeted.
#[test]
fn test_query_size_independent_of_window() {
    let mut rng = rand::rng();
    let params = params(16, 0.0);
    let (db, _) = build_db(3, 8, &params);

    let server = PirServer::new(db, &params, &mut rng);
    let mut client = PirClient::new(&server.setup_message());
    offline_round(&mut client, &server, &mut rng);

    let q0 = client.query(0, &[1, 2], &mut rng);
    let q1 = client.query(6, &[3, 4], &mut rng);
    assert_eq!(q0.size_bytes(), q1.size_bytes());
    assert_eq!(q0.0.len(), q1.0.len());
}

/// The server rejects queries of the wrong width.
#[test]
#[should_panic]
fn test_answer_rejects_wrong_width() {
    let mut rng = rand::rng();
    let params = params(16, 0.0);
    let (db, _) = build_db(3, 4, &params);
    let server = PirServer::new(db, &params, &mut rng);
    server.answer(&PirQuery(vec![0u64; 5]));
}
