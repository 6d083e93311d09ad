use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pir::params::LweParams;
use pir::pir::CommunicationCost;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vector_search::cluster::{Cluster, Metadata};
use vector_search::quantize::quantize_clamp;
use vector_search::{Client, Server};

/// Server-online benchmark: one query round against a mid-sized clustered
/// database. Measures `answer` only; setup, the offline phase, and client
/// work are excluded.
fn bench_server_online(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_server_online");
    group.warm_up_time(Duration::from_secs(3));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let dim = 128u64;
    let prec_bits = 5u64;
    let num_clusters = 64u64;
    let vectors_per_cluster = 128u64;

    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let clusters: Vec<Cluster> = (0..num_clusters)
        .map(|i| {
            let vectors: Vec<i8> = (0..vectors_per_cluster * dim)
                .map(|_| quantize_clamp(rng.random::<f64>() * 8.0 - 4.0, prec_bits))
                .collect();
            Cluster {
                index: i,
                num_vectors: vectors_per_cluster,
                dim,
                prec_bits,
                vectors,
            }
        })
        .collect();
    let metadata = Metadata {
        num_vectors: num_clusters * vectors_per_cluster,
        dim,
        num_clusters,
    };

    // Realistic plaintext space, reduced LWE dimension to keep the offline
    // phase of the benchmark setup quick.
    let params = LweParams {
        n: 512,
        logq: 64,
        p: 1 << 15,
        noise_stddev: 6.4,
    };
    let server =
        Server::process_vectors_with_params(&metadata, &clusters, 4, prec_bits, &params, &mut rng)
            .unwrap();
    let mut client = Client::setup(server.hint());

    let hint_query = client.preprocess_query(&mut rng);
    let hint_answer = server.hint_answer(&hint_query);
    client.process_hint_apply(&hint_answer);

    let query: Vec<i8> = (0..dim)
        .map(|_| quantize_clamp(rng.random::<f64>() * 8.0 - 4.0, prec_bits))
        .collect();
    let online = client.query_embeddings(&query, 0, &mut rng).unwrap();

    let info = client.db_info();
    let db_bytes = (info.l * info.m * 8) as u64;
    eprintln!(
        "[search_online] db: {} x {}, payload = {:.2} MiB",
        info.l,
        info.m,
        db_bytes as f64 / (1024.0 * 1024.0)
    );
    eprintln!(
        "[search_online] comm: query = {:.2} KiB, answer = {} x 8 bytes",
        online.size_bytes() as f64 / 1024.0,
        info.l
    );

    group.throughput(Throughput::Bytes(db_bytes));
    group.bench_with_input(
        BenchmarkId::new("answer", db_bytes),
        &server,
        |b, server| {
            b.iter(|| {
                let answer = server.answer(black_box(&online));
                black_box(answer.0[0])
            })
        },
    );

    group.finish();
}

criterion_group!(benches, bench_server_online);
criterion_main!(benches);
