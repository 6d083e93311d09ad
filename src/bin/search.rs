//! Private vector search driver
//!
//! Reads a clustered, quantized vector database, serves it through the PIR
//! protocol in-process, runs every query in the query file, and writes the
//! ranked results plus per-query performance statistics as CSV.
//!
//! ```bash
//! search --preamble data/sift --topk 10
//! search --preamble data/sift --query data/sift_probe.csv --clusterOnly
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use pir::pir::CommunicationCost;
use tracing::{error, info};

use vector_search::cluster::{read_all_clusters, read_query_csv};
use vector_search::{Client, Server, VectorScore};

/// Hint size target handed to the database builder. Empirical; together with
/// the builder's rows-per-unit constant it fixes the stripe capacity.
const HINT_SZ: u64 = 900;

#[derive(Parser)]
#[command(about = "Private nearest-neighbor vector search over LWE PIR")]
struct Args {
    /// Path prefix of the database files (<preamble>_metadata.json, ...)
    #[arg(long)]
    preamble: PathBuf,

    /// Query CSV; defaults to <preamble>_query.csv
    #[arg(long)]
    query: Option<PathBuf>,

    /// Number of top results to return
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    topk: u64,

    /// Quantization bit-width
    #[arg(long = "precBits", default_value_t = 5)]
    prec_bits: u64,

    /// Only return top k among vectors in the specified cluster
    #[arg(long = "clusterOnly", default_value_t = false)]
    cluster_only: bool,
}

/// Per-query wall-clock and wire measurements, one perf CSV row.
struct QueryPerf {
    client_hint_query_time: Duration,
    server_hint_answer_time: Duration,
    client_hint_apply_time: Duration,
    client_query_processing_time: Duration,
    server_compute_time: Duration,
    client_recon_time: Duration,
    hint_query_size: u64,
    hint_ans_size: u64,
    query_size: u64,
    ans_size: u64,
}

const PERF_HEADER: [&str; 10] = [
    "clientHintQueryTime",
    "serverHintAnswerTime",
    "clientHintApplyTime",
    "clientQueryProcessingTime",
    "serverComputeTime",
    "clientReconTime",
    "hintQuerySize",
    "hintAnsSize",
    "querySize",
    "ansSize",
];

fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(query) = &args.query {
        if query.extension().and_then(|e| e.to_str()) != Some("csv") {
            return Err("when specified, query must be a csv file".into());
        }
        if query.parent() != args.preamble.parent() {
            return Err("query must be in the same directory as indicated by preamble".into());
        }
    }
    Ok(())
}

fn validate_files(preamble: &Path, query_file: &Path) -> Result<(), String> {
    let metadata = PathBuf::from(format!("{}_metadata.json", preamble.display()));
    if !metadata.exists() {
        return Err(format!("metadata file does not exist: {}", metadata.display()));
    }
    if !query_file.exists() {
        return Err(format!("query file does not exist: {}", query_file.display()));
    }
    let cluster0 = PathBuf::from(format!("{}_cluster_0.csv", preamble.display()));
    if !cluster0.exists() {
        return Err(format!("cluster file does not exist: {}", cluster0.display()));
    }
    Ok(())
}

/// `<query stem>` or `<preamble>` plus a suffix, in the data directory.
fn output_path(preamble: &Path, query: &Option<PathBuf>, suffix: &str) -> PathBuf {
    match query {
        Some(q) => q.with_file_name(format!(
            "{}{}",
            q.file_stem().unwrap_or_default().to_string_lossy(),
            suffix
        )),
        None => PathBuf::from(format!("{}{}", preamble.display(), suffix)),
    }
}

fn run_round(
    client: &mut Client,
    server: &Server,
    query: &[i8],
    cluster_index: u64,
    cluster_only: bool,
    rng: &mut impl rand::Rng,
) -> Result<(Vec<VectorScore>, QueryPerf), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let hint_query = client.preprocess_query(rng);
    let client_hint_query_time = start.elapsed();
    let hint_query_size = hint_query.size_bytes() as u64;

    let start = Instant::now();
    let hint_answer = server.hint_answer(&hint_query);
    let server_hint_answer_time = start.elapsed();
    let hint_ans_size = hint_answer.size_bytes() as u64;

    let start = Instant::now();
    client.process_hint_apply(&hint_answer);
    let client_hint_apply_time = start.elapsed();

    let start = Instant::now();
    let online_query = client.query_embeddings(query, cluster_index, rng)?;
    let client_query_processing_time = start.elapsed();
    let query_size = online_query.size_bytes() as u64;

    let start = Instant::now();
    let answer = server.answer(&online_query);
    let server_compute_time = start.elapsed();
    let ans_size = answer.size_bytes() as u64;

    let p = client.db_info().p;
    let start = Instant::now();
    let scores = if cluster_only {
        client.reconstruct_within_cluster(&answer, cluster_index, p)?
    } else {
        client.reconstruct_within_bin(&answer, cluster_index, p)?
    };
    let client_recon_time = start.elapsed();

    let perf = QueryPerf {
        client_hint_query_time,
        server_hint_answer_time,
        client_hint_apply_time,
        client_query_processing_time,
        server_compute_time,
        client_recon_time,
        hint_query_size,
        hint_ans_size,
        query_size,
        ans_size,
    };
    Ok((scores, perf))
}

fn write_results(
    writer: &mut csv::Writer<std::fs::File>,
    perf_writer: &mut csv::Writer<std::fs::File>,
    scores: &[VectorScore],
    k: u64,
    perf: &QueryPerf,
) -> Result<(), Box<dyn std::error::Error>> {
    let num_res = (k as usize).min(scores.len());
    let mut line = Vec::with_capacity(num_res * 2);
    for s in &scores[..num_res] {
        line.push(s.cluster_id.to_string());
        line.push(s.id_within_cluster.to_string());
    }
    writer.write_record(&line)?;
    writer.flush()?;

    let perf_line = [
        format!("{}", perf.client_hint_query_time.as_secs_f64()),
        format!("{}", perf.server_hint_answer_time.as_secs_f64()),
        format!("{}", perf.client_hint_apply_time.as_secs_f64()),
        format!("{}", perf.client_query_processing_time.as_secs_f64()),
        format!("{}", perf.server_compute_time.as_secs_f64()),
        format!("{}", perf.client_recon_time.as_secs_f64()),
        format!("{}", perf.hint_query_size),
        format!("{}", perf.hint_ans_size),
        format!("{}", perf.query_size),
        format!("{}", perf.ans_size),
    ];
    perf_writer.write_record(&perf_line)?;
    perf_writer.flush()?;
    Ok(())
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    validate_args(args)?;

    let query_file = args
        .query
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_query.csv", args.preamble.display())));
    validate_files(&args.preamble, &query_file)?;

    info!("preamble: {}", args.preamble.display());
    info!("query location: {}", query_file.display());
    info!("top k: {}", args.topk);
    info!("cluster only: {}", args.cluster_only);

    let suffix = if args.cluster_only {
        "_cluster_only"
    } else {
        ""
    };
    let results_path = output_path(&args.preamble, &args.query, &format!("_results{suffix}.csv"));
    let perf_path = output_path(&args.preamble, &args.query, &format!("_perf{suffix}.csv"));

    let mut writer = csv::Writer::from_path(&results_path)?;
    let mut perf_writer = csv::Writer::from_path(&perf_path)?;
    perf_writer.write_record(PERF_HEADER)?;
    perf_writer.flush()?;
    info!("writing vector search results to {}", results_path.display());
    info!("writing performance statistics to {}", perf_path.display());

    let mut rng = rand::rng();

    let preprocessing_start = Instant::now();
    let (metadata, clusters) = read_all_clusters(&args.preamble, args.prec_bits)?;
    let server = Server::process_vectors_from_clusters(
        &metadata,
        &clusters,
        HINT_SZ,
        args.prec_bits,
        &mut rng,
    )?;
    info!(
        "server database construction took {:?}",
        preprocessing_start.elapsed()
    );
    info!("server hint size: {} bytes", server.hint().size_bytes());

    let mut client = Client::setup(server.hint());

    let queries = read_query_csv(&query_file, metadata.dim, args.prec_bits)?;
    for (count, q) in queries.iter().enumerate() {
        let (scores, perf) = run_round(
            &mut client,
            &server,
            &q.components,
            q.cluster_index,
            args.cluster_only,
            &mut rng,
        )?;
        write_results(&mut writer, &mut perf_writer, &scores, args.topk, &perf)?;

        if (count + 1) % 100 == 0 {
            info!("processed {} queries", count + 1);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}
