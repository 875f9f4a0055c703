use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};

use strassen_task::{
    algebra::{max_abs_diff, naive_multiply},
    generate::{generate_random_matrix, generate_random_matrix_with},
    logging,
    perf::{print_perf_statistic, Perf, PerfAttr, PerfResults},
    strassen::{element_count, is_valid_size},
    task::{MatrixTask, Multiplier, Naive, TaskData},
    Parallelism, Result, StrassenConfig, StrassenError, LEAF_SIZE, PARALLEL_THRESHOLD,
};

/// Benchmark Strassen multiplication under the pipeline and task protocols.
#[derive(Parser, Debug)]
#[command(name = "strassen-task")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Matrix dimension (power of two)
    #[arg(short = 'n', long, env = "STRASSEN_SIZE", default_value_t = 64)]
    size: usize,

    /// Timed iterations per protocol
    #[arg(short, long, env = "STRASSEN_RUNS", default_value_t = 10)]
    runs: usize,

    /// Untimed warm-up cycles before a pipeline measurement
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Dimension at or below which recursion stays on one thread
    #[arg(long, default_value_t = PARALLEL_THRESHOLD)]
    threshold: usize,

    /// Dimension at which recursion switches to the triple loop
    #[arg(long, default_value_t = LEAF_SIZE)]
    leaf_size: usize,

    /// Never spawn sub-products on the Rayon pool
    #[arg(long)]
    sequential: bool,

    /// Which protocol(s) to run
    #[arg(short, long, value_enum, default_value_t = Protocol::Both)]
    protocol: Protocol,

    /// Also measure the naive triple loop as a baseline
    #[arg(long)]
    baseline: bool,

    /// Seed for reproducible operands
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Protocol {
    Pipeline,
    Task,
    Both,
}

impl Protocol {
    fn includes(self, other: Protocol) -> bool {
        self == Protocol::Both || self == other
    }
}

const TOLERANCE: f64 = 1e-6;

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let n = cli.size;
    if !is_valid_size(n) {
        return Err(StrassenError::InvalidSize { n });
    }
    element_count(n)?;

    let (a, b) = match cli.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let a = generate_random_matrix_with(n, &mut rng);
            (a, generate_random_matrix_with(n, &mut rng))
        }
        None => (generate_random_matrix(n), generate_random_matrix(n)),
    };
    let reference = naive_multiply(&a, &b, n);

    let parallelism = if cli.sequential {
        Parallelism::Sequential
    } else {
        Parallelism::Rayon
    };
    let config = StrassenConfig::new()
        .with_parallelism(parallelism)
        .with_parallel_threshold(cli.threshold)
        .with_leaf_size(cli.leaf_size);

    tracing::info!(n, runs = cli.runs, ?config, "benchmarking");

    let mut all_ok = measure(cli, &a, &b, &reference, config)?;
    if cli.baseline {
        all_ok &= measure(cli, &a, &b, &reference, Naive)?;
    }
    Ok(all_ok)
}

fn measure<M: Multiplier + Copy>(
    cli: &Cli,
    a: &[f64],
    b: &[f64],
    reference: &[f64],
    multiplier: M,
) -> Result<bool> {
    let n = cli.size;
    let mut all_ok = true;

    for protocol in [Protocol::Pipeline, Protocol::Task] {
        if !cli.protocol.includes(protocol) {
            continue;
        }

        let attr = PerfAttr::new()
            .with_num_running(cli.runs)
            .with_warmup_runs(cli.warmup);
        let mut results = PerfResults::default();
        let mut out = vec![0.0; n * n];

        let mut perf = Perf::new(MatrixTask::with_multiplier(
            TaskData::new(a, b, n, &mut out),
            multiplier,
        ));
        match protocol {
            Protocol::Pipeline => perf.pipeline_run(&attr, &mut results)?,
            _ => perf.task_run(&attr, &mut results)?,
        }
        drop(perf);

        print_perf_statistic(&results)?;

        let diff = max_abs_diff(&out, reference);
        if diff > TOLERANCE {
            tracing::error!(diff, task = multiplier.name(), "result differs from reference");
            all_ok = false;
        }
    }

    Ok(all_ok)
}
