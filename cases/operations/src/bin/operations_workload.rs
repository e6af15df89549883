use std::process;

use anyhow::Context;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;

use dict_workload_operations::*;

// Writes a shuffled file of insert, search and delete records for exercising
// a search tree or hash table. Each of COUNT inserts is paired with a search
// (even ids) or a delete (odd ids). One JSON line describing the file is
// printed to standard output once it has been written.

#[derive(Serialize)]
struct RunReport<'a> {
    path: &'a str,
    seed: u64,
    ordering: String,
    #[serde(flatten)]
    summary: WorkloadSummary,
}

fn main() {
    let matches = app().get_matches();

    init_logging();

    let count = match count_arg(&matches) {
        Ok(count) => count,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let output = matches.value_of("output").unwrap_or(DEFAULT_OUTPUT);
    let seed = optional_value(&matches, "seed").unwrap_or_else(|| rand::thread_rng().gen());
    let options = WorkloadOptions {
        count,
        ordering: value_or_default(&matches, "ordering", Ordering::Shuffled),
        window: optional_value(&matches, "window"),
    };

    if let Err(e) = run(&options, output, seed) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}

fn run(options: &WorkloadOptions, output: &str, seed: u64) -> anyhow::Result<()> {
    info!("seed {}", seed);
    let mut rng = Pcg64::seed_from_u64(seed);

    let summary = generate_to_file(&mut rng, options, output)
        .with_context(|| format!("failed to write workload to {}", output))?;

    let report = RunReport {
        path: output,
        seed,
        ordering: options.ordering.to_string(),
        summary,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
