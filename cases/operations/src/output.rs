use std::borrow::Borrow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::{
    arrange, build_workload, companion, generation_order, write_atomically, Inserts, Op, Ordering,
    WindowShuffle, WorkloadError, WorkloadSummary, DEFAULT_COUNT,
};

/// Above this many inserts a materialized workload no longer fits comfortably
/// in memory.
pub const MATERIALIZE_WARN_COUNT: u32 = 50_000_000;

#[derive(Debug, Clone)]
pub struct WorkloadOptions {
    /// Number of inserts; the workload holds twice as many records.
    pub count: u32,
    pub ordering: Ordering,
    /// Stream records through a shuffle window of this size instead of
    /// materializing and permuting the whole workload.
    pub window: Option<usize>,
}

impl Default for WorkloadOptions {
    fn default() -> WorkloadOptions {
        WorkloadOptions {
            count: DEFAULT_COUNT,
            ordering: Ordering::Shuffled,
            window: None,
        }
    }
}

fn write_lines<I>(
    writer: &mut BufWriter<&File>,
    records: I,
    summary: &mut WorkloadSummary,
) -> io::Result<u64>
where
    I: IntoIterator,
    I::Item: Borrow<Op>,
{
    let mut written = 0;
    for record in records {
        let record = record.borrow();
        let mut encoded = record.encode();
        encoded.push(b'\n');
        writer.write_all(&encoded)?;
        written += encoded.len() as u64;
        summary.record(record);
    }
    Ok(written)
}

/// Writes one line per record, in order, replacing whatever is at `path`.
/// On error `path` is left untouched.
pub fn write<P: AsRef<Path>>(records: &[Op], path: P) -> Result<WorkloadSummary, WorkloadError> {
    let size: u64 = records.iter().map(|op| op.encoded_len() + 1).sum();
    let mut summary = WorkloadSummary::default();
    let written = write_atomically(&path, Some(size), |writer| {
        write_lines(writer, records, &mut summary)
    })?;
    debug!("wrote {} bytes to {:?}", written, path.as_ref());
    Ok(summary)
}

/// Like `write`, for records produced on the fly. Space is not reserved up
/// front since the final size is unknown.
pub fn write_stream<I, P>(records: I, path: P) -> Result<WorkloadSummary, WorkloadError>
where
    I: IntoIterator,
    I::Item: Borrow<Op>,
    P: AsRef<Path>,
{
    let mut summary = WorkloadSummary::default();
    let written = write_atomically(&path, None, |writer| {
        write_lines(writer, records, &mut summary)
    })?;
    debug!("streamed {} bytes to {:?}", written, path.as_ref());
    Ok(summary)
}

/// Generates a workload and writes it to `path`.
pub fn generate_to_file<R, P>(
    rng: &mut R,
    options: &WorkloadOptions,
    path: P,
) -> Result<WorkloadSummary, WorkloadError>
where
    R: Rng,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    info!(
        "generating {} inserts into {:?}, ordering {}, window {:?}",
        options.count, path, options.ordering, options.window
    );

    let summary = match (options.window, options.ordering) {
        (None, ordering) => {
            if options.count > MATERIALIZE_WARN_COUNT {
                warn!(
                    "holding {} records in memory; pass a shuffle window to stream instead",
                    u64::from(options.count) * 2
                );
            }
            let records = build_workload(rng, options.count);
            let records = arrange(rng, records, ordering);
            write(&records, path)?
        }
        (Some(window), Ordering::Shuffled) => {
            let shuffle_rng = Pcg64::seed_from_u64(rng.gen());
            let records =
                WindowShuffle::new(generation_order(rng, options.count), window, shuffle_rng)?;
            write_stream(records, path)?
        }
        (Some(window), Ordering::InsertsFirst) => {
            let insert_rng = Pcg64::seed_from_u64(rng.gen());
            let companion_rng = Pcg64::seed_from_u64(rng.gen());
            let companions =
                WindowShuffle::new((0..options.count).map(companion), window, companion_rng)?;
            let inserts = WindowShuffle::new(Inserts::new(rng, options.count), window, insert_rng)?;
            write_stream(inserts.chain(companions), path)?
        }
    };

    debug_assert_eq!(summary, WorkloadSummary::expected(options.count));
    info!(
        "wrote {} records: {} inserts, {} searches, {} deletes",
        summary.total(),
        summary.inserts,
        summary.searches,
        summary.deletes
    );
    Ok(summary)
}
