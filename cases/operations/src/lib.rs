use std::io::{BufRead, BufReader, Read};

use serde::Serialize;

pub use common_utils::*;

mod cli;
mod error;
mod generator;
mod output;
mod shuffle;

pub use cli::{app, count_arg};
pub use error::{OpDecodeError, OpReaderError, WorkloadError};
pub use generator::{
    build_workload, generate_name, generation_order, Inserts, NAME_LENGTH, PREALLOCATE_LIMIT,
};
pub use output::{
    generate_to_file, write, write_stream, WorkloadOptions, MATERIALIZE_WARN_COUNT,
};
pub use shuffle::{arrange, shuffle, Ordering, WindowShuffle};

pub const DEFAULT_COUNT: u32 = 1_000_000;

/// One line of a workload file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    Insert {
        id: u32,
        first_name: String,
        last_name: String,
    },
    Search(u32),
    Delete(u32),
}

/// The record paired with the insert of `id`: even ids are searched for,
/// odd ids are deleted.
pub fn companion(id: u32) -> Op {
    if id % 2 == 0 {
        Op::Search(id)
    } else {
        Op::Delete(id)
    }
}

impl Op {
    pub fn id(&self) -> u32 {
        match self {
            Op::Insert { id, .. } | Op::Search(id) | Op::Delete(id) => *id,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Op::Insert { .. })
    }

    /// Line body without the trailing newline.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Op::Insert {
                id,
                first_name,
                last_name,
            } => format!("i {} {} {}", id, first_name, last_name).into_bytes(),
            Op::Search(id) => format!("s {}", id).into_bytes(),
            Op::Delete(id) => format!("d {}", id).into_bytes(),
        }
    }

    /// Length of `encode()`, computed without allocating.
    pub fn encoded_len(&self) -> u64 {
        fn decimal_len(mut value: u32) -> u64 {
            let mut len = 1;
            while value >= 10 {
                value /= 10;
                len += 1;
            }
            len
        }

        match self {
            Op::Insert {
                id,
                first_name,
                last_name,
            } => 2 + decimal_len(*id) + 1 + first_name.len() as u64 + 1 + last_name.len() as u64,
            Op::Search(id) | Op::Delete(id) => 2 + decimal_len(*id),
        }
    }

    pub fn decode(data: &[u8]) -> Result<Op, OpDecodeError> {
        fn parse_u32(data: &[u8]) -> Result<u32, OpDecodeError> {
            if data.is_empty() {
                return Err(OpDecodeError);
            }
            let mut value: u32 = 0;
            for byte in data {
                if byte.is_ascii_digit() {
                    value = value
                        .checked_mul(10)
                        .ok_or(OpDecodeError)?
                        .checked_add((byte - b'0') as u32)
                        .ok_or(OpDecodeError)?;
                } else {
                    return Err(OpDecodeError);
                }
            }
            Ok(value)
        }

        fn parse_name(data: &[u8]) -> Result<String, OpDecodeError> {
            if data.is_empty() || !data.iter().all(u8::is_ascii_lowercase) {
                return Err(OpDecodeError);
            }
            std::str::from_utf8(data)
                .map(str::to_owned)
                .map_err(|_| OpDecodeError)
        }

        let mut fields = data.split(|byte| *byte == b' ');
        let mut field = || fields.next().ok_or(OpDecodeError);

        let op = match field()? {
            b"i" => Op::Insert {
                id: parse_u32(field()?)?,
                first_name: parse_name(field()?)?,
                last_name: parse_name(field()?)?,
            },
            b"s" => Op::Search(parse_u32(field()?)?),
            b"d" => Op::Delete(parse_u32(field()?)?),
            _ => return Err(OpDecodeError),
        };

        if fields.next().is_some() {
            return Err(OpDecodeError);
        }
        Ok(op)
    }
}

/// Reads newline-terminated records. A trailing line without a newline is
/// treated as the end of input.
pub struct OpReader<R: Read> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: Read> OpReader<R> {
    pub fn new(input: R) -> OpReader<R> {
        OpReader {
            reader: BufReader::new(input),
            buffer: vec![],
        }
    }
}

impl<R: Read> Iterator for OpReader<R> {
    type Item = Result<Op, OpReaderError>;

    fn next(&mut self) -> Option<Result<Op, OpReaderError>> {
        self.buffer.clear();
        let count = match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(count) => count,
            Err(e) => return Some(Err(e.into())),
        };
        if count == 0 || self.buffer.last() != Some(&b'\n') {
            return None;
        }
        match Op::decode(&self.buffer[..self.buffer.len() - 1]) {
            Ok(op) => Some(Ok(op)),
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Record counts of a workload, printed by the workload binary once the file
/// is in place.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkloadSummary {
    pub inserts: u64,
    pub searches: u64,
    pub deletes: u64,
}

impl WorkloadSummary {
    pub fn expected(count: u32) -> WorkloadSummary {
        let count = u64::from(count);
        WorkloadSummary {
            inserts: count,
            searches: (count + 1) / 2,
            deletes: count / 2,
        }
    }

    pub fn record(&mut self, op: &Op) {
        match op {
            Op::Insert { .. } => self.inserts += 1,
            Op::Search(_) => self.searches += 1,
            Op::Delete(_) => self.deletes += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.inserts + self.searches + self.deletes
    }
}

/// Parses a record count given on the command line. Ids are `u32`, so the
/// count may not exceed `u32::MAX`.
pub fn parse_count(raw: &str) -> Result<u32, WorkloadError> {
    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| WorkloadError::InvalidArgument(format!("count {:?} is not an integer", raw)))?;
    if count < 0 {
        return Err(WorkloadError::InvalidArgument(format!(
            "count must not be negative, got {}",
            count
        )));
    }
    u32::try_from(count).map_err(|_| {
        WorkloadError::InvalidArgument(format!(
            "count {} exceeds the id range of {}",
            count,
            u32::MAX
        ))
    })
}
