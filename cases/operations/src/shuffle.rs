use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Op, WorkloadError};

/// Uniformly random permutation in place (Fisher-Yates).
pub fn shuffle<T, R: Rng>(rng: &mut R, records: &mut [T]) {
    records.shuffle(rng);
}

/// How records are ordered in the written workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    /// One permutation over every record. A search or delete may come before
    /// the insert of its id.
    #[default]
    Shuffled,
    /// Inserts permuted among themselves, then the searches and deletes
    /// permuted among themselves, so each id is inserted before it is used.
    InsertsFirst,
}

impl FromStr for Ordering {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Ordering, WorkloadError> {
        match s {
            "shuffled" => Ok(Ordering::Shuffled),
            "inserts-first" => Ok(Ordering::InsertsFirst),
            other => Err(WorkloadError::InvalidArgument(format!(
                "unknown ordering {:?}, expected \"shuffled\" or \"inserts-first\"",
                other
            ))),
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordering::Shuffled => write!(f, "shuffled"),
            Ordering::InsertsFirst => write!(f, "inserts-first"),
        }
    }
}

/// Puts a materialized workload into its final order.
pub fn arrange<R: Rng>(rng: &mut R, mut records: Vec<Op>, ordering: Ordering) -> Vec<Op> {
    match ordering {
        Ordering::Shuffled => {
            shuffle(rng, &mut records);
            records
        }
        Ordering::InsertsFirst => {
            let (mut inserts, mut rest): (Vec<Op>, Vec<Op>) =
                records.into_iter().partition(Op::is_insert);
            shuffle(rng, &mut inserts);
            shuffle(rng, &mut rest);
            inserts.append(&mut rest);
            inserts
        }
    }
}

/// Shuffles a stream while holding at most `window` items.
///
/// Every output is drawn uniformly from the window and its slot is refilled
/// from the source. Items can only move forward by about `window` positions,
/// so the result is not a uniform permutation of the whole stream.
pub struct WindowShuffle<I: Iterator, R> {
    source: I,
    window: Vec<I::Item>,
    capacity: usize,
    rng: R,
    exhausted: bool,
}

impl<I: Iterator, R: Rng> WindowShuffle<I, R> {
    pub fn new(source: I, capacity: usize, rng: R) -> Result<WindowShuffle<I, R>, WorkloadError> {
        if capacity == 0 {
            return Err(WorkloadError::InvalidArgument(
                "shuffle window must hold at least one record".to_owned(),
            ));
        }
        // the window size comes from the command line; never reserve more
        // than the source says it can fill
        let reserve = capacity.min(source.size_hint().0);
        Ok(WindowShuffle {
            source,
            window: Vec::with_capacity(reserve),
            capacity,
            rng,
            exhausted: false,
        })
    }

    fn pull(&mut self) -> Option<I::Item> {
        if self.exhausted {
            return None;
        }
        let next = self.source.next();
        if next.is_none() {
            self.exhausted = true;
        }
        next
    }
}

impl<I: Iterator, R: Rng> Iterator for WindowShuffle<I, R> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        while self.window.len() < self.capacity {
            match self.pull() {
                Some(item) => self.window.push(item),
                None => break,
            }
        }
        if self.window.is_empty() {
            return None;
        }

        let slot = self.rng.gen_range(0..self.window.len());
        match self.pull() {
            Some(refill) => Some(std::mem::replace(&mut self.window[slot], refill)),
            None => Some(self.window.swap_remove(slot)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (low, high) = if self.exhausted {
            (0, Some(0))
        } else {
            self.source.size_hint()
        };
        let buffered = self.window.len();
        (
            low.saturating_add(buffered),
            high.and_then(|high| high.checked_add(buffered)),
        )
    }
}
