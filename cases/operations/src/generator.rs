use std::ops::RangeInclusive;

use rand::Rng;

use crate::{companion, Op};

/// Bounds on the length of a generated name.
pub const NAME_LENGTH: RangeInclusive<usize> = 3..=18;

/// A random lowercase ASCII name. Names are not unique across calls.
pub fn generate_name<R: Rng>(rng: &mut R) -> String {
    let length = rng.gen_range(NAME_LENGTH);
    (0..length)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Lazily produces `Insert` records with ids `0..count` in ascending order.
pub struct Inserts<'a, R> {
    rng: &'a mut R,
    ids: std::ops::Range<u32>,
}

impl<'a, R: Rng> Inserts<'a, R> {
    pub fn new(rng: &'a mut R, count: u32) -> Inserts<'a, R> {
        Inserts { rng, ids: 0..count }
    }
}

impl<'a, R: Rng> Iterator for Inserts<'a, R> {
    type Item = Op;

    fn next(&mut self) -> Option<Op> {
        let id = self.ids.next()?;
        let first_name = generate_name(&mut *self.rng);
        let last_name = generate_name(&mut *self.rng);
        Some(Op::Insert {
            id,
            first_name,
            last_name,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

/// Each insert immediately followed by its companion, without holding the
/// workload in memory.
pub fn generation_order<R: Rng>(rng: &mut R, count: u32) -> impl Iterator<Item = Op> + '_ {
    Inserts::new(rng, count).flat_map(|insert| {
        let paired = companion(insert.id());
        [insert, paired]
    })
}

/// Records reserved up front by `build_workload`; larger workloads grow
/// as they are generated.
pub const PREALLOCATE_LIMIT: usize = 1 << 24;

fn workload_capacity(count: u32) -> usize {
    usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(2))
        .map_or(PREALLOCATE_LIMIT, |records| records.min(PREALLOCATE_LIMIT))
}

/// The unshuffled workload: `2 * count` records in generation order.
pub fn build_workload<R: Rng>(rng: &mut R, count: u32) -> Vec<Op> {
    let mut ops = Vec::with_capacity(workload_capacity(count));
    ops.extend(generation_order(rng, count));
    log::debug!("generated {} records for {} inserts", ops.len(), count);
    ops
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn names_respect_length_and_charset() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut lengths = BTreeSet::new();
        for _ in 0..10_000 {
            let name = generate_name(&mut rng);
            assert!(NAME_LENGTH.contains(&name.len()), "{:?}", name);
            assert!(name.bytes().all(|b| b.is_ascii_lowercase()), "{:?}", name);
            lengths.insert(name.len());
        }
        // every length in range shows up over this many draws
        assert_eq!(lengths.len(), 16);
    }

    #[test]
    fn two_inserts_in_generation_order() {
        let mut rng = Pcg64::seed_from_u64(2);
        let ops = build_workload(&mut rng, 2);

        assert_eq!(ops.len(), 4);
        assert!(matches!(ops[0], Op::Insert { id: 0, .. }));
        assert_eq!(ops[1], Op::Search(0));
        assert!(matches!(ops[2], Op::Insert { id: 1, .. }));
        assert_eq!(ops[3], Op::Delete(1));
    }

    #[test]
    fn empty_workload() {
        let mut rng = Pcg64::seed_from_u64(3);
        assert!(build_workload(&mut rng, 0).is_empty());
    }

    #[test]
    fn every_id_inserted_once_with_its_companion() {
        let mut rng = Pcg64::seed_from_u64(4);
        let count = 1001;
        let ops = build_workload(&mut rng, count);

        assert_eq!(ops.len(), 2 * count as usize);
        let insert_ids: Vec<u32> = ops.iter().filter(|op| op.is_insert()).map(Op::id).collect();
        assert_eq!(insert_ids, (0..count).collect::<Vec<_>>());

        for pair in ops.chunks(2) {
            let id = pair[0].id();
            assert!(pair[0].is_insert());
            if id % 2 == 0 {
                assert_eq!(pair[1], Op::Search(id));
            } else {
                assert_eq!(pair[1], Op::Delete(id));
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = build_workload(&mut Pcg64::seed_from_u64(99), 50);
        let b = build_workload(&mut Pcg64::seed_from_u64(99), 50);
        let c = build_workload(&mut Pcg64::seed_from_u64(100), 50);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn capacity_is_bounded() {
        assert_eq!(workload_capacity(0), 0);
        assert_eq!(workload_capacity(3), 6);
        assert_eq!(workload_capacity(u32::MAX), PREALLOCATE_LIMIT);
        assert_eq!(
            workload_capacity((PREALLOCATE_LIMIT / 2) as u32 + 1),
            PREALLOCATE_LIMIT
        );
    }

    #[test]
    fn lazy_order_matches_materialized() {
        let materialized = build_workload(&mut Pcg64::seed_from_u64(5), 64);
        let mut rng = Pcg64::seed_from_u64(5);
        let lazy: Vec<Op> = generation_order(&mut rng, 64).collect();
        assert_eq!(materialized, lazy);
    }
}
