#![cfg(test)]

// Property tests for every engine kept inside the crate so they share one
// driver over the `HashTable` contract.

use crate::{
    ChainingHashMap, CuckooHashMap, DoubleHashMap, DoubleHashProbe, HashTable, LinearHashMap,
    LinearProbe, OpenAddressing, QuadraticHashMap, QuadraticProbe,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Erase(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Rehash(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Erase),
            2 => idx.clone().prop_map(Op::Find),
            1 => "[a-z]{0,4}".prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (0usize..40).prop_map(Op::Rehash),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Power-of-two schemes double on every rehash; keep storage bounded.
const MAX_REHASH_CAPACITY: usize = 1 << 12;

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised after every operation:
// - `insert` reports a new key exactly when the model lacked it.
// - `erase` reports presence; `find`/`contains_key` parity with the model.
// - `rehash` to a non-larger capacity fails and leaves capacity unchanged;
//   otherwise capacity reaches at least the request and contents survive.
// - `entries` yields each live pair exactly once.
// - `len` parity, and `len <= capacity`; capacity never shrinks.
fn check_against_model<T>(
    sut: &mut T,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    T: HashTable<String, i32> + ?Sized,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        let before = sut.capacity();
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let fresh = model.insert(k.clone(), v).is_none();
                prop_assert_eq!(sut.insert(k, v), fresh);
            }
            Op::Erase(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.erase(k), model.remove(k).is_some());
                prop_assert_eq!(sut.capacity(), before, "erase never resizes");
            }
            Op::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.find_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    (s, m) => {
                        prop_assert!(false, "find_mut {:?} vs model {:?}", s, m);
                    }
                }
            }
            Op::Rehash(_) if before >= MAX_REHASH_CAPACITY => continue,
            Op::Rehash(extra) => {
                let requested = before + extra;
                match sut.rehash(requested) {
                    Ok(()) => {
                        prop_assert!(extra > 0);
                        prop_assert!(sut.capacity() >= requested);
                    }
                    Err(e) => {
                        prop_assert_eq!(extra, 0, "unexpected {}", e);
                        prop_assert_eq!(sut.capacity(), before);
                    }
                }
            }
            Op::Iterate => {
                let mut seen: BTreeMap<&String, &i32> = BTreeMap::new();
                for (k, v) in sut.entries() {
                    prop_assert!(seen.insert(k, v).is_none(), "{:?} yielded twice", k);
                }
                let expected: BTreeMap<&String, &i32> = model.iter().collect();
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.len() <= sut.capacity());
        prop_assert!(sut.capacity() >= before, "capacity shrank");
    }
    for (k, v) in &model {
        prop_assert_eq!(sut.find(k), Some(v));
    }
    Ok(())
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_linear((pool, ops) in arb_scenario()) {
        let mut sut: LinearHashMap<String, i32> = LinearHashMap::new();
        check_against_model(&mut sut, &pool, ops)?;
        prop_assert!(sut.tombstones() + sut.len() <= sut.capacity());
    }

    #[test]
    fn prop_quadratic((pool, ops) in arb_scenario()) {
        let mut sut: QuadraticHashMap<String, i32> = QuadraticHashMap::new();
        check_against_model(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_double((pool, ops) in arb_scenario()) {
        let mut sut: DoubleHashMap<String, i32> = DoubleHashMap::new();
        check_against_model(&mut sut, &pool, ops)?;
        prop_assert!(sut.capacity().is_power_of_two());
    }

    #[test]
    fn prop_chaining((pool, ops) in arb_scenario()) {
        let mut sut: ChainingHashMap<String, i32> = ChainingHashMap::new();
        check_against_model(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_cuckoo((pool, ops) in arb_scenario()) {
        let mut sut: CuckooHashMap<String, i32> = CuckooHashMap::new();
        check_against_model(&mut sut, &pool, ops)?;
        for k in &pool {
            if let Some(slot) = sut.slot_of(k) {
                prop_assert!(sut.candidate_slots(k).contains(&slot));
            }
        }
    }

    #[test]
    fn prop_boxed_dyn((pool, ops) in arb_scenario()) {
        let mut sut: Box<dyn HashTable<String, i32>> = Box::new(ChainingHashMap::<String, i32>::new());
        check_against_model(sut.as_mut(), &pool, ops)?;
    }
}

// Same state-machine invariants under worst-case collision behavior
// (constant hasher): every probe sequence, chain and candidate pair is shared.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn prop_linear_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: OpenAddressing<String, i32, LinearProbe<ConstBuildHasher>> =
            OpenAddressing::with_policy(LinearProbe::with_hasher(ConstBuildHasher));
        check_against_model(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_quadratic_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: OpenAddressing<String, i32, QuadraticProbe<ConstBuildHasher>> =
            OpenAddressing::with_policy(QuadraticProbe::with_hasher(ConstBuildHasher));
        check_against_model(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_double_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: OpenAddressing<String, i32, DoubleHashProbe<ConstBuildHasher, ConstBuildHasher>> =
            OpenAddressing::with_policy(DoubleHashProbe::with_hashers(ConstBuildHasher, ConstBuildHasher));
        check_against_model(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_chaining_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: ChainingHashMap<String, i32, ConstBuildHasher> =
            ChainingHashMap::with_hasher(ConstBuildHasher);
        check_against_model(&mut sut, &pool, ops)?;
        prop_assert!(sut.chain_lengths().filter(|&n| n > 0).count() <= 1);
    }

    #[test]
    fn prop_cuckoo_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: CuckooHashMap<String, i32, ConstBuildHasher, ConstBuildHasher> =
            CuckooHashMap::with_hashers_and_seed(ConstBuildHasher, ConstBuildHasher, 7);
        check_against_model(&mut sut, &pool, ops)?;
        prop_assert!(sut.len() - sut.stash_len() <= 2);
    }
}
