// Bundled digests driving the engines through `DigestBuildHasher`.
use hash_engines::digest::{Addition, Digest, DigestBuildHasher, Polynomial};
use hash_engines::{
    ChainingHashMap, DoubleHashMap, HashTable, LinearHashMap, QuadraticHashMap, QuadraticProbe,
    TableError,
};

type Poly = DigestBuildHasher<Polynomial>;
type Sum = DigestBuildHasher<Addition>;

// Test: constructor validation.
// Verifies: zero modulus and too many coefficients are invalid arguments.
#[test]
fn misconfigured_digests_are_rejected() {
    match Polynomial::new(0, &[1, 2]) {
        Err(TableError::InvalidHasher(msg)) => assert!(msg.contains("modulus"), "{msg}"),
        other => panic!("expected InvalidHasher, got {other:?}"),
    }
    // Degree eight and above: eight coefficients are already too many.
    assert_eq!(Polynomial::MAX_COEFFICIENTS, 7);
    assert!(matches!(
        Polynomial::new(97, &[1u64; 8]),
        Err(TableError::InvalidHasher(_))
    ));
    assert!(Polynomial::new(97, &[1u64; 7]).is_ok());
    assert!(matches!(Addition::new(0), Err(TableError::InvalidHasher(_))));
}

// Test: a polynomial digest is deterministic across builder clones.
#[test]
fn polynomial_is_deterministic() {
    let p = Polynomial::new(1_000_003, &[1, 31, 7]).unwrap();
    let q = p.clone();
    for x in [0u64, 1, 255, 1 << 40, u64::MAX] {
        assert_eq!(p.digest(&x.to_le_bytes()), q.digest(&x.to_le_bytes()));
        assert!(p.digest(&x.to_le_bytes()) < p.modulus());
    }
}

// Test: engines stay correct under the polynomial digest.
#[test]
fn engines_accept_polynomial_hashing() {
    let mut linear: LinearHashMap<u64, u64, Poly> =
        LinearHashMap::with_policy(hash_engines::LinearProbe::with_hasher(Poly::default()));
    let mut quadratic: QuadraticHashMap<u64, u64, Poly> = QuadraticHashMap::with_policy(
        QuadraticProbe::with_hasher(Poly::new(Polynomial::new(1_000_003, &[1, 31]).unwrap())),
    );
    let mut double: DoubleHashMap<u64, u64, Poly, Sum> = DoubleHashMap::with_policy(
        hash_engines::DoubleHashProbe::with_hashers(Poly::default(), Sum::default()),
    );
    assert_eq!(linear.policy().hasher().digest(), &Polynomial::default());
    assert_eq!(quadratic.policy().hasher().digest().modulus(), 1_000_003);
    for k in 0..2_000u64 {
        linear.insert(k, k * 3);
        quadratic.insert(k, k * 3);
        double.insert(k, k * 3);
    }
    for k in 0..2_000u64 {
        assert_eq!(linear.find(&k), Some(&(k * 3)));
        assert_eq!(quadratic.find(&k), Some(&(k * 3)));
        assert_eq!(double.find(&k), Some(&(k * 3)));
    }
    // Growth keeps the injected hasher.
    assert_eq!(quadratic.policy().hasher().digest().modulus(), 1_000_003);
}

// Test: byte-sum hashing degrades chaining into few long chains but keeps it
// correct.
// Verifies: all anagram keys share one bucket and remain distinguishable.
#[test]
fn addition_collides_anagrams_in_one_chain() {
    let mut m: ChainingHashMap<String, u8, Sum> = ChainingHashMap::with_hasher(Sum::default());
    assert_eq!(m.hasher().digest(), &Addition::default());
    let perms = ["abcd", "abdc", "acbd", "acdb", "adbc", "adcb", "bacd", "badc"];
    for (i, w) in perms.iter().enumerate() {
        assert!(m.insert(w.to_string(), i as u8));
    }
    assert_eq!(m.chain_lengths().max(), Some(perms.len()));
    for (i, w) in perms.iter().enumerate() {
        assert_eq!(m.find(&w.to_string()), Some(&(i as u8)));
    }
}
