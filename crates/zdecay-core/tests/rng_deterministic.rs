use rand::RngCore;
use zdecay_core::rng::{derive_substream_seed, RngHandle};
use zdecay_core::Sampler;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn named_draws_are_reproducible() {
    let draw = |seed| {
        let mut rng = RngHandle::from_seed(seed);
        vec![
            rng.uniform(-1.0, 1.0),
            rng.exponential(10.0),
            rng.gaussian(45.0, 0.9),
            rng.breit_wigner(91.1876, 2.4952),
        ]
    };
    let a: Vec<u64> = draw(77).into_iter().map(f64::to_bits).collect();
    let b: Vec<u64> = draw(77).into_iter().map(f64::to_bits).collect();
    assert_eq!(a, b);
}

#[test]
fn substreams_are_distinct_and_stable() {
    let first = derive_substream_seed(42, 0);
    let second = derive_substream_seed(42, 1);
    assert_ne!(first, second);
    assert_eq!(first, derive_substream_seed(42, 0));

    let mut a = RngHandle::for_substream(42, 1);
    let mut b = RngHandle::from_seed(second);
    assert_eq!(a.next_u64(), b.next_u64());
}
