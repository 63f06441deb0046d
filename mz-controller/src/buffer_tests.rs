use crate::ReplayBuffer;
use mz_core::{ReplaySection, Role};
use mz_oracle::TrainingExample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn example(z: f32) -> TrainingExample {
    TrainingExample {
        features: vec![z],
        role: Role::First,
        pi: vec![1.0, 0.0],
        z,
    }
}

fn section(max_buffer_size: usize, max_iteration_history: usize) -> ReplaySection {
    ReplaySection {
        max_buffer_size,
        max_iteration_history,
    }
}

#[test]
fn iteration_queue_drops_oldest_past_capacity() {
    let mut buf = ReplayBuffer::new(&section(3, 10));
    buf.push_iteration((0..5).map(|i| example(i as f32)).collect());

    assert_eq!(buf.len(), 3);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut zs: Vec<f32> = buf.pooled_shuffled(&mut rng).iter().map(|e| e.z).collect();
    zs.sort_by(f32::total_cmp);
    // The two oldest examples (z = 0, 1) were evicted.
    assert_eq!(zs, vec![2.0, 3.0, 4.0]);
}

#[test]
fn history_drops_oldest_iteration_past_capacity() {
    let mut buf = ReplayBuffer::new(&section(100, 2));
    buf.push_iteration(vec![example(1.0)]);
    buf.push_iteration(vec![example(2.0)]);
    buf.push_iteration(vec![example(3.0)]);

    assert_eq!(buf.iterations(), 2);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut zs: Vec<f32> = buf.pooled_shuffled(&mut rng).iter().map(|e| e.z).collect();
    zs.sort_by(f32::total_cmp);
    assert_eq!(zs, vec![2.0, 3.0]);
}

#[test]
fn pooled_examples_span_all_retained_iterations() {
    let mut buf = ReplayBuffer::new(&section(100, 10));
    buf.push_iteration(vec![example(1.0), example(2.0)]);
    buf.push_iteration(vec![example(3.0)]);

    assert_eq!(buf.len(), 3);
    assert!(!buf.is_empty());
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(buf.pooled_shuffled(&mut rng).len(), 3);
}

#[test]
fn fresh_buffer_is_empty() {
    let buf = ReplayBuffer::new(&section(10, 10));
    assert!(buf.is_empty());
    assert_eq!(buf.iterations(), 0);
}
