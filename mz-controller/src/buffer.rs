//! Replay buffer: bounded per-iteration example queues with a bounded
//! iteration history.

use std::collections::VecDeque;

use mz_core::ReplaySection;
use mz_oracle::TrainingExample;
use rand::seq::SliceRandom;
use rand::Rng;

/// Training examples retained across the most recent iterations.
///
/// Two bounds apply: each iteration's queue drops its oldest examples past
/// `max_buffer_size`, and the history drops its oldest iteration past
/// `max_iteration_history`.
#[derive(Debug)]
pub struct ReplayBuffer {
    history: VecDeque<VecDeque<TrainingExample>>,
    max_buffer_size: usize,
    max_iteration_history: usize,
}

impl ReplayBuffer {
    pub fn new(cfg: &ReplaySection) -> Self {
        Self {
            history: VecDeque::new(),
            max_buffer_size: cfg.max_buffer_size,
            max_iteration_history: cfg.max_iteration_history,
        }
    }

    /// Append one iteration's worth of examples.
    pub fn push_iteration(&mut self, examples: Vec<TrainingExample>) {
        let mut queue = VecDeque::with_capacity(examples.len().min(self.max_buffer_size));
        for ex in examples {
            if queue.len() == self.max_buffer_size {
                queue.pop_front();
            }
            queue.push_back(ex);
        }
        self.history.push_back(queue);

        while self.history.len() > self.max_iteration_history {
            log::warn!(
                "replay history over {} iterations; dropping the oldest",
                self.max_iteration_history
            );
            self.history.pop_front();
        }
    }

    /// All retained examples pooled across iterations, in shuffled order.
    pub fn pooled_shuffled(&self, rng: &mut impl Rng) -> Vec<TrainingExample> {
        let mut pooled: Vec<TrainingExample> =
            self.history.iter().flatten().cloned().collect();
        pooled.shuffle(rng);
        pooled
    }

    /// Retained iteration count.
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// Total retained examples.
    pub fn len(&self) -> usize {
        self.history.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.history.iter().all(VecDeque::is_empty)
    }
}
