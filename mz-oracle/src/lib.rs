//! mz-oracle: the policy-value oracle seam.
//!
//! The learning core only ever calls `predict`, `fit`, `save_snapshot` and
//! `load_snapshot`; the oracle's internal structure stays opaque. Two concrete
//! oracles ship here: `UniformOracle` (uninformed baseline for search tests)
//! and `TableOracle` (an in-memory tabular reference, enough to exercise the
//! fit/snapshot/rollback control loop without a neural network).

use mz_core::Role;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Snapshot tag for the accepted line of models.
pub const TAG_BEST: &str = "best";
/// Transient snapshot tag used for rollback during gating.
pub const TAG_TEMP: &str = "temp";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("unknown snapshot tag: {0}")]
    UnknownSnapshot(String),
    #[error("oracle backend error: {0}")]
    Backend(String),
}

/// One self-play training tuple.
///
/// `z` is the episode's terminal outcome expressed relative to `role`, the
/// side that recorded the example; it is back-filled once the episode ends.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: Vec<f32>,
    pub role: Role,
    pub pi: Vec<f32>,
    pub z: f32,
}

/// External policy-value predictor consumed by search and fit by the
/// controller. Inference is treated as a blocking call.
pub trait Oracle {
    /// Action-probability vector (length `action_count`) and scalar value
    /// estimate in [-1, 1] for the encoded acting side.
    fn predict(&self, features: &[f32]) -> (Vec<f32>, f32);

    /// Fit on a batch of finished training examples.
    fn fit(&mut self, batch: &[TrainingExample]) -> Result<(), OracleError>;

    /// Persist the current parameters under `tag`.
    fn save_snapshot(&self, tag: &str) -> Result<(), OracleError>;

    /// Restore the parameters saved under `tag`.
    fn load_snapshot(&mut self, tag: &str) -> Result<(), OracleError>;
}

/// Uniform policy + zero value (baseline stub).
#[derive(Debug, Clone)]
pub struct UniformOracle {
    actions: usize,
}

impl UniformOracle {
    pub fn new(actions: usize) -> Self {
        Self { actions }
    }
}

impl Oracle for UniformOracle {
    fn predict(&self, _features: &[f32]) -> (Vec<f32>, f32) {
        let p = 1.0 / (self.actions.max(1) as f32);
        (vec![p; self.actions], 0.0)
    }

    fn fit(&mut self, _batch: &[TrainingExample]) -> Result<(), OracleError> {
        Ok(())
    }

    fn save_snapshot(&self, _tag: &str) -> Result<(), OracleError> {
        Ok(())
    }

    fn load_snapshot(&mut self, _tag: &str) -> Result<(), OracleError> {
        Ok(())
    }
}

/// Averaged policy/value targets memorized per encoded state.
#[derive(Debug, Clone, Default)]
pub struct TableParams {
    entries: FxHashMap<String, TableEntry>,
}

#[derive(Debug, Clone)]
struct TableEntry {
    pi: Vec<f32>,
    v: f32,
    n: u32,
}

/// Shared snapshot storage, standing in for a checkpoint directory.
///
/// Cloning the store shares the underlying tag map, so a "previous" oracle
/// instance can load what the current instance saved.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    tags: Rc<RefCell<FxHashMap<String, TableParams>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.borrow().contains_key(tag)
    }

    fn save(&self, tag: &str, params: &TableParams) {
        self.tags.borrow_mut().insert(tag.to_string(), params.clone());
    }

    fn load(&self, tag: &str) -> Result<TableParams, OracleError> {
        self.tags
            .borrow()
            .get(tag)
            .cloned()
            .ok_or_else(|| OracleError::UnknownSnapshot(tag.to_string()))
    }
}

/// In-memory tabular oracle: memorizes the running mean of the policy/value
/// targets seen per encoded state, and answers uniform/zero for unseen states.
#[derive(Debug, Clone)]
pub struct TableOracle {
    actions: usize,
    params: TableParams,
    store: SnapshotStore,
}

impl TableOracle {
    pub fn new(actions: usize, store: SnapshotStore) -> Self {
        Self {
            actions,
            params: TableParams::default(),
            store,
        }
    }

    pub fn len(&self) -> usize {
        self.params.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.entries.is_empty()
    }

    fn key(features: &[f32]) -> String {
        // Bit-exact key; the encoding contract guarantees determinism.
        let mut s = String::with_capacity(features.len() * 9);
        for f in features {
            s.push_str(&format!("{:08x},", f.to_bits()));
        }
        s
    }
}

impl Oracle for TableOracle {
    fn predict(&self, features: &[f32]) -> (Vec<f32>, f32) {
        match self.params.entries.get(&Self::key(features)) {
            Some(e) => (e.pi.clone(), e.v),
            None => {
                let p = 1.0 / (self.actions.max(1) as f32);
                (vec![p; self.actions], 0.0)
            }
        }
    }

    fn fit(&mut self, batch: &[TrainingExample]) -> Result<(), OracleError> {
        for ex in batch {
            let key = Self::key(&ex.features);
            let entry = self.params.entries.entry(key).or_insert_with(|| TableEntry {
                pi: vec![0.0; self.actions],
                v: 0.0,
                n: 0,
            });
            let n = entry.n as f32;
            for (slot, &target) in entry.pi.iter_mut().zip(ex.pi.iter()) {
                *slot = (*slot * n + target) / (n + 1.0);
            }
            entry.v = (entry.v * n + ex.z) / (n + 1.0);
            entry.n += 1;
        }
        Ok(())
    }

    fn save_snapshot(&self, tag: &str) -> Result<(), OracleError> {
        self.store.save(tag, &self.params);
        Ok(())
    }

    fn load_snapshot(&mut self, tag: &str) -> Result<(), OracleError> {
        self.params = self.store.load(tag)?;
        Ok(())
    }
}
