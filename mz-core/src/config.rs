//! Unified configuration schema for montezero.
//!
//! One YAML file configures search, self-play, replay retention, gating and
//! the iteration controller.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// MCTS algorithm settings.
    #[serde(default)]
    pub mcts: MctsSection,
    /// Self-play settings.
    #[serde(default)]
    pub selfplay: SelfplaySection,
    /// Replay buffer retention settings.
    #[serde(default)]
    pub replay: ReplaySection,
    /// Gating evaluation settings.
    #[serde(default)]
    pub gating: GatingSection,
    /// Iteration controller settings.
    #[serde(default)]
    pub controller: ControllerSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mcts: MctsSection::default(),
            selfplay: SelfplaySection::default(),
            replay: ReplaySection::default(),
            gating: GatingSection::default(),
            controller: ControllerSection::default(),
        }
    }
}

impl Config {
    /// Load a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Parse a config from a YAML string.
    pub fn from_yaml_str(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// MCTS algorithm configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MctsSection {
    /// PUCT exploration constant.
    #[serde(default = "default_c_puct")]
    pub c_puct: f32,
    /// Simulated descents per action decision.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
}

fn default_c_puct() -> f32 {
    1.5
}

fn default_num_simulations() -> u32 {
    64
}

impl Default for MctsSection {
    fn default() -> Self {
        Self {
            c_puct: default_c_puct(),
            num_simulations: default_num_simulations(),
        }
    }
}

/// Self-play configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelfplaySection {
    /// Episodes generated per iteration.
    #[serde(default = "default_episodes_per_iteration")]
    pub episodes_per_iteration: u32,
    /// Step count after which the executed-move temperature drops from 1 to 0.
    #[serde(default = "default_temp_threshold")]
    pub temp_threshold: u32,
    /// Base seed for episode PRNG streams.
    #[serde(default)]
    pub seed: u64,
}

fn default_episodes_per_iteration() -> u32 {
    32
}

fn default_temp_threshold() -> u32 {
    15
}

impl Default for SelfplaySection {
    fn default() -> Self {
        Self {
            episodes_per_iteration: default_episodes_per_iteration(),
            temp_threshold: default_temp_threshold(),
            seed: 0,
        }
    }
}

/// Replay buffer retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplaySection {
    /// Maximum training examples retained per iteration buffer; oldest evicted.
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
    /// Maximum retained iteration buffers; oldest iteration evicted.
    #[serde(default = "default_max_iteration_history")]
    pub max_iteration_history: usize,
}

fn default_max_buffer_size() -> usize {
    200_000
}

fn default_max_iteration_history() -> usize {
    20
}

impl Default for ReplaySection {
    fn default() -> Self {
        Self {
            max_buffer_size: default_max_buffer_size(),
            max_iteration_history: default_max_iteration_history(),
        }
    }
}

/// Gating evaluation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatingSection {
    /// Arena games per gate.
    #[serde(default = "default_gating_games")]
    pub games: u32,
    /// Acceptance win-rate fraction over decisive games.
    #[serde(default = "default_update_threshold")]
    pub update_threshold: f64,
}

fn default_gating_games() -> u32 {
    40
}

fn default_update_threshold() -> f64 {
    0.6
}

impl Default for GatingSection {
    fn default() -> Self {
        Self {
            games: default_gating_games(),
            update_threshold: default_update_threshold(),
        }
    }
}

/// Iteration controller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerSection {
    /// Total learning iterations (self-play, fit, gate) to run.
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u32,
    /// Optional NDJSON run-event log path.
    #[serde(default)]
    pub events_path: Option<std::path::PathBuf>,
}

fn default_num_iterations() -> u32 {
    10
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            num_iterations: default_num_iterations(),
            events_path: None,
        }
    }
}
