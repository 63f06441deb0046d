use crate::config::Config;

#[test]
fn defaults_are_sane() {
    let cfg = Config::default();
    assert!(cfg.mcts.c_puct > 0.0);
    assert!(cfg.mcts.num_simulations > 0);
    assert!(cfg.selfplay.episodes_per_iteration > 0);
    assert!(cfg.replay.max_buffer_size > 0);
    assert!(cfg.replay.max_iteration_history > 0);
    assert!(cfg.gating.games > 0);
    assert!((0.0..=1.0).contains(&cfg.gating.update_threshold));
    assert!(cfg.controller.num_iterations > 0);
}

#[test]
fn parses_full_yaml() {
    let text = r#"
mcts:
  c_puct: 1.0
  num_simulations: 50
selfplay:
  episodes_per_iteration: 100
  temp_threshold: 10
  seed: 42
replay:
  max_buffer_size: 5000
  max_iteration_history: 4
gating:
  games: 20
  update_threshold: 0.55
controller:
  num_iterations: 3
"#;
    let cfg = Config::from_yaml_str(text).unwrap();
    assert_eq!(cfg.mcts.num_simulations, 50);
    assert_eq!(cfg.mcts.c_puct, 1.0);
    assert_eq!(cfg.selfplay.episodes_per_iteration, 100);
    assert_eq!(cfg.selfplay.temp_threshold, 10);
    assert_eq!(cfg.selfplay.seed, 42);
    assert_eq!(cfg.replay.max_buffer_size, 5000);
    assert_eq!(cfg.replay.max_iteration_history, 4);
    assert_eq!(cfg.gating.games, 20);
    assert_eq!(cfg.gating.update_threshold, 0.55);
    assert_eq!(cfg.controller.num_iterations, 3);
}

#[test]
fn partial_yaml_fills_defaults() {
    let cfg = Config::from_yaml_str("mcts:\n  num_simulations: 8\n").unwrap();
    assert_eq!(cfg.mcts.num_simulations, 8);
    // Untouched sections fall back to defaults.
    assert_eq!(cfg.gating.update_threshold, 0.6);
    assert!(cfg.controller.events_path.is_none());
}
