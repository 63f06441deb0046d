use crate::{Coach, CoachError, Phase};
use mz_blackjack::Blackjack;
use mz_core::{Config, RoleTable};
use mz_logging::NdjsonWriter;
use mz_oracle::{SnapshotStore, TableOracle};

fn small_config() -> Config {
    let mut cfg = Config::default();
    cfg.mcts.num_simulations = 8;
    cfg.selfplay.episodes_per_iteration = 2;
    cfg.selfplay.temp_threshold = 2;
    cfg.selfplay.seed = 11;
    cfg.gating.games = 4;
    cfg.controller.num_iterations = 2;
    cfg
}

fn oracle_pairs() -> (RoleTable<TableOracle>, RoleTable<TableOracle>) {
    let first_store = SnapshotStore::new();
    let second_store = SnapshotStore::new();
    let oracles = RoleTable::new(
        TableOracle::new(2, first_store.clone()),
        TableOracle::new(2, second_store.clone()),
    );
    let prev = RoleTable::new(
        TableOracle::new(2, first_store),
        TableOracle::new(2, second_store),
    );
    (oracles, prev)
}

#[test]
fn learn_runs_every_iteration_and_reports_each_gate() {
    let game = Blackjack::new(9);
    let (oracles, prev) = oracle_pairs();
    let mut coach = Coach::new(&game, oracles, prev, small_config(), None).unwrap();

    let report = coach.learn().unwrap();

    assert_eq!(report.iterations.len(), 2);
    assert_eq!(report.promotions + report.rejections, 2);
    for entry in &report.iterations {
        assert_eq!(entry.gate.games, 4);
        assert!(entry.new_examples > 0);
    }
    assert_eq!(coach.phase(), Phase::Done);
    assert!(!coach.buffer().is_empty());
}

#[test]
fn learn_emits_one_event_per_iteration_plus_a_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.ndjson");

    let game = Blackjack::new(9);
    let (oracles, prev) = oracle_pairs();
    let events = NdjsonWriter::open_append(&path).unwrap();
    let mut coach = Coach::new(&game, oracles, prev, small_config(), Some(events)).unwrap();

    coach.learn().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("\"event\":\"iteration_v1\""));
    assert!(lines[2].contains("\"event\":\"run_summary_v1\""));
}

#[test]
fn zero_gate_games_is_a_config_error() {
    let game = Blackjack::new(9);
    let (oracles, prev) = oracle_pairs();
    let mut cfg = small_config();
    cfg.gating.games = 0;

    let err = Coach::new(&game, oracles, prev, cfg, None).unwrap_err();
    assert!(matches!(err, CoachError::InvalidConfig { .. }));
}

#[test]
fn out_of_range_threshold_is_a_config_error() {
    let game = Blackjack::new(9);
    let (oracles, prev) = oracle_pairs();
    let mut cfg = small_config();
    cfg.gating.update_threshold = 1.5;

    let err = Coach::new(&game, oracles, prev, cfg, None).unwrap_err();
    assert!(matches!(err, CoachError::InvalidConfig { .. }));
}
