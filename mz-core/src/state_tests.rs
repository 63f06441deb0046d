use crate::state::{Outcome, Role, RoleTable, State, DRAW_EPS};

#[test]
fn role_signs_and_other() {
    assert_eq!(Role::First.sign(), 1);
    assert_eq!(Role::Second.sign(), -1);
    assert_eq!(Role::First.other(), Role::Second);
    assert_eq!(Role::Second.other(), Role::First);
}

#[test]
fn outcome_sentinels() {
    assert_eq!(Outcome::Ongoing.value(), 0.0);
    assert_eq!(Outcome::Win.value(), 1.0);
    assert_eq!(Outcome::Loss.value(), -1.0);
    assert_eq!(Outcome::Draw.value(), DRAW_EPS);
    assert!(Outcome::Draw.value() != 0.0);
    assert!(Outcome::Ongoing.is_ongoing());
    assert!(!Outcome::Draw.is_ongoing());
}

#[test]
fn swap_views_flips_role_and_views() {
    let s = State::new(vec![1u8, 2], vec![3u8], Role::First);
    let t = s.clone().swap_views();
    assert_eq!(t.active, s.other);
    assert_eq!(t.other, s.active);
    assert_eq!(t.to_move, Role::Second);
    assert_eq!(t.outcome, Outcome::Ongoing);
}

#[test]
fn role_table_indexes_by_role() {
    let mut t = RoleTable::new("a", "b");
    assert_eq!(t[Role::First], "a");
    assert_eq!(t[Role::Second], "b");
    t[Role::Second] = "c";
    assert_eq!(t[Role::Second], "c");

    let roles: Vec<Role> = t.iter().map(|(r, _)| r).collect();
    assert_eq!(roles, vec![Role::First, Role::Second]);
}
