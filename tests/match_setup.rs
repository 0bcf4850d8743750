use lineup_terminal::match_log::default_actions;
use lineup_terminal::match_setup::{LineupSummary, MatchSetup, SelectionError, SetupSlot};
use lineup_terminal::model::{Player, Position, Role, Team, TeamColors};
use lineup_terminal::picker::{PickerOutcome, PlayerPicker};

fn team(id: &str, numbers: &[u32]) -> Team {
    let mut team = Team::new(id, format!("Team {id}"), "https://x/l.png", TeamColors::default());
    team.players = numbers
        .iter()
        .map(|n| {
            Player::new(
                format!("{id}-{n}"),
                *n,
                format!("P{n}"),
                Position::default(),
                Role::default(),
            )
        })
        .collect();
    team
}

#[test]
fn fewer_than_two_teams_is_insufficient() {
    let setup = MatchSetup {
        team_a: Some("a".to_string()),
        team_b: Some("b".to_string()),
        focus: None,
    };
    assert_eq!(setup.validate(&[team("a", &[])]), Err(SelectionError::InsufficientTeams));
    assert_eq!(setup.validate(&[]), Err(SelectionError::InsufficientTeams));
}

#[test]
fn both_selections_required_and_distinct() {
    let teams = vec![team("a", &[]), team("b", &[])];
    let mut setup = MatchSetup::new();
    assert_eq!(setup.validate(&teams), Err(SelectionError::MissingSelection));

    setup.set(SetupSlot::A, Some("a".to_string()));
    assert_eq!(setup.validate(&teams), Err(SelectionError::MissingSelection));

    setup.set(SetupSlot::B, Some("a".to_string()));
    assert_eq!(setup.validate(&teams), Err(SelectionError::SameTeam));

    setup.set(SetupSlot::B, Some("b".to_string()));
    assert_eq!(
        setup.validate(&teams),
        Ok(("a".to_string(), "b".to_string()))
    );
}

#[test]
fn cycle_walks_teams_and_back_to_none() {
    let teams = vec![team("a", &[]), team("b", &[])];
    let mut setup = MatchSetup::new();
    setup.cycle(&teams, 1);
    assert_eq!(setup.team_a.as_deref(), Some("a"));
    setup.cycle(&teams, 1);
    assert_eq!(setup.team_a.as_deref(), Some("b"));
    setup.cycle(&teams, 1);
    assert_eq!(setup.team_a, None);
    setup.cycle(&teams, -1);
    assert_eq!(setup.team_a.as_deref(), Some("b"));

    setup.toggle_focus();
    setup.cycle(&teams, 1);
    assert_eq!(setup.team_b.as_deref(), Some("a"));
}

#[test]
fn deleted_teams_drop_out_of_the_selection() {
    let mut setup = MatchSetup::new();
    setup.set(SetupSlot::A, Some("a".to_string()));
    setup.set(SetupSlot::B, Some("gone".to_string()));
    setup.retain_known(&[team("a", &[]), team("b", &[])]);
    assert_eq!(setup.team_a.as_deref(), Some("a"));
    assert_eq!(setup.team_b, None);
}

#[test]
fn summary_reports_formation_starters_and_captain() {
    let mut t = team("a", &[1, 2, 3]);
    let summary = LineupSummary::of(&t);
    assert_eq!(summary.formation_label(), "not set");
    assert_eq!(summary.starters_label(), "0/11");
    assert_eq!(summary.captain_label(), "-");

    t.formation = Some("4-3-3".to_string());
    t.players[0].is_starter = true;
    t.players[1].is_starter = true;
    t.players[1].is_captain = true;
    let summary = LineupSummary::of(&t);
    assert_eq!(summary.formation_label(), "4-3-3");
    assert_eq!(summary.starters_label(), "2/11");
    assert_eq!(summary.captain_label(), "P2");
}

#[test]
fn picker_lists_players_by_number() {
    let t = team("a", &[10, 1, 7]);
    let picker = PlayerPicker::new(&t, &default_actions()[0]);
    let numbers: Vec<u32> = picker.players().iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 7, 10]);
    assert_eq!(picker.team_name, "Team a");
}

#[test]
fn picker_selects_exactly_one_id() {
    let t = team("a", &[10, 1, 7]);
    let mut picker = PlayerPicker::new(&t, &default_actions()[0]);
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-1".to_string())));
    picker.move_by(-1);
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-10".to_string())));
    assert_eq!(
        picker.select_index(1),
        Some(PickerOutcome::Selected("a-7".to_string()))
    );
    assert_eq!(picker.select_index(9), None);
}

#[test]
fn typed_jersey_number_moves_the_cursor() {
    let t = team("a", &[1, 7, 10, 12]);
    let mut picker = PlayerPicker::new(&t, &default_actions()[0]);

    assert!(picker.type_digit('7'));
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-7".to_string())));

    // "7" then "1" matches nobody, so "1" starts over.
    assert!(picker.type_digit('1'));
    assert_eq!(picker.number_entry(), "1");
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-1".to_string())));
    assert!(picker.type_digit('2'));
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-12".to_string())));

    assert!(!picker.type_digit('9'));
    assert_eq!(picker.number_entry(), "");
    assert_eq!(picker.confirm(), Some(PickerOutcome::Selected("a-12".to_string())));

    picker.type_digit('1');
    picker.move_by(1);
    assert_eq!(picker.number_entry(), "");
}

#[test]
fn empty_picker_can_only_cancel() {
    let t = team("a", &[]);
    let mut picker = PlayerPicker::new(&t, &default_actions()[0]);
    assert!(picker.is_empty());
    picker.move_by(1);
    assert_eq!(picker.cursor(), 0);
    assert_eq!(picker.confirm(), None);
    assert_eq!(picker.cancel(), PickerOutcome::Cancelled);
}
