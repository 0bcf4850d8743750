use lineup_terminal::match_log::Match;
use lineup_terminal::model::{
    FieldPosition, Player, Position, Role, Side, Team, TeamColors, TeamPatch,
};
use lineup_terminal::store::{StoreError, TeamRegistry, TeamStore};
use lineup_terminal::tactical::{
    EditorError, LineupDraft, TacticalEditor, default_layout, pointer_to_field, token_at,
};
use ratatui::layout::Rect;

const PITCH: Rect = Rect {
    x: 10,
    y: 5,
    width: 50,
    height: 20,
};

fn player(team: &str, number: u32) -> Player {
    Player::new(
        format!("{team}-{number}"),
        number,
        format!("Player {number}"),
        Position::default(),
        Role::default(),
    )
}

fn team(id: &str, numbers: &[u32]) -> Team {
    let mut team = Team::new(id, id.to_uppercase(), "https://x/logo.png", TeamColors::default());
    team.players = numbers.iter().map(|n| player(id, *n)).collect();
    team
}

fn registry() -> TeamRegistry {
    let mut registry = TeamRegistry::new();
    registry.add_team(team("a", &[1, 2, 3])).expect("add a");
    registry.add_team(team("b", &[7, 8])).expect("add b");
    registry
}

/// Store that refuses updates for one team id.
struct RejectingStore {
    inner: TeamRegistry,
    reject: String,
}

impl TeamStore for RejectingStore {
    fn teams(&self) -> &[Team] {
        self.inner.teams()
    }

    fn add_team(&mut self, team: Team) -> Result<(), StoreError> {
        self.inner.add_team(team)
    }

    fn update_team(&mut self, id: &str, patch: TeamPatch) -> Result<(), StoreError> {
        if id == self.reject {
            return Err(StoreError::Rejected {
                id: id.to_string(),
                reason: "offline".to_string(),
            });
        }
        self.inner.update_team(id, patch)
    }

    fn delete_team(&mut self, id: &str) -> Result<Team, StoreError> {
        self.inner.delete_team(id)
    }

    fn start_match(&mut self, team_a: &str, team_b: &str) -> Result<&Match, StoreError> {
        self.inner.start_match(team_a, team_b)
    }
}

#[test]
fn draft_starts_from_stored_flags() {
    let mut stored = team("a", &[1, 2, 3]);
    stored.players[2].is_starter = true;
    stored.players[0].is_starter = true;
    stored.players[0].is_captain = true;
    let draft = LineupDraft::from_team(&stored);
    assert_eq!(draft.formation(), "4-4-2");
    assert_eq!(draft.starters(), ["a-1".to_string(), "a-3".to_string()]);
    assert_eq!(draft.captain(), Some("a-1"));
}

#[test]
fn captain_double_toggle_clears() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.toggle_starter("a-1");
    assert_eq!(editor.toggle_captain("a-1").expect("starter"), Some("a-1"));
    assert_eq!(editor.toggle_captain("a-1").expect("starter"), None);
    assert_eq!(editor.current_draft().captain(), None);

    editor.save(&mut registry).expect("save");
    let stored = registry.team("a").expect("team a");
    assert!(stored.players.iter().all(|p| !p.is_captain));
}

#[test]
fn draft_captain_toggle_tolerates_non_starters() {
    let stored = team("a", &[1, 2]);
    let mut draft = LineupDraft::from_team(&stored);
    assert_eq!(draft.toggle_captain("a-2"), Some("a-2"));
    assert_eq!(draft.toggle_captain("a-2"), None);
}

#[test]
fn editor_refuses_captain_outside_starters() {
    let registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    let err = editor.toggle_captain("a-2").unwrap_err();
    assert!(matches!(err, EditorError::CaptainNotStarter(id) if id == "a-2"));
    assert_eq!(editor.current_draft().captain(), None);
}

#[test]
fn set_starter_is_idempotent_and_keeps_insertion_order() {
    let registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.set_starter("a-3", true);
    editor.set_starter("a-1", true);
    editor.set_starter("a-3", true);
    assert_eq!(editor.current_draft().starters(), ["a-3".to_string(), "a-1".to_string()]);
    editor.set_starter("a-3", false);
    assert_eq!(editor.current_draft().starters(), ["a-1".to_string()]);
}

#[test]
fn save_writes_starters_for_both_teams() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.toggle_starter("a-1");
    editor.toggle_starter("a-2");
    editor.select_side(Side::B);
    assert_eq!(editor.current_team_id(), "b");

    editor.save(&mut registry).expect("save");

    let a = registry.team("a").expect("team a");
    let starters: Vec<&str> = a
        .players
        .iter()
        .filter(|p| p.is_starter)
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(starters, vec!["a-1", "a-2"]);
    let setup_a = a.tactical_setup.as_ref().expect("setup a");
    assert_eq!(setup_a.starters, vec!["a-1".to_string(), "a-2".to_string()]);
    assert_eq!(a.formation.as_deref(), Some("4-4-2"));

    let b = registry.team("b").expect("team b");
    assert!(b.players.iter().all(|p| !p.is_starter));
    let setup_b = b.tactical_setup.as_ref().expect("setup b");
    assert!(setup_b.starters.is_empty());
}

#[test]
fn formation_is_saved_per_side() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.set_formation("4-3-3");
    editor.select_side(Side::B);
    editor.set_formation("anything goes");
    editor.save(&mut registry).expect("save");
    assert_eq!(registry.team("a").expect("a").formation.as_deref(), Some("4-3-3"));
    assert_eq!(
        registry.team("b").expect("b").formation.as_deref(),
        Some("anything goes")
    );
}

#[test]
fn cancel_discards_flags_but_keeps_drags() {
    let mut registry = registry();
    let before = registry.team("a").expect("team a").clone();

    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.toggle_starter("a-1");
    editor.toggle_captain("a-1").expect("starter");
    editor.set_formation("3-5-2");
    editor.begin_drag("a-1");
    let dropped = editor
        .drag_to(&mut registry, PITCH, 35, 15)
        .expect("drag")
        .expect("dragging");
    editor.end_drag();
    drop(editor);

    let after = registry.team("a").expect("team a");
    assert_eq!(after.formation, before.formation);
    assert!(after.tactical_setup.is_none());
    assert!(after.players.iter().all(|p| !p.is_starter && !p.is_captain));
    assert_eq!(after.player("a-1").expect("a-1").field_position, Some(dropped));
}

#[test]
fn drag_clamps_to_pitch_margins() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.begin_drag("a-2");

    let beyond_right = PITCH.x + PITCH.width + PITCH.width / 10;
    let pos = editor
        .drag_to(&mut registry, PITCH, beyond_right, PITCH.y + 200)
        .expect("drag")
        .expect("dragging");
    assert_eq!(pos, FieldPosition::new(95.0, 95.0));

    let pos = editor
        .drag_to(&mut registry, PITCH, 0, 0)
        .expect("drag")
        .expect("dragging");
    assert_eq!(pos, FieldPosition::new(5.0, 5.0));

    let stored = registry.team("a").expect("a").player("a-2").expect("a-2").field_position;
    assert_eq!(stored, Some(FieldPosition::new(5.0, 5.0)));
}

#[test]
fn pointer_maps_to_percentages() {
    let centre = pointer_to_field(PITCH, PITCH.x + PITCH.width / 2, PITCH.y + PITCH.height / 2);
    assert!((centre.x - 51.0).abs() < 0.01);
    assert!((centre.y - 52.5).abs() < 0.01);
}

#[test]
fn drag_without_grab_is_ignored() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    let moved = editor.drag_to(&mut registry, PITCH, 20, 10).expect("no error");
    assert!(moved.is_none());
    assert!(registry
        .team("a")
        .expect("a")
        .players
        .iter()
        .all(|p| p.field_position.is_none()));
}

#[test]
fn reset_positions_clears_selected_team_only() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.begin_drag("a-1");
    editor.drag_to(&mut registry, PITCH, 20, 10).expect("drag a");
    editor.select_side(Side::B);
    editor.begin_drag("b-7");
    editor.drag_to(&mut registry, PITCH, 30, 12).expect("drag b");
    editor.end_drag();

    editor.select_side(Side::A);
    editor.reset_positions(&mut registry).expect("reset");

    assert!(registry
        .team("a")
        .expect("a")
        .players
        .iter()
        .all(|p| p.field_position.is_none()));
    assert!(registry.team("b").expect("b").player("b-7").expect("b-7").field_position.is_some());
}

#[test]
fn failing_second_update_keeps_first_and_names_team_b() {
    let mut store = RejectingStore {
        inner: registry(),
        reject: "b".to_string(),
    };
    let mut editor = TacticalEditor::open(&store, "a", "b").expect("open");
    editor.toggle_starter("a-3");
    editor.select_side(Side::B);
    editor.toggle_starter("b-8");

    let err = editor.save(&mut store).unwrap_err();
    assert_eq!(err.side, Side::B);
    assert_eq!(err.team_id, "b");
    assert!(err.to_string().contains("(b)"));

    let a = store.team("a").expect("a");
    assert!(a.player("a-3").expect("a-3").is_starter);
    let b = store.team("b").expect("b");
    assert!(b.players.iter().all(|p| !p.is_starter));
    assert!(b.tactical_setup.is_none());
}

#[test]
fn tokens_use_default_layout_until_dragged() {
    let mut registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    editor.toggle_starter("a-1");
    editor.toggle_starter("a-2");

    let stored = registry.team("a").expect("a").clone();
    let tokens = editor.tokens(&stored);
    assert_eq!(tokens.len(), 2);
    let layout = default_layout("4-4-2", 2);
    assert_eq!(tokens[0].position, layout[0]);
    assert_eq!(tokens[1].position, layout[1]);

    let (cx, cy) = lineup_terminal::tactical::field_to_cell(PITCH, tokens[0].position);
    let hit = token_at(PITCH, &tokens, cx, cy).expect("token under pointer");
    assert_eq!(hit.player_id, "a-1");

    editor.begin_drag("a-2");
    let moved = editor
        .drag_to(&mut registry, PITCH, 50, 20)
        .expect("drag")
        .expect("dragging");
    let stored = registry.team("a").expect("a").clone();
    let tokens = editor.tokens(&stored);
    assert_eq!(tokens[1].position, moved);
}

#[test]
fn default_layout_spreads_formation_lines() {
    let slots = default_layout("4-4-2", 11);
    assert_eq!(slots.len(), 11);
    assert!(slots[0].x < slots[1].x, "keeper sits behind the back line");
    assert!(slots.iter().all(|s| (5.0..=95.0).contains(&s.x) && (5.0..=95.0).contains(&s.y)));
    assert!(slots[10].x > slots[5].x);

    let fallback = default_layout("free", 3);
    assert!(fallback.iter().all(|s| *s == FieldPosition::new(50.0, 50.0)));
}

#[test]
fn default_layout_survives_oversized_formation_numbers() {
    let on_pitch = |s: &FieldPosition| (5.0..=95.0).contains(&s.x) && (5.0..=95.0).contains(&s.y);

    let overflowing = default_layout("18446744073709551615", 1);
    assert_eq!(overflowing.len(), 1);

    let wide = default_layout("4-4-300000000", 11);
    assert_eq!(wide.len(), 11);
    assert!(wide.iter().all(on_pitch));
    assert!(wide[1..5].iter().all(|s| s.x == wide[1].x));
    assert!(wide[9].x > wide[5].x);

    let unparsable = default_layout("9999999999999999999999999", 4);
    assert!(unparsable.iter().all(|s| *s == FieldPosition::new(50.0, 50.0)));

    assert!(default_layout("4-4-2", 0).is_empty());

    let registry = registry();
    let mut editor = TacticalEditor::open(&registry, "a", "b").expect("open");
    for id in ["a-1", "a-2", "a-3"] {
        editor.toggle_starter(id);
    }
    editor.set_formation("9999999999999999999");
    let tokens = editor.tokens(registry.team("a").expect("a"));
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| on_pitch(&t.position)));
}
