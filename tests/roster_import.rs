use lineup_terminal::model::{
    DEFAULT_POSITION_LABEL, DEFAULT_ROLE_LABEL, Position, Role, Team, TeamColors,
};
use lineup_terminal::roster_import::{append_players, import_roster, parse_roster};
use lineup_terminal::store::{StoreError, TeamRegistry, TeamStore};

fn registry_with(team_id: &str) -> TeamRegistry {
    let mut registry = TeamRegistry::new();
    registry
        .add_team(Team::new(
            team_id,
            "Flamengo",
            "https://example.com/logo.png",
            TeamColors::default(),
        ))
        .expect("add team");
    registry
}

#[test]
fn full_line_maps_every_field() {
    let players = parse_roster("t1", "10,Ana,Atacante,Titular");
    assert_eq!(players.len(), 1);
    let ana = &players[0];
    assert_eq!(ana.id, "t1-10");
    assert_eq!(ana.number, 10);
    assert_eq!(ana.name, "Ana");
    assert_eq!(ana.position, Position::Forward);
    assert_eq!(ana.position.label(), "Atacante");
    assert_eq!(ana.role.label(), "Titular");
    assert!(!ana.is_starter);
    assert!(!ana.is_captain);
    assert!(ana.field_position.is_none());
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let players = parse_roster("t1", ",Bia,,");
    assert_eq!(players.len(), 1);
    let bia = &players[0];
    assert_eq!(bia.number, 1);
    assert_eq!(bia.name, "Bia");
    assert_eq!(bia.position.label(), DEFAULT_POSITION_LABEL);
    assert_eq!(bia.role.label(), DEFAULT_ROLE_LABEL);
    assert_eq!(bia.id, "t1-1");
}

#[test]
fn fallback_number_counts_non_empty_lines() {
    let text = "9,Caio,Zagueiro,Libero\n\n   \n,Duda\nabc,Eva";
    let players = parse_roster("t1", text);
    let numbers: Vec<u32> = players.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![9, 2, 3]);
}

#[test]
fn every_player_has_non_empty_fields() {
    let texts = [
        "",
        ",,,",
        "x",
        "7",
        "  12 , , Goleiro ,",
        "-4,Neg,Lateral Esquerdo,Ala",
        "0,Zero",
        "3,Tri,Posição Nova,Papel Novo,extra,fields",
        "\t\n,\n,,,,\n",
    ];
    for text in texts {
        for player in parse_roster("team", text) {
            assert!(player.number > 0, "number for {text:?}");
            assert!(!player.name.trim().is_empty(), "name for {text:?}");
            assert!(!player.position.label().is_empty(), "position for {text:?}");
            assert!(!player.role.label().is_empty(), "role for {text:?}");
            assert!(!player.id.is_empty());
        }
    }
}

#[test]
fn missing_name_uses_jersey_number() {
    let players = parse_roster("t1", "8");
    assert_eq!(players[0].name, "Jogador 8");
}

#[test]
fn unknown_labels_are_preserved() {
    let players = parse_roster("t1", "5,Gil,Volante,Meia Central");
    assert_eq!(players[0].position, Position::Other("Volante".to_string()));
    assert_eq!(players[0].role, Role::CentralMidfielder);
}

#[test]
fn duplicate_numbers_get_unique_ids() {
    let players = parse_roster("t1", "10,Ana\n10,Bia\n10,Caio");
    let ids: Vec<&str> = players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["t1-10", "t1-10-2", "t1-10-3"]);
    assert!(players.iter().all(|p| p.number == 10));
}

#[test]
fn import_replaces_existing_roster() {
    let mut registry = registry_with("t1");
    import_roster(&mut registry, "t1", "1,Old").expect("first import");
    let count = import_roster(&mut registry, "t1", "2,New\n3,Newer").expect("second import");
    assert_eq!(count, 2);
    let team = registry.team("t1").expect("team");
    let names: Vec<&str> = team.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Newer"]);
}

#[test]
fn append_keeps_existing_players_and_ids_unique() {
    let mut registry = registry_with("t1");
    import_roster(&mut registry, "t1", "10,Ana\n,Bia").expect("import");
    let count = append_players(&mut registry, "t1", "10,Caio\n,Duda").expect("append");
    assert_eq!(count, 2);

    let team = registry.team("t1").expect("team");
    let ids: Vec<&str> = team.players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["t1-10", "t1-2", "t1-10-2", "t1-4"]);
    assert_eq!(team.players[3].number, 4);
}

#[test]
fn import_into_unknown_team_fails() {
    let mut registry = registry_with("t1");
    let err = import_roster(&mut registry, "missing", "1,Ana").unwrap_err();
    assert_eq!(err, StoreError::UnknownTeam("missing".to_string()));
    assert!(registry.team("t1").expect("team").players.is_empty());
}
