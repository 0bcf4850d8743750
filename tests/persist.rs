use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use lineup_terminal::config::AppConfig;
use lineup_terminal::model::{Team, TeamColors};
use lineup_terminal::persist::{SNAPSHOT_VERSION, Snapshot, load_snapshot, save_snapshot};
use lineup_terminal::roster_import::parse_roster;
use lineup_terminal::state::{Delta, WorkerCommand};
use lineup_terminal::store::{TeamRegistry, TeamStore};
use lineup_terminal::worker::handle_command;

fn registry() -> TeamRegistry {
    let mut registry = TeamRegistry::new();
    let mut team = Team::new("t1", "Grêmio", "https://x/l.png", TeamColors::default());
    team.players = parse_roster("t1", "1,Ana,Goleiro\n9,Bia,Atacante");
    team.formation = Some("4-3-3".to_string());
    registry.add_team(team).expect("add");
    registry
}

fn config(pairs: &[(&str, &str)]) -> AppConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(move |key| env.get(key).cloned())
}

#[test]
fn snapshot_survives_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("teams.json");
    let snapshot = Snapshot::from_registry(&registry());

    save_snapshot(&path, &snapshot).expect("save");
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_snapshot(&path).expect("load").expect("present");
    assert_eq!(loaded, snapshot);
    let restored = loaded.into_registry();
    let team = restored.team("t1").expect("team");
    assert_eq!(team.players.len(), 2);
    assert_eq!(team.formation.as_deref(), Some("4-3-3"));
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = load_snapshot(&dir.path().join("absent.json")).expect("load");
    assert!(loaded.is_none());
}

#[test]
fn other_version_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("teams.json");
    let mut snapshot = Snapshot::from_registry(&registry());
    snapshot.version = SNAPSHOT_VERSION + 1;
    save_snapshot(&path, &snapshot).expect("save");
    assert!(load_snapshot(&path).expect("load").is_none());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("teams.json");
    fs::write(&path, "{not json").expect("write");
    assert!(load_snapshot(&path).is_err());
}

#[test]
fn snapshot_without_history_still_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("teams.json");
    fs::write(&path, format!(r#"{{"version":{SNAPSHOT_VERSION},"teams":[]}}"#)).expect("write");
    let loaded = load_snapshot(&path).expect("load").expect("present");
    assert!(loaded.history.is_empty());
}

#[test]
fn config_defaults() {
    let cfg = config(&[("HOME", "/home/coach")]);
    assert_eq!(
        cfg.data_file,
        Some(PathBuf::from("/home/coach/.local/share/lineup_terminal/teams.json"))
    );
    assert_eq!(cfg.log_dir, PathBuf::from("logs"));
    assert_eq!(cfg.tick, Duration::from_millis(250));
    assert!(cfg.autosave);

    assert_eq!(config(&[]).data_file, None);
}

#[test]
fn config_overrides() {
    let cfg = config(&[
        ("HOME", "/home/coach"),
        ("XDG_DATA_HOME", "/data"),
        ("LINEUP_LOG_DIR", "/var/log/lineup"),
        ("LINEUP_TICK_MS", "10"),
        ("LINEUP_AUTOSAVE", "Off"),
    ]);
    assert_eq!(
        cfg.data_file,
        Some(PathBuf::from("/data/lineup_terminal/teams.json"))
    );
    assert_eq!(cfg.log_dir, PathBuf::from("/var/log/lineup"));
    assert_eq!(cfg.tick, Duration::from_millis(50));
    assert!(!cfg.autosave);

    let cfg = config(&[("LINEUP_DATA_FILE", " ./teams.json "), ("LINEUP_TICK_MS", "junk")]);
    assert_eq!(cfg.data_file, Some(PathBuf::from("./teams.json")));
    assert_eq!(cfg.tick, Duration::from_millis(250));
}

#[test]
fn worker_saves_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("teams.json");
    let delta = handle_command(WorkerCommand::SaveSnapshot {
        path: path.clone(),
        revision: 4,
        snapshot: Box::new(Snapshot::from_registry(&registry())),
    });
    assert_eq!(delta, Delta::SnapshotSaved { revision: 4 });
    assert!(path.exists());
}

#[test]
fn worker_reports_save_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").expect("write");
    let delta = handle_command(WorkerCommand::SaveSnapshot {
        path: blocker.join("teams.json"),
        revision: 2,
        snapshot: Box::new(Snapshot::default()),
    });
    assert!(matches!(delta, Delta::SnapshotFailed { revision: 2, .. }));
}

#[test]
fn worker_loads_logo_for_generation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("crest.gif");
    fs::write(&path, b"GIF89a").expect("write");

    match handle_command(WorkerCommand::LoadLogo { generation: 7, path }) {
        Delta::LogoLoaded { generation, result } => {
            assert_eq!(generation, 7);
            assert!(result.expect("data url").starts_with("data:image/gif;base64,"));
        }
        other => panic!("unexpected delta {other:?}"),
    }

    let missing = handle_command(WorkerCommand::LoadLogo {
        generation: 8,
        path: dir.path().join("nope.png"),
    });
    assert!(matches!(
        missing,
        Delta::LogoLoaded { generation: 8, result: Err(_) }
    ));
}
