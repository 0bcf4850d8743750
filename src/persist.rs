use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::match_log::SavedGame;
use crate::model::Team;
use crate::store::{TeamRegistry, TeamStore};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub teams: Vec<Team>,
    #[serde(default)]
    pub history: Vec<SavedGame>,
}

impl Snapshot {
    pub fn from_registry(registry: &TeamRegistry) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            teams: registry.teams().to_vec(),
            history: registry.history().to_vec(),
        }
    }

    pub fn into_registry(self) -> TeamRegistry {
        TeamRegistry::from_parts(self.teams, self.history)
    }
}

/// Reads the snapshot at `path`. A missing file or a snapshot written by a
/// different version yields `None`.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            path = %path.display(),
            found = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "snapshot version mismatch, ignoring"
        );
        return Ok(None);
    }
    info!(path = %path.display(), teams = snapshot.teams.len(), "snapshot loaded");
    Ok(Some(snapshot))
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string(snapshot).context("serialize snapshot")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    info!(path = %path.display(), teams = snapshot.teams.len(), "snapshot saved");
    Ok(())
}
