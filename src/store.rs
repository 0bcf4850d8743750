use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::match_log::{Match, SavedGame};
use crate::model::{Team, TeamPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("team id already registered: {0}")]
    DuplicateTeam(String),
    #[error("a match needs two different teams")]
    SameTeam,
    #[error("update rejected for team {id}: {reason}")]
    Rejected { id: String, reason: String },
}

/// Team registry operations the screens depend on.
///
/// Mutations are synchronous and last-write-wins.
pub trait TeamStore {
    fn teams(&self) -> &[Team];

    fn team(&self, id: &str) -> Option<&Team> {
        self.teams().iter().find(|t| t.id == id)
    }

    fn add_team(&mut self, team: Team) -> Result<(), StoreError>;

    fn update_team(&mut self, id: &str, patch: TeamPatch) -> Result<(), StoreError>;

    /// Removes the team together with its roster.
    fn delete_team(&mut self, id: &str) -> Result<Team, StoreError>;

    fn start_match(&mut self, team_a: &str, team_b: &str) -> Result<&Match, StoreError>;
}

/// In-process store: registered teams, the match in progress and finished games.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: Vec<Team>,
    current_match: Option<Match>,
    history: Vec<SavedGame>,
    revision: u64,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(teams: Vec<Team>, history: Vec<SavedGame>) -> Self {
        Self {
            teams,
            current_match: None,
            history,
            revision: 0,
        }
    }

    /// Bumped on every mutation; used to detect unsaved changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &[SavedGame] {
        &self.history
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.as_ref()
    }

    /// The running match is not persisted, so changes to it leave the revision alone.
    pub fn current_match_mut(&mut self) -> Option<&mut Match> {
        self.current_match.as_mut()
    }

    /// Closes the running match and archives it.
    pub fn end_match(&mut self) -> Option<&SavedGame> {
        let finished = self.current_match.take()?;
        let saved = finished.finish(Utc::now());
        info!(game_id = %saved.id, actions = saved.actions.len(), "match archived");
        self.history.push(saved);
        self.revision += 1;
        self.history.last()
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.teams
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::UnknownTeam(id.to_string()))
    }
}

impl TeamStore for TeamRegistry {
    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn add_team(&mut self, team: Team) -> Result<(), StoreError> {
        if self.teams.iter().any(|t| t.id == team.id) {
            return Err(StoreError::DuplicateTeam(team.id));
        }
        info!(team_id = %team.id, name = %team.name, "team added");
        self.teams.push(team);
        self.revision += 1;
        Ok(())
    }

    fn update_team(&mut self, id: &str, patch: TeamPatch) -> Result<(), StoreError> {
        let idx = self.position(id)?;
        if patch.is_empty() {
            warn!(team_id = id, "empty team update ignored");
            return Ok(());
        }
        self.teams[idx].apply(patch);
        self.revision += 1;
        Ok(())
    }

    fn delete_team(&mut self, id: &str) -> Result<Team, StoreError> {
        let idx = self.position(id)?;
        let removed = self.teams.remove(idx);
        info!(team_id = id, players = removed.players.len(), "team deleted");
        self.revision += 1;
        Ok(removed)
    }

    fn start_match(&mut self, team_a: &str, team_b: &str) -> Result<&Match, StoreError> {
        if team_a == team_b {
            return Err(StoreError::SameTeam);
        }
        let a = self.teams[self.position(team_a)?].clone();
        let b = self.teams[self.position(team_b)?].clone();
        let started = Match::new(a, b, Utc::now());
        info!(match_id = %started.id, team_a, team_b, "match started");
        Ok(self.current_match.insert(started))
    }
}
