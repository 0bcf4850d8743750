use thiserror::Error;

use crate::model::{LINEUP_SIZE, Team};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("register at least two teams to set up a match")]
    InsufficientTeams,
    #[error("select both teams first")]
    MissingSelection,
    #[error("pick two different teams")]
    SameTeam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupSlot {
    A,
    B,
}

/// Match setup selections, stored as team ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSetup {
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub focus: Option<SetupSlot>,
}

impl MatchSetup {
    pub fn new() -> Self {
        Self {
            focus: Some(SetupSlot::A),
            ..Self::default()
        }
    }

    pub fn slot(&self, slot: SetupSlot) -> Option<&str> {
        match slot {
            SetupSlot::A => self.team_a.as_deref(),
            SetupSlot::B => self.team_b.as_deref(),
        }
    }

    pub fn set(&mut self, slot: SetupSlot, team_id: Option<String>) {
        match slot {
            SetupSlot::A => self.team_a = team_id,
            SetupSlot::B => self.team_b = team_id,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = Some(match self.focus {
            Some(SetupSlot::A) => SetupSlot::B,
            _ => SetupSlot::A,
        });
    }

    /// Steps the focused slot through the registered teams, starting from
    /// "nothing selected".
    pub fn cycle(&mut self, teams: &[Team], delta: isize) {
        let Some(slot) = self.focus else {
            return;
        };
        if teams.is_empty() {
            self.set(slot, None);
            return;
        }
        let len = teams.len() as isize + 1;
        let current = self
            .slot(slot)
            .and_then(|id| teams.iter().position(|t| t.id == id))
            .map(|idx| idx as isize + 1)
            .unwrap_or(0);
        let next = (current + delta).rem_euclid(len);
        let picked = if next == 0 {
            None
        } else {
            Some(teams[(next - 1) as usize].id.clone())
        };
        self.set(slot, picked);
    }

    /// Drops selections pointing at teams that no longer exist.
    pub fn retain_known(&mut self, teams: &[Team]) {
        let known = |id: &Option<String>| {
            id.as_ref()
                .is_some_and(|id| teams.iter().any(|t| &t.id == id))
        };
        if !known(&self.team_a) {
            self.team_a = None;
        }
        if !known(&self.team_b) {
            self.team_b = None;
        }
    }

    pub fn validate(&self, teams: &[Team]) -> Result<(String, String), SelectionError> {
        if teams.len() < 2 {
            return Err(SelectionError::InsufficientTeams);
        }
        let exists = |id: &str| teams.iter().any(|t| t.id == id);
        let (Some(a), Some(b)) = (self.team_a.as_deref(), self.team_b.as_deref()) else {
            return Err(SelectionError::MissingSelection);
        };
        if !exists(a) || !exists(b) {
            return Err(SelectionError::MissingSelection);
        }
        if a == b {
            return Err(SelectionError::SameTeam);
        }
        Ok((a.to_string(), b.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupSummary {
    pub team_name: String,
    pub formation: Option<String>,
    pub starters: usize,
    pub captain: Option<String>,
}

impl LineupSummary {
    pub fn of(team: &Team) -> Self {
        Self {
            team_name: team.name.clone(),
            formation: team.formation.clone(),
            starters: team.starter_count(),
            captain: team.captain().map(|p| p.name.clone()),
        }
    }

    pub fn formation_label(&self) -> &str {
        self.formation.as_deref().unwrap_or("not set")
    }

    pub fn starters_label(&self) -> String {
        format!("{}/{}", self.starters, LINEUP_SIZE)
    }

    pub fn captain_label(&self) -> &str {
        self.captain.as_deref().unwrap_or("-")
    }
}
