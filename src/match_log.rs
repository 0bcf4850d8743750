use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{ActionType, FieldPosition, PlayerRequirement, Side, SidePair, Team};

pub const ZONE_ROWS: u8 = 3;
pub const ZONE_COLS: u8 = 6;

static DEFAULT_ACTIONS: Lazy<Vec<ActionType>> = Lazy::new(|| {
    vec![
        action("pass", "Passe", "P", PlayerRequirement::One),
        action("shot", "Finalização", "F", PlayerRequirement::One),
        ActionType {
            changes_possession: true,
            ..action("goal", "Gol", "G", PlayerRequirement::One)
        },
        ActionType {
            reverse_action: true,
            changes_possession: true,
            ..action("tackle", "Desarme", "D", PlayerRequirement::One)
        },
        ActionType {
            reverse_action: true,
            counter_action: Some("foul_suffered".to_string()),
            ..action("foul", "Falta", "X", PlayerRequirement::One)
        },
        action("foul_suffered", "Falta sofrida", "S", PlayerRequirement::None),
        action("corner", "Escanteio", "E", PlayerRequirement::None),
        ActionType {
            changes_possession: true,
            ..action("offside", "Impedimento", "I", PlayerRequirement::One)
        },
        ActionType {
            changes_possession: true,
            ..action("out", "Lateral", "L", PlayerRequirement::None)
        },
        action("substitution", "Substituição", "T", PlayerRequirement::Multiple),
    ]
});

fn action(id: &str, name: &str, icon: &str, requires_player: PlayerRequirement) -> ActionType {
    ActionType {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        requires_player,
        counter_action: None,
        reverse_action: false,
        changes_possession: false,
    }
}

pub fn default_actions() -> &'static [ActionType] {
    &DEFAULT_ACTIONS
}

pub fn find_action(id: &str) -> Option<&'static ActionType> {
    DEFAULT_ACTIONS.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("set possession before logging this action")]
    NoPossession,
    #[error("action needs {expected} player(s), got {got}")]
    WrongPlayerCount { expected: usize, got: usize },
    #[error("player {0} is not in the acting team")]
    UnknownPlayer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameActionKind {
    Possession,
    Specific,
}

/// Cell of the pitch grid an event happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub row: u8,
    pub col: u8,
}

impl Zone {
    pub fn new(row: u8, col: u8) -> Self {
        Self {
            row: row.min(ZONE_ROWS - 1),
            col: col.min(ZONE_COLS - 1),
        }
    }

    pub fn from_field(pos: FieldPosition) -> Self {
        let row = (pos.y.clamp(0.0, 99.999) / 100.0 * f32::from(ZONE_ROWS)) as u8;
        let col = (pos.x.clamp(0.0, 99.999) / 100.0 * f32::from(ZONE_COLS)) as u8;
        Self::new(row, col)
    }

    pub fn center() -> Self {
        Self::new(ZONE_ROWS / 2, ZONE_COLS / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub player_out: String,
    pub player_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GameActionKind,
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_ids: Vec<String>,
    pub zone: Zone,
    /// Match clock in seconds.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Substitution>,
}

impl GameAction {
    fn new(kind: GameActionKind, team_id: &str, zone: Zone, timestamp: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            team_id: team_id.to_string(),
            player_id: None,
            player_ids: Vec::new(),
            zone,
            timestamp,
            action_name: None,
            substitution: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub team_a: Team,
    pub team_b: Team,
    pub actions: Vec<GameAction>,
    pub start_time: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub is_playing: bool,
    pub current_possession: Option<String>,
}

impl Match {
    pub fn new(team_a: Team, team_b: Team, start_time: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_a,
            team_b,
            actions: Vec::new(),
            start_time,
            elapsed_ms: 0,
            is_playing: false,
            current_possession: None,
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.team_a.id == team_id {
            Some(Side::A)
        } else if self.team_b.id == team_id {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Match clock in whole seconds.
    pub fn current_time(&self) -> u64 {
        self.elapsed_ms / 1000
    }

    pub fn toggle_clock(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if self.is_playing {
            self.elapsed_ms = self
                .elapsed_ms
                .saturating_add(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        }
    }

    pub fn possession_side(&self) -> Option<Side> {
        self.current_possession
            .as_deref()
            .and_then(|id| self.side_of(id))
    }

    /// Hands possession to `side`, logging a possession action.
    pub fn set_possession(&mut self, side: Side, zone: Zone) {
        let team_id = self.team(side).id.clone();
        let timestamp = self.current_time();
        self.actions.push(GameAction::new(
            GameActionKind::Possession,
            &team_id,
            zone,
            timestamp,
        ));
        self.current_possession = Some(team_id);
    }

    /// Team the action is credited to: the holder, or the opponent for reverse actions.
    pub fn acting_side(&self, action: &ActionType) -> Result<Side, MatchError> {
        let holder = self.possession_side().ok_or(MatchError::NoPossession)?;
        Ok(if action.reverse_action {
            holder.opponent()
        } else {
            holder
        })
    }

    /// Logs `action` with the picked players (none, one, or `[out, in]` for multiple).
    pub fn record_action(
        &mut self,
        action: &ActionType,
        players: &[String],
        zone: Zone,
    ) -> Result<(), MatchError> {
        let holder = self.possession_side().ok_or(MatchError::NoPossession)?;
        let side = self.acting_side(action)?;
        let expected = match action.requires_player {
            PlayerRequirement::None => 0,
            PlayerRequirement::One => 1,
            PlayerRequirement::Multiple => 2,
        };
        if players.len() != expected {
            return Err(MatchError::WrongPlayerCount {
                expected,
                got: players.len(),
            });
        }
        let team = self.team(side);
        if let Some(unknown) = players.iter().find(|id| team.player(id).is_none()) {
            return Err(MatchError::UnknownPlayer(unknown.clone()));
        }

        let team_id = team.id.clone();
        let timestamp = self.current_time();
        let mut entry = GameAction::new(GameActionKind::Specific, &team_id, zone, timestamp);
        entry.action_name = Some(action.name.clone());
        match action.requires_player {
            PlayerRequirement::None => {}
            PlayerRequirement::One => entry.player_id = players.first().cloned(),
            PlayerRequirement::Multiple => {
                entry.player_ids = players.to_vec();
                let substitution = Substitution {
                    player_out: players[0].clone(),
                    player_in: players[1].clone(),
                };
                self.apply_substitution(side, &substitution);
                entry.substitution = Some(substitution);
            }
        }
        debug!(action = %action.id, team = %team_id, "match action recorded");
        self.actions.push(entry);

        if let Some(counter) = action.counter_action.as_deref().and_then(find_action) {
            let opponent_id = self.team(side.opponent()).id.clone();
            let mut counter_entry =
                GameAction::new(GameActionKind::Specific, &opponent_id, zone, timestamp);
            counter_entry.action_name = Some(counter.name.clone());
            self.actions.push(counter_entry);
        }

        if action.changes_possession {
            self.set_possession(holder.opponent(), zone);
        }
        Ok(())
    }

    fn apply_substitution(&mut self, side: Side, substitution: &Substitution) {
        let team = self.team_mut(side);
        for player in &mut team.players {
            if player.id == substitution.player_out {
                player.is_starter = false;
                player.is_captain = false;
            } else if player.id == substitution.player_in {
                player.is_starter = true;
            }
        }
    }

    pub fn stats(&self) -> GameStats {
        let mut actions = SidePair::new(0usize, 0usize);
        let mut specific: BTreeMap<String, SidePair<usize>> = BTreeMap::new();
        for entry in &self.actions {
            if entry.kind != GameActionKind::Specific {
                continue;
            }
            let Some(side) = self.side_of(&entry.team_id) else {
                continue;
            };
            *actions.get_mut(side) += 1;
            if let Some(name) = &entry.action_name {
                *specific.entry(name.clone()).or_default().get_mut(side) += 1;
            }
        }
        GameStats {
            possession: self.possession_share(),
            actions,
            specific_actions: specific,
        }
    }

    /// Percent of the clock each side held the ball; falls back to possession
    /// action counts while the clock has not run.
    fn possession_share(&self) -> SidePair<f32> {
        let changes: Vec<(Side, u64)> = self
            .actions
            .iter()
            .filter(|a| a.kind == GameActionKind::Possession)
            .filter_map(|a| self.side_of(&a.team_id).map(|side| (side, a.timestamp)))
            .collect();
        if changes.is_empty() {
            return SidePair::new(0.0, 0.0);
        }

        let now = self.current_time();
        let mut held = SidePair::new(0u64, 0u64);
        for (idx, (side, start)) in changes.iter().enumerate() {
            let end = changes.get(idx + 1).map(|(_, t)| *t).unwrap_or(now);
            *held.get_mut(*side) += end.saturating_sub(*start);
        }
        if held.a + held.b == 0 {
            held = SidePair::new(0, 0);
            for (side, _) in &changes {
                *held.get_mut(*side) += 1;
            }
        }
        let total = (held.a + held.b) as f32;
        SidePair::new(
            held.a as f32 * 100.0 / total,
            held.b as f32 * 100.0 / total,
        )
    }

    pub fn finish(self, end_time: DateTime<Utc>) -> SavedGame {
        SavedGame {
            id: self.id,
            duration: self.elapsed_ms / 1000,
            team_a: self.team_a,
            team_b: self.team_b,
            actions: self.actions,
            start_time: self.start_time,
            end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameStats {
    pub possession: SidePair<f32>,
    pub actions: SidePair<usize>,
    pub specific_actions: BTreeMap<String, SidePair<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub id: String,
    pub team_a: Team,
    pub team_b: Team,
    pub actions: Vec<GameAction>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Clock duration in seconds.
    pub duration: u64,
}
