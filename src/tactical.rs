use ratatui::layout::Rect;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{
    FieldPosition, LINEUP_SIZE, Player, Side, SidePair, TacticalSetup, Team, TeamPatch,
};
use crate::store::{StoreError, TeamStore};

/// Half-width, in cells, of the area that grabs a token on the pitch.
const TOKEN_HIT_RADIUS: u16 = 2;
const KEEPER_X: f32 = 8.0;
const FIRST_LINE_X: f32 = 25.0;
const LAST_LINE_X: f32 = 85.0;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("player {0} is not in this team")]
    UnknownPlayer(String),
    #[error("only starters can be captain")]
    CaptainNotStarter(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Lineup save failed for `side`. Updates issued before it stay committed.
#[derive(Debug, Error)]
#[error("saving lineup for team {} ({team_id}) failed: {source}", .side.label())]
pub struct SaveError {
    pub side: Side,
    pub team_id: String,
    #[source]
    pub source: StoreError,
}

/// Staged starters/captain/formation for one team, kept apart from the stored record
/// until the editor saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupDraft {
    formation: String,
    starters: Vec<String>,
    captain: Option<String>,
}

impl LineupDraft {
    pub fn from_team(team: &Team) -> Self {
        Self {
            formation: team.formation_or_default().to_string(),
            starters: team.starters().map(|p| p.id.clone()).collect(),
            captain: team.captain().map(|p| p.id.clone()),
        }
    }

    pub fn formation(&self) -> &str {
        &self.formation
    }

    /// Starter ids in the order they were marked.
    pub fn starters(&self) -> &[String] {
        &self.starters
    }

    pub fn captain(&self) -> Option<&str> {
        self.captain.as_deref()
    }

    pub fn is_starter(&self, player_id: &str) -> bool {
        self.starters.iter().any(|id| id == player_id)
    }

    pub fn set_starter(&mut self, player_id: &str, checked: bool) {
        if checked {
            if !self.is_starter(player_id) {
                self.starters.push(player_id.to_string());
            }
        } else {
            self.starters.retain(|id| id != player_id);
        }
    }

    pub fn toggle_starter(&mut self, player_id: &str) -> bool {
        let checked = !self.is_starter(player_id);
        self.set_starter(player_id, checked);
        checked
    }

    /// Sets the captain, or clears it when `player_id` already is captain.
    /// Starter membership is not checked here.
    pub fn toggle_captain(&mut self, player_id: &str) -> Option<&str> {
        if self.captain.as_deref() == Some(player_id) {
            self.captain = None;
        } else {
            self.captain = Some(player_id.to_string());
        }
        self.captain.as_deref()
    }

    pub fn set_formation(&mut self, formation: impl Into<String>) {
        self.formation = formation.into();
    }

    pub fn snapshot(&self) -> TacticalSetup {
        TacticalSetup {
            starters: self.starters.clone(),
            captain: self.captain.clone(),
            formation: self.formation.clone(),
        }
    }

    /// Copies `players` with starter/captain flags recomputed from this draft.
    pub fn apply_to(&self, players: &[Player]) -> Vec<Player> {
        players
            .iter()
            .map(|player| Player {
                is_starter: self.is_starter(&player.id),
                is_captain: self.captain.as_deref() == Some(player.id.as_str()),
                ..player.clone()
            })
            .collect()
    }
}

/// Lineup editor over the two teams of a fixture.
///
/// Starter, captain and formation edits are staged in drafts and written by
/// [`TacticalEditor::save`]. Drags and position resets write through immediately,
/// so dropping the editor without saving keeps them.
#[derive(Debug, Clone)]
pub struct TacticalEditor {
    team_ids: SidePair<String>,
    drafts: SidePair<LineupDraft>,
    selected: Side,
    dragging: Option<String>,
    pub cursor: usize,
}

impl TacticalEditor {
    pub fn open<S: TeamStore + ?Sized>(
        store: &S,
        team_a: &str,
        team_b: &str,
    ) -> Result<Self, StoreError> {
        let a = store
            .team(team_a)
            .ok_or_else(|| StoreError::UnknownTeam(team_a.to_string()))?;
        let b = store
            .team(team_b)
            .ok_or_else(|| StoreError::UnknownTeam(team_b.to_string()))?;
        Ok(Self {
            team_ids: SidePair::new(a.id.clone(), b.id.clone()),
            drafts: SidePair::new(LineupDraft::from_team(a), LineupDraft::from_team(b)),
            selected: Side::A,
            dragging: None,
            cursor: 0,
        })
    }

    pub fn selected_side(&self) -> Side {
        self.selected
    }

    pub fn select_side(&mut self, side: Side) {
        if self.selected != side {
            self.selected = side;
            self.dragging = None;
            self.cursor = 0;
        }
    }

    pub fn team_id(&self, side: Side) -> &str {
        self.team_ids.get(side)
    }

    pub fn current_team_id(&self) -> &str {
        self.team_id(self.selected)
    }

    pub fn draft(&self, side: Side) -> &LineupDraft {
        self.drafts.get(side)
    }

    pub fn current_draft(&self) -> &LineupDraft {
        self.draft(self.selected)
    }

    fn current_draft_mut(&mut self) -> &mut LineupDraft {
        self.drafts.get_mut(self.selected)
    }

    pub fn toggle_starter(&mut self, player_id: &str) -> bool {
        self.current_draft_mut().toggle_starter(player_id)
    }

    pub fn set_starter(&mut self, player_id: &str, checked: bool) {
        self.current_draft_mut().set_starter(player_id, checked);
    }

    /// Captain toggle as offered to the operator: only reachable for current starters.
    pub fn toggle_captain(&mut self, player_id: &str) -> Result<Option<&str>, EditorError> {
        if !self.current_draft().is_starter(player_id) {
            return Err(EditorError::CaptainNotStarter(player_id.to_string()));
        }
        Ok(self.current_draft_mut().toggle_captain(player_id))
    }

    pub fn set_formation(&mut self, formation: impl Into<String>) {
        self.current_draft_mut().set_formation(formation);
    }

    pub fn begin_drag(&mut self, player_id: &str) {
        debug!(player_id, "drag started");
        self.dragging = Some(player_id.to_string());
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Moves the dragged token to the pointer and stores the clamped position
    /// right away. Returns `None` when nothing is being dragged.
    pub fn drag_to<S: TeamStore + ?Sized>(
        &mut self,
        store: &mut S,
        pitch: Rect,
        column: u16,
        row: u16,
    ) -> Result<Option<FieldPosition>, EditorError> {
        let Some(player_id) = self.dragging.clone() else {
            return Ok(None);
        };
        let position = pointer_to_field(pitch, column, row);
        let team_id = self.current_team_id().to_string();
        let team = store
            .team(&team_id)
            .ok_or_else(|| StoreError::UnknownTeam(team_id.clone()))?;
        if team.player(&player_id).is_none() {
            self.dragging = None;
            return Err(EditorError::UnknownPlayer(player_id));
        }
        let players = team
            .players
            .iter()
            .map(|p| {
                if p.id == player_id {
                    Player {
                        field_position: Some(position),
                        ..p.clone()
                    }
                } else {
                    p.clone()
                }
            })
            .collect();
        store.update_team(&team_id, TeamPatch::players(players))?;
        Ok(Some(position))
    }

    /// Clears custom positions of the selected team. Written immediately.
    pub fn reset_positions<S: TeamStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<(), EditorError> {
        let team_id = self.current_team_id().to_string();
        let team = store
            .team(&team_id)
            .ok_or_else(|| StoreError::UnknownTeam(team_id.clone()))?;
        let players = team
            .players
            .iter()
            .map(|p| Player {
                field_position: None,
                ..p.clone()
            })
            .collect();
        store.update_team(&team_id, TeamPatch::players(players))?;
        self.dragging = None;
        info!(team_id = %team_id, "field positions reset");
        Ok(())
    }

    /// Commits both drafts, team A first. No rollback: if team B fails, team A
    /// keeps its new lineup and the error names team B.
    pub fn save<S: TeamStore + ?Sized>(&self, store: &mut S) -> Result<(), SaveError> {
        for side in [Side::A, Side::B] {
            let team_id = self.team_id(side).to_string();
            let draft = self.draft(side);
            let fail = |source| SaveError {
                side,
                team_id: team_id.clone(),
                source,
            };
            let team = store
                .team(&team_id)
                .ok_or_else(|| fail(StoreError::UnknownTeam(team_id.clone())))?;
            let patch = TeamPatch {
                players: Some(draft.apply_to(&team.players)),
                formation: Some(draft.formation().to_string()),
                tactical_setup: Some(draft.snapshot()),
                ..TeamPatch::default()
            };
            store.update_team(&team_id, patch).map_err(fail)?;
            info!(
                team_id = %team_id,
                starters = draft.starters().len(),
                formation = draft.formation(),
                "lineup saved"
            );
        }
        Ok(())
    }

    /// Starter tokens of the selected team with their pitch position; players
    /// without a stored position take the formation's default slot.
    pub fn tokens(&self, team: &Team) -> Vec<PitchToken> {
        let draft = self.current_draft();
        let starters: Vec<&Player> = team
            .players
            .iter()
            .filter(|p| draft.is_starter(&p.id))
            .collect();
        let layout = default_layout(draft.formation(), starters.len());
        starters
            .into_iter()
            .zip(layout)
            .map(|(player, slot)| PitchToken {
                player_id: player.id.clone(),
                number: player.number,
                position: player.field_position.unwrap_or(slot),
                captain: draft.captain() == Some(player.id.as_str()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitchToken {
    pub player_id: String,
    pub number: u32,
    pub position: FieldPosition,
    pub captain: bool,
}

/// Pointer cell as a clamped percentage of the pitch rectangle.
pub fn pointer_to_field(pitch: Rect, column: u16, row: u16) -> FieldPosition {
    if pitch.width == 0 || pitch.height == 0 {
        return FieldPosition::clamped(50.0, 50.0);
    }
    let x = (f32::from(column) - f32::from(pitch.x) + 0.5) / f32::from(pitch.width) * 100.0;
    let y = (f32::from(row) - f32::from(pitch.y) + 0.5) / f32::from(pitch.height) * 100.0;
    FieldPosition::clamped(x, y)
}

/// Cell a field position is drawn at inside `pitch`.
pub fn field_to_cell(pitch: Rect, position: FieldPosition) -> (u16, u16) {
    let offset = |pct: f32, len: u16| -> u16 {
        if len == 0 {
            return 0;
        }
        let cell = (pct.clamp(0.0, 100.0) / 100.0 * f32::from(len)) as u16;
        cell.min(len - 1)
    };
    (
        pitch.x + offset(position.x, pitch.width),
        pitch.y + offset(position.y, pitch.height),
    )
}

/// Token under the pointer, if any.
pub fn token_at(pitch: Rect, tokens: &[PitchToken], column: u16, row: u16) -> Option<&PitchToken> {
    tokens.iter().rev().find(|token| {
        let (cx, cy) = field_to_cell(pitch, token.position);
        cy == row && column.abs_diff(cx) <= TOKEN_HIT_RADIUS
    })
}

/// Default slots for `count` starters: keeper first, then one vertical line per
/// formation number from defence to attack. Unreadable formations stack on the centre spot.
pub fn default_layout(formation: &str, count: usize) -> Vec<FieldPosition> {
    let lines: Vec<usize> = formation
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|part| part.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .collect();
    let mut slots = Vec::with_capacity(count);
    if lines.is_empty() || count == 0 {
        slots.resize(count, FieldPosition::clamped(50.0, 50.0));
        return slots;
    }

    slots.push(FieldPosition::clamped(KEEPER_X, 50.0));
    let span = (lines.len().max(2) - 1) as f32;
    'lines: for (line_idx, players) in lines.iter().enumerate() {
        let x = if lines.len() == 1 {
            (FIRST_LINE_X + LAST_LINE_X) / 2.0
        } else {
            FIRST_LINE_X + (LAST_LINE_X - FIRST_LINE_X) * line_idx as f32 / span
        };
        // Formations are free text; a line never holds more than a full lineup.
        let players = (*players).min(LINEUP_SIZE);
        for slot in 0..players {
            if slots.len() == count {
                break 'lines;
            }
            let y = 100.0 * (slot + 1) as f32 / (players + 1) as f32;
            slots.push(FieldPosition::clamped(x, y));
        }
    }
    slots.resize(count, FieldPosition::clamped(50.0, 50.0));
    slots
}
