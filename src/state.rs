use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::layout::Rect;

use crate::match_log::{Zone, ZONE_COLS, ZONE_ROWS, default_actions};
use crate::match_setup::MatchSetup;
use crate::model::{ActionType, Player, PlayerRequirement, Side, Team};
use crate::persist::Snapshot;
use crate::picker::{PickerOutcome, PlayerPicker};
use crate::roster_import::{append_players, import_roster};
use crate::store::{TeamRegistry, TeamStore};
use crate::tactical::{TacticalEditor, pointer_to_field, token_at};
use crate::team_form::{FormError, LogoSource, TeamForm, submit_team};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Teams,
    MatchSetup,
    Tactical,
    Match,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Replace,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDialog {
    pub team_id: String,
    pub team_name: String,
    pub mode: ImportMode,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    TeamForm(TeamForm),
    Import(ImportDialog),
    Formation(String),
    ConfirmDelete { team_id: String, name: String },
}

/// Action waiting on the player picker.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub action: ActionType,
    pub side: Side,
    pub zone: Zone,
    pub chosen: Vec<String>,
}

impl PendingAction {
    fn players_needed(&self) -> usize {
        match self.action.requires_player {
            PlayerRequirement::None => 0,
            PlayerRequirement::One => 1,
            PlayerRequirement::Multiple => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Log(String),
    LogoLoaded {
        generation: u64,
        result: Result<String, String>,
    },
    SnapshotSaved {
        revision: u64,
    },
    SnapshotFailed {
        revision: u64,
        error: String,
    },
}

#[derive(Debug, Clone)]
pub enum WorkerCommand {
    LoadLogo {
        generation: u64,
        path: PathBuf,
    },
    SaveSnapshot {
        path: PathBuf,
        revision: u64,
        snapshot: Box<Snapshot>,
    },
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub registry: TeamRegistry,
    pub team_cursor: usize,
    pub setup: MatchSetup,
    pub editor: Option<TacticalEditor>,
    pub dialog: Option<Dialog>,
    pub picker: Option<PlayerPicker>,
    pub pending: Option<PendingAction>,
    pub action_cursor: usize,
    pub zone: Zone,
    pub logs: VecDeque<String>,
    pub alert: Option<String>,
    pub help_overlay: bool,
    form_generation: u64,
    saved_revision: u64,
    save_in_flight: Option<u64>,
    failed_revision: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TeamRegistry::new())
    }
}

impl AppState {
    pub fn new(registry: TeamRegistry) -> Self {
        let saved_revision = registry.revision();
        Self {
            screen: Screen::Teams,
            registry,
            team_cursor: 0,
            setup: MatchSetup::new(),
            editor: None,
            dialog: None,
            picker: None,
            pending: None,
            action_cursor: 0,
            zone: Zone::center(),
            logs: VecDeque::new(),
            alert: None,
            help_overlay: false,
            form_generation: 0,
            saved_revision,
            save_in_flight: None,
            failed_revision: None,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Blocking message for the operator, mirrored into the console.
    pub fn show_alert(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.push_log(format!("[WARN] {msg}"));
        self.alert = Some(msg);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn go_to(&mut self, screen: Screen) {
        match screen {
            Screen::Tactical if self.editor.is_none() => {
                self.show_alert("Open the tactical editor from match setup");
                return;
            }
            Screen::Match if self.registry.current_match().is_none() => {
                self.show_alert("No match in progress");
                return;
            }
            _ => {}
        }
        if self.screen == Screen::Tactical && screen != Screen::Tactical {
            self.leave_tactical();
        }
        if screen == Screen::MatchSetup {
            self.setup.retain_known(self.registry.teams());
        }
        self.screen = screen;
    }

    // Teams

    pub fn selected_team(&self) -> Option<&Team> {
        self.registry.teams().get(self.team_cursor)
    }

    pub fn select_next_team(&mut self) {
        let len = self.registry.teams().len();
        if len > 0 && self.team_cursor + 1 < len {
            self.team_cursor += 1;
        }
    }

    pub fn select_prev_team(&mut self) {
        self.team_cursor = self.team_cursor.saturating_sub(1);
    }

    fn clamp_team_cursor(&mut self) {
        let len = self.registry.teams().len();
        self.team_cursor = self.team_cursor.min(len.saturating_sub(1));
    }

    fn next_generation(&mut self) -> u64 {
        self.form_generation += 1;
        self.form_generation
    }

    pub fn open_create_form(&mut self) {
        let generation = self.next_generation();
        self.dialog = Some(Dialog::TeamForm(TeamForm::create(generation)));
    }

    pub fn open_edit_form(&mut self) {
        let Some(team) = self.selected_team().cloned() else {
            self.push_log("[INFO] No team selected");
            return;
        };
        let generation = self.next_generation();
        self.dialog = Some(Dialog::TeamForm(TeamForm::edit(&team, generation)));
    }

    pub fn team_form_mut(&mut self) -> Option<&mut TeamForm> {
        match self.dialog.as_mut() {
            Some(Dialog::TeamForm(form)) => Some(form),
            _ => None,
        }
    }

    /// Submits the open team form. A logo file still has to be read, which the
    /// returned command hands to the worker.
    pub fn submit_team_form(&mut self) -> Option<WorkerCommand> {
        let (validation, generation) = match &self.dialog {
            Some(Dialog::TeamForm(form)) if !form.loading_logo => {
                (form.validate(), form.generation())
            }
            _ => return None,
        };
        match validation {
            Err(err) => {
                self.show_alert(err.to_string());
                None
            }
            Ok(LogoSource::Url(url)) => {
                self.finish_team_form(url);
                None
            }
            Ok(LogoSource::File(path)) => {
                if let Some(form) = self.team_form_mut() {
                    form.loading_logo = true;
                }
                self.push_log(format!("[INFO] Loading logo {}", path.display()));
                Some(WorkerCommand::LoadLogo { generation, path })
            }
        }
    }

    fn finish_team_form(&mut self, logo_url: String) {
        let Some(Dialog::TeamForm(mut form)) = self.dialog.take() else {
            return;
        };
        match submit_team(&mut self.registry, &form, logo_url) {
            Ok(team_id) => {
                let verb = if form.editing.is_some() { "updated" } else { "created" };
                self.push_log(format!("[INFO] Team {} {verb}", form.name.trim()));
                if let Some(idx) = self.registry.teams().iter().position(|t| t.id == team_id) {
                    self.team_cursor = idx;
                }
            }
            Err(err) => {
                form.loading_logo = false;
                self.dialog = Some(Dialog::TeamForm(form));
                self.show_alert(err.to_string());
            }
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn open_import(&mut self, mode: ImportMode) {
        let Some(team) = self.selected_team() else {
            self.push_log("[INFO] No team selected");
            return;
        };
        self.dialog = Some(Dialog::Import(ImportDialog {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            mode,
            text: String::new(),
        }));
    }

    pub fn submit_import(&mut self) {
        let Some(Dialog::Import(import)) = self.dialog.take() else {
            return;
        };
        let result = match import.mode {
            ImportMode::Replace => import_roster(&mut self.registry, &import.team_id, &import.text),
            ImportMode::Append => append_players(&mut self.registry, &import.team_id, &import.text),
        };
        match result {
            Ok(count) => self.push_log(format!(
                "[INFO] Imported {count} players into {}",
                import.team_name
            )),
            Err(err) => self.show_alert(format!("Import failed: {err}")),
        }
    }

    pub fn request_delete(&mut self) {
        let Some(team) = self.selected_team() else {
            return;
        };
        self.dialog = Some(Dialog::ConfirmDelete {
            team_id: team.id.clone(),
            name: team.name.clone(),
        });
    }

    pub fn confirm_delete(&mut self) {
        let Some(Dialog::ConfirmDelete { team_id, name }) = self.dialog.take() else {
            return;
        };
        match self.registry.delete_team(&team_id) {
            Ok(_) => {
                self.push_log(format!("[INFO] Team {name} deleted"));
                self.setup.retain_known(self.registry.teams());
                self.clamp_team_cursor();
            }
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    // Match setup

    pub fn setup_cycle(&mut self, delta: isize) {
        self.setup.cycle(self.registry.teams(), delta);
    }

    pub fn open_tactical(&mut self) {
        let (a, b) = match self.setup.validate(self.registry.teams()) {
            Ok(ids) => ids,
            Err(err) => {
                self.show_alert(err.to_string());
                return;
            }
        };
        match TacticalEditor::open(&self.registry, &a, &b) {
            Ok(editor) => {
                self.editor = Some(editor);
                self.screen = Screen::Tactical;
            }
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    pub fn begin_match(&mut self) {
        let (a, b) = match self.setup.validate(self.registry.teams()) {
            Ok(ids) => ids,
            Err(err) => {
                self.show_alert(err.to_string());
                return;
            }
        };
        match self.registry.start_match(&a, &b) {
            Ok(started) => {
                let msg = format!(
                    "[INFO] Match started: {} vs {}",
                    started.team_a.name, started.team_b.name
                );
                self.push_log(msg);
                self.zone = Zone::center();
                self.action_cursor = 0;
                self.screen = Screen::Match;
            }
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    // Tactical editor

    /// Roster of the team being edited, by jersey number.
    pub fn editor_players(&self) -> Vec<&Player> {
        let Some(editor) = &self.editor else {
            return Vec::new();
        };
        let Some(team) = self.registry.team(editor.current_team_id()) else {
            return Vec::new();
        };
        let mut players: Vec<&Player> = team.players.iter().collect();
        players.sort_by_key(|p| p.number);
        players
    }

    fn editor_player_id(&self) -> Option<String> {
        let cursor = self.editor.as_ref()?.cursor;
        self.editor_players().get(cursor).map(|p| p.id.clone())
    }

    pub fn editor_move(&mut self, delta: isize) {
        let len = self.editor_players().len();
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if len == 0 {
            editor.cursor = 0;
            return;
        }
        editor.cursor = (editor.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn editor_switch_side(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            let next = editor.selected_side().opponent();
            editor.select_side(next);
        }
    }

    pub fn editor_toggle_starter(&mut self) {
        let Some(player_id) = self.editor_player_id() else {
            return;
        };
        if let Some(editor) = self.editor.as_mut() {
            editor.toggle_starter(&player_id);
        }
    }

    pub fn editor_toggle_captain(&mut self) {
        let Some(player_id) = self.editor_player_id() else {
            return;
        };
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let result = editor.toggle_captain(&player_id).map(|_| ());
        if let Err(err) = result {
            self.show_alert(err.to_string());
        }
    }

    pub fn open_formation_input(&mut self) {
        if let Some(editor) = &self.editor {
            let current = editor.current_draft().formation().to_string();
            self.dialog = Some(Dialog::Formation(current));
        }
    }

    pub fn submit_formation(&mut self) {
        let Some(Dialog::Formation(text)) = self.dialog.take() else {
            return;
        };
        let formation = text.trim();
        if formation.is_empty() {
            self.show_alert("Formation cannot be empty");
            self.dialog = Some(Dialog::Formation(text));
            return;
        }
        if let Some(editor) = self.editor.as_mut() {
            editor.set_formation(formation);
        }
    }

    pub fn editor_reset_positions(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match editor.reset_positions(&mut self.registry) {
            Ok(()) => self.push_log("[INFO] Field positions reset"),
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    /// Writes both lineups; the editor stays open when a write fails.
    pub fn save_lineups(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        match editor.save(&mut self.registry) {
            Ok(()) => {
                self.push_log("[INFO] Lineups saved");
                self.editor = None;
                self.screen = Screen::MatchSetup;
            }
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    /// Leaves the editor, discarding staged starter/captain/formation edits.
    pub fn leave_tactical(&mut self) {
        if self.editor.take().is_some() {
            self.push_log("[INFO] Tactical editor closed without saving");
        }
        if self.screen == Screen::Tactical {
            self.screen = Screen::MatchSetup;
        }
    }

    pub fn pitch_press(&mut self, pitch: Rect, column: u16, row: u16) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let Some(team) = self.registry.team(editor.current_team_id()) else {
            return;
        };
        let tokens = editor.tokens(team);
        if let Some(token) = token_at(pitch, &tokens, column, row) {
            let player_id = token.player_id.clone();
            editor.begin_drag(&player_id);
        }
    }

    /// Pointer motion while a token is held. Leaving `panel` ends the drag.
    pub fn pitch_drag(&mut self, panel: Rect, pitch: Rect, column: u16, row: u16) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if editor.dragging().is_none() {
            return;
        }
        // Cells carry no per-token leave event, so the panel edge stands in for it.
        if !rect_contains(panel, column, row) {
            editor.end_drag();
            return;
        }
        if let Err(err) = editor.drag_to(&mut self.registry, pitch, column, row) {
            self.show_alert(err.to_string());
        }
    }

    pub fn pitch_release(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.end_drag();
        }
    }

    // Match

    pub fn toggle_clock(&mut self) {
        if let Some(current) = self.registry.current_match_mut() {
            current.toggle_clock();
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(current) = self.registry.current_match_mut() {
            current.tick(elapsed);
        }
    }

    pub fn set_possession(&mut self, side: Side) {
        let zone = self.zone;
        if let Some(current) = self.registry.current_match_mut() {
            current.set_possession(side, zone);
        }
    }

    pub fn move_zone(&mut self, d_row: i8, d_col: i8) {
        let row = (self.zone.row as i8 + d_row).clamp(0, ZONE_ROWS as i8 - 1);
        let col = (self.zone.col as i8 + d_col).clamp(0, ZONE_COLS as i8 - 1);
        self.zone = Zone::new(row as u8, col as u8);
    }

    pub fn select_zone_at(&mut self, pitch: Rect, column: u16, row: u16) {
        if rect_contains(pitch, column, row) {
            self.zone = Zone::from_field(pointer_to_field(pitch, column, row));
        }
    }

    pub fn action_move(&mut self, delta: isize) {
        let len = default_actions().len() as isize;
        self.action_cursor = (self.action_cursor as isize + delta).rem_euclid(len) as usize;
    }

    /// Records the highlighted action, or opens the picker when it names players.
    pub fn trigger_action(&mut self) {
        let Some(action) = default_actions().get(self.action_cursor).cloned() else {
            return;
        };
        let Some(current) = self.registry.current_match() else {
            return;
        };
        let side = match current.acting_side(&action) {
            Ok(side) => side,
            Err(err) => {
                self.show_alert(err.to_string());
                return;
            }
        };
        if !action.needs_player() {
            let zone = self.zone;
            self.record(&action, &[], zone);
            return;
        }
        let prompt = match action.requires_player {
            PlayerRequirement::Multiple => "Player going off",
            _ => "Select the player",
        };
        self.picker = Some(PlayerPicker::new(current.team(side), &action).with_prompt(prompt));
        self.pending = Some(PendingAction {
            action,
            side,
            zone: self.zone,
            chosen: Vec::new(),
        });
    }

    pub fn picker_choose(&mut self, outcome: PickerOutcome) {
        let player_id = match outcome {
            PickerOutcome::Cancelled => {
                self.picker = None;
                self.pending = None;
                self.push_log("[INFO] Action cancelled");
                return;
            }
            PickerOutcome::Selected(id) => id,
        };
        let Some(mut pending) = self.pending.take() else {
            self.picker = None;
            return;
        };
        if pending.chosen.contains(&player_id) {
            self.pending = Some(pending);
            self.show_alert("Pick a different player");
            return;
        }
        pending.chosen.push(player_id);
        if pending.chosen.len() < pending.players_needed() {
            self.picker = self
                .picker
                .take()
                .map(|picker| picker.with_prompt("Player coming on"));
            self.pending = Some(pending);
            return;
        }
        self.picker = None;
        self.record(&pending.action, &pending.chosen, pending.zone);
    }

    fn record(&mut self, action: &ActionType, players: &[String], zone: Zone) {
        let Some(current) = self.registry.current_match_mut() else {
            return;
        };
        match current.record_action(action, players, zone) {
            Ok(()) => self.push_log(format!("[INFO] {}", action.name)),
            Err(err) => self.show_alert(err.to_string()),
        }
    }

    pub fn finish_match(&mut self) {
        self.picker = None;
        self.pending = None;
        let summary = self
            .registry
            .end_match()
            .map(|saved| format!("[INFO] Match saved ({} actions)", saved.actions.len()));
        if let Some(msg) = summary {
            self.push_log(msg);
        }
        self.screen = Screen::MatchSetup;
    }

    // Persistence

    pub fn is_dirty(&self) -> bool {
        self.registry.revision() != self.saved_revision
    }

    /// Snapshot command for the worker when there are unsaved changes and no
    /// save is running. A revision that failed is not retried until it changes.
    pub fn snapshot_command(&mut self, path: &Path) -> Option<WorkerCommand> {
        let revision = self.registry.revision();
        if !self.is_dirty()
            || self.save_in_flight.is_some()
            || self.failed_revision == Some(revision)
        {
            return None;
        }
        self.save_in_flight = Some(revision);
        Some(WorkerCommand::SaveSnapshot {
            path: path.to_path_buf(),
            revision,
            snapshot: Box::new(Snapshot::from_registry(&self.registry)),
        })
    }
}

fn rect_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Log(msg) => state.push_log(msg),
        Delta::LogoLoaded { generation, result } => {
            let waiting = matches!(
                &state.dialog,
                Some(Dialog::TeamForm(form)) if form.generation() == generation && form.loading_logo
            );
            if !waiting {
                state.push_log("[INFO] Discarded logo from a closed form");
                return;
            }
            match result {
                Ok(data_url) => state.finish_team_form(data_url),
                Err(err) => {
                    if let Some(form) = state.team_form_mut() {
                        form.loading_logo = false;
                    }
                    state.show_alert(FormError::Logo(err).to_string());
                }
            }
        }
        Delta::SnapshotSaved { revision } => {
            state.save_in_flight = None;
            state.saved_revision = revision;
            state.failed_revision = None;
        }
        Delta::SnapshotFailed { revision, error } => {
            state.save_in_flight = None;
            state.failed_revision = Some(revision);
            state.push_log(format!("[WARN] Save failed: {error}"));
        }
    }
}
