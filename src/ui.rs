use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::match_log::{GameActionKind, Match, ZONE_COLS, ZONE_ROWS, default_actions};
use crate::match_setup::{LineupSummary, SetupSlot};
use crate::model::{LINEUP_SIZE, Side, Team};
use crate::state::{AppState, Dialog, ImportMode, Screen};
use crate::store::TeamStore;
use crate::tactical::field_to_cell;
use crate::team_form::{FormField, TeamForm};

const CONSOLE_HEIGHT: u16 = 5;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.size();
    let chunks = frame_chunks(area);

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = body_chunks(chunks[1]);
    match state.screen {
        Screen::Teams => render_teams(frame, body[0], state),
        Screen::MatchSetup => render_match_setup(frame, body[0], state),
        Screen::Tactical => render_tactical(frame, body[0], state),
        Screen::Match => render_match(frame, body[0], state),
    }
    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, body[1]);

    let footer = Paragraph::new(footer_text(state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if let Some(dialog) = &state.dialog {
        render_dialog(frame, area, dialog);
    }
    if state.picker.is_some() {
        render_picker(frame, area, state);
    }
    if let Some(alert) = &state.alert {
        render_alert(frame, area, alert);
    }
    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn frame_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area)
}

fn body_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(CONSOLE_HEIGHT)])
        .split(area)
}

fn screen_body(area: Rect) -> Rect {
    body_chunks(frame_chunks(area)[1])[0]
}

/// Pitch panel (with border) and the pitch inside it, for a terminal of size `area`.
pub fn tactical_pitch(area: Rect) -> (Rect, Rect) {
    let columns = tactical_columns(screen_body(area));
    let panel = columns[1];
    let pitch = Block::default().borders(Borders::ALL).inner(panel);
    (panel, pitch)
}

fn tactical_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(20)])
        .split(area)
}

/// Zone grid of the match screen for a terminal of size `area`.
pub fn match_pitch(area: Rect) -> Rect {
    let columns = match_columns(screen_body(area));
    let middle = match_middle(columns[1]);
    Block::default().borders(Borders::ALL).inner(middle[0])
}

fn match_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Min(30),
            Constraint::Length(30),
        ])
        .split(area)
}

fn match_middle(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area)
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Teams => format!("LINEUP | Teams ({})", state.registry.teams().len()),
        Screen::MatchSetup => "LINEUP | Match setup".to_string(),
        Screen::Tactical => "LINEUP | Tactical setup".to_string(),
        Screen::Match => match state.registry.current_match() {
            Some(m) => format!(
                "LINEUP | {} vs {} | {} {}",
                m.team_a.name,
                m.team_b.name,
                format_clock(m.current_time()),
                if m.is_playing { "PLAYING" } else { "PAUSED" }
            ),
            None => "LINEUP | Match".to_string(),
        },
    };
    let saved = if state.is_dirty() { " *" } else { "" };
    let line1 = format!("  .-.  {title}{saved}");
    let line2 = " ( o )".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    let text = match state.screen {
        Screen::Teams => {
            "1 Teams | 2 Setup | n New | e Edit | i Import | a Append | x Delete | j/k Move | ? Help | q Quit"
        }
        Screen::MatchSetup => {
            "Tab Slot | ←/→ Team | t Tactical | m Start match | 1 Teams | ? Help | q Quit"
        }
        Screen::Tactical => {
            "Tab Side | Space Starter | c Captain | f Formation | r Reset | s Save | Esc Cancel"
        }
        Screen::Match => {
            "Space Clock | a/b Possession | j/k Action | Enter Log | arrows Zone | E End | ? Help"
        }
    };
    text.to_string()
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let visible = usize::from(CONSOLE_HEIGHT.saturating_sub(2)).max(1);
    let skip = state.logs.len().saturating_sub(visible);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total <= visible {
        return (0, total);
    }
    let start = selected.saturating_sub(visible / 2).min(total - visible);
    (start, start + visible)
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn team_color(raw: &str) -> Color {
    raw.parse::<Color>().unwrap_or(Color::Blue)
}

fn render_lines(frame: &mut Frame, area: Rect, rows: &[(String, bool)], selected: usize) {
    let visible = usize::from(area.height);
    if visible == 0 {
        return;
    }
    let (start, end) = visible_range(selected, rows.len(), visible);
    for (i, (text, highlight)) in rows[start..end].iter().enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + i as u16,
            width: area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(text.as_str()).style(selected_style(*highlight)),
            row_area,
        );
    }
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(area);

    let list_block = Block::default().title("Teams").borders(Borders::ALL);
    let list_area = list_block.inner(columns[0]);
    frame.render_widget(list_block, columns[0]);

    let teams = state.registry.teams();
    if teams.is_empty() {
        let empty = Paragraph::new("No teams yet. Press n to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, list_area);
    } else {
        let rows: Vec<(String, bool)> = teams
            .iter()
            .enumerate()
            .map(|(idx, team)| {
                (
                    format!("{} ({})", team.name, team.players.len()),
                    idx == state.team_cursor,
                )
            })
            .collect();
        render_lines(frame, list_area, &rows, state.team_cursor);
    }

    let detail = match state.selected_team() {
        Some(team) => team_detail_text(team),
        None => "Select a team".to_string(),
    };
    let title = state
        .selected_team()
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Roster".to_string());
    let roster = Paragraph::new(detail).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(roster, columns[1]);
}

fn team_detail_text(team: &Team) -> String {
    let mut lines = vec![
        format!("Logo: {}", logo_label(&team.logo_url)),
        format!("Colors: {} / {}", team.colors.primary, team.colors.secondary),
        format!(
            "Formation: {}",
            team.formation.as_deref().unwrap_or("not set")
        ),
        String::new(),
    ];
    if team.players.is_empty() {
        lines.push("No players. Press i to import a roster.".to_string());
    }
    for player in &team.players {
        let mut flags = String::new();
        if player.is_starter {
            flags.push_str(" [S]");
        }
        if player.is_captain {
            flags.push_str(" [C]");
        }
        lines.push(format!(
            "{:>3} {:<22} {:<16} {}{flags}",
            player.number,
            player.name,
            player.position.label(),
            player.role.label()
        ));
    }
    lines.join("\n")
}

fn logo_label(logo_url: &str) -> String {
    if let Some(rest) = logo_url.strip_prefix("data:") {
        let mime = rest.split(';').next().unwrap_or("image");
        return format!("embedded {mime} ({} bytes)", logo_url.len());
    }
    logo_url.to_string()
}

fn render_match_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let teams = state.registry.teams();
    if teams.len() < 2 {
        let msg = format!(
            "At least two teams are needed to set up a match ({} registered).\nPress 1 to manage teams.",
            teams.len()
        );
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Match setup").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (slot, column) in [(SetupSlot::A, columns[0]), (SetupSlot::B, columns[1])] {
        let label = match slot {
            SetupSlot::A => "Team A",
            SetupSlot::B => "Team B",
        };
        let focused = state.setup.focus == Some(slot);
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let text = match state.setup.slot(slot).and_then(|id| state.registry.team(id)) {
            Some(team) => lineup_summary_text(&LineupSummary::of(team)),
            None => "No team selected\n\nUse ←/→ to choose".to_string(),
        };
        let panel = Paragraph::new(text).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(panel, column);
    }
}

fn lineup_summary_text(summary: &LineupSummary) -> String {
    [
        summary.team_name.clone(),
        String::new(),
        format!("Formation: {}", summary.formation_label()),
        format!("Starters:  {}", summary.starters_label()),
        format!("Captain:   {}", summary.captain_label()),
    ]
    .join("\n")
}

fn render_tactical(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(editor) = &state.editor else {
        frame.render_widget(Paragraph::new("Tactical editor is closed"), area);
        return;
    };
    let columns = tactical_columns(area);
    let side = editor.selected_side();
    let team = state.registry.team(editor.current_team_id());
    let draft = editor.current_draft();
    let team_name = team.map(|t| t.name.as_str()).unwrap_or("?");

    let list_block = Block::default()
        .title(format!(
            "{} {} | {}/{} starters",
            side.label(),
            team_name,
            draft.starters().len(),
            LINEUP_SIZE
        ))
        .borders(Borders::ALL);
    let list_area = list_block.inner(columns[0]);
    frame.render_widget(list_block, columns[0]);

    let rows: Vec<(String, bool)> = state
        .editor_players()
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let starter = if draft.is_starter(&player.id) { "[x]" } else { "[ ]" };
            let captain = if draft.captain() == Some(player.id.as_str()) { " (C)" } else { "" };
            (
                format!("{starter} {:>3} {}{captain}", player.number, player.name),
                idx == editor.cursor,
            )
        })
        .collect();
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("Roster is empty").style(Style::default().fg(Color::DarkGray)),
            list_area,
        );
    } else {
        render_lines(frame, list_area, &rows, editor.cursor);
    }

    let panel = columns[1];
    let block = Block::default()
        .title(format!("Pitch | {}", draft.formation()))
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let pitch = block.inner(panel);
    frame.render_widget(block, panel);
    render_pitch_lines(frame, pitch);

    let Some(team) = team else {
        return;
    };
    if pitch.is_empty() {
        return;
    }
    let token_style = Style::default()
        .fg(Color::White)
        .bg(team_color(&team.colors.primary))
        .add_modifier(Modifier::BOLD);
    for token in editor.tokens(team) {
        let (x, y) = field_to_cell(pitch, token.position);
        let label = if token.captain {
            format!("{}C", token.number)
        } else {
            token.number.to_string()
        };
        let width = (label.len() as u16).min(pitch.width);
        let start = x
            .saturating_sub(width / 2)
            .max(pitch.x)
            .min((pitch.x + pitch.width).saturating_sub(width));
        let style = if editor.dragging() == Some(token.player_id.as_str()) {
            token_style.bg(Color::Yellow).fg(Color::Black)
        } else {
            token_style
        };
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect::new(start, y, width, 1),
        );
    }
}

fn render_pitch_lines(frame: &mut Frame, pitch: Rect) {
    if pitch.width < 3 || pitch.height == 0 {
        return;
    }
    let halfway = Rect::new(pitch.x + pitch.width / 2, pitch.y, 1, pitch.height);
    let line = vec!["│"; usize::from(pitch.height)].join("\n");
    frame.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
        halfway,
    );
}

fn render_match(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(current) = state.registry.current_match() else {
        frame.render_widget(Paragraph::new("No match in progress"), area);
        return;
    };
    let columns = match_columns(area);

    let actions_block = Block::default().title("Actions").borders(Borders::ALL);
    let actions_area = actions_block.inner(columns[0]);
    frame.render_widget(actions_block, columns[0]);
    let rows: Vec<(String, bool)> = default_actions()
        .iter()
        .enumerate()
        .map(|(idx, action)| {
            (
                format!("{} {}", action.icon, action.name),
                idx == state.action_cursor,
            )
        })
        .collect();
    render_lines(frame, actions_area, &rows, state.action_cursor);

    let middle = match_middle(columns[1]);
    let possession = current
        .possession_side()
        .map(|side| current.team(side).name.clone())
        .unwrap_or_else(|| "nobody".to_string());
    let grid_block = Block::default()
        .title(format!("Zones | Possession: {possession}"))
        .borders(Borders::ALL);
    let grid = grid_block.inner(middle[0]);
    frame.render_widget(grid_block, middle[0]);
    render_zone_grid(frame, grid, state);

    let recent = Paragraph::new(recent_actions_text(current))
        .block(Block::default().title("Log").borders(Borders::ALL));
    frame.render_widget(recent, middle[1]);

    let stats = Paragraph::new(stats_text(current))
        .block(Block::default().title("Stats").borders(Borders::ALL));
    frame.render_widget(stats, columns[2]);
}

fn render_zone_grid(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, u32::from(ZONE_ROWS)); usize::from(ZONE_ROWS)])
        .split(area);
    for (row_idx, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, u32::from(ZONE_COLS));
                usize::from(ZONE_COLS)
            ])
            .split(*row_area);
        for (col_idx, cell) in cells.iter().enumerate() {
            let selected =
                usize::from(state.zone.row) == row_idx && usize::from(state.zone.col) == col_idx;
            let style = if selected {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            };
            frame.render_widget(Block::default().borders(Borders::ALL).style(style), *cell);
        }
    }
}

fn recent_actions_text(current: &Match) -> String {
    let lines: Vec<String> = current
        .actions
        .iter()
        .rev()
        .take(8)
        .map(|entry| {
            let team = current
                .side_of(&entry.team_id)
                .map(|side| current.team(side).name.as_str())
                .unwrap_or("?");
            let what = match entry.kind {
                GameActionKind::Possession => "Possession".to_string(),
                GameActionKind::Specific => entry.action_name.clone().unwrap_or_default(),
            };
            let player = entry
                .player_id
                .as_deref()
                .and_then(|id| {
                    current
                        .side_of(&entry.team_id)
                        .and_then(|side| current.team(side).player(id))
                })
                .map(|p| format!(" #{} {}", p.number, p.name))
                .unwrap_or_default();
            format!(
                "{} {what} - {team}{player}",
                format_clock(entry.timestamp)
            )
        })
        .collect();
    if lines.is_empty() {
        return "No actions yet".to_string();
    }
    lines.join("\n")
}

fn stats_text(current: &Match) -> String {
    let stats = current.stats();
    let mut lines = vec![
        format!("{:<14}{:>6}{:>6}", "", "A", "B"),
        format!(
            "{:<14}{:>5.0}%{:>5.0}%",
            "Possession", stats.possession.a, stats.possession.b
        ),
        format!(
            "{:<14}{:>6}{:>6}",
            "Actions", stats.actions.a, stats.actions.b
        ),
    ];
    for (name, counts) in &stats.specific_actions {
        lines.push(format!("{:<14}{:>6}{:>6}", name, counts.a, counts.b));
    }
    lines.push(String::new());
    for side in [Side::A, Side::B] {
        let team = current.team(side);
        lines.push(format!("{}: {}", side.label(), team.name));
    }
    lines.join("\n")
}

fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);
    let (title, text) = match dialog {
        Dialog::TeamForm(form) => (
            if form.editing.is_some() { "Edit team" } else { "New team" }.to_string(),
            team_form_text(form),
        ),
        Dialog::Import(import) => {
            let verb = match import.mode {
                ImportMode::Replace => "Import roster (replaces players)",
                ImportMode::Append => "Add players",
            };
            (
                format!("{verb} | {}", import.team_name),
                format!(
                    "One player per line: number, name, position, role\n\n{}_\n\nCtrl+S apply | Esc cancel",
                    import.text
                ),
            )
        }
        Dialog::Formation(text) => (
            "Formation".to_string(),
            format!("{text}_\n\nEnter apply | Esc cancel"),
        ),
        Dialog::ConfirmDelete { name, .. } => (
            "Delete team".to_string(),
            format!("Delete {name} and its whole roster?\n\ny confirm | n cancel"),
        ),
    };
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn team_form_text(form: &TeamForm) -> String {
    let fields = [
        FormField::Name,
        FormField::LogoFile,
        FormField::LogoUrl,
        FormField::PrimaryColor,
        FormField::SecondaryColor,
    ];
    let mut lines: Vec<String> = fields
        .iter()
        .map(|field| {
            let marker = if form.focus == *field { ">" } else { " " };
            let mut value = form.field(*field).to_string();
            if *field == FormField::LogoUrl && value.starts_with("data:") {
                value = logo_label(&value);
            }
            format!("{marker} {:<16} {value}", field.label())
        })
        .collect();
    lines.push(String::new());
    if form.loading_logo {
        lines.push("Loading logo...".to_string());
    }
    lines.push("Tab next field | Enter save | Ctrl+L clear logo | Esc cancel".to_string());
    lines.join("\n")
}

fn render_picker(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(picker) = &state.picker else {
        return;
    };
    let sheet_height = (area.height / 2).max(5).min(area.height);
    let sheet = Rect::new(
        area.x,
        area.y + area.height - sheet_height,
        area.width,
        sheet_height,
    );
    frame.render_widget(Clear, sheet);
    let mut title = format!(
        "{} | {} | {}",
        picker.action.name, picker.team_name, picker.prompt
    );
    if !picker.number_entry().is_empty() {
        title.push_str(&format!(" | #{}", picker.number_entry()));
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(sheet);
    frame.render_widget(block, sheet);
    if picker.is_empty() {
        frame.render_widget(
            Paragraph::new("No players registered. Esc to cancel.")
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }
    let rows: Vec<(String, bool)> = picker
        .players()
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            (
                format!("{:>3}  {}", player.number, player.name),
                idx == picker.cursor(),
            )
        })
        .collect();
    render_lines(frame, inner, &rows, picker.cursor());
}

fn render_alert(frame: &mut Frame, area: Rect, alert: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(format!("{alert}\n\nEnter/Esc to dismiss"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Alert").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Lineup Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3 / 4  Teams / Setup / Tactical / Match",
        "  ?              Toggle help",
        "  q              Quit",
        "",
        "Teams:",
        "  n / e / x      New / edit / delete team",
        "  i / a          Import roster / append players",
        "",
        "Tactical:",
        "  Space / c      Toggle starter / captain",
        "  drag token     Move player on the pitch",
        "  f / r / s      Formation / reset positions / save",
        "",
        "Match:",
        "  Space          Start or pause the clock",
        "  a / b          Give possession to team A / B",
        "  Enter          Log the highlighted action",
        "  E              End match and save it",
        "",
        "Player picker:",
        "  0-9            Jump to jersey number",
        "  Enter / Esc    Pick / cancel",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
