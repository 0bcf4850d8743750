use std::fs;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lineup_terminal::config::AppConfig;
use lineup_terminal::model::Side;
use lineup_terminal::persist::{self, Snapshot};
use lineup_terminal::state::{AppState, Delta, Dialog, ImportMode, Screen, WorkerCommand, apply_delta};
use lineup_terminal::store::TeamRegistry;
use lineup_terminal::{ui, worker};

struct App {
    state: AppState,
    config: AppConfig,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<WorkerCommand>>,
    area: Rect,
}

impl App {
    fn new(state: AppState, config: AppConfig, cmd_tx: Option<mpsc::Sender<WorkerCommand>>) -> Self {
        Self {
            state,
            config,
            should_quit: false,
            cmd_tx,
            area: Rect::default(),
        }
    }

    fn send(&mut self, cmd: WorkerCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Background worker unavailable");
            return;
        };
        let is_logo = matches!(cmd, WorkerCommand::LoadLogo { .. });
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Background worker request failed");
            if is_logo && let Some(form) = self.state.team_form_mut() {
                form.loading_logo = false;
            }
        }
    }

    fn maybe_autosave(&mut self) {
        if !self.config.autosave {
            return;
        }
        let Some(path) = self.config.data_file.clone() else {
            return;
        };
        if let Some(cmd) = self.state.snapshot_command(&path) {
            self.send(cmd);
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.dismiss_alert();
            }
            return;
        }
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.picker.is_some() {
            self.on_picker_key(key);
            return;
        }
        if self.state.dialog.is_some() {
            self.on_dialog_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = true;
                return;
            }
            KeyCode::Char('1') => {
                self.state.go_to(Screen::Teams);
                return;
            }
            KeyCode::Char('2') => {
                self.state.go_to(Screen::MatchSetup);
                return;
            }
            KeyCode::Char('3') => {
                self.state.go_to(Screen::Tactical);
                return;
            }
            KeyCode::Char('4') => {
                self.state.go_to(Screen::Match);
                return;
            }
            _ => {}
        }

        match self.state.screen {
            Screen::Teams => self.on_teams_key(key),
            Screen::MatchSetup => self.on_setup_key(key),
            Screen::Tactical => self.on_tactical_key(key),
            Screen::Match => self.on_match_key(key),
        }
    }

    fn on_teams_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_team(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_team(),
            KeyCode::Char('n') => self.state.open_create_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.state.open_edit_form(),
            KeyCode::Char('i') => self.state.open_import(ImportMode::Replace),
            KeyCode::Char('a') => self.state.open_import(ImportMode::Append),
            KeyCode::Char('x') | KeyCode::Delete => self.state.request_delete(),
            _ => {}
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.state.setup.toggle_focus(),
            KeyCode::Left | KeyCode::Char('h') => self.state.setup_cycle(-1),
            KeyCode::Right | KeyCode::Char('l') => self.state.setup_cycle(1),
            KeyCode::Char('t') => self.state.open_tactical(),
            KeyCode::Char('m') | KeyCode::Enter => self.state.begin_match(),
            _ => {}
        }
    }

    fn on_tactical_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.state.editor_switch_side(),
            KeyCode::Char('j') | KeyCode::Down => self.state.editor_move(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.editor_move(-1),
            KeyCode::Char(' ') => self.state.editor_toggle_starter(),
            KeyCode::Char('c') => self.state.editor_toggle_captain(),
            KeyCode::Char('f') => self.state.open_formation_input(),
            KeyCode::Char('r') => self.state.editor_reset_positions(),
            KeyCode::Char('s') => self.state.save_lineups(),
            KeyCode::Esc | KeyCode::Char('b') => self.state.leave_tactical(),
            _ => {}
        }
    }

    fn on_match_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.state.toggle_clock(),
            KeyCode::Char('a') => self.state.set_possession(Side::A),
            KeyCode::Char('b') => self.state.set_possession(Side::B),
            KeyCode::Char('j') => self.state.action_move(1),
            KeyCode::Char('k') => self.state.action_move(-1),
            KeyCode::Enter => self.state.trigger_action(),
            KeyCode::Up => self.state.move_zone(-1, 0),
            KeyCode::Down => self.state.move_zone(1, 0),
            KeyCode::Left => self.state.move_zone(0, -1),
            KeyCode::Right => self.state.move_zone(0, 1),
            KeyCode::Char('E') => self.state.finish_match(),
            _ => {}
        }
    }

    fn on_picker_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.state.picker.as_mut() else {
            return;
        };
        let outcome = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                picker.move_by(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                picker.move_by(-1);
                None
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                picker.type_digit(c);
                None
            }
            KeyCode::Enter => picker.confirm(),
            KeyCode::Esc => Some(picker.cancel()),
            _ => None,
        };
        if let Some(outcome) = outcome {
            self.state.picker_choose(outcome);
        }
    }

    fn on_dialog_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let Some(dialog) = self.state.dialog.as_mut() else {
            return;
        };
        match dialog {
            Dialog::TeamForm(form) => match key.code {
                KeyCode::Esc => self.state.close_dialog(),
                KeyCode::Enter => {
                    if let Some(cmd) = self.state.submit_team_form() {
                        self.send(cmd);
                    }
                }
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char('l') if ctrl => form.clear_logo(),
                KeyCode::Char(ch) if !ctrl => form.input(ch),
                _ => {}
            },
            Dialog::Import(import) => match key.code {
                KeyCode::Esc => self.state.close_dialog(),
                KeyCode::Char('s') if ctrl => self.state.submit_import(),
                KeyCode::Enter => import.text.push('\n'),
                KeyCode::Backspace => {
                    import.text.pop();
                }
                KeyCode::Char(ch) if !ctrl => import.text.push(ch),
                _ => {}
            },
            Dialog::Formation(text) => match key.code {
                KeyCode::Esc => self.state.close_dialog(),
                KeyCode::Enter => self.state.submit_formation(),
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Char(ch) if !ctrl => text.push(ch),
                _ => {}
            },
            Dialog::ConfirmDelete { .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.state.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Esc => self.state.close_dialog(),
                _ => {}
            },
        }
    }

    fn on_paste(&mut self, text: &str) {
        match self.state.dialog.as_mut() {
            Some(Dialog::Import(import)) => import.text.push_str(&text.replace('\r', "")),
            Some(Dialog::TeamForm(form)) => {
                for ch in text.chars().filter(|c| !c.is_control()) {
                    form.input(ch);
                }
            }
            Some(Dialog::Formation(buffer)) => buffer.push_str(text.trim()),
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.state.dialog.is_some() || self.state.picker.is_some() || self.state.alert.is_some() {
            return;
        }
        match (self.state.screen, mouse.kind) {
            (Screen::Tactical, MouseEventKind::Down(MouseButton::Left)) => {
                let (_, pitch) = ui::tactical_pitch(self.area);
                self.state.pitch_press(pitch, mouse.column, mouse.row);
            }
            (Screen::Tactical, MouseEventKind::Drag(MouseButton::Left)) => {
                let (panel, pitch) = ui::tactical_pitch(self.area);
                self.state.pitch_drag(panel, pitch, mouse.column, mouse.row);
            }
            (Screen::Tactical, MouseEventKind::Up(MouseButton::Left)) => {
                self.state.pitch_release();
            }
            (Screen::Match, MouseEventKind::Down(MouseButton::Left)) => {
                let pitch = ui::match_pitch(self.area);
                self.state.select_zone_at(pitch, mouse.column, mouse.row);
            }
            _ => {}
        }
    }

    fn save_on_exit(&mut self) {
        let Some(path) = self.config.data_file.clone() else {
            return;
        };
        if !self.state.is_dirty() {
            return;
        }
        let snapshot = Snapshot::from_registry(&self.state.registry);
        if let Err(err) = persist::save_snapshot(&path, &snapshot) {
            error!(error = %err, "final save failed");
            eprintln!("error: could not save teams: {err:#}");
        }
    }
}

fn init_tracing(config: &AppConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("create log dir {}", config.log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "lineup.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn load_state(config: &AppConfig) -> AppState {
    let Some(path) = &config.data_file else {
        let mut state = AppState::default();
        state.push_log("[WARN] No data directory; teams will not be saved");
        return state;
    };
    match persist::load_snapshot(path) {
        Ok(Some(snapshot)) => {
            let teams = snapshot.teams.len();
            let mut state = AppState::new(snapshot.into_registry());
            state.push_log(format!("[INFO] Loaded {teams} teams from {}", path.display()));
            state
        }
        Ok(None) => AppState::new(TeamRegistry::new()),
        Err(err) => {
            warn!(error = %err, "snapshot load failed");
            let mut state = AppState::default();
            state.push_log(format!("[WARN] Could not load saved teams: {err:#}"));
            state
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    let _guard = init_tracing(&config)?;
    info!(data_file = ?config.data_file, "lineup terminal starting");

    let state = load_state(&config);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend).context("create terminal")?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let worker = worker::spawn_worker(tx, cmd_rx);

    let mut app = App::new(state, config, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    app.cmd_tx = None;
    if worker.join().is_err() {
        warn!("worker thread panicked");
    }
    app.save_on_exit();

    if let Err(err) = res {
        error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    info!("lineup terminal stopped");
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = app.config.tick;
    let mut last_tick = Instant::now();
    let mut last_frame = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let now = Instant::now();
        app.state.tick(now.duration_since(last_frame));
        last_frame = now;

        terminal.draw(|f| {
            app.area = f.size();
            ui::draw(f, &app.state);
        })?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                Event::Paste(text) => app.on_paste(&text),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.maybe_autosave();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
