use std::env;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "lineup_terminal";
const DATA_FILE: &str = "teams.json";
const DEFAULT_TICK_MS: u64 = 250;
const MIN_TICK_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` when no home directory can be resolved; persistence is then off.
    pub data_file: Option<PathBuf>,
    pub log_dir: PathBuf,
    pub tick: Duration,
    pub autosave: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let data_file = non_empty("LINEUP_DATA_FILE")
            .map(PathBuf::from)
            .or_else(|| default_data_file(&non_empty));
        let log_dir = non_empty("LINEUP_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));
        let tick_ms = non_empty("LINEUP_TICK_MS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TICK_MS)
            .max(MIN_TICK_MS);
        let autosave = non_empty("LINEUP_AUTOSAVE")
            .map(|val| parse_bool(&val))
            .unwrap_or(true);

        Self {
            data_file,
            log_dir,
            tick: Duration::from_millis(tick_ms),
            autosave,
        }
    }
}

fn default_data_file(non_empty: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(base) = non_empty("XDG_DATA_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR).join(DATA_FILE));
    }
    let home = non_empty("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR)
            .join(DATA_FILE),
    )
}

fn parse_bool(raw: &str) -> bool {
    !matches!(
        raw.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
