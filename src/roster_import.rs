use std::collections::HashSet;

use tracing::{debug, info};

use crate::model::{Player, Position, Role, TeamPatch};
use crate::store::{StoreError, TeamStore};

/// Parses one player per line, fields `number, name, position, role`.
///
/// Parsing never fails: missing or unreadable fields fall back to defaults
/// (number = 1-based index of the non-empty line, `Jogador <n>`, `Campo`, `Titular`).
/// Repeated jersey numbers get a `-<k>` suffix so ids stay unique within the team.
pub fn parse_roster(team_id: &str, text: &str) -> Vec<Player> {
    let mut taken = HashSet::new();
    parse_lines(team_id, text, 0, &mut taken)
}

/// Replaces the team's roster with the parsed players. Returns how many were imported.
pub fn import_roster<S: TeamStore + ?Sized>(
    store: &mut S,
    team_id: &str,
    text: &str,
) -> Result<usize, StoreError> {
    if store.team(team_id).is_none() {
        return Err(StoreError::UnknownTeam(team_id.to_string()));
    }
    let players = parse_roster(team_id, text);
    let count = players.len();
    store.update_team(team_id, TeamPatch::players(players))?;
    info!(team_id, count, "roster imported");
    Ok(count)
}

/// Appends the parsed players after the existing roster.
pub fn append_players<S: TeamStore + ?Sized>(
    store: &mut S,
    team_id: &str,
    text: &str,
) -> Result<usize, StoreError> {
    let team = store
        .team(team_id)
        .ok_or_else(|| StoreError::UnknownTeam(team_id.to_string()))?;
    let mut taken: HashSet<String> = team.players.iter().map(|p| p.id.clone()).collect();
    let mut players = team.players.clone();
    let added = parse_lines(team_id, text, players.len(), &mut taken);
    let count = added.len();
    players.extend(added);
    store.update_team(team_id, TeamPatch::players(players))?;
    info!(team_id, count, "players appended");
    Ok(count)
}

fn parse_lines(
    team_id: &str,
    text: &str,
    index_offset: usize,
    taken: &mut HashSet<String>,
) -> Vec<Player> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| parse_line(team_id, index_offset + index, line, taken))
        .collect()
}

fn parse_line(team_id: &str, index: usize, line: &str, taken: &mut HashSet<String>) -> Player {
    let parts: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    let field = |idx: usize| parts.get(idx).copied().filter(|part| !part.is_empty());

    let number = field(0)
        .and_then(parse_jersey_number)
        .unwrap_or(index as u32 + 1);
    let name = field(1)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Jogador {number}"));
    let position = field(2).map(Position::from_label).unwrap_or_default();
    let role = field(3).map(Role::from_label).unwrap_or_default();

    let id = unique_player_id(team_id, number, taken);
    debug!(%id, number, "parsed roster line");
    Player::new(id, number, name, position, role)
}

/// Leading-digit parse: `"10"` and `"10a"` give 10; zero, signs and text give `None`.
fn parse_jersey_number(raw: &str) -> Option<u32> {
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

fn unique_player_id(team_id: &str, number: u32, taken: &mut HashSet<String>) -> String {
    let base = format!("{team_id}-{number}");
    let mut id = base.clone();
    let mut suffix = 2;
    while taken.contains(&id) {
        id = format!("{base}-{suffix}");
        suffix += 1;
    }
    taken.insert(id.clone());
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_jersey_number_reads_leading_digits() {
        assert_eq!(parse_jersey_number("10"), Some(10));
        assert_eq!(parse_jersey_number("7b"), Some(7));
        assert_eq!(parse_jersey_number("+9"), Some(9));
        assert_eq!(parse_jersey_number("0"), None);
        assert_eq!(parse_jersey_number("-3"), None);
        assert_eq!(parse_jersey_number("abc"), None);
    }

    #[test]
    fn unique_player_id_suffixes_collisions() {
        let mut taken = HashSet::new();
        assert_eq!(unique_player_id("t1", 5, &mut taken), "t1-5");
        assert_eq!(unique_player_id("t1", 5, &mut taken), "t1-5-2");
        assert_eq!(unique_player_id("t1", 5, &mut taken), "t1-5-3");
    }
}
