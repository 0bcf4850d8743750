use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FORMATION: &str = "4-4-2";
pub const DEFAULT_POSITION_LABEL: &str = "Campo";
pub const DEFAULT_ROLE_LABEL: &str = "Titular";
pub const DEFAULT_PRIMARY_COLOR: &str = "#3B82F6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1E40AF";

/// Tokens never sit closer than this (in percent) to the pitch border.
pub const FIELD_MARGIN: f32 = 5.0;
pub const LINEUP_SIZE: usize = 11;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Goalkeeper,
    CenterBack,
    LeftBack,
    RightBack,
    Midfielder,
    Forward,
    /// Label used when an imported line carries no position.
    #[default]
    Outfield,
    Other(String),
}

impl Position {
    pub const KNOWN: [Position; 7] = [
        Position::Goalkeeper,
        Position::CenterBack,
        Position::LeftBack,
        Position::RightBack,
        Position::Midfielder,
        Position::Forward,
        Position::Outfield,
    ];

    pub fn label(&self) -> &str {
        match self {
            Position::Goalkeeper => "Goleiro",
            Position::CenterBack => "Zagueiro",
            Position::LeftBack => "Lateral Esquerdo",
            Position::RightBack => "Lateral Direito",
            Position::Midfielder => "Meio-campista",
            Position::Forward => "Atacante",
            Position::Outfield => DEFAULT_POSITION_LABEL,
            Position::Other(label) => label,
        }
    }

    pub fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Position::Outfield;
        }
        Self::KNOWN
            .iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| Position::Other(trimmed.to_string()))
    }
}

impl From<String> for Position {
    fn from(raw: String) -> Self {
        Position::from_label(&raw)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.label().to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    TraditionalKeeper,
    SweeperKeeper,
    CentralDefender,
    BallPlayingDefender,
    Libero,
    DefensiveFullBack,
    SupportFullBack,
    InvertedFullBack,
    WingBack,
    Anchor,
    HoldingMidfielder,
    SecondVolante,
    BoxToBox,
    Playmaker,
    CentralMidfielder,
    AttackingMidfielder,
    LinkMidfielder,
    Winger,
    WideForward,
    InvertedWinger,
    SecondStriker,
    CentreForward,
    Poacher,
    TargetMan,
    FalseNine,
    /// Label used when an imported line carries no role.
    #[default]
    Squad,
    Other(String),
}

impl Role {
    pub const KNOWN: [Role; 26] = [
        Role::TraditionalKeeper,
        Role::SweeperKeeper,
        Role::CentralDefender,
        Role::BallPlayingDefender,
        Role::Libero,
        Role::DefensiveFullBack,
        Role::SupportFullBack,
        Role::InvertedFullBack,
        Role::WingBack,
        Role::Anchor,
        Role::HoldingMidfielder,
        Role::SecondVolante,
        Role::BoxToBox,
        Role::Playmaker,
        Role::CentralMidfielder,
        Role::AttackingMidfielder,
        Role::LinkMidfielder,
        Role::Winger,
        Role::WideForward,
        Role::InvertedWinger,
        Role::SecondStriker,
        Role::CentreForward,
        Role::Poacher,
        Role::TargetMan,
        Role::FalseNine,
        Role::Squad,
    ];

    pub fn label(&self) -> &str {
        match self {
            Role::TraditionalKeeper => "Goleiro Tradicional",
            Role::SweeperKeeper => "Goleiro-Líbero",
            Role::CentralDefender => "Zagueiro Central",
            Role::BallPlayingDefender => "Zagueiro Construtor",
            Role::Libero => "Líbero",
            Role::DefensiveFullBack => "Lateral Defensivo",
            Role::SupportFullBack => "Lateral Apoiador",
            Role::InvertedFullBack => "Lateral Construtor",
            Role::WingBack => "Ala",
            Role::Anchor => "Cabeça de Área",
            Role::HoldingMidfielder => "Primeiro Volante",
            Role::SecondVolante => "Segundo Volante",
            Role::BoxToBox => "Meia Box-to-Box",
            Role::Playmaker => "Meia Armador",
            Role::CentralMidfielder => "Meia Central",
            Role::AttackingMidfielder => "Meia-atacante",
            Role::LinkMidfielder => "Meia de Ligação",
            Role::Winger => "Ponta",
            Role::WideForward => "Extremo",
            Role::InvertedWinger => "Ponta Invertido",
            Role::SecondStriker => "Segundo Atacante",
            Role::CentreForward => "Centroavante",
            Role::Poacher => "Homem de Área",
            Role::TargetMan => "Pivô",
            Role::FalseNine => "Falso 9",
            Role::Squad => DEFAULT_ROLE_LABEL,
            Role::Other(label) => label,
        }
    }

    pub fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Role::Squad;
        }
        Self::KNOWN
            .iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| Role::Other(trimmed.to_string()))
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from_label(&raw)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized pitch coordinate, both axes in percent of the pitch rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPosition {
    pub x: f32,
    pub y: f32,
}

impl FieldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamps both axes into `[FIELD_MARGIN, 100 - FIELD_MARGIN]`.
    pub fn clamped(x: f32, y: f32) -> Self {
        let lo = FIELD_MARGIN;
        let hi = 100.0 - FIELD_MARGIN;
        let x = if x.is_nan() { 50.0 } else { x };
        let y = if y.is_nan() { 50.0 } else { y };
        Self {
            x: x.clamp(lo, hi),
            y: y.clamp(lo, hi),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_starter: bool,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_position: Option<FieldPosition>,
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        number: u32,
        name: impl Into<String>,
        position: Position,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            number,
            name: name.into(),
            position,
            role,
            is_starter: false,
            is_captain: false,
            field_position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColors {
    pub primary: String,
    pub secondary: String,
}

impl Default for TeamColors {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary: DEFAULT_SECONDARY_COLOR.to_string(),
        }
    }
}

/// Denormalized copy of the starter/captain flags, refreshed on every lineup save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalSetup {
    pub starters: Vec<String>,
    pub captain: Option<String>,
    pub formation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub logo_url: String,
    #[serde(default)]
    pub colors: TeamColors,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactical_setup: Option<TacticalSetup>,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        logo_url: impl Into<String>,
        colors: TeamColors,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo_url: logo_url.into(),
            colors,
            players: Vec::new(),
            formation: None,
            tactical_setup: None,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn starters(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_starter)
    }

    pub fn starter_count(&self) -> usize {
        self.starters().count()
    }

    pub fn captain(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_captain)
    }

    pub fn formation_or_default(&self) -> &str {
        self.formation.as_deref().unwrap_or(DEFAULT_FORMATION)
    }

    /// Applies a partial update; absent fields keep their current value.
    pub fn apply(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(logo_url) = patch.logo_url {
            self.logo_url = logo_url;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(players) = patch.players {
            self.players = players;
        }
        if let Some(formation) = patch.formation {
            self.formation = Some(formation);
        }
        if let Some(setup) = patch.tactical_setup {
            self.tactical_setup = Some(setup);
        }
    }
}

/// Partial team update handed to `TeamStore::update_team`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub colors: Option<TeamColors>,
    pub players: Option<Vec<Player>>,
    pub formation: Option<String>,
    pub tactical_setup: Option<TacticalSetup>,
}

impl TeamPatch {
    pub fn players(players: Vec<Player>) -> Self {
        Self {
            players: Some(players),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRequirement {
    None,
    One,
    Multiple,
}

/// A loggable match event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionType {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub requires_player: PlayerRequirement,
    /// Action recorded for the opponent alongside this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter_action: Option<String>,
    /// Recorded for the team without possession instead of the team with it.
    #[serde(default)]
    pub reverse_action: bool,
    #[serde(default)]
    pub changes_possession: bool,
}

impl ActionType {
    pub fn needs_player(&self) -> bool {
        self.requires_player != PlayerRequirement::None
    }
}

/// Which of the two teams of a fixture a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

/// One value per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub a: T,
    pub b: T,
}

impl<T> SidePair<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }
}
