use crate::model::{ActionType, Player, Team};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(String),
    Cancelled,
}

/// Bottom sheet listing a team's players by jersey number for one pick.
#[derive(Debug, Clone)]
pub struct PlayerPicker {
    pub team_id: String,
    pub team_name: String,
    pub action: ActionType,
    pub prompt: String,
    players: Vec<Player>,
    cursor: usize,
    number_entry: String,
}

impl PlayerPicker {
    pub fn new(team: &Team, action: &ActionType) -> Self {
        let mut players = team.players.clone();
        players.sort_by_key(|p| p.number);
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            action: action.clone(),
            prompt: "Select the player".to_string(),
            players,
            cursor: 0,
            number_entry: String::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_by(&mut self, delta: isize) {
        self.number_entry.clear();
        if self.players.is_empty() {
            self.cursor = 0;
            return;
        }
        let len = self.players.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    pub fn confirm(&self) -> Option<PickerOutcome> {
        self.select_index(self.cursor)
    }

    pub fn select_index(&self, index: usize) -> Option<PickerOutcome> {
        self.players
            .get(index)
            .map(|p| PickerOutcome::Selected(p.id.clone()))
    }

    /// Digits typed so far while jumping by jersey number.
    pub fn number_entry(&self) -> &str {
        &self.number_entry
    }

    /// Extends the typed jersey number and moves the cursor to the first player
    /// whose number starts with it. A digit that matches nobody starts a new entry.
    pub fn type_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        self.number_entry.push(digit);
        if self.jump_to_entry() {
            return true;
        }
        self.number_entry = digit.to_string();
        if self.jump_to_entry() {
            return true;
        }
        self.number_entry.clear();
        false
    }

    fn jump_to_entry(&mut self) -> bool {
        let exact = self.number_entry.parse::<u32>().ok();
        let found = self
            .players
            .iter()
            .position(|p| Some(p.number) == exact)
            .or_else(|| {
                self.players
                    .iter()
                    .position(|p| p.number.to_string().starts_with(&self.number_entry))
            });
        match found {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    pub fn cancel(&self) -> PickerOutcome {
        PickerOutcome::Cancelled
    }
}
