use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::model::{DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR, Team, TeamColors, TeamPatch};
use crate::store::{StoreError, TeamStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("team name is required")]
    MissingName,
    #[error("team logo is required")]
    MissingLogo,
    #[error("could not load logo: {0}")]
    Logo(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// Image file still to be converted into a data URL.
    File(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    LogoFile,
    LogoUrl,
    PrimaryColor,
    SecondaryColor,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Name,
        FormField::LogoFile,
        FormField::LogoUrl,
        FormField::PrimaryColor,
        FormField::SecondaryColor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::LogoFile => "Logo file",
            FormField::LogoUrl => "Logo URL",
            FormField::PrimaryColor => "Primary color",
            FormField::SecondaryColor => "Secondary color",
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Create/edit form for a team. Each open gets a new generation so results of
/// a logo conversion started by an earlier dialog can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamForm {
    pub editing: Option<String>,
    pub name: String,
    pub logo_file: String,
    pub logo_url: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub focus: FormField,
    pub loading_logo: bool,
    generation: u64,
}

impl TeamForm {
    pub fn create(generation: u64) -> Self {
        Self {
            editing: None,
            name: String::new(),
            logo_file: String::new(),
            logo_url: String::new(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            focus: FormField::Name,
            loading_logo: false,
            generation,
        }
    }

    pub fn edit(team: &Team, generation: u64) -> Self {
        Self {
            editing: Some(team.id.clone()),
            name: team.name.clone(),
            logo_url: team.logo_url.clone(),
            primary_color: team.colors.primary.clone(),
            secondary_color: team.colors.secondary.clone(),
            ..Self::create(generation)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::LogoFile => &mut self.logo_file,
            FormField::LogoUrl => &mut self.logo_url,
            FormField::PrimaryColor => &mut self.primary_color,
            FormField::SecondaryColor => &mut self.secondary_color,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::LogoFile => &self.logo_file,
            FormField::LogoUrl => &self.logo_url,
            FormField::PrimaryColor => &self.primary_color,
            FormField::SecondaryColor => &self.secondary_color,
        }
    }

    pub fn focus_next(&mut self) {
        let idx = (self.focus.index() + 1) % FormField::ORDER.len();
        self.focus = FormField::ORDER[idx];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ORDER.len();
        let idx = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ORDER[idx];
    }

    pub fn input(&mut self, ch: char) {
        let focus = self.focus;
        self.field_mut(focus).push(ch);
        if focus == FormField::LogoFile {
            self.logo_url.clear();
        }
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        self.field_mut(focus).pop();
    }

    pub fn clear_logo(&mut self) {
        self.logo_file.clear();
        self.logo_url.clear();
    }

    /// A chosen file wins over a URL.
    pub fn logo_source(&self) -> Option<LogoSource> {
        let file = self.logo_file.trim();
        if !file.is_empty() {
            return Some(LogoSource::File(PathBuf::from(file)));
        }
        let url = self.logo_url.trim();
        if !url.is_empty() {
            return Some(LogoSource::Url(url.to_string()));
        }
        None
    }

    pub fn validate(&self) -> Result<LogoSource, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        self.logo_source().ok_or(FormError::MissingLogo)
    }

    fn colors(&self) -> TeamColors {
        let pick = |raw: &str, fallback: &str| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        };
        TeamColors {
            primary: pick(&self.primary_color, DEFAULT_PRIMARY_COLOR),
            secondary: pick(&self.secondary_color, DEFAULT_SECONDARY_COLOR),
        }
    }
}

pub fn new_team_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Writes the form with a resolved logo URL: updates the edited team or adds a
/// new one. Returns the team id.
pub fn submit_team<S: TeamStore + ?Sized>(
    store: &mut S,
    form: &TeamForm,
    logo_url: String,
) -> Result<String, FormError> {
    if form.name.trim().is_empty() {
        return Err(FormError::MissingName);
    }
    if logo_url.trim().is_empty() {
        return Err(FormError::MissingLogo);
    }
    let name = form.name.trim().to_string();
    match &form.editing {
        Some(id) => {
            let patch = TeamPatch {
                name: Some(name),
                logo_url: Some(logo_url),
                colors: Some(form.colors()),
                ..TeamPatch::default()
            };
            store.update_team(id, patch)?;
            info!(team_id = %id, "team updated");
            Ok(id.clone())
        }
        None => {
            let team = Team::new(new_team_id(), name, logo_url, form.colors());
            let id = team.id.clone();
            store.add_team(team)?;
            Ok(id)
        }
    }
}
