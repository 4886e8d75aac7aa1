//! Top-level application state: which view is showing and the active theme.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::Preferences;

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Modern,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Classic => Self::Modern,
            Self::Modern => Self::Classic,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
        })
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "modern" => Ok(Self::Modern),
            other => anyhow::bail!("unknown theme {other:?} (expected classic or modern)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    /// Editing the entry of one day.
    Write { date: chrono::NaiveDate },
    Voice,
    Bookshelf,
    Book { key: String },
    CapsuleComposer,
    Capsule { key: String },
}

/// Explicit, serializable controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    pub view: View,
    pub theme: Theme,
}

impl AppState {
    /// Start on the dashboard with the persisted theme (classic when unset or unreadable).
    pub fn restore(prefs: &Preferences) -> Self {
        let theme = match prefs.get::<Theme>(THEME_KEY) {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read theme preference");
                Theme::default()
            }
        };
        Self {
            view: View::Dashboard,
            theme,
        }
    }

    pub fn navigate(&mut self, view: View) {
        tracing::debug!(?view, "navigate");
        self.view = view;
    }

    pub fn go_home(&mut self) {
        self.navigate(View::Dashboard);
    }

    pub fn set_theme(&mut self, prefs: &Preferences, theme: Theme) -> Result<()> {
        prefs.set(THEME_KEY, &theme)?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self, prefs: &Preferences) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set_theme(prefs, next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntryStore;

    #[test]
    fn theme_persists_across_restores() {
        let store = EntryStore::in_memory().unwrap();
        let prefs = store.preferences();

        let mut state = AppState::restore(&prefs);
        assert_eq!(state.theme, Theme::Classic);
        assert_eq!(state.toggle_theme(&prefs).unwrap(), Theme::Modern);

        let restored = AppState::restore(&prefs);
        assert_eq!(restored.theme, Theme::Modern);
        assert_eq!(restored.view, View::Dashboard);
    }

    #[test]
    fn garbage_theme_falls_back_to_classic() {
        let store = EntryStore::in_memory().unwrap();
        let prefs = store.preferences();
        prefs.set("theme", &"neon").unwrap();
        assert_eq!(AppState::restore(&prefs).theme, Theme::Classic);
    }

    #[test]
    fn state_serializes_with_tagged_view() {
        let mut state = AppState::default();
        state.navigate(View::Book { key: "book-1".into() });
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["view"]["view"], "book");
        assert_eq!(json["view"]["key"], "book-1");
        assert_eq!(json["theme"], "classic");
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Modern".parse::<Theme>().unwrap(), Theme::Modern);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
