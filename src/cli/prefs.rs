//! `theme` and `prompts`: the device-local preference commands.

use anyhow::Result;

use super::{generator, open_store, today, with_spinner};
use crate::ai::prompts::daily_prompts;
use crate::app::{AppState, Theme};
use crate::config::TtylConfig;

/// Show the theme, set it, or flip it.
pub fn theme(config: &TtylConfig, set: Option<Theme>, toggle: bool) -> Result<()> {
    let store = open_store(config)?;
    let prefs = store.preferences();
    let mut state = AppState::restore(&prefs);

    if let Some(theme) = set {
        state.set_theme(&prefs, theme)?;
    } else if toggle {
        state.toggle_theme(&prefs)?;
    }
    println!("Theme: {}", state.theme);
    Ok(())
}

pub async fn prompts(config: &TtylConfig) -> Result<()> {
    let store = open_store(config)?;
    let prefs = store.preferences();
    let generator = generator(config)?;

    let prompts = with_spinner(
        "finding today's prompts...",
        daily_prompts(generator.as_ref(), &prefs, today()),
    )
    .await;
    println!("1. {}", prompts.option1);
    println!("2. {}", prompts.option2);
    Ok(())
}
