use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use super::{generator, open_store, with_spinner};
use crate::capture::{CaptureSession, FileDevice};
use crate::config::TtylConfig;
use crate::voice::save_voice_note;

/// Import a recording from disk as a voice note.
pub async fn voice(config: &TtylConfig, file: &Path, mime: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let mime = mime.unwrap_or_else(|| FileDevice::guess_mime(file));

    let mut device = FileDevice::new(file, mime);
    let blob = {
        let mut session = CaptureSession::start(&mut device)?;
        session.drain()?;
        session.stop()
    };

    let saved = with_spinner(
        "titling recording...",
        save_voice_note(&store, generator(config)?.as_ref(), blob, Utc::now()),
    )
    .await?;
    println!("Saved: \"{}\" ({})", saved.value.summary, saved.key);
    Ok(())
}
