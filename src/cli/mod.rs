pub mod books;
pub mod capsule;
pub mod entries;
pub mod export;
pub mod prefs;
pub mod stats;
pub mod voice;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::ai::client::ProxyClient;
use crate::ai::Generator;
use crate::config::TtylConfig;
use crate::store::EntryStore;

/// Open the configured store, creating the parent directory on first use.
pub fn open_store(config: &TtylConfig) -> Result<EntryStore> {
    let db_path = config.resolved_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
    }
    EntryStore::open(&db_path)
}

/// The AI client used by terminal views: the proxy, not the upstream model.
pub fn generator(config: &TtylConfig) -> Result<Arc<dyn Generator>> {
    let client = ProxyClient::new(&config.ai).context("failed to build proxy client")?;
    Ok(Arc::new(client))
}

/// Run `fut` with a spinner on stderr.
pub async fn with_spinner<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Ask a y/N question. `assume_yes` skips the prompt.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Today on the local calendar. Journal keys and reading dates follow the user's
/// day, not UTC's.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Print `question` and read one trimmed line from stdin. Fails once stdin is closed.
pub fn prompt_line(question: &str) -> Result<String> {
    println!("{question}");
    print!("> ");
    std::io::stdout().flush()?;
    read_answer(&mut std::io::stdin().lock())
}

fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        anyhow::bail!("input closed before an answer was given");
    }
    Ok(input.trim().to_string())
}

/// Text from an argument, or all of stdin when the argument is absent or `-`.
pub fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
