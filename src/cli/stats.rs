use anyhow::Result;

use super::open_store;
use crate::config::TtylConfig;

/// Record counts per kind plus a database health check.
pub fn stats(config: &TtylConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let store = open_store(config)?;
    let counts = store.count_by_kind()?;
    let health = store.with_conn(crate::db::check_database_health)?;

    println!("Journal Statistics");
    println!("{}", "=".repeat(40));
    for (kind, count) in &counts {
        println!("  {:<12} {}", kind.as_str(), count);
    }
    println!();
    println!("Total entries:         {}", health.entry_count);
    println!("Preferences:           {}", health.preference_count);
    println!("Schema version:        {}", health.schema_version);
    println!(
        "Integrity:             {}",
        if health.integrity_ok {
            "ok".to_string()
        } else {
            health.integrity_details.clone()
        }
    );
    if let Ok(meta) = std::fs::metadata(&db_path) {
        println!("Database size:         {} bytes", meta.len());
    }
    println!("Database:              {}", db_path.display());
    Ok(())
}
