use std::path::PathBuf;

use anyhow::{Context, Result};

use pelada::config::{self, Config};
use pelada::match_log;
use pelada::storage;

fn main() -> Result<()> {
    config::init_env();
    let cfg = Config::from_env();

    let log_path = config::arg_value("--log")
        .map(PathBuf::from)
        .unwrap_or(cfg.log_file);
    let db_path = config::arg_value("--db")
        .map(PathBuf::from)
        .or(cfg.db_path)
        .context("unable to resolve sqlite path")?;
    let reset = config::has_flag("--reset");

    let Some(parsed) = match_log::load_match_log(&log_path)? else {
        println!("No data: {} not found", log_path.display());
        return Ok(());
    };

    println!("Match log: {}", log_path.display());
    println!("Dates: {}", parsed.days.len());
    for (date, teams) in parsed.team_counts() {
        println!("  {date}: {teams} teams");
    }
    if !parsed.issues.is_empty() {
        println!("Skipped lines: {}", parsed.issues.len());
        for issue in &parsed.issues {
            println!(" - {issue}");
        }
    }

    let mut conn = storage::open_db(&db_path)?;
    if reset {
        storage::reset_ledger(&mut conn)?;
        println!("Ledger reset");
    }

    let mut folded = 0usize;
    let mut skipped = 0usize;
    for day in &parsed.days {
        match storage::fold_day_once(&mut conn, day)? {
            Some(summary) => {
                folded += 1;
                println!(
                    "folded {}: fixtures={} new={} updated={}",
                    summary.date, summary.fixtures, summary.players_inserted, summary.players_updated
                );
            }
            None => skipped += 1,
        }
    }

    println!("DB: {}", db_path.display());
    println!("Days folded: {folded} (already folded: {skipped})");
    Ok(())
}
