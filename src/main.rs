use std::path::PathBuf;

use anyhow::{Context, Result};

use pelada::config::{self, Config};
use pelada::ranking;
use pelada::scoring::LedgerStore;
use pelada::storage::{self, SqliteLedger};

fn main() -> Result<()> {
    config::init_env();
    let cfg = Config::from_env();

    let db_path = config::arg_value("--db")
        .map(PathBuf::from)
        .or(cfg.db_path)
        .context("unable to resolve sqlite path")?;
    let conn = storage::open_db(&db_path)?;
    let entries = SqliteLedger::new(&conn).entries()?;

    if entries.is_empty() {
        println!("No data: process the match log first.");
        return Ok(());
    }

    print_table("Scorers", &ranking::scorer_rows(&entries));
    println!();
    print_table("Points", &ranking::points_rows(&entries));
    println!();
    println!("Points for W/D/L: 2 teams 3/1/0, 3 teams 1/0/0");

    if let Some(path) = config::arg_value("--xlsx") {
        let path = PathBuf::from(path);
        let report = ranking::export_xlsx(&path, &entries)?;
        println!(
            "Exported {} scorers and {} players to {}",
            report.scorers,
            report.players,
            path.display()
        );
    }
    Ok(())
}

fn print_table(title: &str, rows: &[Vec<String>]) {
    println!("{title}");
    if rows.len() <= 1 {
        println!("  (none)");
        return;
    }
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..cols)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(c, v)| format!("{v:<width$}", width = widths[c]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line.trim_end());
    }
}
