use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use pelada::config::{self, Config};
use pelada::roster::{Player, Position};
use pelada::skill::Attributes;
use pelada::storage;

#[derive(Debug, Deserialize)]
struct PlayerRecord {
    name: String,
    primary_position: String,
    #[serde(default)]
    secondary_position: Option<String>,
    physical: u8,
    defense: u8,
    tactics: u8,
    speed: u8,
    technique: u8,
    attack: u8,
}

impl PlayerRecord {
    fn into_player(self) -> Player {
        let primary = Position::from_code(&self.primary_position);
        let secondary = self
            .secondary_position
            .as_deref()
            .map(Position::from_code)
            .unwrap_or(primary);
        Player::new(
            &self.name,
            primary,
            secondary,
            Attributes {
                physical: self.physical,
                defense: self.defense,
                tactics: self.tactics,
                speed: self.speed,
                technique: self.technique,
                attack: self.attack,
            },
        )
    }
}

fn main() -> Result<()> {
    config::init_env();
    let cfg = Config::from_env();

    let path = config::positional_arg(&["--db"])
        .map(PathBuf::from)
        .context("usage: import_players <players.json> [--db path]")?;
    let db_path = config::arg_value("--db")
        .map(PathBuf::from)
        .or(cfg.db_path)
        .context("unable to resolve sqlite path")?;

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let records: Vec<PlayerRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;

    let mut conn = storage::open_db(&db_path)?;
    let tx = conn.transaction().context("begin import transaction")?;
    let mut imported = 0usize;
    let mut skipped = Vec::new();
    for record in records {
        let player = record.into_player();
        if player.key.is_empty() {
            skipped.push(player.name);
            continue;
        }
        storage::upsert_player(&tx, &player)?;
        imported += 1;
    }
    tx.commit().context("commit import transaction")?;

    println!("DB: {}", db_path.display());
    println!("Players upserted: {imported}");
    if !skipped.is_empty() {
        println!("Skipped (empty name): {}", skipped.len());
    }
    Ok(())
}
