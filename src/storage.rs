use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::app_data_dir;
use crate::match_log::MatchDay;
use crate::roster::{Player, PlayerDatabase, Position};
use crate::scoring::{FoldSummary, LedgerEntry, LedgerStore, PlayerDelta, fold_match_day};
use crate::skill::Attributes;

pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("pelada.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS players (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            primary_position TEXT NOT NULL,
            secondary_position TEXT NOT NULL,
            physical INTEGER NOT NULL,
            defense INTEGER NOT NULL,
            tactics INTEGER NOT NULL,
            speed INTEGER NOT NULL,
            technique INTEGER NOT NULL,
            attack INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ledger (
            key TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            wins INTEGER NOT NULL DEFAULT 0,
            draws INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            points INTEGER NOT NULL DEFAULT 0,
            goals INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ledger_points ON ledger(points);

        CREATE TABLE IF NOT EXISTS folded_days (
            date TEXT PRIMARY KEY,
            num_times INTEGER NOT NULL,
            players INTEGER NOT NULL,
            folded_at TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Ledger rows in the `ledger` table. Works on a plain connection or on an
/// open transaction.
pub struct SqliteLedger<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLedger<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl LedgerStore for SqliteLedger<'_> {
    fn upsert_delta(&mut self, delta: &PlayerDelta) -> Result<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO ledger (key, name, wins, draws, losses, points, goals, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(key) DO UPDATE SET
                    wins = wins + excluded.wins,
                    draws = draws + excluded.draws,
                    losses = losses + excluded.losses,
                    points = points + excluded.points,
                    goals = goals + excluded.goals,
                    updated_at = excluded.updated_at
                "#,
                params![
                    delta.key,
                    delta.name,
                    delta.wins,
                    delta.draws,
                    delta.losses,
                    delta.points,
                    delta.goals,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("upsert ledger row {}", delta.key))?;
        Ok(())
    }

    fn entry(&self, key: &str) -> Result<Option<LedgerEntry>> {
        self.conn
            .query_row(
                "SELECT key, name, wins, draws, losses, points, goals FROM ledger WHERE key = ?1",
                params![key],
                ledger_row,
            )
            .optional()
            .with_context(|| format!("query ledger row {key}"))
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, name, wins, draws, losses, points, goals FROM ledger ORDER BY key ASC")
            .context("prepare ledger query")?;
        let rows = stmt.query_map([], ledger_row).context("query ledger")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode ledger row")?);
        }
        Ok(out)
    }

    fn reset(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM ledger", [])
            .context("clear ledger")?;
        Ok(())
    }
}

fn ledger_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        key: row.get(0)?,
        name: row.get(1)?,
        wins: row.get(2)?,
        draws: row.get(3)?,
        losses: row.get(4)?,
        points: row.get(5)?,
        goals: row.get(6)?,
    })
}

pub fn is_day_folded(conn: &Connection, date: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM folded_days WHERE date = ?1",
            params![date],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .with_context(|| format!("query folded day {date}"))?;
    Ok(found.is_some())
}

/// Folds one day and journals it in a single transaction. A day already in
/// the journal is left alone and `None` is returned.
pub fn fold_day_once(conn: &mut Connection, day: &MatchDay) -> Result<Option<FoldSummary>> {
    let tx = conn.transaction().context("begin fold transaction")?;
    if is_day_folded(&tx, &day.date)? {
        log::info!("{} already folded, skipping", day.date);
        return Ok(None);
    }
    let summary = {
        let mut ledger = SqliteLedger::new(&tx);
        fold_match_day(&mut ledger, day)?
    };
    tx.execute(
        "INSERT INTO folded_days (date, num_times, players, folded_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            day.date,
            day.num_times as i64,
            day.player_count() as i64,
            Utc::now().to_rfc3339()
        ],
    )
    .context("journal folded day")?;
    tx.commit().context("commit fold transaction")?;
    Ok(Some(summary))
}

/// Clears the ledger and the fold journal together.
pub fn reset_ledger(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction().context("begin reset transaction")?;
    SqliteLedger::new(&tx).reset()?;
    tx.execute("DELETE FROM folded_days", [])
        .context("clear fold journal")?;
    tx.commit().context("commit reset transaction")?;
    log::info!("ledger reset");
    Ok(())
}

pub fn upsert_player(conn: &Connection, player: &Player) -> Result<()> {
    let a = player.attributes;
    conn.execute(
        r#"
        INSERT INTO players (
            key, name, primary_position, secondary_position,
            physical, defense, tactics, speed, technique, attack, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(key) DO UPDATE SET
            name = excluded.name,
            primary_position = excluded.primary_position,
            secondary_position = excluded.secondary_position,
            physical = excluded.physical,
            defense = excluded.defense,
            tactics = excluded.tactics,
            speed = excluded.speed,
            technique = excluded.technique,
            attack = excluded.attack,
            updated_at = excluded.updated_at
        "#,
        params![
            player.key,
            player.name,
            player.primary.as_str(),
            player.secondary.as_str(),
            a.physical,
            a.defense,
            a.tactics,
            a.speed,
            a.technique,
            a.attack,
            Utc::now().to_rfc3339(),
        ],
    )
    .with_context(|| format!("upsert player {}", player.key))?;
    Ok(())
}

pub fn load_player_database(conn: &Connection) -> Result<PlayerDatabase> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT name, primary_position, secondary_position,
                   physical, defense, tactics, speed, technique, attack
            FROM players
            ORDER BY key ASC
            "#,
        )
        .context("prepare players query")?;
    let rows = stmt
        .query_map([], |row| {
            let name: String = row.get(0)?;
            let primary: String = row.get(1)?;
            let secondary: String = row.get(2)?;
            let attributes = Attributes {
                physical: row.get(3)?,
                defense: row.get(4)?,
                tactics: row.get(5)?,
                speed: row.get(6)?,
                technique: row.get(7)?,
                attack: row.get(8)?,
            };
            Ok(Player::new(
                &name,
                Position::from_code(&primary),
                Position::from_code(&secondary),
                attributes,
            ))
        })
        .context("query players")?;

    let mut db = PlayerDatabase::new();
    for row in rows {
        db.insert(row.context("decode player row")?);
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::{SqliteLedger, open_in_memory};
    use crate::scoring::{LedgerStore, PlayerDelta};

    #[test]
    fn upsert_adds_onto_existing_row() {
        let conn = open_in_memory().unwrap();
        let mut ledger = SqliteLedger::new(&conn);
        let delta = PlayerDelta {
            key: "ana".into(),
            name: "ana".into(),
            wins: 1,
            draws: 0,
            losses: 0,
            points: 3,
            goals: 2,
        };
        ledger.upsert_delta(&delta).unwrap();
        ledger.upsert_delta(&delta).unwrap();
        let row = ledger.entry("ana").unwrap().unwrap();
        assert_eq!((row.wins, row.points, row.goals), (2, 6, 4));
        assert!(ledger.entry("bia").unwrap().is_none());
    }
}
