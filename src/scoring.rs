use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::match_log::MatchDay;
use crate::names::{display_name, normalize_name};

/// Points per result. Only a two-team day uses 3/1/0; every other team
/// count uses 1/0/0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl ScoringRule {
    pub fn for_team_count(num_times: usize) -> Self {
        if num_times == 2 {
            Self {
                win: 3,
                draw: 1,
                loss: 0,
            }
        } else {
            Self {
                win: 1,
                draw: 0,
                loss: 0,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTally {
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl TeamTally {
    fn win(&mut self, rule: ScoringRule) {
        self.wins += 1;
        self.points += rule.win;
    }

    fn draw(&mut self, rule: ScoringRule) {
        self.draws += 1;
        self.points += rule.draw;
    }

    fn loss(&mut self, rule: ScoringRule) {
        self.losses += 1;
        self.points += rule.loss;
    }
}

/// Tallies for every declared team of the day, in declaration order.
/// A team playing several fixtures accumulates all of them.
pub fn score_match_day(day: &MatchDay) -> Vec<(String, TeamTally)> {
    let rule = ScoringRule::for_team_count(day.num_times);
    let mut tallies: Vec<(String, TeamTally)> = day
        .teams
        .iter()
        .map(|t| (t.label.clone(), TeamTally::default()))
        .collect();
    let index: HashMap<String, usize> = tallies
        .iter()
        .enumerate()
        .map(|(idx, (label, _))| (label.clone(), idx))
        .collect();

    for fixture in &day.fixtures {
        let (Some(&a), Some(&b)) = (index.get(&fixture.team_a), index.get(&fixture.team_b)) else {
            log::warn!(
                "{}: fixture {} - {} references an undeclared team",
                day.date,
                fixture.team_a,
                fixture.team_b
            );
            continue;
        };
        if fixture.goals_a > fixture.goals_b {
            tallies[a].1.win(rule);
            tallies[b].1.loss(rule);
        } else if fixture.goals_a < fixture.goals_b {
            tallies[b].1.win(rule);
            tallies[a].1.loss(rule);
        } else {
            tallies[a].1.draw(rule);
            tallies[b].1.draw(rule);
        }
    }

    tallies
}

/// One player's contribution from a single match day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub key: String,
    pub name: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub goals: u32,
}

/// Every player takes the full tally of their team plus their own goals.
/// A name listed twice on the same day is merged into one delta.
pub fn player_deltas(day: &MatchDay) -> Vec<PlayerDelta> {
    let tallies = score_match_day(day);
    let mut out: Vec<PlayerDelta> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (team, (_, tally)) in day.teams.iter().zip(tallies.iter()) {
        for player in &team.players {
            let key = normalize_name(&player.name);
            if key.is_empty() {
                log::warn!("{}: skipping player with empty name `{}`", day.date, player.name);
                continue;
            }
            let idx = *seen.entry(key.clone()).or_insert_with(|| {
                out.push(PlayerDelta {
                    key,
                    name: display_name(&player.name),
                    ..PlayerDelta::default()
                });
                out.len() - 1
            });
            let delta = &mut out[idx];
            delta.wins += tally.wins;
            delta.draws += tally.draws;
            delta.losses += tally.losses;
            delta.points += tally.points;
            delta.goals += player.goals;
        }
    }

    out
}

/// Cumulative statistics for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: String,
    pub name: String,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
    pub goals: u32,
}

impl LedgerEntry {
    pub fn zero(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, delta: &PlayerDelta) {
        self.wins += delta.wins;
        self.draws += delta.draws;
        self.losses += delta.losses;
        self.points += delta.points;
        self.goals += delta.goals;
    }

    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    /// `W/D/L` as shown in the points table.
    pub fn record_label(&self) -> String {
        format!("{}/{}/{}", self.wins, self.draws, self.losses)
    }
}

/// Persisted per-player counters with insert-if-absent, else add semantics.
pub trait LedgerStore {
    fn upsert_delta(&mut self, delta: &PlayerDelta) -> Result<()>;
    fn entry(&self, key: &str) -> Result<Option<LedgerEntry>>;
    fn entries(&self) -> Result<Vec<LedgerEntry>>;
    fn reset(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    rows: BTreeMap<String, LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LedgerStore for MemoryLedger {
    fn upsert_delta(&mut self, delta: &PlayerDelta) -> Result<()> {
        self.rows
            .entry(delta.key.clone())
            .or_insert_with(|| LedgerEntry::zero(&delta.key, &delta.name))
            .apply(delta);
        Ok(())
    }

    fn entry(&self, key: &str) -> Result<Option<LedgerEntry>> {
        Ok(self.rows.get(key).cloned())
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.rows.values().cloned().collect())
    }

    fn reset(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSummary {
    pub date: String,
    pub fixtures: usize,
    pub players_inserted: usize,
    pub players_updated: usize,
}

/// Adds one match day into the ledger. Not idempotent: the caller must fold
/// each day exactly once, and must not run two folds at the same time.
pub fn fold_match_day<S: LedgerStore + ?Sized>(store: &mut S, day: &MatchDay) -> Result<FoldSummary> {
    let mut summary = FoldSummary {
        date: day.date.clone(),
        fixtures: day.fixtures.len(),
        players_inserted: 0,
        players_updated: 0,
    };
    for delta in player_deltas(day) {
        if store.entry(&delta.key)?.is_some() {
            summary.players_updated += 1;
        } else {
            summary.players_inserted += 1;
        }
        store.upsert_delta(&delta)?;
    }
    log::info!(
        "folded {}: {} fixtures, {} new players, {} updated",
        summary.date,
        summary.fixtures,
        summary.players_inserted,
        summary.players_updated
    );
    Ok(summary)
}
