use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;

use pelada::balance::{self, BalanceOutcome};
use pelada::config::{self, Config};
use pelada::roster::{self, PlayerDatabase};
use pelada::storage;

const VALUE_FLAGS: &[&str] = &["--db", "--teams", "--trials", "--seed"];
const TEAM_COLOURS: &[&str] = &["Red", "Blue", "Black"];

fn main() -> Result<()> {
    config::init_env();
    let cfg = Config::from_env();

    let attendees_path = config::positional_arg(VALUE_FLAGS)
        .map(PathBuf::from)
        .context("usage: make_teams <attendees.txt> [--teams 2|3] [--trials N] [--seed S] [--json]")?;
    let num_teams = config::arg_value("--teams")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(cfg.teams);
    balance::check_team_count(num_teams)?;
    let trials = config::arg_value("--trials")
        .and_then(|v| v.parse::<usize>().ok())
        .map(Config::clamp_trials)
        .unwrap_or(cfg.trials);
    let seed = config::arg_value("--seed")
        .and_then(|v| v.parse::<u64>().ok())
        .or(cfg.seed);
    let as_json = config::has_flag("--json");

    let text = fs::read_to_string(&attendees_path)
        .with_context(|| format!("read attendee list {}", attendees_path.display()))?;
    let attendees = roster::parse_attendees(&text);
    if attendees.is_empty() {
        return Err(anyhow!("no attendees found in {}", attendees_path.display()));
    }

    let db = load_database(&cfg)?;
    let matched = roster::resolve_roster(&attendees, &db);

    let outcome = if cfg.parallel {
        let seed = seed.unwrap_or_else(rand::random);
        balance::balance_teams_parallel(&matched.players, num_teams, trials, seed)?
    } else {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        balance::balance_teams(&matched.players, num_teams, trials, &mut rng)?
    };

    if as_json {
        let payload = serde_json::json!({
            "outcome": &outcome,
            "profiles": outcome.profiles(&matched.players),
            "unrecognized": &matched.unrecognized,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("serialize balance outcome")?
        );
        return Ok(());
    }

    print_outcome(&outcome, &matched.players);
    if !matched.unrecognized.is_empty() {
        println!();
        println!("Not in player table (default ratings used):");
        for name in &matched.unrecognized {
            println!(" - {name}");
        }
    }
    Ok(())
}

fn load_database(cfg: &Config) -> Result<PlayerDatabase> {
    let db_path = config::arg_value("--db")
        .map(PathBuf::from)
        .or_else(|| cfg.db_path.clone());
    let Some(db_path) = db_path else {
        log::warn!("no player database path resolved, every attendee gets default ratings");
        return Ok(PlayerDatabase::new());
    };
    let conn = storage::open_db(&db_path)?;
    storage::load_player_database(&conn)
}

fn print_outcome(outcome: &BalanceOutcome, pool: &[roster::Player]) {
    println!(
        "Best of {} trials (trial {})",
        outcome.trials,
        outcome.trial + 1
    );
    let profiles = outcome.profiles(pool);
    for (idx, team) in outcome.teams.iter().enumerate() {
        let colour = TEAM_COLOURS.get(idx).copied().unwrap_or("-");
        let avg = outcome.averages[idx]
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "no players".to_string());
        println!();
        println!("Team {} ({colour}): {avg}", idx + 1);
        for (name, &member) in team.iter().zip(&outcome.members[idx]) {
            match pool.get(member) {
                Some(player) => println!("  {name} ({:.2})", player.skill()),
                None => println!("  {name}"),
            }
        }
        if let Some(p) = profiles[idx] {
            println!(
                "  PHY {:.1} DEF {:.1} TAC {:.1} SPD {:.1} TEC {:.1} ATT {:.1}",
                p.physical, p.defense, p.tactics, p.speed, p.technique, p.attack
            );
        }
    }
    println!();
    println!("Total difference: {:.3}", outcome.disparity);
}
