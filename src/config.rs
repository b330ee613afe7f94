use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "pelada";
const DEFAULT_LOG_FILE: &str = "data/jogos.txt";
const DEFAULT_TRIALS: usize = 100;
const MAX_TRIALS: usize = 3000;
const DEFAULT_TEAMS: usize = 2;

/// Settings shared by the binaries. Command-line flags override these.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub log_file: PathBuf,
    pub trials: usize,
    pub teams: usize,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = opt_env("PELADA_DB")
            .map(PathBuf::from)
            .or_else(crate::storage::default_db_path);
        let log_file = opt_env("PELADA_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let trials = opt_env("PELADA_TRIALS")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TRIALS)
            .clamp(1, MAX_TRIALS);
        let teams = opt_env("PELADA_TEAMS")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TEAMS);
        let seed = opt_env("PELADA_SEED").and_then(|val| val.parse::<u64>().ok());
        let parallel = opt_env("PELADA_PARALLEL")
            .map(|val| matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            db_path,
            log_file,
            trials,
            teams,
            seed,
            parallel,
        }
    }

    pub fn clamp_trials(trials: usize) -> usize {
        trials.clamp(1, MAX_TRIALS)
    }
}

/// Loads `.env.local` then `.env` and starts the logger.
pub fn init_env() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

/// `--name value` or `--name=value` from the process arguments.
pub fn arg_value(name: &str) -> Option<String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

pub fn has_flag(name: &str) -> bool {
    env::args().skip(1).any(|arg| arg == name)
}

/// First argument that is not a flag or a flag's value.
pub fn positional_arg(value_flags: &[&str]) -> Option<String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if value_flags.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        return Some(arg);
    }
    None
}
