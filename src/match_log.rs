use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DATE_PREFIX: &str = "data:";
const TEAM_COUNT_PREFIX: &str = "times:";
const TEAM_HEADER_PREFIX: &str = "# time";
const TEAM_CLOSE: &str = "---";
const FIXTURES_PREFIX: &str = "jogos:";
const FIXTURE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGoals {
    pub name: String,
    pub goals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub label: String,
    pub players: Vec<PlayerGoals>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub team_a: String,
    pub goals_a: u32,
    pub team_b: String,
    pub goals_b: u32,
}

/// All teams and results recorded under one `data:` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDay {
    pub date: String,
    pub num_times: usize,
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
}

impl MatchDay {
    pub fn team(&self, label: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.label == label)
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    MalformedFixture,
    MalformedPlayer,
    InvalidGoals,
    InvalidTeamCount,
    MissingTeamLabel,
    UnknownTeam(String),
    OutsideMatchDay,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MalformedFixture => write!(f, "fixture line is not `<team> <goals> - <goals> <team>`"),
            IssueKind::MalformedPlayer => write!(f, "player line has no name"),
            IssueKind::InvalidGoals => write!(f, "goal count is not a number"),
            IssueKind::InvalidTeamCount => write!(f, "team count is not a number"),
            IssueKind::MissingTeamLabel => write!(f, "team header has no label"),
            IssueKind::UnknownTeam(label) => write!(f, "fixture references unknown team `{label}`"),
            IssueKind::OutsideMatchDay => write!(f, "line appears before any `data:` block"),
        }
    }
}

/// A line the parser skipped or only partially understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogIssue {
    pub line_no: usize,
    pub line: String,
    pub kind: IssueKind,
}

impl fmt::Display for LogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_no, self.kind, self.line)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLog {
    /// Days in order of first appearance in the document.
    pub days: Vec<MatchDay>,
    pub issues: Vec<LogIssue>,
}

impl MatchLog {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: &str) -> Option<&MatchDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn dates(&self) -> Vec<&str> {
        self.days.iter().map(|d| d.date.as_str()).collect()
    }

    pub fn team_counts(&self) -> BTreeMap<String, usize> {
        self.days
            .iter()
            .map(|d| (d.date.clone(), d.num_times))
            .collect()
    }
}

/// Reads and parses a match log. A missing file is "no data", not an error.
pub fn load_match_log(path: &Path) -> Result<Option<MatchLog>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(parse_match_log(&raw))),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::warn!("match log {} not found", path.display());
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("read match log {}", path.display())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Idle,
    Team(usize),
    Fixtures,
}

struct PendingFixture {
    line_no: usize,
    line: String,
    fixture: Fixture,
}

struct DayBuilder {
    date: String,
    num_times: Option<usize>,
    teams: Vec<Team>,
    fixtures: Vec<PendingFixture>,
}

impl DayBuilder {
    fn new(date: String) -> Self {
        Self {
            date,
            num_times: None,
            teams: Vec::new(),
            fixtures: Vec::new(),
        }
    }

    fn open_team(&mut self, label: String) -> usize {
        if let Some(idx) = self.teams.iter().position(|t| t.label == label) {
            return idx;
        }
        self.teams.push(Team {
            label,
            players: Vec::new(),
        });
        self.teams.len() - 1
    }

    fn finish(self, issues: &mut Vec<LogIssue>) -> MatchDay {
        let mut fixtures = Vec::with_capacity(self.fixtures.len());
        for pending in self.fixtures {
            let missing = [&pending.fixture.team_a, &pending.fixture.team_b]
                .into_iter()
                .find(|label| !self.teams.iter().any(|t| &t.label == *label))
                .cloned();
            match missing {
                Some(label) => push_issue(
                    issues,
                    pending.line_no,
                    &pending.line,
                    IssueKind::UnknownTeam(label),
                ),
                None => fixtures.push(pending.fixture),
            }
        }
        MatchDay {
            date: self.date,
            num_times: self.num_times.unwrap_or(self.teams.len()),
            teams: self.teams,
            fixtures,
        }
    }
}

/// Parses the whole log text. Deterministic; bad lines become issues and
/// never abort the document.
pub fn parse_match_log(text: &str) -> MatchLog {
    let mut out = MatchLog::default();
    let mut current: Option<DayBuilder> = None;
    let mut section = Section::Idle;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(DATE_PREFIX) {
            if let Some(day) = current.take() {
                commit_day(&mut out, day);
            }
            current = Some(DayBuilder::new(rest.trim().to_string()));
            section = Section::Idle;
            continue;
        }

        let Some(day) = current.as_mut() else {
            push_issue(&mut out.issues, line_no, &line, IssueKind::OutsideMatchDay);
            continue;
        };

        if let Some(rest) = line.strip_prefix(TEAM_COUNT_PREFIX) {
            match rest.trim().parse::<usize>() {
                Ok(n) => day.num_times = Some(n),
                Err(_) => push_issue(&mut out.issues, line_no, &line, IssueKind::InvalidTeamCount),
            }
            continue;
        }

        if line.starts_with(TEAM_HEADER_PREFIX) {
            let label = line
                .split('-')
                .nth(1)
                .map(str::trim)
                .filter(|s| !s.is_empty());
            section = match label {
                Some(label) => Section::Team(day.open_team(label.to_string())),
                None => {
                    push_issue(&mut out.issues, line_no, &line, IssueKind::MissingTeamLabel);
                    Section::Idle
                }
            };
            continue;
        }

        if line == TEAM_CLOSE {
            if matches!(section, Section::Team(_)) {
                section = Section::Idle;
            }
            continue;
        }

        if line.starts_with(FIXTURES_PREFIX) {
            section = Section::Fixtures;
            continue;
        }

        match section {
            Section::Team(team_idx) => match parse_player_line(&line) {
                Ok(player) => day.teams[team_idx].players.push(player),
                Err((kind, Some(player))) => {
                    push_issue(&mut out.issues, line_no, &line, kind);
                    day.teams[team_idx].players.push(player);
                }
                Err((kind, None)) => push_issue(&mut out.issues, line_no, &line, kind),
            },
            Section::Fixtures => {
                if !line.contains(FIXTURE_SEPARATOR) || line.starts_with('#') {
                    continue;
                }
                match parse_fixture_line(&line) {
                    Ok(fixture) => day.fixtures.push(PendingFixture {
                        line_no,
                        line: line.clone(),
                        fixture,
                    }),
                    Err(kind) => push_issue(&mut out.issues, line_no, &line, kind),
                }
            }
            Section::Idle => {}
        }
    }

    if let Some(day) = current.take() {
        commit_day(&mut out, day);
    }

    log::debug!(
        "parsed {} match days with {} issues",
        out.days.len(),
        out.issues.len()
    );
    out
}

fn commit_day(out: &mut MatchLog, builder: DayBuilder) {
    let day = builder.finish(&mut out.issues);
    if let Some(existing) = out.days.iter_mut().find(|d| d.date == day.date) {
        log::warn!("match day {} appears more than once; keeping the last block", day.date);
        *existing = day;
    } else {
        out.days.push(day);
    }
}

/// `name(goals)`; goals default to 0 without parentheses. An unreadable goal
/// count keeps the player with 0 goals and reports the line.
fn parse_player_line(line: &str) -> Result<PlayerGoals, (IssueKind, Option<PlayerGoals>)> {
    let (name, goals) = match line.split_once('(') {
        Some((name, rest)) => (name.trim(), Some(rest.replace(')', ""))),
        None => (line.trim(), None),
    };
    if name.is_empty() {
        return Err((IssueKind::MalformedPlayer, None));
    }
    let name = name.to_string();
    let Some(goals) = goals else {
        return Ok(PlayerGoals { name, goals: 0 });
    };
    match goals.trim().parse::<u32>() {
        Ok(goals) => Ok(PlayerGoals { name, goals }),
        Err(_) => Err((IssueKind::InvalidGoals, Some(PlayerGoals { name, goals: 0 }))),
    }
}

/// `<team a> <goals> - <goals> <team b>`: left side split on its last
/// whitespace, right side on its first.
fn parse_fixture_line(line: &str) -> Result<Fixture, IssueKind> {
    let mut sides = line.split(FIXTURE_SEPARATOR);
    let left = sides.next().unwrap_or_default();
    let right = sides.next().unwrap_or_default();

    let (team_a, goals_a) = split_halves(left.trim().rsplit_once(char::is_whitespace))
        .ok_or(IssueKind::MalformedFixture)?;
    let (goals_b, team_b) = split_halves(right.trim().split_once(char::is_whitespace))
        .ok_or(IssueKind::MalformedFixture)?;

    let goals_a = goals_a.parse::<u32>().map_err(|_| IssueKind::InvalidGoals)?;
    let goals_b = goals_b.parse::<u32>().map_err(|_| IssueKind::InvalidGoals)?;

    Ok(Fixture {
        team_a: team_a.to_string(),
        goals_a,
        team_b: team_b.to_string(),
        goals_b,
    })
}

fn split_halves<'a>(pair: Option<(&'a str, &'a str)>) -> Option<(&'a str, &'a str)> {
    let (a, b) = pair?;
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some((a, b))
}

fn push_issue(issues: &mut Vec<LogIssue>, line_no: usize, line: &str, kind: IssueKind) {
    let issue = LogIssue {
        line_no,
        line: line.to_string(),
        kind,
    };
    log::warn!("match log {issue}");
    issues.push(issue);
}

#[cfg(test)]
mod tests {
    use super::{IssueKind, parse_fixture_line, parse_player_line};

    #[test]
    fn player_line_defaults_to_zero_goals() {
        let p = parse_player_line("marcos").unwrap();
        assert_eq!(p.name, "marcos");
        assert_eq!(p.goals, 0);

        let p = parse_player_line("ana maria (3)").unwrap();
        assert_eq!(p.name, "ana maria");
        assert_eq!(p.goals, 3);
    }

    #[test]
    fn player_line_with_bad_goals_keeps_player() {
        let (kind, player) = parse_player_line("rui(x)").unwrap_err();
        assert_eq!(kind, IssueKind::InvalidGoals);
        assert_eq!(player.unwrap().goals, 0);
    }

    #[test]
    fn fixture_line_splits_on_outer_whitespace() {
        let f = parse_fixture_line("time azul 2 - 1 time preto").unwrap();
        assert_eq!(f.team_a, "time azul");
        assert_eq!(f.goals_a, 2);
        assert_eq!(f.goals_b, 1);
        assert_eq!(f.team_b, "time preto");
    }

    #[test]
    fn fixture_line_without_halves_is_malformed() {
        assert_eq!(parse_fixture_line("azul - 1 preto"), Err(IssueKind::MalformedFixture));
        assert_eq!(parse_fixture_line("azul 2 - 1"), Err(IssueKind::MalformedFixture));
        assert_eq!(parse_fixture_line("azul x - 1 preto"), Err(IssueKind::InvalidGoals));
    }

    #[test]
    fn fixture_line_tolerates_extra_spaces_around_dash() {
        for line in ["a 2  - 1 b", "a 2 -  1 b", "a 2   -   1 b"] {
            let f = parse_fixture_line(line).unwrap();
            assert_eq!((f.team_a.as_str(), f.goals_a), ("a", 2), "{line}");
            assert_eq!((f.team_b.as_str(), f.goals_b), ("b", 1), "{line}");
        }
    }
}
