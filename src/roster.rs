use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::names::{display_name, normalize_name};
use crate::skill::Attributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Defender,
    Midfielder,
    Attacker,
}

impl Position {
    /// Maps a position code (CB, CAM, ST, ...) or a role word onto the three
    /// balancing families. Anything unrecognised is a midfielder.
    pub fn from_code(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        match s.as_str() {
            "cb" | "lb" | "rb" | "lwb" | "rwb" | "gk" => return Position::Defender,
            "cm" | "cdm" | "cam" | "lm" | "rm" => return Position::Midfielder,
            "st" | "lw" | "rw" | "cf" => return Position::Attacker,
            _ => {}
        }
        if s.contains("defender") || s.contains("zagueiro") || s.contains("lateral") || s.contains("back") {
            return Position::Defender;
        }
        if s.contains("attacker")
            || s.contains("forward")
            || s.contains("striker")
            || s.contains("atacante")
            || s.contains("wing")
        {
            return Position::Attacker;
        }
        Position::Midfielder
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Attacker => "attacker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Normalized join key.
    pub key: String,
    pub primary: Position,
    pub secondary: Position,
    pub attributes: Attributes,
}

impl Player {
    pub fn new(name: &str, primary: Position, secondary: Position, attributes: Attributes) -> Self {
        Self {
            name: display_name(name),
            key: normalize_name(name),
            primary,
            secondary,
            attributes: attributes.clamped(),
        }
    }

    /// Stand-in record for an attendee the database does not know.
    pub fn with_defaults(name: &str) -> Self {
        Self::new(
            name,
            Position::Midfielder,
            Position::Midfielder,
            Attributes::default(),
        )
    }

    pub fn skill(&self) -> f64 {
        self.attributes.weighted_skill()
    }
}

/// Known players keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct PlayerDatabase {
    players: HashMap<String, Player>,
}

impl PlayerDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Self {
        let mut db = Self::new();
        for p in players {
            db.insert(p);
        }
        db
    }

    /// Later records with the same key replace earlier ones.
    pub fn insert(&mut self, player: Player) {
        self.players.insert(player.key.clone(), player);
    }

    pub fn lookup(&self, name: &str) -> Option<&Player> {
        self.players.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeSection {
    Monthly,
    Casual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub section: AttendeeSection,
}

/// Reads a numbered attendee list with a monthly and a casual section.
/// Monthly members come first in the result, then casual players, each in
/// list order.
pub fn parse_attendees(text: &str) -> Vec<Attendee> {
    let mut monthly = Vec::new();
    let mut casual = Vec::new();
    let mut section: Option<AttendeeSection> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(next) = section_header(line) {
            section = Some(next);
            continue;
        }
        let Some(current) = section else {
            continue;
        };
        let Some(name) = entry_name(line) else {
            continue;
        };
        let attendee = Attendee {
            name: display_name(name),
            section: current,
        };
        match current {
            AttendeeSection::Monthly => monthly.push(attendee),
            AttendeeSection::Casual => casual.push(attendee),
        }
    }

    monthly.extend(casual);
    monthly
}

fn section_header(line: &str) -> Option<AttendeeSection> {
    let s = line.to_lowercase();
    if s.contains("mensalista") || s.contains("monthly") {
        return Some(AttendeeSection::Monthly);
    }
    if s.contains("avulso") || s.contains("casual") {
        return Some(AttendeeSection::Casual);
    }
    None
}

/// `<digits>-<spaces><name>`
fn entry_name(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('-')?.trim();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterMatch {
    /// One record per attendee, in attendee order.
    pub players: Vec<Player>,
    pub unrecognized: Vec<String>,
}

pub fn resolve_roster(attendees: &[Attendee], db: &PlayerDatabase) -> RosterMatch {
    let mut players = Vec::with_capacity(attendees.len());
    let mut unrecognized = Vec::new();

    for attendee in attendees {
        match db.lookup(&attendee.name) {
            Some(found) => {
                log::debug!("roster: {} found", attendee.name);
                players.push(found.clone());
            }
            None => {
                log::info!("roster: {} not in player table, using default ratings", attendee.name);
                unrecognized.push(attendee.name.clone());
                players.push(Player::with_defaults(&attendee.name));
            }
        }
    }

    RosterMatch {
        players,
        unrecognized,
    }
}
