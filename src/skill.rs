use serde::{Deserialize, Serialize};

pub const ATTRIBUTE_MIN: u8 = 0;
pub const ATTRIBUTE_MAX: u8 = 5;
pub const DEFAULT_ATTRIBUTE: u8 = 3;

const W_PHYSICAL: f64 = 0.4;
const W_SPEED: f64 = 0.2;
const W_DEFENSE: f64 = 0.1;
const W_TACTICS: f64 = 0.05;
const W_TECHNIQUE: f64 = 0.05;
const W_ATTACK: f64 = 0.1;

/// The six ratings kept for every player, each in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub physical: u8,
    pub defense: u8,
    pub tactics: u8,
    pub speed: u8,
    pub technique: u8,
    pub attack: u8,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(DEFAULT_ATTRIBUTE)
    }
}

impl Attributes {
    pub fn uniform(value: u8) -> Self {
        Self {
            physical: value,
            defense: value,
            tactics: value,
            speed: value,
            technique: value,
            attack: value,
        }
    }

    /// Values outside the rating scale are pulled back into it.
    pub fn clamped(self) -> Self {
        let c = |v: u8| v.clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX);
        Self {
            physical: c(self.physical),
            defense: c(self.defense),
            tactics: c(self.tactics),
            speed: c(self.speed),
            technique: c(self.technique),
            attack: c(self.attack),
        }
    }

    pub fn weighted_skill(&self) -> f64 {
        W_PHYSICAL * f64::from(self.physical)
            + W_SPEED * f64::from(self.speed)
            + W_DEFENSE * f64::from(self.defense)
            + W_TACTICS * f64::from(self.tactics)
            + W_TECHNIQUE * f64::from(self.technique)
            + W_ATTACK * f64::from(self.attack)
    }
}

/// Mean weighted skill of a team; `None` when the team has no players.
pub fn team_skill_average<'a>(members: impl IntoIterator<Item = &'a Attributes>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for attrs in members {
        sum += attrs.weighted_skill();
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(sum / n as f64)
}

/// Per-attribute team means, the data behind a radar view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeProfile {
    pub physical: f64,
    pub defense: f64,
    pub tactics: f64,
    pub speed: f64,
    pub technique: f64,
    pub attack: f64,
}

impl AttributeProfile {
    pub fn of<'a>(members: impl IntoIterator<Item = &'a Attributes>) -> Option<Self> {
        let mut acc = [0.0f64; 6];
        let mut n = 0usize;
        for a in members {
            acc[0] += f64::from(a.physical);
            acc[1] += f64::from(a.defense);
            acc[2] += f64::from(a.tactics);
            acc[3] += f64::from(a.speed);
            acc[4] += f64::from(a.technique);
            acc[5] += f64::from(a.attack);
            n += 1;
        }
        if n == 0 {
            return None;
        }
        let d = n as f64;
        Some(Self {
            physical: acc[0] / d,
            defense: acc[1] / d,
            tactics: acc[2] / d,
            speed: acc[3] / d,
            technique: acc[4] / d,
            attack: acc[5] / d,
        })
    }
}
