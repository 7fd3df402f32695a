use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

/// Seniority rank stored in `worker.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trainee,
    Junior,
    Middle,
    Senior,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Trainee, Level::Junior, Level::Middle, Level::Senior];

    /// Lower-cased name, the form the `level` column stores.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trainee => "trainee",
            Level::Junior => "junior",
            Level::Middle => "middle",
            Level::Senior => "senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown level: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    pub birthday: Date,
    pub email: String,
    pub level: Level,
    pub salary: i32,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        birthday: Date,
        email: impl Into<String>,
        level: Level,
        salary: i32,
    ) -> Self {
        Self {
            name: name.into(),
            birthday,
            email: email.into(),
            level,
            salary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A project owned by a client. `client_id` is resolved by the database only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub client_id: i32,
    pub start_date: Date,
    pub finish_date: Date,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        client_id: i32,
        start_date: Date,
        finish_date: Date,
    ) -> Self {
        Self {
            name: name.into(),
            client_id,
            start_date,
            finish_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trips_through_text() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>(), Ok(level));
        }
        assert_eq!("SENIOR".parse::<Level>(), Ok(Level::Senior));
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!("architect".parse::<Level>().is_err());
    }
}
