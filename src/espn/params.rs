use core::fmt;
use std::fmt::Display;

use chrono::{NaiveDate, Utc};

/// ESPN league code as it appears in URLs, e.g. "eng.1".
pub enum LeagueCode {
    Code(String),
}

/// Schedule date, rendered as the YYYYMMDD path segment.
pub enum SchedDate {
    D(NaiveDate),
}

pub enum GameId {
    Id(String),
}

impl Display for LeagueCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LeagueCode::Code(code) => write!(f, "{}", code),
        }
    }
}

impl Display for SchedDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchedDate::D(date) => write!(f, "{}", date.format("%Y%m%d")),
        }
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameId::Id(id) => write!(f, "{}", id),
        }
    }
}

impl Default for SchedDate {
    fn default() -> Self {
        SchedDate::D(Utc::now().date_naive())
    }
}
