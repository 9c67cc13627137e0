//! Timestamp precision for writes and queries.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown time precision '{0}' (expected s, ms or u)")]
pub struct UnknownPrecision(String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    Seconds,
    #[default]
    Milliseconds,
    Microseconds,
}

impl TimePrecision {
    /// Wire spelling, shared by every supported server generation.
    pub fn as_str(self) -> &'static str {
        match self {
            TimePrecision::Seconds => "s",
            TimePrecision::Milliseconds => "ms",
            TimePrecision::Microseconds => "u",
        }
    }
}

impl fmt::Display for TimePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePrecision {
    type Err = UnknownPrecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimePrecision::Seconds),
            "ms" => Ok(TimePrecision::Milliseconds),
            "u" | "us" => Ok(TimePrecision::Microseconds),
            _ => Err(UnknownPrecision(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_spellings() {
        assert_eq!("s".parse::<TimePrecision>().unwrap(), TimePrecision::Seconds);
        assert_eq!("ms".parse::<TimePrecision>().unwrap(), TimePrecision::Milliseconds);
        assert_eq!("u".parse::<TimePrecision>().unwrap(), TimePrecision::Microseconds);
        assert!("ns".parse::<TimePrecision>().is_err());
    }
}
