use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExamMode {
    Timer,
    Stopwatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SessionStatus {
    Pending,
    Active,
    Completed,
    Expired,
}

impl ExamMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Stopwatch => "stopwatch",
        }
    }
}

impl FromStr for ExamMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "timer" => Ok(Self::Timer),
            "stopwatch" => Ok(Self::Stopwatch),
            other => Err(format!("Invalid mode '{other}'. Must be 'timer' or 'stopwatch'")),
        }
    }
}

impl SessionStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_wire_names_only() {
        assert_eq!("timer".parse::<ExamMode>(), Ok(ExamMode::Timer));
        assert_eq!("stopwatch".parse::<ExamMode>(), Ok(ExamMode::Stopwatch));
        assert!("Timer".parse::<ExamMode>().is_err());
        assert!("".parse::<ExamMode>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(SessionStatus::Expired).unwrap();
        assert_eq!(json, "expired");
        assert_eq!(SessionStatus::Active.to_string(), "active");
    }

    #[test]
    fn only_completed_and_expired_are_terminal() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Expired.is_terminal());
    }
}
