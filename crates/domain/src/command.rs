//! Window-covering commands received from the host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cover::LiftPercent100ths;

/// A command the host can issue to a covering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum CoverCommand {
    /// Fully open.
    Open,
    /// Fully close.
    Close,
    /// Stop any motion.
    Stop,
    /// Move to a host-scale lift position.
    GoToLiftPercent(LiftPercent100ths),
}

impl CoverCommand {
    /// Matter command name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "upOrOpen",
            Self::Close => "downOrClose",
            Self::Stop => "stopMotion",
            Self::GoToLiftPercent(_) => "goToLiftPercentage",
        }
    }
}

impl fmt::Display for CoverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_matter_command_names() {
        assert_eq!(CoverCommand::Open.to_string(), "upOrOpen");
        assert_eq!(CoverCommand::Close.to_string(), "downOrClose");
        assert_eq!(CoverCommand::Stop.to_string(), "stopMotion");
        let lift = LiftPercent100ths::new(5_000).unwrap();
        assert_eq!(
            CoverCommand::GoToLiftPercent(lift).to_string(),
            "goToLiftPercentage"
        );
    }
}
