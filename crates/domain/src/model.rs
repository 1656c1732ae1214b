//! Model codes reported by peripherals and the device kinds they map to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Single-character model identifier carried in SwitchBot advertisements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelCode(char);

impl ModelCode {
    /// Model code of the SwitchBot Curtain.
    pub const CURTAIN: Self = Self('c');

    /// Wrap a raw model character.
    #[must_use]
    pub const fn new(code: char) -> Self {
        Self(code)
    }

    /// The raw model character.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for ModelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Device kinds the bridge knows how to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Curtain motor exposed as a Matter window covering.
    Curtain,
}

impl DeviceKind {
    /// Resolve a model code, or `None` when the model is not supported.
    #[must_use]
    pub fn from_model_code(code: ModelCode) -> Option<Self> {
        match code {
            ModelCode::CURTAIN => Some(Self::Curtain),
            _ => None,
        }
    }
}
