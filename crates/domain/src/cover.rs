//! Window-covering lift scale.
//!
//! The host reports lift in hundredths of a percent, `0..=10000`. The curtain
//! motor works in whole percent on the inverted scale: host `0` is device
//! `100` and host `10000` is device `0`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Host-side lift position in hundredths of a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct LiftPercent100ths(u16);

impl LiftPercent100ths {
    /// Upper bound of the scale.
    pub const MAX: u16 = 10_000;

    /// Validate a host-side value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LiftPercentOutOfRange`] above `10000`.
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::LiftPercentOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Convert a raw device position (whole percent) to the host scale:
    /// `10000 - raw * 100`, saturating at `0` for out-of-range readings.
    #[must_use]
    pub fn from_raw_position(raw: u8) -> Self {
        Self(Self::MAX.saturating_sub(u16::from(raw) * 100))
    }

    /// Convert to the raw device position: `(10000 - value) / 100`.
    #[must_use]
    pub fn to_raw_position(self) -> u8 {
        // at most 100, always fits
        u8::try_from((Self::MAX - self.0) / 100).unwrap_or(u8::MAX)
    }

    /// The host-side value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for LiftPercent100ths {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LiftPercent100ths> for u16 {
    fn from(value: LiftPercent100ths) -> Self {
        value.0
    }
}

impl fmt::Display for LiftPercent100ths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
