//! Battery readings and the derived charge-level tier.

use serde::{Deserialize, Serialize};

/// Matter `PowerSource.BatChargeLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeLevel {
    Ok,
    Warning,
    Critical,
}

impl ChargeLevel {
    /// Tier for a published battery percentage: `Ok` from 20, `Warning`
    /// from 10, `Critical` below.
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            20.. => Self::Ok,
            10..=19 => Self::Warning,
            _ => Self::Critical,
        }
    }

    /// Enum value on the wire.
    #[must_use]
    pub const fn matter_value(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
        }
    }
}

/// Battery state derived from an advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    percent: u8,
}

impl BatteryReading {
    /// Highest published percentage.
    pub const MAX_PERCENT: u8 = 100;

    /// Build from the half-scale value carried in the advertisement.
    /// Readings above `50` clamp to a full battery.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        Self {
            percent: raw.saturating_mul(2).min(Self::MAX_PERCENT),
        }
    }

    /// Published battery percentage (`raw * 2`, at most `100`).
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.percent
    }

    /// Tier derived from [`percent`](Self::percent).
    #[must_use]
    pub fn charge_level(self) -> ChargeLevel {
        ChargeLevel::from_percent(self.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_double_raw_battery_value() {
        assert_eq!(BatteryReading::from_raw(0).percent(), 0);
        assert_eq!(BatteryReading::from_raw(37).percent(), 74);
        assert_eq!(BatteryReading::from_raw(50).percent(), 100);
    }

    #[test]
    fn should_derive_tier_from_doubled_value() {
        for raw in 0..=50u8 {
            let reading = BatteryReading::from_raw(raw);
            let doubled = raw * 2;
            let expected = if doubled < 10 {
                ChargeLevel::Critical
            } else if doubled < 20 {
                ChargeLevel::Warning
            } else {
                ChargeLevel::Ok
            };
            assert_eq!(reading.charge_level(), expected, "raw = {raw}");
        }
    }

    #[test]
    fn should_place_tier_boundaries_at_ten_and_twenty_percent() {
        assert_eq!(ChargeLevel::from_percent(9), ChargeLevel::Critical);
        assert_eq!(ChargeLevel::from_percent(10), ChargeLevel::Warning);
        assert_eq!(ChargeLevel::from_percent(19), ChargeLevel::Warning);
        assert_eq!(ChargeLevel::from_percent(20), ChargeLevel::Ok);
    }

    #[test]
    fn should_clamp_oversized_raw_value_to_full() {
        for raw in [51, 64, 127, 200] {
            let reading = BatteryReading::from_raw(raw);
            assert_eq!(reading.percent(), 100, "raw = {raw}");
            assert_eq!(reading.charge_level(), ChargeLevel::Ok);
        }
    }

    #[test]
    fn should_expose_matter_enum_values() {
        assert_eq!(ChargeLevel::Ok.matter_value(), 0);
        assert_eq!(ChargeLevel::Warning.matter_value(), 1);
        assert_eq!(ChargeLevel::Critical.matter_value(), 2);
    }
}
