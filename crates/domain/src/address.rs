//! Device addresses and the configured allow-list.
//!
//! A [`DeviceAddress`] is always stored lowercase, so two spellings of the
//! same MAC compare equal and hash to the same registry slot.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// BLE MAC-like identifier, normalised to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Normalise an address reported by a transport.
    ///
    /// No validation is applied: whatever the radio reports is the identity
    /// of that peripheral. Use [`DeviceAddress::parse`] for user input.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    /// Parse and normalise a user-supplied address.
    ///
    /// Accepts hex digits separated by `:` or `-`, in any case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddress`] for blank input and
    /// [`ValidationError::InvalidAddressCharacter`] for anything else that is
    /// not a hex digit or separator.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        if let Some(character) = trimmed
            .chars()
            .find(|c| !c.is_ascii_hexdigit() && *c != ':' && *c != '-')
        {
            return Err(ValidationError::InvalidAddressCharacter {
                address: raw.to_string(),
                character,
            });
        }
        Ok(Self::new(trimmed))
    }

    /// The normalised address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeviceAddress> for String {
    fn from(value: DeviceAddress) -> Self {
        value.0
    }
}

/// Set of addresses the bridge is allowed to manage. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(HashSet<DeviceAddress>);

impl AllowList {
    /// Parse an allow-list from configured address strings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised by
    /// [`DeviceAddress::parse`].
    pub fn parse<I, S>(addresses: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        addresses
            .into_iter()
            .map(|raw| DeviceAddress::parse(raw.as_ref()))
            .collect::<Result<HashSet<_>, _>>()
            .map(Self)
    }

    /// Whether `address` may be managed by the bridge.
    #[must_use]
    pub fn contains(&self, address: &DeviceAddress) -> bool {
        self.0.contains(address)
    }

    /// Number of distinct allowed addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no address is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<DeviceAddress> for AllowList {
    fn from_iter<T: IntoIterator<Item = DeviceAddress>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
