//! # switchbridge-domain
//!
//! Pure domain model for the SwitchBot-to-Matter bridge.
//!
//! ## Responsibilities
//! - Device identity: normalised [`address::DeviceAddress`], the
//!   configured [`address::AllowList`], model codes and device kinds
//! - Scale conversions between the curtain motor and the host
//!   (lift position, battery percentage, charge-level tier)
//! - Commands and advertisement payloads
//! - Endpoint descriptors and attribute updates declared to the host
//! - The error taxonomy shared by every layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod address;
pub mod advertisement;
pub mod battery;
pub mod command;
pub mod cover;
pub mod endpoint;
pub mod model;
