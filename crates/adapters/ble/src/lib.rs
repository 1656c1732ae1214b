//! # switchbridge-adapter-ble
//!
//! BLE transport for SwitchBot devices, implementing the bridge's
//! `BleTransport` and `BlePeripheral` ports on top of `btleplug`.
//!
//! ## How it works
//!
//! SwitchBot devices broadcast their model and state as service-data
//! advertisements, so discovery and state updates need no connection. A
//! bounded discovery pass collects every peripheral advertising SwitchBot
//! service data; afterwards a listener task forwards each advertisement to
//! the bridge. Commands are single GATT writes, each on a short-lived
//! connection.
//!
//! ## Supported devices
//!
//! | Model code | Device | Decoded state |
//! |------------|--------|---------------|
//! | `c` | Curtain | battery, position |
//!
//! Other SwitchBot models are discovered with their model code only.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `switchbridge-app` and
//! `switchbridge-domain`.

mod config;
mod error;
pub mod gatt;
pub mod parser;
mod scanner;

pub use config::BleConfig;
pub use error::{BleError, PayloadParseError};
pub use scanner::{SwitchBotPeripheral, SwitchBotTransport};
