//! # switchbridge-app
//!
//! Bridge core — **port definitions** (traits) and the components that
//! translate between a BLE transport and a Matter host.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BleTransport` / `BlePeripheral` — discovery, scanning, commands
//!   - `HostPlatform` — endpoint registration and attribute writes
//!   - `ScanControl` — scan restart requested by a device
//!   - `LogLevelControl` — runtime log level changes
//! - Provide the bridge components:
//!   - `devices` — per-device translators
//!   - `factory` — model code to translator
//!   - `registry` — address to translator
//!   - `router` — advertisement dispatch
//!   - `orchestrator` — discovery and scan lifecycle
//!   - `platform` — host lifecycle hooks
//!
//! ## Dependency rule
//! Depends on `switchbridge-domain` only (plus `tokio` for tasks, locks and
//! timers). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod devices;
pub mod factory;
pub mod orchestrator;
pub mod platform;
pub mod ports;
pub mod registry;
pub mod router;

#[cfg(test)]
mod testing;
