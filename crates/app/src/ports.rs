//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the bridge core and the outside world:
//! the BLE transport on one side, the host platform on the other. They are
//! defined here so that both the core and the adapters can depend on them
//! without creating circular dependencies.

pub mod ble;
pub mod host;
pub mod logging;

pub use ble::{AdvertisementCallback, BlePeripheral, BleTransport, DiscoverOptions, ScanControl};
pub use host::{HostInfo, HostPlatform, SelectKind};
pub use logging::LogLevelControl;
