//! Device translators.
//!
//! A translator owns one BLE peripheral and its host endpoint, and converts
//! in both directions: host commands become BLE calls, advertisements
//! become attribute writes. [`Translator`] is the closed set of supported
//! kinds; adding a device kind means adding a variant here and a case in
//! [`crate::factory`].

pub mod curtain;

use switchbridge_domain::address::DeviceAddress;
use switchbridge_domain::advertisement::ServiceData;
use switchbridge_domain::command::CoverCommand;
use switchbridge_domain::endpoint::{DeviceIdentity, EndpointDescriptor};
use switchbridge_domain::error::BridgeError;
use switchbridge_domain::model::DeviceKind;

use crate::ports::{BlePeripheral, HostPlatform, ScanControl};

pub use curtain::CurtainTranslator;

/// Lifecycle of a translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorState {
    /// Built, no endpoint yet.
    Created,
    /// Endpoint created, not (or not yet) registered with the host.
    EndpointReady,
    /// Registered with the host.
    Registered,
    /// Destroyed; advertisements are ignored and commands refused.
    Destroyed,
}

/// A bridged device of any supported kind.
pub enum Translator<P, S, H> {
    Curtain(CurtainTranslator<P, S, H>),
}

impl<P, S, H> Translator<P, S, H>
where
    P: BlePeripheral,
    S: ScanControl,
    H: HostPlatform,
{
    pub fn address(&self) -> &DeviceAddress {
        match self {
            Self::Curtain(curtain) => curtain.address(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Curtain(curtain) => curtain.name(),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Curtain(_) => DeviceKind::Curtain,
        }
    }

    pub fn state(&self) -> TranslatorState {
        match self {
            Self::Curtain(curtain) => curtain.state(),
        }
    }

    pub fn identity(&self) -> Option<&DeviceIdentity> {
        match self {
            Self::Curtain(curtain) => curtain.identity(),
        }
    }

    pub fn descriptor(&self) -> Option<&EndpointDescriptor> {
        match self {
            Self::Curtain(curtain) => curtain.descriptor(),
        }
    }

    pub fn create_endpoint(&self, host: &H) {
        match self {
            Self::Curtain(curtain) => curtain.create_endpoint(host),
        }
    }

    /// See [`CurtainTranslator::register_with_platform`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's registration error.
    pub async fn register_with_platform(&self, host: &H) -> Result<(), BridgeError> {
        match self {
            Self::Curtain(curtain) => curtain.register_with_platform(host).await,
        }
    }

    /// See [`CurtainTranslator::apply_command`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's command error.
    pub async fn apply_command(&self, command: CoverCommand) -> Result<(), BridgeError> {
        match self {
            Self::Curtain(curtain) => curtain.apply_command(command).await,
        }
    }

    /// See [`CurtainTranslator::handle_advertisement`].
    ///
    /// # Errors
    ///
    /// Propagates the variant's update error.
    pub async fn handle_advertisement(&self, data: &ServiceData) -> Result<(), BridgeError> {
        match self {
            Self::Curtain(curtain) => curtain.handle_advertisement(data).await,
        }
    }

    pub fn identify(&self, identify_time: u16) {
        match self {
            Self::Curtain(curtain) => curtain.identify(identify_time),
        }
    }

    pub fn destroy(&self) {
        match self {
            Self::Curtain(curtain) => curtain.destroy(),
        }
    }
}
