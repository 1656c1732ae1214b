//! Device factory — picks the translator for a discovered peripheral.

use std::time::Duration;

use switchbridge_domain::address::DeviceAddress;
use switchbridge_domain::error::BridgeError;
use switchbridge_domain::model::DeviceKind;

use crate::devices::{CurtainTranslator, Translator};
use crate::ports::{BlePeripheral, HostPlatform, ScanControl};

/// Default bound on waiting for a device's update lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(4);

/// Build the translator matching the peripheral's model code.
///
/// # Errors
///
/// Returns [`BridgeError::UnsupportedDeviceType`] for any model code the
/// bridge does not translate.
pub fn create<P, S, H>(
    peripheral: P,
    scan: S,
    lock_timeout: Duration,
) -> Result<Translator<P, S, H>, BridgeError>
where
    P: BlePeripheral,
    S: ScanControl,
    H: HostPlatform,
{
    let model = peripheral.model();
    match DeviceKind::from_model_code(model) {
        Some(DeviceKind::Curtain) => Ok(Translator::Curtain(CurtainTranslator::new(
            peripheral,
            scan,
            lock_timeout,
        ))),
        None => Err(BridgeError::UnsupportedDeviceType {
            address: DeviceAddress::new(peripheral.address()),
            model,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use switchbridge_domain::model::ModelCode;

    use crate::devices::TranslatorState;
    use crate::testing::{CountingScan, FakePeripheral, RecordingHost};

    #[test]
    fn should_create_curtain_for_curtain_model_code() {
        let translator: Translator<_, _, RecordingHost> = create(
            FakePeripheral::curtain("AA:BB:CC"),
            CountingScan::default(),
            DEFAULT_LOCK_TIMEOUT,
        )
        .unwrap();

        assert_eq!(translator.kind(), DeviceKind::Curtain);
        assert_eq!(translator.address().as_str(), "aa:bb:cc");
        assert_eq!(translator.name(), "Curtain aa:bb:cc");
        assert_eq!(translator.state(), TranslatorState::Created);
    }

    #[test]
    fn should_reject_unknown_model_code() {
        let result: Result<Translator<_, _, RecordingHost>, _> = create(
            FakePeripheral::new("DD:EE:FF", ModelCode::new('H')),
            CountingScan::default(),
            DEFAULT_LOCK_TIMEOUT,
        );

        match result {
            Err(BridgeError::UnsupportedDeviceType { address, model }) => {
                assert_eq!(address.as_str(), "dd:ee:ff");
                assert_eq!(model, ModelCode::new('H'));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("unknown model must not produce a translator"),
        }
    }
}
