//! Keyboard backlight cycling for the ASUS Zenbook Duo keyboard.
//!
//! Every run advances the backlight one step through four levels
//! (off, low, medium, high, then back to off). The current level is kept in
//! a small state file and applied with a vendor HID SET_REPORT control
//! transfer on interface 4 of the keyboard (`0b05:1b2c`).
//!
//! # Requirements
//!
//! - libusb
//! - Write access to the keyboard's USB device node (root or a udev rule)
//!
//! # Example
//!
//! ```no_run
//! use kbd_backlight::{cycle, open_keyboard, BacklightError, StateTracker};
//!
//! fn main() -> Result<(), BacklightError> {
//!     let tracker = StateTracker::from_config_dir();
//!     let report = cycle(&tracker, open_keyboard)?;
//!     println!("backlight at level {}", report.level);
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockInterface`] to test code without hardware:
//!
//! ```
//! use kbd_backlight::{apply, BrightnessLevel, MockInterface};
//!
//! let mut mock = MockInterface::with_kernel_driver();
//! apply(&mut mock, BrightnessLevel::OFF).unwrap();
//! assert_eq!(mock.sent_packets().len(), 1);
//! ```

#![warn(missing_docs)]

mod device;
mod error;
mod level;
mod mock;
pub mod protocol;
mod state;

// Re-export public API
pub use device::{apply, open_keyboard, HidInterface, TransferReport};
pub use error::{BacklightError, StateError};
pub use level::BrightnessLevel;
pub use mock::{MockInterface, UsbCall};
pub use protocol::ControlPacket;
pub use state::{default_state_path, StateTracker, STATE_FILE_NAME};

/// Advance the persisted level and send it to the keyboard.
///
/// The state file is always updated first, so a missing keyboard still
/// moves the stored level forward.
pub fn cycle<H, F>(tracker: &StateTracker, open: F) -> Result<TransferReport, BacklightError>
where
    H: HidInterface,
    F: FnOnce() -> Result<H, BacklightError>,
{
    let level = tracker.next_level();
    let mut handle = open()?;
    apply(&mut handle, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{INTERFACE, PRODUCT_ID, TIMEOUT, VENDOR_ID};
    use std::fs;
    use std::path::PathBuf;

    fn scratch_state(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "kbd-backlight-lib-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join(STATE_FILE_NAME)
    }

    #[test]
    fn test_apply_sends_expected_transfer() {
        let mut mock = MockInterface::with_kernel_driver();
        let report = apply(&mut mock, BrightnessLevel::new(2).unwrap()).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.bytes_written, 16);
        assert_eq!(
            mock.calls(),
            vec![
                UsbCall::KernelDriverActive(INTERFACE),
                UsbCall::DetachKernelDriver(INTERFACE),
                UsbCall::ClaimInterface(INTERFACE),
                UsbCall::WriteControl {
                    request_type: 0x21,
                    request: 0x09,
                    value: 0x035A,
                    index: 4,
                    data: vec![0x5A, 0xBA, 0xC5, 0xC4, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
                    timeout: TIMEOUT,
                },
                UsbCall::ReleaseInterface(INTERFACE),
                UsbCall::AttachKernelDriver(INTERFACE),
            ]
        );
        assert!(mock.driver_active);
    }

    #[test]
    fn test_apply_without_kernel_driver_skips_detach() {
        let mut mock = MockInterface::new();
        apply(&mut mock, BrightnessLevel::OFF).unwrap();

        let calls = mock.calls();
        assert!(!calls.contains(&UsbCall::DetachKernelDriver(INTERFACE)));
        // Reattach is attempted regardless
        assert_eq!(calls.last(), Some(&UsbCall::AttachKernelDriver(INTERFACE)));
    }

    #[test]
    fn test_detach_failure_sends_nothing() {
        let mut mock = MockInterface::with_kernel_driver();
        mock.detach_error = Some(rusb::Error::Busy);

        let err = apply(&mut mock, BrightnessLevel::MAX).unwrap_err();
        assert!(matches!(
            err,
            BacklightError::DetachKernelDriver {
                interface: 4,
                source: rusb::Error::Busy
            }
        ));
        assert!(mock.sent_packets().is_empty());
        assert!(!mock.calls().contains(&UsbCall::ClaimInterface(INTERFACE)));
    }

    #[test]
    fn test_driver_query_failure_is_fatal() {
        let mut mock = MockInterface::new();
        mock.query_error = Some(rusb::Error::NoDevice);

        let err = apply(&mut mock, BrightnessLevel::OFF).unwrap_err();
        assert!(matches!(err, BacklightError::DetachKernelDriver { .. }));
        assert!(mock.sent_packets().is_empty());
    }

    #[test]
    fn test_driver_query_unsupported_is_ignored() {
        let mut mock = MockInterface::new();
        mock.query_error = Some(rusb::Error::NotSupported);

        assert!(apply(&mut mock, BrightnessLevel::OFF).is_ok());
        assert_eq!(mock.sent_packets().len(), 1);
    }

    #[test]
    fn test_transfer_failure_releases_without_reattach() {
        let mut mock = MockInterface::with_kernel_driver();
        mock.transfer_error = Some(rusb::Error::Pipe);

        let err = apply(&mut mock, BrightnessLevel::OFF).unwrap_err();
        assert!(matches!(
            err,
            BacklightError::Transfer {
                source: rusb::Error::Pipe,
                ..
            }
        ));

        let calls = mock.calls();
        assert_eq!(calls.last(), Some(&UsbCall::ReleaseInterface(INTERFACE)));
        assert!(!calls.contains(&UsbCall::AttachKernelDriver(INTERFACE)));
    }

    #[test]
    fn test_claim_failure_is_a_transfer_failure() {
        let mut mock = MockInterface::new();
        mock.claim_error = Some(rusb::Error::Access);

        let err = apply(&mut mock, BrightnessLevel::OFF).unwrap_err();
        assert!(matches!(
            err,
            BacklightError::Transfer {
                source: rusb::Error::Access,
                ..
            }
        ));
        assert!(mock.sent_packets().is_empty());
    }

    #[test]
    fn test_short_write_is_not_fatal() {
        let mut mock = MockInterface::with_kernel_driver();
        mock.short_write = Some(8);

        let report = apply(&mut mock, BrightnessLevel::new(1).unwrap()).unwrap();
        assert_eq!(report.bytes_written, 8);
        assert!(!report.is_complete());

        let calls = mock.calls();
        assert!(calls.contains(&UsbCall::ReleaseInterface(INTERFACE)));
        assert_eq!(calls.last(), Some(&UsbCall::AttachKernelDriver(INTERFACE)));
    }

    #[test]
    fn test_cleanup_failures_are_swallowed() {
        let mut mock = MockInterface::with_kernel_driver();
        mock.release_error = Some(rusb::Error::NotFound);
        mock.attach_error = Some(rusb::Error::Busy);

        let report = apply(&mut mock, BrightnessLevel::MAX).unwrap();
        assert!(report.is_complete());
        assert!(!mock.driver_active);
    }

    #[test]
    fn test_cycle_advances_and_applies() {
        let tracker = StateTracker::new(scratch_state("cycle"));

        let sent: Vec<u8> = (0..5)
            .map(|_| {
                cycle(&tracker, || Ok(MockInterface::new()))
                    .unwrap()
                    .level
                    .value()
            })
            .collect();
        assert_eq!(sent, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_cycle_missing_device_still_updates_state() {
        let path = scratch_state("missing");
        let tracker = StateTracker::new(&path);

        let err = cycle::<MockInterface, _>(&tracker, || {
            Err(BacklightError::DeviceNotFound {
                vendor_id: VENDOR_ID,
                product_id: PRODUCT_ID,
            })
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Device not found (Vendor ID: 0x0B05, Product ID: 0x1B2C)"
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
    }
}
