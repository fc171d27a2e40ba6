//! Error types for the backlight cycler.

use std::io;
use std::num::ParseIntError;

/// Errors raised while loading or storing the persisted brightness level.
///
/// These never abort a run: [`StateTracker::next_level`](crate::StateTracker::next_level)
/// logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The state file exists but could not be read.
    #[error("Error reading state file: {0}")]
    Read(#[source] io::Error),

    /// The state file did not hold a decimal integer.
    #[error("Error reading state file: invalid level {contents:?}: {source}")]
    Parse {
        /// The trimmed file contents.
        contents: String,
        /// The underlying parse failure.
        source: ParseIntError,
    },

    /// The new level could not be written back.
    #[error("Error writing state file: {0}")]
    Write(#[source] io::Error),

    /// No per-user configuration directory could be resolved.
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

/// Errors that abort a brightness change.
#[derive(Debug, thiserror::Error)]
pub enum BacklightError {
    /// Creating the USB context or listing devices failed.
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// No device with the expected ids is connected.
    #[error("Device not found (Vendor ID: 0x{vendor_id:04X}, Product ID: 0x{product_id:04X})")]
    DeviceNotFound {
        /// Vendor id searched for.
        vendor_id: u16,
        /// Product id searched for.
        product_id: u16,
    },

    /// The device was found but could not be opened.
    #[error("Could not open device: {0}")]
    Open(#[source] rusb::Error),

    /// The kernel driver bound to the interface could not be detached.
    #[error("Could not detach kernel driver from interface {interface}: {source}")]
    DetachKernelDriver {
        /// Interface number.
        interface: u8,
        /// The underlying USB failure.
        source: rusb::Error,
    },

    /// Claiming the interface or sending the SET_REPORT transfer failed.
    #[error("Control transfer failed on interface {interface}: {source}")]
    Transfer {
        /// Interface number.
        interface: u8,
        /// The underlying USB failure.
        source: rusb::Error,
    },
}
