//! USB backlight driver.

use crate::error::BacklightError;
use crate::level::BrightnessLevel;
use crate::protocol::{
    ControlPacket, INTERFACE, PACKET_LEN, PRODUCT_ID, REPORT_VALUE, REQUEST_TYPE, SET_REPORT,
    TIMEOUT, VENDOR_ID,
};

use log::{debug, info, warn};
use rusb::{Context, DeviceHandle, UsbContext};
use std::time::Duration;

// =============================================================================
// HID Interface Trait
// =============================================================================

/// The handful of USB operations needed to send one report.
///
/// Implemented for [`rusb::DeviceHandle`] and for
/// [`MockInterface`](crate::MockInterface) in tests.
pub trait HidInterface {
    /// Whether a kernel driver is bound to `iface`.
    fn kernel_driver_active(&self, iface: u8) -> rusb::Result<bool>;

    /// Unbind the kernel driver from `iface`.
    fn detach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()>;

    /// Rebind the kernel driver to `iface`.
    fn attach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()>;

    /// Claim `iface` for this process.
    fn claim_interface(&mut self, iface: u8) -> rusb::Result<()>;

    /// Release a previously claimed `iface`.
    fn release_interface(&mut self, iface: u8) -> rusb::Result<()>;

    /// Send a host-to-device control transfer, returning the bytes written.
    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl<T: UsbContext> HidInterface for DeviceHandle<T> {
    fn kernel_driver_active(&self, iface: u8) -> rusb::Result<bool> {
        DeviceHandle::kernel_driver_active(self, iface)
    }

    fn detach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::detach_kernel_driver(self, iface)
    }

    fn attach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::attach_kernel_driver(self, iface)
    }

    fn claim_interface(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::claim_interface(self, iface)
    }

    fn release_interface(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::release_interface(self, iface)
    }

    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::write_control(self, request_type, request, value, index, buf, timeout)
    }
}

// =============================================================================
// Device Lookup
// =============================================================================

/// Open the first connected keyboard matching [`VENDOR_ID`]/[`PRODUCT_ID`].
///
/// # Errors
///
/// - [`BacklightError::Usb`] if libusb cannot be initialised or enumerated
/// - [`BacklightError::DeviceNotFound`] if no matching device is connected
/// - [`BacklightError::Open`] if the device cannot be opened (usually permissions)
pub fn open_keyboard() -> Result<DeviceHandle<Context>, BacklightError> {
    let context = Context::new()?;

    for device in context.devices()?.iter() {
        let desc = match device.device_descriptor() {
            Ok(desc) => desc,
            Err(_) => continue,
        };
        if desc.vendor_id() != VENDOR_ID || desc.product_id() != PRODUCT_ID {
            continue;
        }

        debug!(
            "found keyboard on bus {} address {}",
            device.bus_number(),
            device.address()
        );
        return device.open().map_err(BacklightError::Open);
    }

    Err(BacklightError::DeviceNotFound {
        vendor_id: VENDOR_ID,
        product_id: PRODUCT_ID,
    })
}

// =============================================================================
// Transfer
// =============================================================================

/// Outcome of a brightness change that reached the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// The level that was sent.
    pub level: BrightnessLevel,
    /// Bytes the device accepted.
    pub bytes_written: usize,
}

impl TransferReport {
    /// Whether the whole payload was accepted.
    pub fn is_complete(&self) -> bool {
        self.bytes_written == PACKET_LEN
    }
}

/// Send `level` to the keyboard behind `handle`.
///
/// The kernel driver on [`INTERFACE`] is detached for the duration of the
/// transfer. After a successful transfer the interface is released and the
/// driver reattached; failures of either step are logged and dropped.
///
/// # Errors
///
/// - [`BacklightError::DetachKernelDriver`] if the bound driver cannot be
///   detached; nothing is sent in that case
/// - [`BacklightError::Transfer`] if the interface cannot be claimed or the
///   transfer fails; the interface is released but the driver is not
///   reattached
pub fn apply<H: HidInterface>(
    handle: &mut H,
    level: BrightnessLevel,
) -> Result<TransferReport, BacklightError> {
    let packet = ControlPacket::new(level);

    let driver_active = match handle.kernel_driver_active(INTERFACE) {
        Ok(active) => active,
        // No kernel driver concept on this platform
        Err(rusb::Error::NotSupported) => false,
        Err(source) => {
            return Err(BacklightError::DetachKernelDriver {
                interface: INTERFACE,
                source,
            });
        }
    };

    if driver_active {
        debug!("detaching kernel driver from interface {}", INTERFACE);
        handle
            .detach_kernel_driver(INTERFACE)
            .map_err(|source| BacklightError::DetachKernelDriver {
                interface: INTERFACE,
                source,
            })?;
    }

    let bytes_written = match send_report(handle, &packet) {
        Ok(n) => n,
        Err(source) => {
            let _ = handle.release_interface(INTERFACE);
            return Err(BacklightError::Transfer {
                interface: INTERFACE,
                source,
            });
        }
    };

    let report = TransferReport {
        level,
        bytes_written,
    };
    if report.is_complete() {
        info!("Brightness level {} set successfully.", level);
    } else {
        warn!("Only {} bytes sent out of {}.", bytes_written, PACKET_LEN);
    }

    if let Err(e) = handle.release_interface(INTERFACE) {
        debug!("release of interface {} failed: {}", INTERFACE, e);
    }
    // Reattach failures are ignored
    let _ = handle.attach_kernel_driver(INTERFACE);

    Ok(report)
}

fn send_report<H: HidInterface>(handle: &mut H, packet: &ControlPacket) -> rusb::Result<usize> {
    handle.claim_interface(INTERFACE)?;
    debug!("SET_REPORT {:02x?}", packet.as_bytes());
    handle.write_control(
        REQUEST_TYPE,
        SET_REPORT,
        REPORT_VALUE,
        u16::from(INTERFACE),
        packet.as_ref(),
        TIMEOUT,
    )
}
