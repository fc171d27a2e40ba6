//! Mock USB interface for testing.

use crate::device::HidInterface;

use std::cell::RefCell;
use std::time::Duration;

/// A USB operation recorded by [`MockInterface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsbCall {
    /// `kernel_driver_active(iface)`
    KernelDriverActive(u8),
    /// `detach_kernel_driver(iface)`
    DetachKernelDriver(u8),
    /// `attach_kernel_driver(iface)`
    AttachKernelDriver(u8),
    /// `claim_interface(iface)`
    ClaimInterface(u8),
    /// `release_interface(iface)`
    ReleaseInterface(u8),
    /// `write_control(..)` with all of its arguments.
    WriteControl {
        /// bmRequestType
        request_type: u8,
        /// bRequest
        request: u8,
        /// wValue
        value: u16,
        /// wIndex
        index: u16,
        /// Payload.
        data: Vec<u8>,
        /// Transfer timeout.
        timeout: Duration,
    },
}

/// An in-memory stand-in for a keyboard's USB handle.
///
/// This allows exercising [`apply`](crate::apply) without the keyboard
/// attached. Every call is recorded in order; failures can be injected
/// per operation.
///
/// # Example
///
/// ```
/// use kbd_backlight::{apply, BrightnessLevel, MockInterface};
///
/// let mut mock = MockInterface::new();
/// let report = apply(&mut mock, BrightnessLevel::MAX).unwrap();
/// assert!(report.is_complete());
/// assert_eq!(mock.sent_packets()[0][4], 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockInterface {
    /// Whether a kernel driver is reported as bound.
    pub driver_active: bool,
    /// Error returned by `kernel_driver_active`.
    pub query_error: Option<rusb::Error>,
    /// Error returned by `detach_kernel_driver`.
    pub detach_error: Option<rusb::Error>,
    /// Error returned by `attach_kernel_driver`.
    pub attach_error: Option<rusb::Error>,
    /// Error returned by `claim_interface`.
    pub claim_error: Option<rusb::Error>,
    /// Error returned by `release_interface`.
    pub release_error: Option<rusb::Error>,
    /// Error returned by `write_control`.
    pub transfer_error: Option<rusb::Error>,
    /// Cap on the bytes `write_control` reports as written.
    pub short_write: Option<usize>,

    calls: RefCell<Vec<UsbCall>>,
}

impl MockInterface {
    /// A device with no kernel driver bound where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A device with a kernel driver bound to every interface.
    pub fn with_kernel_driver() -> Self {
        Self {
            driver_active: true,
            ..Self::default()
        }
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<UsbCall> {
        self.calls.borrow().clone()
    }

    /// Payloads of every control transfer that was attempted.
    pub fn sent_packets(&self) -> Vec<Vec<u8>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                UsbCall::WriteControl { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: UsbCall) {
        self.calls.borrow_mut().push(call);
    }

    fn outcome(error: Option<rusb::Error>) -> rusb::Result<()> {
        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl HidInterface for MockInterface {
    fn kernel_driver_active(&self, iface: u8) -> rusb::Result<bool> {
        self.record(UsbCall::KernelDriverActive(iface));
        Self::outcome(self.query_error).map(|()| self.driver_active)
    }

    fn detach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        self.record(UsbCall::DetachKernelDriver(iface));
        Self::outcome(self.detach_error)?;
        self.driver_active = false;
        Ok(())
    }

    fn attach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        self.record(UsbCall::AttachKernelDriver(iface));
        Self::outcome(self.attach_error)?;
        self.driver_active = true;
        Ok(())
    }

    fn claim_interface(&mut self, iface: u8) -> rusb::Result<()> {
        self.record(UsbCall::ClaimInterface(iface));
        Self::outcome(self.claim_error)
    }

    fn release_interface(&mut self, iface: u8) -> rusb::Result<()> {
        self.record(UsbCall::ReleaseInterface(iface));
        Self::outcome(self.release_error)
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
        self.record(UsbCall::WriteControl {
            request_type,
            request,
            value,
            index,
            data: buf.to_vec(),
            timeout,
        });
        Self::outcome(self.transfer_error)?;
        Ok(self.short_write.map_or(buf.len(), |n| n.min(buf.len())))
    }
}
