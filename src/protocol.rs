//! Wire format of the backlight SET_REPORT request.
//!
//! ```text
//! bmRequestType  0x21   host-to-device | class | interface
//! bRequest       0x09   SET_REPORT
//! wValue         0x035A feature report, id 0x5A
//! wIndex         4      interface number
//! wLength        16
//! data           5A BA C5 C4 <level> 00 .. 00
//! ```

use crate::level::BrightnessLevel;

use std::time::Duration;

/// ASUSTek vendor id.
pub const VENDOR_ID: u16 = 0x0b05;
/// Zenbook Duo keyboard product id.
pub const PRODUCT_ID: u16 = 0x1b2c;

/// Interface carrying the vendor backlight report.
pub const INTERFACE: u8 = 4;

/// Host-to-device, class request, interface recipient.
pub const REQUEST_TYPE: u8 = 0x21;
/// HID SET_REPORT.
pub const SET_REPORT: u8 = 0x09;
/// Report type (feature, 0x03) in the high byte, report id in the low byte.
pub const REPORT_VALUE: u16 = 0x035A;

/// First payload byte.
pub const REPORT_ID: u8 = 0x5A;
/// Fixed bytes following the report id.
pub const MAGIC: [u8; 3] = [0xBA, 0xC5, 0xC4];

/// Length of the report payload.
pub const PACKET_LEN: usize = 16;

/// Upper bound on the blocking control transfer.
pub const TIMEOUT: Duration = Duration::from_millis(1000);

/// The 16-byte SET_REPORT payload for one brightness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPacket([u8; PACKET_LEN]);

impl ControlPacket {
    /// Build the payload selecting `level`.
    pub fn new(level: BrightnessLevel) -> Self {
        let mut data = [0u8; PACKET_LEN];
        data[0] = REPORT_ID;
        data[1..4].copy_from_slice(&MAGIC);
        data[4] = level.value();
        Self(data)
    }

    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for ControlPacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
