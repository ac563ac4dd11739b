//! Constants used by the MCTP USB device locator

/// USB device class code reserved for MCTP devices
pub const MCTP_CLASS_CODE: u8 = 0x14;

/// Maximum number of hub ports tracked between a bus root and a device.
///
/// The USB 3.x specs limit the depth to 7 tiers; 8 leaves room for
/// controllers which report an extra level.
pub const MAX_PORT_DEPTH: usize = 8;

/// Prefixes accepted in front of hex identifiers
pub const HEX_PREFIXES: [&str; 2] = ["0x", "0X"];

/// Stdout label in front of the bus/port path
pub const PORT_PATH_LABEL: &str = "USB Device Port Path";
