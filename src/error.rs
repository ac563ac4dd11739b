//! Error objects for the mctp-usb-tool crate
use thiserror::Error;

/// Error type for the mctp-usb-tool crate
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A hex identifier couldn't be parsed
    #[error("Invalid hex value '{token}': {kind}")]
    Format { token: String, kind: FormatKind },

    /// The host USB subsystem couldn't be initialized
    #[error("Failed to initialize libusb: {message}")]
    Init { message: String },

    /// No device with the requested identifier is attached, or it couldn't
    /// be opened
    #[error("Could not find/open USB device with VID:PID {vid:04x}:{pid:04x}")]
    NotFound { vid: u16, pid: u16 },

    /// The device was matched but its descriptor couldn't be read.  Usually
    /// means it was unplugged in the meantime.
    #[error("Failed to read device descriptor of USB device {vid:04x}:{pid:04x}: {message}")]
    Descriptor { vid: u16, pid: u16, message: String },

    /// The device sits deeper in the hub tree than can be reported
    #[error("USB device on bus {bus} is {depth} ports deep, more than the supported maximum {max}", max = crate::constants::MAX_PORT_DEPTH)]
    Topology { bus: u8, depth: usize },

    /// Any other error returned by the host USB subsystem
    #[error("USB error: {0}")]
    Usb(String),

    /// Invalid arguments passed to the tool
    #[error("Invalid arguments: {message}")]
    Args { message: String },
}

/// Used to differentiate between the ways a hex token can be malformed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatKind {
    #[error("no hex digits")]
    Empty,

    #[error("unexpected character {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },

    #[error("value exceeds 0xffff")]
    Overflow,
}

// Map rusb::Error to Error
impl From<rusb::Error> for Error {
    fn from(err: rusb::Error) -> Self {
        Self::Usb(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound {
            vid: 0x1234,
            pid: 0x5678,
        };
        assert_eq!(
            err.to_string(),
            "Could not find/open USB device with VID:PID 1234:5678"
        );
    }

    #[test]
    fn test_topology_message_mentions_limit() {
        let err = Error::Topology { bus: 3, depth: 9 };
        assert!(err.to_string().contains("maximum 8"));
    }

    #[test]
    fn test_rusb_error_conversion() {
        let err: Error = rusb::Error::NoDevice.into();
        assert!(matches!(err, Error::Usb(_)));
    }
}
