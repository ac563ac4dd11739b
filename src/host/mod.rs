//! The [`host`](crate::host) module abstracts the host USB subsystem, so the
//! device lookup can be exercised without real hardware.
//!
//! [`UsbHost`] acquires a [`HostContext`], which is used to open the first
//! device matching a [`DeviceId`] as a [`HostHandle`].  Both the context and
//! the handle release their underlying resources when dropped.
//!
//! The production implementation, [`RusbHost`], is backed by libusb via
//! [`rusb`].

#[cfg(test)]
pub(crate) mod fake;
pub mod usb;

pub use usb::{RusbHost, UsbHostConfig};

use crate::error::Error;
use crate::topology::PortChain;
use crate::DeviceId;

/// The entry point to a host USB subsystem.  Allows the subsystem to be
/// mocked out for testing.
pub trait UsbHost: std::fmt::Debug {
    type Context: HostContext;

    /// Acquires a context on the host USB subsystem.
    ///
    /// # Returns
    /// * `Ok(Self::Context)` - The open context, released when dropped
    /// * `Err(Error::Init)` - If the subsystem is unavailable
    fn init(&self) -> Result<Self::Context, Error>;
}

/// An open connection to the host USB subsystem
pub trait HostContext {
    type Handle: HostHandle;

    /// Opens the first currently attached device with the given vendor and
    /// product IDs.
    ///
    /// Which device is first when several match is decided by the host's
    /// enumeration order.
    ///
    /// # Returns
    /// * `Some(Self::Handle)` - The opened device, closed when dropped
    /// * `None` - If no device matched, or the match couldn't be opened
    fn open_first_match(&self, id: DeviceId) -> Option<Self::Handle>;
}

/// An open device on the host USB subsystem
pub trait HostHandle {
    /// Reads the device descriptor.  Can fail if the device has gone away
    /// since it was opened.
    fn descriptor(&self) -> Result<DescriptorSnapshot, Error>;

    fn bus_number(&self) -> u8;

    fn address(&self) -> u8;

    /// The hub ports between the bus root and this device, root-most first
    fn port_chain(&self) -> PortChain;
}

/// The fields of a USB device descriptor used by this crate, as read at one
/// point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSnapshot {
    pub vendor_id: u16,
    pub product_id: u16,
    pub class_code: u8,
    pub sub_class_code: u8,
    pub protocol_code: u8,
}
