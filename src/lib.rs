//! # mctp-usb-tool
//!
//! This crate finds a USB device by its vendor and product IDs, reports where
//! it is attached (bus number and hub port chain) and checks whether it
//! advertises itself as an MCTP (Management Component Transport Protocol) USB
//! device via its device class code.
//!
//! It is a point-in-time discovery tool: it confirms a device is present and
//! locates it in the bus tree before higher level MCTP tooling is attached.
//! It does not speak MCTP itself.
//!
//! ## Overview
//!
//! - [`parse_hex_u16`] and [`DeviceId`] turn user supplied hex tokens into a
//!   VID:PID pair.  Zero is a valid ID, so failures are always explicit
//!   errors.
//! - [`Locator`] runs the lookup as a small state machine: acquire a USB
//!   context, open the first matching device, read its descriptor, resolve
//!   its topology and classify it.
//! - [`TopologyPath`] and [`PortChain`] hold the bus/port path, displayed as
//!   `<bus>-<port>-<port>...`.
//! - [`UsbHost`] abstracts the host USB subsystem.  [`RusbHost`] uses libusb
//!   via [`rusb`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use mctp_usb_tool::{DeviceId, Error, Locator, RusbHost};
//!
//! fn main() -> Result<(), Error> {
//!     let id = DeviceId::parse("0x1234", "0x5678")?;
//!
//!     // The USB context and device handle are released before run() returns
//!     let report = Locator::new(RusbHost::new(None), id).run()?;
//!
//!     println!("Port path: {}", report.path());
//!     println!("MCTP: {}", report.classification().is_mctp());
//!     Ok(())
//! }
//! ```
//!
//! ## Matching
//!
//! Only the first matching device is reported.  When several devices share
//! a VID:PID, which one is first depends on the host's enumeration order,
//! which this crate doesn't control.
//!
//! ## Logging
//!
//! The library uses the `log` crate for diagnostic output:
//!
//! - Warn: Lookup failures which may need operator attention
//! - Info: Device found or not found
//! - Debug: State machine transitions and descriptor contents
//! - Trace: Function entry and topology walking
//!
//! The `mctp-usb-tool` binary uses
//! [`env_logger`](https://docs.rs/env_logger/latest/env_logger/index.html),
//! so set the `RUST_LOG` environment variable to see this output.
//!
//! ## License
//!
//! This library is licensed under the GNU General Public License Version 3 (GPLv3).

pub mod cli;
pub mod constants;
pub mod error;
pub mod hex;
pub mod host;
pub mod locator;
pub mod topology;

pub use crate::error::{Error, FormatKind};
pub use crate::hex::{parse_hex_u16, DeviceId};
pub use crate::host::{DescriptorSnapshot, HostContext, HostHandle, RusbHost, UsbHost, UsbHostConfig};
pub use crate::locator::{Classification, DeviceReport, Locator, Stage};
pub use crate::topology::{resolve_topology, PortChain, TopologyPath};
