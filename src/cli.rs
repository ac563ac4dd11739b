//! Command line handling for the mctp-usb-tool binary
use crate::hex::parse_hex_u16;
use crate::host::{UsbHost, UsbHostConfig};
use crate::{DeviceId, Locator};

use clap::Parser;
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use rusb::LogLevel;
use std::ffi::OsString;
use std::io::Write;

const LONG_ABOUT: &str = "\
Finds the USB device with the specified VID:PID, displays its USB port path \
and reports whether it is a MCTP USB Device (device class 0x14).

Example:
  mctp-usb-tool 0x1234 0x5678";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = LONG_ABOUT)]
pub struct Args {
    /// USB Vendor ID (hexadecimal, e.g., 0x1234)
    #[arg(value_parser = parse_hex_u16)]
    pub vendor_id: u16,

    /// USB Device ID (hexadecimal, e.g., 0x5678)
    #[arg(value_parser = parse_hex_u16)]
    pub device_id: u16,

    /// Turn on libusb's own debug logging
    #[arg(long)]
    pub libusb_debug: bool,
}

impl Args {
    pub fn device_id(&self) -> DeviceId {
        DeviceId::new(self.vendor_id, self.device_id)
    }

    pub fn host_config(&self) -> UsbHostConfig {
        UsbHostConfig {
            context: None,
            log_level: if self.libusb_debug {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
        }
    }
}

/// Runs the tool and returns the process exit code.
///
/// The host is only created, via `make_host`, once both identifiers have
/// been parsed successfully.
///
/// # Returns
/// * `0` - The device was found and reported, whether or not it is MCTP
/// * `1` - Bad arguments, or the device couldn't be found or resolved
pub fn main_with<I, T, H, F, O, E>(argv: I, make_host: F, out: &mut O, err: &mut E) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    H: UsbHost,
    F: FnOnce(&Args) -> H,
    O: Write,
    E: Write,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported via clap errors too
            if e.use_stderr() {
                let _ = write!(err, "{}", e.render());
                return 1;
            }
            let _ = write!(out, "{}", e.render());
            return 0;
        }
    };
    trace!("Parsed arguments {args:?}");

    let id = args.device_id();
    let host = make_host(&args);
    info!("Looking for USB device {id}");

    let result = Locator::new(host, id)
        .run()
        .and_then(|report| report.write_to(out).map_err(|e| crate::Error::Args {
            message: format!("Failed to write report: {e}"),
        }));

    match result {
        Ok(()) => 0,
        Err(e) => {
            debug!("Exiting with error {e:?}");
            let _ = writeln!(err, "Error: {e}");
            1
        }
    }
}
