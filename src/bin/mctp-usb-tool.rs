//! Finds a USB device by VID:PID, prints its USB port path and whether it is
//! a MCTP USB device.
//!
//! ```text
//! $ mctp-usb-tool 0x1234 0x5678
//! USB Device Port Path: 2-3-1
//! Device is a MCTP USB Device
//! ```
//!
//! Exits with 0 if the device was found, whether or not it is MCTP, and 1
//! otherwise.  Logging goes to stderr and can be controlled via the
//! `RUST_LOG` environment variable.
use mctp_usb_tool::cli::main_with;
use mctp_usb_tool::RusbHost;

use env_logger;
use std::io;

fn main() {
    env_logger::builder().init();

    let code = main_with(
        std::env::args_os(),
        |args| RusbHost::new(Some(args.host_config())),
        &mut io::stdout(),
        &mut io::stderr(),
    );
    std::process::exit(code);
}
