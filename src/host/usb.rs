use crate::error::Error;
use crate::host::{DescriptorSnapshot, HostContext, HostHandle, UsbHost};
use crate::topology::PortChain;
use crate::DeviceId;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use rusb::DeviceHandle as RusbDeviceHandle;
use rusb::{Context, LogLevel, UsbContext};
use std::fmt;

/// The host USB subsystem, accessed via libusb.
///
/// A new [`rusb::Context`] is created by each call to [`UsbHost::init`],
/// unless one was supplied in the [`UsbHostConfig`].
///
/// # Example
///
/// ```rust,no_run
/// use mctp_usb_tool::{DeviceId, Locator, RusbHost};
///
/// let host = RusbHost::new(None);
/// let report = Locator::new(host, DeviceId::new(0x1234, 0x5678))
///     .run()
///     .unwrap();
/// println!("{}", report.path());
/// ```
#[derive(Debug)]
pub struct RusbHost {
    config: UsbHostConfig,
}

pub struct UsbHostConfig {
    /// The [`rusb::Context`] to use.  May be None to create a new context
    /// for each lookup.
    pub context: Option<Context>,

    /// Log level applied to the libusb context
    pub log_level: LogLevel,
}

impl Default for UsbHostConfig {
    fn default() -> Self {
        UsbHostConfig {
            context: None,
            log_level: LogLevel::Info,
        }
    }
}

// rusb::LogLevel doesn't implement Debug
impl fmt::Debug for UsbHostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.log_level {
            LogLevel::None => "None",
            LogLevel::Error => "Error",
            LogLevel::Warning => "Warning",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
        };
        f.debug_struct("UsbHostConfig")
            .field("context", &self.context)
            .field("log_level", &level)
            .finish()
    }
}

impl RusbHost {
    /// Creates a new RusbHost using the provided config, which can be
    /// omitted to use the default configuration.
    ///
    /// Nothing is opened until [`UsbHost::init`] is called.
    pub fn new(config: Option<UsbHostConfig>) -> Self {
        let config = config.unwrap_or_default();
        trace!("RusbHost::new config {config:?}");
        Self { config }
    }

    pub fn config(&self) -> &UsbHostConfig {
        &self.config
    }
}

impl UsbHost for RusbHost {
    type Context = RusbContext;

    fn init(&self) -> Result<Self::Context, Error> {
        trace!("RusbHost::init");

        let mut context = match &self.config.context {
            Some(ctx) => ctx.clone(),
            None => Context::new().map_err(|e| {
                warn!("Failed to create libusb context: {e}");
                Error::Init {
                    message: e.to_string(),
                }
            })?,
        };
        context.set_log_level(self.config.log_level);

        debug!("libusb context ready");
        Ok(RusbContext { context })
    }
}

/// A libusb context, exited when dropped (once any clones of the
/// [`rusb::Context`] are also gone)
#[derive(Debug)]
pub struct RusbContext {
    context: Context,
}

impl HostContext for RusbContext {
    type Handle = RusbHandle;

    fn open_first_match(&self, id: DeviceId) -> Option<Self::Handle> {
        trace!("RusbContext::open_first_match id {id}");
        let handle = self
            .context
            .open_device_with_vid_pid(id.vendor_id(), id.product_id())?;
        debug!("Opened USB device {id}");
        Some(RusbHandle { handle, id })
    }
}

impl Drop for RusbContext {
    fn drop(&mut self) {
        trace!("RusbContext::drop");
    }
}

/// An open libusb device, closed when dropped
#[derive(Debug)]
pub struct RusbHandle {
    handle: RusbDeviceHandle<Context>,
    id: DeviceId,
}

impl HostHandle for RusbHandle {
    fn descriptor(&self) -> Result<DescriptorSnapshot, Error> {
        trace!("RusbHandle::descriptor");
        let desc = self
            .handle
            .device()
            .device_descriptor()
            .map_err(|e| Error::Descriptor {
                vid: self.id.vendor_id(),
                pid: self.id.product_id(),
                message: e.to_string(),
            })?;

        Ok(DescriptorSnapshot {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            class_code: desc.class_code(),
            sub_class_code: desc.sub_class_code(),
            protocol_code: desc.protocol_code(),
        })
    }

    fn bus_number(&self) -> u8 {
        self.handle.device().bus_number()
    }

    fn address(&self) -> u8 {
        self.handle.device().address()
    }

    // Walks up the parent devices until reaching the root hub, which has no
    // port number.  This is what libusb_get_port_numbers() does, but without
    // failing when the path is longer than the buffer.
    fn port_chain(&self) -> PortChain {
        trace!("RusbHandle::port_chain");
        let mut leaf_first = vec![];
        let mut device = Some(self.handle.device());
        while let Some(dev) = device {
            let port = dev.port_number();
            if port == 0 {
                break;
            }
            trace!("Device on bus {} is on port {port}", dev.bus_number());
            leaf_first.push(port);
            device = dev.get_parent();
        }
        leaf_first.reverse();
        PortChain::from_ports(&leaf_first)
    }
}

impl Drop for RusbHandle {
    fn drop(&mut self) {
        trace!("RusbHandle::drop {}", self.id);
    }
}
