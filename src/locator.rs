//! Locates a USB device by VID:PID, resolves where it is attached and
//! classifies it.
//!
//! A lookup is a linear state machine:
//!
//! ```text
//! Uninitialized -> Ready -> Matched -> Classified -> Done
//!       |            |         |           |
//!   InitError    NotFound  DescriptorReadError  TopologyError
//! ```
//!
//! Each [`Locator::step`] performs one transition.  Any open device handle and
//! the host context are released as soon as the lookup reaches a terminal
//! stage, whether it succeeded or not, with the handle always released first.
use crate::constants::{MCTP_CLASS_CODE, PORT_PATH_LABEL};
use crate::error::Error;
use crate::host::{DescriptorSnapshot, HostContext, HostHandle, UsbHost};
use crate::topology::{resolve_topology, TopologyPath};
use crate::DeviceId;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use std::fmt;
use std::io::{self, Write};

/// Whether a device advertises itself as an MCTP USB device.  The device
/// class code is the only thing checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Mctp,
    NotMctp,
}

impl Classification {
    pub const fn from_class_code(class_code: u8) -> Self {
        if class_code == MCTP_CLASS_CODE {
            Classification::Mctp
        } else {
            Classification::NotMctp
        }
    }

    pub const fn is_mctp(&self) -> bool {
        matches!(self, Classification::Mctp)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Mctp => write!(f, "a MCTP USB Device"),
            Classification::NotMctp => write!(f, "not MCTP USB Device"),
        }
    }
}

/// The stages of a lookup, including the terminal failure stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    Ready,
    Matched,
    Classified,
    Done,
    InitError,
    NotFound,
    DescriptorReadError,
    TopologyError,
}

impl Stage {
    pub const fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Stage::Uninitialized | Stage::Ready | Stage::Matched | Stage::Classified
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Uninitialized => "Uninitialized",
            Stage::Ready => "Ready",
            Stage::Matched => "Matched",
            Stage::Classified => "Classified",
            Stage::Done => "Done",
            Stage::InitError => "InitError",
            Stage::NotFound => "NotFound",
            Stage::DescriptorReadError => "DescriptorReadError",
            Stage::TopologyError => "TopologyError",
        };
        write!(f, "{name}")
    }
}

/// The result of a successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    id: DeviceId,
    path: TopologyPath,
    address: u8,
    descriptor: DescriptorSnapshot,
    classification: Classification,
}

impl DeviceReport {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Bus number and port chain of the device
    pub fn path(&self) -> &TopologyPath {
        &self.path
    }

    /// Device address on its bus
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn descriptor(&self) -> &DescriptorSnapshot {
        &self.descriptor
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Writes the port path line followed by the classification line
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{PORT_PATH_LABEL}: {}", self.path)?;
        writeln!(out, "Device is {}", self.classification)
    }
}

// Handles are declared before the context they were opened from, so they are
// dropped first if a state is discarded.
enum Lookup<C: HostContext> {
    Uninitialized,
    Ready {
        context: C,
    },
    Matched {
        handle: C::Handle,
        context: C,
    },
    Classified {
        handle: C::Handle,
        context: C,
        descriptor: DescriptorSnapshot,
    },
    Done(DeviceReport),
    Failed(Stage),
}

impl<C: HostContext> Lookup<C> {
    fn stage(&self) -> Stage {
        match self {
            Lookup::Uninitialized => Stage::Uninitialized,
            Lookup::Ready { .. } => Stage::Ready,
            Lookup::Matched { .. } => Stage::Matched,
            Lookup::Classified { .. } => Stage::Classified,
            Lookup::Done(_) => Stage::Done,
            Lookup::Failed(stage) => *stage,
        }
    }
}

/// Finds the first attached device matching a [`DeviceId`] and reports its
/// topology and classification.
///
/// # Example
///
/// ```rust,no_run
/// use mctp_usb_tool::{DeviceId, Locator, RusbHost};
///
/// let id = DeviceId::parse("0x1234", "0x5678").unwrap();
/// let report = Locator::new(RusbHost::new(None), id).run().unwrap();
/// report.write_to(&mut std::io::stdout()).unwrap();
/// ```
pub struct Locator<H: UsbHost> {
    host: H,
    id: DeviceId,
    state: Lookup<H::Context>,
}

impl<H: UsbHost> Locator<H> {
    pub fn new(host: H, id: DeviceId) -> Self {
        trace!("Locator::new host {host:?} id {id}");
        Self {
            host,
            id,
            state: Lookup::Uninitialized,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// The report, once the lookup is [`Stage::Done`]
    pub fn report(&self) -> Option<&DeviceReport> {
        match &self.state {
            Lookup::Done(report) => Some(report),
            _ => None,
        }
    }

    /// Runs the lookup to completion.
    ///
    /// # Returns
    /// * `Ok(DeviceReport)` - If the device was found and resolved
    /// * `Err(Error)` - The error from the stage which failed
    ///
    /// All USB resources have been released by the time this returns.
    pub fn run(mut self) -> Result<DeviceReport, Error> {
        trace!("Locator::run id {}", self.id);
        loop {
            if let Lookup::Done(report) = self.state {
                return Ok(report);
            }
            self.step()?;
        }
    }

    /// Performs the next transition of the lookup.
    ///
    /// # Returns
    /// * `Ok(Stage)` - The stage reached
    /// * `Err(Error)` - If the transition failed.  [`Locator::stage`] then
    ///   returns the terminal failure stage, and all resources have been
    ///   released.
    ///
    /// Calling this once the lookup is done is a no-op.  Calling it after a
    /// failure returns [`Error::Args`].
    pub fn step(&mut self) -> Result<Stage, Error> {
        let from = self.stage();
        trace!("Locator::step from {from}");

        let state = std::mem::replace(&mut self.state, Lookup::Failed(from));
        match self.advance(state) {
            Ok(state) => {
                self.state = state;
                let to = self.stage();
                debug!("Lookup of {} moved from {from} to {to}", self.id);
                Ok(to)
            }
            Err((stage, e)) => {
                debug!("Lookup of {} failed in {from}: {e}", self.id);
                self.state = Lookup::Failed(stage);
                Err(e)
            }
        }
    }

    fn advance(
        &self,
        state: Lookup<H::Context>,
    ) -> Result<Lookup<H::Context>, (Stage, Error)> {
        match state {
            Lookup::Uninitialized => match self.host.init() {
                Ok(context) => Ok(Lookup::Ready { context }),
                Err(e) => {
                    warn!("Failed to initialize USB host: {e}");
                    Err((Stage::InitError, e))
                }
            },

            Lookup::Ready { context } => match context.open_first_match(self.id) {
                Some(handle) => {
                    info!("Found USB device {}", self.id);
                    Ok(Lookup::Matched { handle, context })
                }
                None => {
                    info!("No USB device {} found", self.id);
                    drop(context);
                    Err((
                        Stage::NotFound,
                        Error::NotFound {
                            vid: self.id.vendor_id(),
                            pid: self.id.product_id(),
                        },
                    ))
                }
            },

            Lookup::Matched { handle, context } => match handle.descriptor() {
                Ok(descriptor) => {
                    debug!(
                        "Device descriptor {:04x}:{:04x} class 0x{:02x} subclass 0x{:02x} protocol 0x{:02x}",
                        descriptor.vendor_id,
                        descriptor.product_id,
                        descriptor.class_code,
                        descriptor.sub_class_code,
                        descriptor.protocol_code
                    );
                    Ok(Lookup::Classified {
                        handle,
                        context,
                        descriptor,
                    })
                }
                Err(e) => {
                    warn!("Device {} went away before its descriptor was read", self.id);
                    Self::release(handle, context);
                    Err((Stage::DescriptorReadError, e))
                }
            },

            Lookup::Classified {
                handle,
                context,
                descriptor,
            } => {
                let topology = resolve_topology(&handle);
                let address = handle.address();
                Self::release(handle, context);

                let path = topology.map_err(|e| (Stage::TopologyError, e))?;
                let classification = Classification::from_class_code(descriptor.class_code);
                debug!(
                    "Device {} at {path} address {address} is {classification}",
                    self.id
                );
                Ok(Lookup::Done(DeviceReport {
                    id: self.id,
                    path,
                    address,
                    descriptor,
                    classification,
                }))
            }

            state @ Lookup::Done(_) => Ok(state),

            Lookup::Failed(stage) => Err((
                stage,
                Error::Args {
                    message: format!("Lookup of {} already failed in {stage}", self.id),
                },
            )),
        }
    }

    fn release(handle: <H::Context as HostContext>::Handle, context: H::Context) {
        trace!("Locator::release");
        drop(handle);
        drop(context);
    }
}
