//! A fake host USB subsystem which counts the calls made to it
use crate::error::Error;
use crate::host::{DescriptorSnapshot, HostContext, HostHandle, UsbHost};
use crate::topology::PortChain;
use crate::DeviceId;

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Counters {
    pub inits: Cell<usize>,
    pub context_drops: Cell<usize>,
    pub opens: Cell<usize>,
    pub handle_drops: Cell<usize>,
    pub descriptor_reads: Cell<usize>,
    pub topology_reads: Cell<usize>,
    pub handle_outlived_context: Cell<bool>,
}

impl Counters {
    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }

    pub fn contexts_open(&self) -> usize {
        self.inits.get() - self.context_drops.get()
    }

    pub fn handles_open(&self) -> usize {
        self.opens.get() - self.handle_drops.get()
    }
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    pub id: DeviceId,
    pub class_code: u8,
    pub bus: u8,
    pub address: u8,
    pub ports: Vec<u8>,
    /// Descriptor reads fail, as if the device was unplugged after opening
    pub vanishes: bool,
}

impl FakeDevice {
    pub fn new(id: DeviceId, class_code: u8, bus: u8, ports: &[u8]) -> Self {
        Self {
            id,
            class_code,
            bus,
            address: ports.len() as u8 + 1,
            ports: ports.to_vec(),
            vanishes: false,
        }
    }

    pub fn vanishing(mut self) -> Self {
        self.vanishes = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeHost {
    devices: Vec<FakeDevice>,
    fail_init: bool,
    counters: Rc<Counters>,
}

impl FakeHost {
    pub fn with_devices(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Default::default()
        }
    }

    pub fn counters(&self) -> Rc<Counters> {
        self.counters.clone()
    }
}

impl UsbHost for FakeHost {
    type Context = FakeContext;

    fn init(&self) -> Result<Self::Context, Error> {
        if self.fail_init {
            return Err(Error::Init {
                message: "fake init failure".into(),
            });
        }
        Counters::bump(&self.counters.inits);
        Ok(FakeContext {
            devices: self.devices.clone(),
            counters: self.counters.clone(),
        })
    }
}

#[derive(Debug)]
pub struct FakeContext {
    devices: Vec<FakeDevice>,
    counters: Rc<Counters>,
}

impl HostContext for FakeContext {
    type Handle = FakeHandle;

    fn open_first_match(&self, id: DeviceId) -> Option<Self::Handle> {
        let device = self.devices.iter().find(|d| d.id == id)?.clone();
        Counters::bump(&self.counters.opens);
        Some(FakeHandle {
            device,
            counters: self.counters.clone(),
        })
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        Counters::bump(&self.counters.context_drops);
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    device: FakeDevice,
    counters: Rc<Counters>,
}

impl HostHandle for FakeHandle {
    fn descriptor(&self) -> Result<DescriptorSnapshot, Error> {
        Counters::bump(&self.counters.descriptor_reads);
        if self.device.vanishes {
            return Err(Error::Descriptor {
                vid: self.device.id.vendor_id(),
                pid: self.device.id.product_id(),
                message: "No such device (it may have been disconnected)".into(),
            });
        }
        Ok(DescriptorSnapshot {
            vendor_id: self.device.id.vendor_id(),
            product_id: self.device.id.product_id(),
            class_code: self.device.class_code,
            sub_class_code: 0,
            protocol_code: 0,
        })
    }

    fn bus_number(&self) -> u8 {
        self.device.bus
    }

    fn address(&self) -> u8 {
        self.device.address
    }

    fn port_chain(&self) -> PortChain {
        Counters::bump(&self.counters.topology_reads);
        PortChain::from_ports(&self.device.ports)
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        Counters::bump(&self.counters.handle_drops);
        if self.counters.contexts_open() == 0 {
            self.counters.handle_outlived_context.set(true);
        }
    }
}
