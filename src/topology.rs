//! Bus and hub port topology of a USB device
use crate::constants::MAX_PORT_DEPTH;
use crate::error::Error;
use crate::host::HostHandle;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use std::fmt;

/// The ordered hub port numbers from the bus root to a device, root-most
/// first.
///
/// Holds at most [`MAX_PORT_DEPTH`] ports.  If a deeper path was supplied the
/// extra leaf-most ports are dropped and [`PortChain::is_truncated`] returns
/// true, along with the real depth from [`PortChain::depth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortChain {
    ports: [u8; MAX_PORT_DEPTH],
    len: usize,
    depth: usize,
}

impl PortChain {
    /// Creates an empty chain, as for a root hub
    pub const fn new() -> Self {
        Self {
            ports: [0; MAX_PORT_DEPTH],
            len: 0,
            depth: 0,
        }
    }

    /// Builds a chain from port numbers ordered root-most first
    pub fn from_ports(ports: &[u8]) -> Self {
        let mut chain = Self::new();
        for port in ports {
            chain.push(*port);
        }
        chain
    }

    /// Appends the next port towards the leaf
    pub fn push(&mut self, port: u8) {
        if self.len < MAX_PORT_DEPTH {
            self.ports[self.len] = port;
            self.len += 1;
        } else if self.depth == MAX_PORT_DEPTH {
            debug!("Port chain deeper than {MAX_PORT_DEPTH}, dropping port {port}");
        }
        self.depth += 1;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ports[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of ports held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of ports supplied, including any which were dropped
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_truncated(&self) -> bool {
        self.depth > self.len
    }
}

/// A device's bus number and port chain, displayed as `B-P1-P2-...-Pn`, or
/// just `B` when there is no port chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyPath {
    bus: u8,
    ports: PortChain,
}

impl TopologyPath {
    pub fn new(bus: u8, ports: PortChain) -> Self {
        Self { bus, ports }
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn ports(&self) -> &PortChain {
        &self.ports
    }
}

impl fmt::Display for TopologyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bus)?;
        for port in self.ports.as_slice() {
            write!(f, "-{port}")?;
        }
        Ok(())
    }
}

/// Resolves the bus number and port chain of an open device.
///
/// # Returns
/// * `Ok(TopologyPath)` - The device's position in the bus tree
/// * `Err(Error::Topology)` - If the device is deeper than
///   [`MAX_PORT_DEPTH`] ports, rather than reporting a misleading partial
///   path
pub fn resolve_topology<H: HostHandle>(handle: &H) -> Result<TopologyPath, Error> {
    trace!("resolve_topology");
    let bus = handle.bus_number();
    let ports = handle.port_chain();

    if ports.is_truncated() {
        warn!(
            "Device on bus {bus} is {} ports deep, only {MAX_PORT_DEPTH} supported",
            ports.depth()
        );
        return Err(Error::Topology {
            bus,
            depth: ports.depth(),
        });
    }

    if ports.is_empty() {
        debug!("No port chain for device on bus {bus}, probably a root hub");
    }

    let path = TopologyPath::new(bus, ports);
    debug!("Resolved topology {path}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeDevice;
    use crate::host::fake::FakeHost;
    use crate::host::{HostContext, UsbHost};
    use crate::DeviceId;

    #[test]
    fn test_display() {
        let path = TopologyPath::new(2, PortChain::from_ports(&[3, 1]));
        assert_eq!(path.to_string(), "2-3-1");
    }

    #[test]
    fn test_display_bus_only() {
        let path = TopologyPath::new(1, PortChain::new());
        assert_eq!(path.to_string(), "1");
    }

    #[test]
    fn test_chain_at_limit() {
        let ports = [1, 2, 3, 4, 5, 6, 7, 8];
        let chain = PortChain::from_ports(&ports);
        assert_eq!(chain.as_slice(), &ports);
        assert_eq!(chain.len(), MAX_PORT_DEPTH);
        assert!(!chain.is_truncated());
    }

    #[test]
    fn test_chain_truncated() {
        let chain = PortChain::from_ports(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(chain.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(chain.depth(), 10);
        assert!(chain.is_truncated());
    }

    #[test]
    fn test_resolve() {
        let id = DeviceId::new(0x1234, 0x5678);
        let host = FakeHost::with_devices(vec![FakeDevice::new(id, 0x14, 4, &[2, 7, 1])]);
        let context = host.init().unwrap();
        let handle = context.open_first_match(id).unwrap();

        let path = resolve_topology(&handle).unwrap();
        assert_eq!(path.bus(), 4);
        assert_eq!(path.to_string(), "4-2-7-1");
    }

    #[test]
    fn test_resolve_root_hub() {
        let id = DeviceId::new(0x1d6b, 0x0002);
        let host = FakeHost::with_devices(vec![FakeDevice::new(id, 0x09, 1, &[])]);
        let context = host.init().unwrap();
        let handle = context.open_first_match(id).unwrap();

        assert_eq!(resolve_topology(&handle).unwrap().to_string(), "1");
    }

    #[test]
    fn test_resolve_too_deep() {
        let id = DeviceId::new(0x1234, 0x5678);
        let ports = [1u8; MAX_PORT_DEPTH + 1];
        let host = FakeHost::with_devices(vec![FakeDevice::new(id, 0x14, 3, &ports)]);
        let context = host.init().unwrap();
        let handle = context.open_first_match(id).unwrap();

        assert_eq!(
            resolve_topology(&handle),
            Err(Error::Topology {
                bus: 3,
                depth: MAX_PORT_DEPTH + 1
            })
        );
    }
}
