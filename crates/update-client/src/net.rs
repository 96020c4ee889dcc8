/// Answers whether the host currently has a usable network connection.
///
/// Remote operations consult the probe before opening a connection so that
/// an offline host fails fast with a dedicated error instead of a transport
/// timeout. The production probe is [`SystemNetworkProbe`]; tests substitute
/// their own to force the offline path.
pub trait NetworkProbe: Send + Sync {
    /// Whether any network interface is up.
    fn is_available(&self) -> bool;
}

/// Probe backed by the OS interface table. Loopback does not count, and a
/// failed enumeration is reported as offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetworkProbe;

impl NetworkProbe for SystemNetworkProbe {
    fn is_available(&self) -> bool {
        match if_addrs::get_if_addrs() {
            Ok(interfaces) => interfaces.iter().any(|iface| !iface.is_loopback()),
            Err(_) => false,
        }
    }
}
