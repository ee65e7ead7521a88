// Adapters layer: concrete serial backends behind the domain port traits.

pub mod memory;
pub mod serial;

pub use memory::{MemoryPort, MemoryPorts, RecordedDelay};
pub use serial::{SystemPort, SystemPorts};
