// Domain layer: protocol model and the traits adapters plug into.

pub mod model;
pub mod ports;
