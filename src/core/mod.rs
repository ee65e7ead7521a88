pub mod communicator;
pub mod controller;

pub use crate::domain::model::{Command, PortConfig, PortDescriptor, ResponseToken};
pub use crate::domain::ports::{ActuatorController, Communicator, PortEnumerator, PortHandle};
pub use crate::utils::error::Result;
