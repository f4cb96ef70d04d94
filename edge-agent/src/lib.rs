pub mod config;
pub mod peer;
pub mod sensors;

pub use peer::EdgePeer;
pub use sensors::{OffsetFactors, SensorModel};
