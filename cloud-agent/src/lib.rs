pub mod config;
pub mod peer;

pub use peer::CloudPeer;
