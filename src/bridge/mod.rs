pub mod protocol;
mod service;

pub use service::{outbound_channel, write_outbound, BridgeService};
