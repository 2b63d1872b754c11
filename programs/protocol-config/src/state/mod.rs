pub mod protocol_config;

pub use protocol_config::*;
