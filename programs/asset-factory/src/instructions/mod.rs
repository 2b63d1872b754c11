pub mod deploy_instrument_pair;
pub mod get_deployed_pairs;
pub mod initialize;
pub mod is_deployed;
pub mod register_pair;
pub mod transfer_ownership;

pub use deploy_instrument_pair::*;
pub use get_deployed_pairs::*;
pub use initialize::*;
pub use is_deployed::*;
pub use register_pair::*;
pub use transfer_ownership::*;
