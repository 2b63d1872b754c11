pub mod asset_registry;
pub mod deployed_instrument;
pub mod deployment_key;
pub mod factory_state;
pub mod pair_registration;

pub use asset_registry::*;
pub use deployed_instrument::*;
pub use deployment_key::*;
pub use factory_state::*;
pub use pair_registration::*;
