pub mod module_core_state;
pub mod module_state;

pub use module_core_state::*;
pub use module_state::*;
