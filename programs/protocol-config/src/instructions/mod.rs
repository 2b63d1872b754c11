pub mod initialize;
pub mod initialize_module;
pub mod issue_new_series;
pub mod pause;
pub mod read_config;
pub mod roles;
pub mod set_module_core;
pub mod transfer_admin;
pub mod update_fee_rate;

pub use initialize::*;
pub use initialize_module::*;
pub use issue_new_series::*;
pub use pause::*;
pub use read_config::*;
pub use roles::*;
pub use set_module_core::*;
pub use transfer_admin::*;
pub use update_fee_rate::*;
