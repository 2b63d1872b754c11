pub mod initialize;
pub mod initialize_module;
pub mod issue_new_series;
pub mod update_fee_rate;

pub use initialize::*;
pub use initialize_module::*;
pub use issue_new_series::*;
pub use update_fee_rate::*;
