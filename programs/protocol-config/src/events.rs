use anchor_lang::prelude::*;

use crate::state::Role;

#[event]
pub struct ModuleCoreUpdated {
    pub previous: Pubkey,
    pub module_core: Pubkey,
}

#[event]
pub struct Paused {
    pub account: Pubkey,
}

#[event]
pub struct Unpaused {
    pub account: Pubkey,
}

#[event]
pub struct RoleGranted {
    pub role: Role,
    pub identity: Pubkey,
    pub sender: Pubkey,
}

#[event]
pub struct RoleRevoked {
    pub role: Role,
    pub identity: Pubkey,
    pub sender: Pubkey,
}
