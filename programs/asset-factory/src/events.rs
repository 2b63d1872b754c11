use anchor_lang::prelude::*;

/// Emitted once per newly registered instrument pair, never on a retry.
#[event]
pub struct AssetDeployed {
    pub backing_asset: Pubkey,
    pub instrument_a: Pubkey,
    pub instrument_b: Pubkey,
}

#[event]
pub struct PairRegistered {
    pub backing_asset: Pubkey,
    pub peg_asset: Pubkey,
    pub pair: Pubkey,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}
