use anchor_lang::prelude::*;

/// Marks a (backing, peg) pair as recognized. Instrument pairs can only be
/// deployed for pairs that have one of these.
#[account]
pub struct PairRegistration {
    pub backing_asset: Pubkey,
    pub peg_asset: Pubkey,
    /// Factory owner at registration time
    pub registered_by: Pubkey,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl PairRegistration {
    pub const LEN: usize = 8 + // discriminator
        32 + // backing_asset
        32 + // peg_asset
        32 + // registered_by
        1; // bump
}
