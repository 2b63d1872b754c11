use anchor_lang::prelude::*;

#[account]
pub struct FactoryState {
    /// The factory owner, the only identity allowed to register pairs and deploy instruments
    pub owner: Pubkey,
    /// Number of (backing, peg) pairs registered so far
    pub pair_count: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl FactoryState {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        8 + // pair_count
        1; // bump
}
