use anchor_lang::prelude::*;

use super::InstrumentKind;

/// Existence marker for a deployed instrument mint, seeded by the mint address.
#[account]
pub struct DeployedInstrument {
    pub backing_asset: Pubkey,
    pub kind: InstrumentKind,
    pub bump: u8,
}

impl DeployedInstrument {
    pub const LEN: usize = 8 + // discriminator
        32 + // backing_asset
        1 + // kind
        1; // bump

    /// A marker created by `init_if_needed` in the current instruction still
    /// holds zeroed fields; one written by an earlier deployment never does.
    pub fn is_recorded(&self) -> bool {
        self.backing_asset != Pubkey::default()
    }
}
