use anchor_lang::prelude::*;

use crate::constants::DEPLOYED_SEED;

#[derive(Accounts)]
#[instruction(address: Pubkey)]
pub struct IsDeployed<'info> {
    /// CHECK: Marker PDA for `address`, uninitialized when nothing was deployed there
    #[account(
        seeds = [DEPLOYED_SEED, address.as_ref()],
        bump
    )]
    pub marker: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<IsDeployed>, address: Pubkey) -> Result<bool> {
    let marker = &ctx.accounts.marker;
    let deployed = marker.owner == &crate::ID && !marker.data_is_empty();

    msg!("Instrument {} deployed: {}", address, deployed);

    Ok(deployed)
}
