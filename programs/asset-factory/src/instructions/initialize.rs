use anchor_lang::prelude::*;

use crate::constants::FACTORY_SEED;
use crate::state::FactoryState;

#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The factory state account that holds the factory owner
    #[account(
        init,
        payer = payer,
        space = FactoryState::LEN,
        seeds = [FACTORY_SEED],
        bump
    )]
    pub factory: Account<'info, FactoryState>,

    /// The initial factory owner
    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let factory = &mut ctx.accounts.factory;

    factory.owner = ctx.accounts.owner.key();
    factory.pair_count = 0;
    factory.bump = ctx.bumps.factory;

    msg!("Asset factory initialized!");
    msg!("Factory: {}", factory.key());
    msg!("Factory owner: {}", factory.owner);

    Ok(())
}
