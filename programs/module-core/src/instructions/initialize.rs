use anchor_lang::prelude::*;

use crate::constants::MODULE_CORE_SEED;
use crate::state::ModuleCoreState;

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = payer,
        space = ModuleCoreState::LEN,
        seeds = [MODULE_CORE_SEED],
        bump
    )]
    pub module_core_state: Account<'info, ModuleCoreState>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, config_authority: Pubkey) -> Result<()> {
    ModuleCoreState::require_config_authority(&config_authority)?;

    let state = &mut ctx.accounts.module_core_state;

    state.config_authority = config_authority;
    state.bump = ctx.bumps.module_core_state;

    msg!("Module core initialized!");
    msg!("Config authority: {}", state.config_authority);

    Ok(())
}
