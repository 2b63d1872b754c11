use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::events::ModuleCoreUpdated;
use crate::state::ProtocolConfig;

#[derive(Accounts)]
pub struct ManageConfig<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    pub manager: Signer<'info>,
}

pub fn handler(ctx: Context<ManageConfig>, module_core: Pubkey) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_manager(&ctx.accounts.manager.key())?;

    let previous = config.module_core;
    config.set_module_core(module_core)?;

    emit!(ModuleCoreUpdated {
        previous,
        module_core,
    });

    msg!("Module core updated!");
    msg!("Previous: {}", previous);
    msg!("Current: {}", module_core);

    Ok(())
}
