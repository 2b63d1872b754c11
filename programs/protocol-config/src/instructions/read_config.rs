use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::state::{ProtocolConfig, Role};

#[derive(Accounts)]
pub struct ReadConfig<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ProtocolConfig>,
}

pub fn has_role_handler(ctx: Context<ReadConfig>, role: Role, identity: Pubkey) -> Result<bool> {
    Ok(ctx.accounts.config.has_role(role, &identity))
}

pub fn is_paused_handler(ctx: Context<ReadConfig>) -> Result<bool> {
    Ok(ctx.accounts.config.paused)
}
