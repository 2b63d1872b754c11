use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::events::{RoleGranted, RoleRevoked};
use crate::state::{ProtocolConfig, Role};

#[derive(Accounts)]
pub struct TransferAdmin<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    pub admin: Signer<'info>,
}

pub fn handler(ctx: Context<TransferAdmin>, new_admin: Pubkey) -> Result<()> {
    let old_admin = ctx.accounts.admin.key();
    ctx.accounts.config.transfer_admin(&old_admin, new_admin)?;

    if old_admin != new_admin {
        emit!(RoleGranted {
            role: Role::Admin,
            identity: new_admin,
            sender: old_admin,
        });
        emit!(RoleRevoked {
            role: Role::Admin,
            identity: old_admin,
            sender: old_admin,
        });
    }

    msg!("Admin transfer successful!");
    msg!("Old admin: {}", old_admin);
    msg!("New admin: {}", new_admin);

    Ok(())
}
