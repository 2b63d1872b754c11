use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::events::{RoleGranted, RoleRevoked};
use crate::state::{ProtocolConfig, Role};

#[derive(Accounts)]
pub struct UpdateRoles<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    pub admin: Signer<'info>,
}

pub fn grant_manager_handler(ctx: Context<UpdateRoles>, identity: Pubkey) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    let config = &mut ctx.accounts.config;
    config.require_admin(&admin)?;

    if !config.grant_role(Role::Manager, identity)? {
        msg!("{} already holds Manager", identity);
        return Ok(());
    }

    emit!(RoleGranted {
        role: Role::Manager,
        identity,
        sender: admin,
    });
    msg!("Manager granted to {}", identity);

    Ok(())
}

pub fn revoke_manager_handler(ctx: Context<UpdateRoles>, identity: Pubkey) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    let config = &mut ctx.accounts.config;
    config.require_admin(&admin)?;

    if !config.revoke_role(Role::Manager, &identity) {
        msg!("{} does not hold Manager", identity);
        return Ok(());
    }

    emit!(RoleRevoked {
        role: Role::Manager,
        identity,
        sender: admin,
    });
    msg!("Manager revoked from {}", identity);

    Ok(())
}
