use anchor_lang::prelude::*;

use crate::events::{Paused, Unpaused};

use super::ManageConfig;

pub fn pause_handler(ctx: Context<ManageConfig>) -> Result<()> {
    let manager = ctx.accounts.manager.key();
    let config = &mut ctx.accounts.config;
    config.require_manager(&manager)?;
    config.pause()?;

    emit!(Paused { account: manager });
    msg!("Protocol paused by {}", manager);

    Ok(())
}

pub fn unpause_handler(ctx: Context<ManageConfig>) -> Result<()> {
    let manager = ctx.accounts.manager.key();
    let config = &mut ctx.accounts.config;
    config.require_manager(&manager)?;
    config.unpause()?;

    emit!(Unpaused { account: manager });
    msg!("Protocol unpaused by {}", manager);

    Ok(())
}
