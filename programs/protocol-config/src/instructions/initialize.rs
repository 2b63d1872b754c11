use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::events::RoleGranted;
use crate::state::{ProtocolConfig, Role};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = admin,
        space = ProtocolConfig::LEN,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, ProtocolConfig>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    ctx.accounts
        .config
        .set_inner(ProtocolConfig::new(admin, ctx.bumps.config));

    emit!(RoleGranted {
        role: Role::Admin,
        identity: admin,
        sender: admin,
    });

    msg!("Protocol config initialized!");
    msg!("Admin: {}", admin);

    Ok(())
}
