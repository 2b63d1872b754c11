use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::state::{validate_expiry, ProtocolConfig};

#[derive(Accounts)]
pub struct IssueNewSeries<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ProtocolConfig>,

    pub manager: Signer<'info>,

    /// CHECK: Compared against the configured module core in the handler
    pub module_program: UncheckedAccount<'info>,

    /// CHECK: Validated by the module program
    pub module_core_state: UncheckedAccount<'info>,

    /// CHECK: Module state of the pair, validated by the module program
    #[account(mut)]
    pub module: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<IssueNewSeries>, expiry: i64, exchange_rate: u64, cap: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    config.require_manager(&ctx.accounts.manager.key())?;
    config.require_active()?;
    config.require_module(&ctx.accounts.module_program.key())?;
    validate_expiry(expiry, Clock::get()?.unix_timestamp)?;

    let config_seeds = &[CONFIG_SEED, &[config.bump]];
    let signer_seeds = &[&config_seeds[..]];

    let cpi_accounts = module_core::cpi::accounts::IssueNewSeries {
        module_core_state: ctx.accounts.module_core_state.to_account_info(),
        config_authority: config.to_account_info(),
        module: ctx.accounts.module.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.module_program.to_account_info(),
        cpi_accounts,
        signer_seeds,
    );
    module_core::cpi::issue_new_series(cpi_ctx, expiry, exchange_rate, cap)?;

    msg!("Series issuance forwarded!");
    msg!("Module: {}", ctx.accounts.module.key());
    msg!("Expiry: {}", expiry);

    Ok(())
}
