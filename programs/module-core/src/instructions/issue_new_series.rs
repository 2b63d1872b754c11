use anchor_lang::prelude::*;

use crate::constants::{MODULE_CORE_SEED, MODULE_SEED};
use crate::error::ModuleError;
use crate::events::SeriesIssued;
use crate::state::{ModuleCoreState, ModuleState};

#[derive(Accounts)]
pub struct IssueNewSeries<'info> {
    #[account(
        seeds = [MODULE_CORE_SEED],
        bump = module_core_state.bump,
        has_one = config_authority @ ModuleError::Unauthorized,
    )]
    pub module_core_state: Account<'info, ModuleCoreState>,

    pub config_authority: Signer<'info>,

    #[account(
        mut,
        seeds = [MODULE_SEED, module.peg_asset.as_ref(), module.backing_asset.as_ref()],
        bump = module.bump
    )]
    pub module: Account<'info, ModuleState>,
}

pub fn handler(ctx: Context<IssueNewSeries>, expiry: i64, exchange_rate: u64, cap: u64) -> Result<()> {
    let module = &mut ctx.accounts.module;
    let series = module.issue_series(expiry, exchange_rate, cap)?;

    emit!(SeriesIssued {
        module: module.key(),
        series_id: series.id,
        expiry,
        exchange_rate,
        cap,
    });

    msg!("Series issued!");
    msg!("Module: {}", module.key());
    msg!("Series id: {}", series.id);
    msg!("Expiry: {}", expiry);

    Ok(())
}
