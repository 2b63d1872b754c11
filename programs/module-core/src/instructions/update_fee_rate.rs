use anchor_lang::prelude::*;

use crate::constants::{MODULE_CORE_SEED, MODULE_SEED};
use crate::error::ModuleError;
use crate::events::{EarlyRedemptionFeeRateUpdated, RepurchaseFeeRateUpdated};
use crate::state::{ModuleCoreState, ModuleState};

#[derive(Accounts)]
pub struct UpdateFeeRate<'info> {
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

pub fn repurchase_handler(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
    let module = &mut ctx.accounts.module;
    module.set_repurchase_fee_rate(rate)?;

    emit!(RepurchaseFeeRateUpdated {
        module: module.key(),
        rate,
    });
    msg!("Repurchase fee rate for {} set to {} bps", module.key(), rate);

    Ok(())
}

pub fn early_redemption_handler(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
    let module = &mut ctx.accounts.module;
    module.set_early_redemption_fee_rate(rate)?;

    emit!(EarlyRedemptionFeeRateUpdated {
        module: module.key(),
        rate,
    });
    msg!(
        "Early redemption fee rate for {} set to {} bps",
        module.key(),
        rate
    );

    Ok(())
}
