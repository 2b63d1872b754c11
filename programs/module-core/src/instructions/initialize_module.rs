use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::constants::{MAX_EARLY_REDEMPTION_FEE_BPS, MODULE_CORE_SEED, MODULE_SEED};
use crate::error::ModuleError;
use crate::events::ModuleInitialized;
use crate::state::{ModuleCoreState, ModuleState};

#[derive(Accounts)]
pub struct InitializeModule<'info> {
    #[account(
        seeds = [MODULE_CORE_SEED],
        bump = module_core_state.bump,
        has_one = config_authority @ ModuleError::Unauthorized,
    )]
    pub module_core_state: Account<'info, ModuleCoreState>,

    pub config_authority: Signer<'info>,

    pub peg_mint: Box<InterfaceAccount<'info, Mint>>,

    pub backing_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = payer,
        space = ModuleState::LEN,
        seeds = [MODULE_SEED, peg_mint.key().as_ref(), backing_mint.key().as_ref()],
        bump
    )]
    pub module: Account<'info, ModuleState>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeModule>,
    lv_fee: u16,
    lv_amm_wa_deposit_threshold: u64,
    lv_amm_ct_deposit_threshold: u64,
) -> Result<()> {
    require!(
        lv_fee <= MAX_EARLY_REDEMPTION_FEE_BPS,
        ModuleError::InvalidFees
    );

    let module = &mut ctx.accounts.module;
    module.peg_asset = ctx.accounts.peg_mint.key();
    module.backing_asset = ctx.accounts.backing_mint.key();
    module.lv_fee = lv_fee;
    module.lv_amm_wa_deposit_threshold = lv_amm_wa_deposit_threshold;
    module.lv_amm_ct_deposit_threshold = lv_amm_ct_deposit_threshold;
    module.series_count = 0;
    module.current_series = None;
    module.repurchase_fee_rate = 0;
    module.early_redemption_fee_rate = lv_fee;
    module.bump = ctx.bumps.module;

    emit!(ModuleInitialized {
        module: module.key(),
        peg_asset: module.peg_asset,
        backing_asset: module.backing_asset,
        lv_fee,
    });

    msg!("Module initialized!");
    msg!("Module: {}", module.key());
    msg!("Peg asset: {}", module.peg_asset);
    msg!("Backing asset: {}", module.backing_asset);

    Ok(())
}
