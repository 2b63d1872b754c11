use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::state::ProtocolConfig;

#[derive(Accounts)]
pub struct InitializeModule<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ProtocolConfig>,

    pub manager: Signer<'info>,

    /// CHECK: Compared against the configured module core in the handler
    pub module_program: UncheckedAccount<'info>,

    /// CHECK: Validated by the module program
    pub module_core_state: UncheckedAccount<'info>,

    /// CHECK: Validated by the module program
    pub peg_mint: UncheckedAccount<'info>,

    /// CHECK: Validated by the module program
    pub backing_mint: UncheckedAccount<'info>,

    /// CHECK: Created by the module program
    #[account(mut)]
    pub module: UncheckedAccount<'info>,

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
    let config = &ctx.accounts.config;
    config.require_manager(&ctx.accounts.manager.key())?;
    config.require_active()?;
    config.require_module(&ctx.accounts.module_program.key())?;

    let config_seeds = &[CONFIG_SEED, &[config.bump]];
    let signer_seeds = &[&config_seeds[..]];

    let cpi_accounts = module_core::cpi::accounts::InitializeModule {
        module_core_state: ctx.accounts.module_core_state.to_account_info(),
        config_authority: config.to_account_info(),
        peg_mint: ctx.accounts.peg_mint.to_account_info(),
        backing_mint: ctx.accounts.backing_mint.to_account_info(),
        module: ctx.accounts.module.to_account_info(),
        payer: ctx.accounts.payer.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.module_program.to_account_info(),
        cpi_accounts,
        signer_seeds,
    );
    module_core::cpi::initialize_module(
        cpi_ctx,
        lv_fee,
        lv_amm_wa_deposit_threshold,
        lv_amm_ct_deposit_threshold,
    )?;

    msg!("Module initialization forwarded!");
    msg!("Peg asset: {}", ctx.accounts.peg_mint.key());
    msg!("Backing asset: {}", ctx.accounts.backing_mint.key());

    Ok(())
}
