use anchor_lang::prelude::*;

use crate::constants::CONFIG_SEED;
use crate::state::ProtocolConfig;

/// Fee updates are Manager-gated but stay available while paused.
#[derive(Accounts)]
pub struct UpdateFeeRate<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Account<'info, ProtocolConfig>,

    pub manager: Signer<'info>,

    /// CHECK: Compared against the configured module core in the handler
    pub module_program: UncheckedAccount<'info>,

    /// CHECK: Validated by the module program
    pub module_core_state: UncheckedAccount<'info>,

    /// CHECK: Module state identifying the series, validated by the module program
    #[account(mut)]
    pub module: UncheckedAccount<'info>,
}

impl<'info> UpdateFeeRate<'info> {
    fn authorize(&self) -> Result<()> {
        self.config.require_manager(&self.manager.key())?;
        self.config.require_module(&self.module_program.key())
    }

    fn module_accounts(&self) -> module_core::cpi::accounts::UpdateFeeRate<'info> {
        module_core::cpi::accounts::UpdateFeeRate {
            module_core_state: self.module_core_state.to_account_info(),
            config_authority: self.config.to_account_info(),
            module: self.module.to_account_info(),
        }
    }
}

pub fn repurchase_handler(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
    ctx.accounts.authorize()?;

    let config_seeds = &[CONFIG_SEED, &[ctx.accounts.config.bump]];
    let signer_seeds = &[&config_seeds[..]];
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.module_program.to_account_info(),
        ctx.accounts.module_accounts(),
        signer_seeds,
    );
    module_core::cpi::update_repurchase_fee_rate(cpi_ctx, rate)?;

    msg!("Repurchase fee rate update forwarded: {} bps", rate);

    Ok(())
}

pub fn early_redemption_handler(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
    ctx.accounts.authorize()?;

    let config_seeds = &[CONFIG_SEED, &[ctx.accounts.config.bump]];
    let signer_seeds = &[&config_seeds[..]];
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.module_program.to_account_info(),
        ctx.accounts.module_accounts(),
        signer_seeds,
    );
    module_core::cpi::update_early_redemption_fee_rate(cpi_ctx, rate)?;

    msg!("Early redemption fee rate update forwarded: {} bps", rate);

    Ok(())
}
