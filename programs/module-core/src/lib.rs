#![allow(unexpected_cfgs)]

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("BxWQJToEbetqiSgnX3D1sTojmq2bP7xvUmgtjzEg1DH6");

#[program]
pub mod module_core {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, config_authority: Pubkey) -> Result<()> {
        initialize::handler(ctx, config_authority)
    }

    pub fn initialize_module(
        ctx: Context<InitializeModule>,
        lv_fee: u16,
        lv_amm_wa_deposit_threshold: u64,
        lv_amm_ct_deposit_threshold: u64,
    ) -> Result<()> {
        initialize_module::handler(
            ctx,
            lv_fee,
            lv_amm_wa_deposit_threshold,
            lv_amm_ct_deposit_threshold,
        )
    }

    pub fn issue_new_series(
        ctx: Context<IssueNewSeries>,
        expiry: i64,
        exchange_rate: u64,
        cap: u64,
    ) -> Result<()> {
        issue_new_series::handler(ctx, expiry, exchange_rate, cap)
    }

    pub fn update_repurchase_fee_rate(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
        update_fee_rate::repurchase_handler(ctx, rate)
    }

    pub fn update_early_redemption_fee_rate(ctx: Context<UpdateFeeRate>, rate: u16) -> Result<()> {
        update_fee_rate::early_redemption_handler(ctx, rate)
    }
}
