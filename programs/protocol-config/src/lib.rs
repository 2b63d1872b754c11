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

declare_id!("E7qS4eKqX2PFk49yrwr4VN6dyqFuqoNcxVVvQGgdq2Px");

#[program]
pub mod protocol_config {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        initialize::handler(ctx)
    }

    pub fn grant_manager(ctx: Context<UpdateRoles>, identity: Pubkey) -> Result<()> {
        roles::grant_manager_handler(ctx, identity)
    }

    pub fn revoke_manager(ctx: Context<UpdateRoles>, identity: Pubkey) -> Result<()> {
        roles::revoke_manager_handler(ctx, identity)
    }

    pub fn transfer_admin(ctx: Context<TransferAdmin>, new_admin: Pubkey) -> Result<()> {
        transfer_admin::handler(ctx, new_admin)
    }

    pub fn has_role(ctx: Context<ReadConfig>, role: Role, identity: Pubkey) -> Result<bool> {
        read_config::has_role_handler(ctx, role, identity)
    }

    pub fn is_paused(ctx: Context<ReadConfig>) -> Result<bool> {
        read_config::is_paused_handler(ctx)
    }

    pub fn set_module_core(ctx: Context<ManageConfig>, module_core: Pubkey) -> Result<()> {
        set_module_core::handler(ctx, module_core)
    }

    pub fn pause(ctx: Context<ManageConfig>) -> Result<()> {
        pause::pause_handler(ctx)
    }

    pub fn unpause(ctx: Context<ManageConfig>) -> Result<()> {
        pause::unpause_handler(ctx)
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
