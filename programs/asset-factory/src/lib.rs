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

declare_id!("8njfaMxuWHedPfNC4iTvdMcHs81NdZNmAFTtai6EetoT");

#[program]
pub mod asset_factory {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        initialize::handler(ctx)
    }

    pub fn transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
        transfer_ownership::handler(ctx)
    }

    pub fn register_pair(ctx: Context<RegisterPair>) -> Result<()> {
        register_pair::handler(ctx)
    }

    pub fn deploy_instrument_pair(
        ctx: Context<DeployInstrumentPair>,
        expiry: i64,
        initial_rate: u64,
    ) -> Result<()> {
        deploy_instrument_pair::handler(ctx, expiry, initial_rate)
    }

    pub fn is_deployed(ctx: Context<IsDeployed>, address: Pubkey) -> Result<bool> {
        is_deployed::handler(ctx, address)
    }

    /// Paged read capped at `MAX_PAGE_SIZE`; see `AssetRegistry::deployed_pairs`
    /// for the uncapped off-chain read.
    pub fn get_deployed_pairs(
        ctx: Context<GetDeployedPairs>,
        backing_asset: Pubkey,
        page_index: u32,
        page_size: u32,
    ) -> Result<DeployedPage> {
        get_deployed_pairs::handler(ctx, backing_asset, page_index, page_size)
    }
}
