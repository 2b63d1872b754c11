use anchor_lang::prelude::*;

use crate::constants::{MAX_PAGE_SIZE, REGISTRY_SEED};
use crate::error::FactoryError;
use crate::state::{AssetRegistry, DeployedPage};

#[derive(Accounts)]
#[instruction(backing_asset: Pubkey)]
pub struct GetDeployedPairs<'info> {
    /// CHECK: Registry PDA for `backing_asset`, may not exist yet
    #[account(
        seeds = [REGISTRY_SEED, backing_asset.as_ref()],
        bump
    )]
    pub registry: UncheckedAccount<'info>,
}

/// Return one page of instrument pairs deployed for `backing_asset`.
///
/// Pages are returned through transaction return data, which is capped at
/// 1024 bytes, so `page_size` above `MAX_PAGE_SIZE` (15) fails with
/// `PageSizeTooLarge`. Off-chain callers that want arbitrary page sizes can
/// fetch the registry account, deserialize it as `AssetRegistry` and call
/// `AssetRegistry::deployed_pairs`, which accepts any page size.
///
/// Only the slots inside the requested window are decoded.
pub fn handler(
    ctx: Context<GetDeployedPairs>,
    backing_asset: Pubkey,
    page_index: u32,
    page_size: u32,
) -> Result<DeployedPage> {
    require!(page_size <= MAX_PAGE_SIZE, FactoryError::PageSizeTooLarge);

    let registry_info = ctx.accounts.registry.to_account_info();
    if registry_info.data_is_empty() {
        msg!("No registry for backing asset {}", backing_asset);
        return Ok(DeployedPage::empty(page_size as usize));
    }

    require_keys_eq!(*registry_info.owner, crate::ID, FactoryError::InvalidRegistry);
    let data = registry_info.try_borrow_data()?;
    msg!(
        "Page {} of size {} over {} records",
        page_index,
        page_size,
        AssetRegistry::header(&data)?.len
    );

    AssetRegistry::page(&data, page_index, page_size)
}
