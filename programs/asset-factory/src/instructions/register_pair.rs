use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::constants::{FACTORY_SEED, PAIR_SEED, REGISTRY_SEED};
use crate::error::FactoryError;
use crate::events::PairRegistered;
use crate::state::{AssetRegistry, FactoryState, PairRegistration};

#[derive(Accounts)]
pub struct RegisterPair<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED],
        bump = factory.bump,
        has_one = owner @ FactoryError::CallerNotOwner,
    )]
    pub factory: Account<'info, FactoryState>,

    pub owner: Signer<'info>,

    /// Backing (collateral) asset mint
    pub backing_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Peg (redemption target) asset mint
    pub peg_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = payer,
        space = PairRegistration::LEN,
        seeds = [PAIR_SEED, backing_mint.key().as_ref(), peg_mint.key().as_ref()],
        bump
    )]
    pub pair: Account<'info, PairRegistration>,

    /// CHECK: Registry PDA for the backing asset, created here on first use
    #[account(
        mut,
        seeds = [REGISTRY_SEED, backing_mint.key().as_ref()],
        bump
    )]
    pub registry: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RegisterPair>) -> Result<()> {
    let backing_asset = ctx.accounts.backing_mint.key();
    let peg_asset = ctx.accounts.peg_mint.key();

    let registry_info = ctx.accounts.registry.to_account_info();
    if registry_info.data_is_empty() {
        AssetRegistry::create(
            &registry_info,
            &ctx.accounts.payer.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
            backing_asset,
            ctx.bumps.registry,
        )?;
        msg!("Registry created for backing asset {}", backing_asset);
    }

    let pair = &mut ctx.accounts.pair;
    pair.backing_asset = backing_asset;
    pair.peg_asset = peg_asset;
    pair.registered_by = ctx.accounts.owner.key();
    pair.bump = ctx.bumps.pair;

    let factory = &mut ctx.accounts.factory;
    factory.pair_count = factory
        .pair_count
        .checked_add(1)
        .ok_or(FactoryError::MathOverflow)?;

    emit!(PairRegistered {
        backing_asset,
        peg_asset,
        pair: pair.key(),
    });

    msg!("Pair registered!");
    msg!("Backing asset: {}", backing_asset);
    msg!("Peg asset: {}", peg_asset);
    msg!("Registered pairs: {}", factory.pair_count);

    Ok(())
}
