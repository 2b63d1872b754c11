use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenInterface};

use crate::constants::{
    DEPLOYED_SEED, FACTORY_SEED, INSTRUMENT_A_SEED, INSTRUMENT_B_SEED, PAIR_SEED, REGISTRY_SEED,
};
use crate::error::FactoryError;
use crate::events::AssetDeployed;
use crate::state::{
    AssetRegistry, DeployedInstrument, DeploymentKey, FactoryState, InstrumentKind,
};

#[derive(Accounts)]
#[instruction(expiry: i64)]
pub struct DeployInstrumentPair<'info> {
    #[account(
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

    /// CHECK: Mint authority handed to both instruments
    pub deployer: UncheckedAccount<'info>,

    /// CHECK: Pair registration PDA, must already exist
    #[account(
        seeds = [PAIR_SEED, backing_mint.key().as_ref(), peg_mint.key().as_ref()],
        bump
    )]
    pub pair: UncheckedAccount<'info>,

    /// CHECK: Registry PDA for the backing asset, read and grown in the handler
    #[account(
        mut,
        seeds = [REGISTRY_SEED, backing_mint.key().as_ref()],
        bump
    )]
    pub registry: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = payer,
        mint::decimals = backing_mint.decimals,
        mint::authority = deployer,
        mint::token_program = token_program,
        seeds = [
            INSTRUMENT_A_SEED,
            backing_mint.key().as_ref(),
            peg_mint.key().as_ref(),
            &expiry.to_le_bytes()
        ],
        bump
    )]
    pub instrument_a: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = payer,
        mint::decimals = backing_mint.decimals,
        mint::authority = deployer,
        mint::token_program = token_program,
        seeds = [
            INSTRUMENT_B_SEED,
            backing_mint.key().as_ref(),
            peg_mint.key().as_ref(),
            &expiry.to_le_bytes()
        ],
        bump
    )]
    pub instrument_b: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = DeployedInstrument::LEN,
        seeds = [DEPLOYED_SEED, instrument_a.key().as_ref()],
        bump
    )]
    pub instrument_a_marker: Box<Account<'info, DeployedInstrument>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = DeployedInstrument::LEN,
        seeds = [DEPLOYED_SEED, instrument_b.key().as_ref()],
        bump
    )]
    pub instrument_b_marker: Box<Account<'info, DeployedInstrument>>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<DeployInstrumentPair>, expiry: i64, initial_rate: u64) -> Result<()> {
    let pair = &ctx.accounts.pair;
    require!(
        pair.owner == &crate::ID && !pair.data_is_empty(),
        FactoryError::UnrecognizedPair
    );

    let key = DeploymentKey::new(
        ctx.accounts.backing_mint.key(),
        ctx.accounts.peg_mint.key(),
        expiry,
    );
    let instrument_a = ctx.accounts.instrument_a.key();
    let instrument_b = ctx.accounts.instrument_b.key();

    let registry_info = ctx.accounts.registry.to_account_info();
    require_keys_eq!(*registry_info.owner, crate::ID, FactoryError::InvalidRegistry);
    let header = AssetRegistry::header(&registry_info.try_borrow_data()?)?;
    require_keys_eq!(
        header.backing_asset,
        key.backing_asset,
        FactoryError::InvalidRegistry
    );

    // The marker PDA is seeded by the instrument address, which is seeded by
    // the deployment key, so a populated marker means this key is recorded.
    if ctx.accounts.instrument_a_marker.is_recorded() {
        msg!("Instrument pair already deployed, nothing to do");
        msg!("Instrument A: {}", instrument_a);
        msg!("Instrument B: {}", instrument_b);
        return Ok(());
    }

    let record = key.record(
        instrument_a,
        instrument_b,
        ctx.accounts.deployer.key(),
        initial_rate,
    );
    let record_count = AssetRegistry::append(
        &registry_info,
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        &record,
    )?;

    ctx.accounts.instrument_a_marker.set_inner(DeployedInstrument {
        backing_asset: key.backing_asset,
        kind: InstrumentKind::A,
        bump: ctx.bumps.instrument_a_marker,
    });
    ctx.accounts.instrument_b_marker.set_inner(DeployedInstrument {
        backing_asset: key.backing_asset,
        kind: InstrumentKind::B,
        bump: ctx.bumps.instrument_b_marker,
    });

    emit!(AssetDeployed {
        backing_asset: key.backing_asset,
        instrument_a,
        instrument_b,
    });

    msg!("Instrument pair deployed!");
    msg!("Backing asset: {}", key.backing_asset);
    msg!("Peg asset: {}", key.peg_asset);
    msg!("Expiry: {}", expiry);
    msg!("Instrument A: {}", instrument_a);
    msg!("Instrument B: {}", instrument_b);
    msg!("Records for backing asset: {}", record_count);

    Ok(())
}
