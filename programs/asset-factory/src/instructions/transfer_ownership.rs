use anchor_lang::prelude::*;

use crate::constants::FACTORY_SEED;
use crate::error::FactoryError;
use crate::events::OwnershipTransferred;
use crate::state::FactoryState;

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(
        mut,
        seeds = [FACTORY_SEED],
        bump = factory.bump,
        has_one = owner @ FactoryError::CallerNotOwner,
    )]
    pub factory: Account<'info, FactoryState>,

    /// Current factory owner
    pub owner: Signer<'info>,

    /// CHECK: New factory owner, any account may be handed ownership
    pub new_owner: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<TransferOwnership>) -> Result<()> {
    let factory = &mut ctx.accounts.factory;
    let previous_owner = factory.owner;

    factory.owner = ctx.accounts.new_owner.key();

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner: factory.owner,
    });

    msg!("Ownership transferred!");
    msg!("Previous owner: {}", previous_owner);
    msg!("New owner: {}", factory.owner);

    Ok(())
}
