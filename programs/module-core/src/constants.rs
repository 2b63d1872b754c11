use anchor_lang::prelude::*;

pub const MODULE_CORE_SEED: &[u8] = b"module_core";
pub const MODULE_SEED: &[u8] = b"module";

/// Fee rates are expressed in basis points.
pub const MAX_REPURCHASE_FEE_BPS: u16 = 500;
pub const MAX_EARLY_REDEMPTION_FEE_BPS: u16 = 1_000;

/// Program allowed to drive this module through its `[b"config"]` PDA.
pub const PROTOCOL_CONFIG_PROGRAM_ID: Pubkey =
    anchor_lang::solana_program::pubkey!("E7qS4eKqX2PFk49yrwr4VN6dyqFuqoNcxVVvQGgdq2Px");
pub const PROTOCOL_CONFIG_SEED: &[u8] = b"config";
