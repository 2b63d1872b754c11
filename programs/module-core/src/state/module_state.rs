use anchor_lang::prelude::*;

use crate::constants::{MAX_EARLY_REDEMPTION_FEE_BPS, MAX_REPURCHASE_FEE_BPS};
use crate::error::ModuleError;

/// A single issuance epoch.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Series {
    pub id: u32,
    pub expiry: i64,
    pub exchange_rate: u64,
    pub cap: u64,
}

impl Series {
    pub const LEN: usize = 4 + // id
        8 + // expiry
        8 + // exchange_rate
        8; // cap
}

/// Operational state for one (peg, backing) pair. Its address is the series
/// identifier the config hub uses when updating fees.
#[account]
pub struct ModuleState {
    pub peg_asset: Pubkey,
    pub backing_asset: Pubkey,
    pub lv_fee: u16,
    pub lv_amm_wa_deposit_threshold: u64,
    pub lv_amm_ct_deposit_threshold: u64,
    /// Number of series issued so far, also the id of the current one
    pub series_count: u32,
    pub current_series: Option<Series>,
    pub repurchase_fee_rate: u16,
    pub early_redemption_fee_rate: u16,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl ModuleState {
    pub const LEN: usize = 8 + // discriminator
        32 + // peg_asset
        32 + // backing_asset
        2 + // lv_fee
        8 + // lv_amm_wa_deposit_threshold
        8 + // lv_amm_ct_deposit_threshold
        4 + // series_count
        1 + Series::LEN + // current_series
        2 + // repurchase_fee_rate
        2 + // early_redemption_fee_rate
        1; // bump

    pub fn issue_series(&mut self, expiry: i64, exchange_rate: u64, cap: u64) -> Result<Series> {
        require!(exchange_rate > 0, ModuleError::InvalidExchangeRate);

        let id = self
            .series_count
            .checked_add(1)
            .ok_or(ModuleError::MathOverflow)?;
        let series = Series {
            id,
            expiry,
            exchange_rate,
            cap,
        };

        self.series_count = id;
        self.current_series = Some(series);
        Ok(series)
    }

    pub fn set_repurchase_fee_rate(&mut self, rate: u16) -> Result<()> {
        require!(rate <= MAX_REPURCHASE_FEE_BPS, ModuleError::InvalidFees);
        self.repurchase_fee_rate = rate;
        Ok(())
    }

    pub fn set_early_redemption_fee_rate(&mut self, rate: u16) -> Result<()> {
        require!(rate <= MAX_EARLY_REDEMPTION_FEE_BPS, ModuleError::InvalidFees);
        self.early_redemption_fee_rate = rate;
        Ok(())
    }
}
