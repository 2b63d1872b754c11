use anchor_lang::prelude::*;

#[event]
pub struct ModuleInitialized {
    pub module: Pubkey,
    pub peg_asset: Pubkey,
    pub backing_asset: Pubkey,
    pub lv_fee: u16,
}

#[event]
pub struct SeriesIssued {
    pub module: Pubkey,
    pub series_id: u32,
    pub expiry: i64,
    pub exchange_rate: u64,
    pub cap: u64,
}

#[event]
pub struct RepurchaseFeeRateUpdated {
    pub module: Pubkey,
    pub rate: u16,
}

#[event]
pub struct EarlyRedemptionFeeRateUpdated {
    pub module: Pubkey,
    pub rate: u16,
}
