use anchor_lang::prelude::*;

#[error_code]
pub enum ModuleError {
    #[msg("Signer is not the configured config authority")]
    Unauthorized,
    #[msg("Fee rate exceeds the allowed maximum")]
    InvalidFees,
    #[msg("Exchange rate must be greater than zero")]
    InvalidExchangeRate,
    #[msg("Math operation overflow")]
    MathOverflow,
}
