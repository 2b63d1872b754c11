use anchor_lang::prelude::*;

#[error_code]
pub enum ConfigError {
    #[msg("Caller does not hold the Manager role")]
    CallerNotManager,
    #[msg("Caller does not hold the Admin role")]
    CallerNotAdmin,
    #[msg("Address must not be the zero address")]
    InvalidAddress,
    #[msg("Protocol is paused")]
    ContractPaused,
    #[msg("Protocol is not paused")]
    ContractNotPaused,
    #[msg("Series expiry must be in the future")]
    InvalidExpiry,
    #[msg("Module program does not match the configured module core")]
    InvalidModule,
    #[msg("No room left in the role table")]
    RoleTableFull,
}
