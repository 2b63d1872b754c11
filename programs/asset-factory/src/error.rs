use anchor_lang::prelude::*;

#[error_code]
pub enum FactoryError {
    #[msg("Only the factory owner can perform this action")]
    CallerNotOwner,
    #[msg("Backing/peg pair has not been registered")]
    UnrecognizedPair,
    #[msg("Requested page size exceeds the maximum")]
    PageSizeTooLarge,
    #[msg("Registry account is missing or belongs to another backing asset")]
    InvalidRegistry,
    #[msg("Math operation overflow")]
    MathOverflow,
}
