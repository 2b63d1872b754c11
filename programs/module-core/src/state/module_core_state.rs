use anchor_lang::prelude::*;

use crate::constants::{PROTOCOL_CONFIG_PROGRAM_ID, PROTOCOL_CONFIG_SEED};
use crate::error::ModuleError;

#[account]
pub struct ModuleCoreState {
    /// The only signer allowed to change module state (the config hub's PDA)
    pub config_authority: Pubkey,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl ModuleCoreState {
    pub const LEN: usize = 8 + // discriminator
        32 + // config_authority
        1; // bump

    /// The protocol config PDA, the only authority `initialize` accepts.
    pub fn expected_config_authority() -> Pubkey {
        Pubkey::find_program_address(&[PROTOCOL_CONFIG_SEED], &PROTOCOL_CONFIG_PROGRAM_ID).0
    }

    pub fn require_config_authority(config_authority: &Pubkey) -> Result<()> {
        require_keys_eq!(
            *config_authority,
            Self::expected_config_authority(),
            ModuleError::Unauthorized
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_pda_is_accepted() {
        let (config, _) =
            Pubkey::find_program_address(&[b"config"], &PROTOCOL_CONFIG_PROGRAM_ID);

        assert!(ModuleCoreState::require_config_authority(&config).is_ok());
    }

    #[test]
    fn any_other_authority_is_rejected() {
        for authority in [
            Pubkey::new_unique(),
            Pubkey::default(),
            PROTOCOL_CONFIG_PROGRAM_ID,
            Pubkey::find_program_address(&[b"config"], &crate::ID).0,
        ] {
            assert_eq!(
                ModuleCoreState::require_config_authority(&authority).unwrap_err(),
                ModuleError::Unauthorized.into()
            );
        }
    }
}
