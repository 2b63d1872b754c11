use anchor_lang::prelude::*;

use crate::constants::MAX_ROLE_MEMBERS;
use crate::error::ConfigError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Grants and revokes Manager. Does not imply Manager.
    Admin,
    /// Operational role for every parameter mutation.
    Manager,
}

impl Role {
    pub fn bit(&self) -> u8 {
        match self {
            Role::Admin => 1 << 0,
            Role::Manager => 1 << 1,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RoleAssignment {
    pub identity: Pubkey,
    /// Bit set of `Role::bit` values
    pub roles: u8,
}

impl RoleAssignment {
    pub const LEN: usize = 32 + // identity
        1; // roles

    pub fn holds(&self, role: Role) -> bool {
        self.roles & role.bit() != 0
    }
}

#[account]
pub struct ProtocolConfig {
    /// Execution module program administered through this config
    pub module_core: Pubkey,
    /// Global pause switch for the pause-gated entry points
    pub paused: bool,
    /// Identities holding at least one role
    pub members: Vec<RoleAssignment>,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl ProtocolConfig {
    pub const LEN: usize = 8 + // discriminator
        32 + // module_core
        1 + // paused
        4 + MAX_ROLE_MEMBERS * RoleAssignment::LEN + // members
        1; // bump

    pub fn new(admin: Pubkey, bump: u8) -> Self {
        Self {
            module_core: Pubkey::default(),
            paused: false,
            members: vec![RoleAssignment {
                identity: admin,
                roles: Role::Admin.bit(),
            }],
            bump,
        }
    }

    pub fn has_role(&self, role: Role, identity: &Pubkey) -> bool {
        self.members
            .iter()
            .any(|m| m.identity == *identity && m.holds(role))
    }

    pub fn require_admin(&self, caller: &Pubkey) -> Result<()> {
        require!(self.has_role(Role::Admin, caller), ConfigError::CallerNotAdmin);
        Ok(())
    }

    pub fn require_manager(&self, caller: &Pubkey) -> Result<()> {
        require!(
            self.has_role(Role::Manager, caller),
            ConfigError::CallerNotManager
        );
        Ok(())
    }

    pub fn require_active(&self) -> Result<()> {
        require!(!self.paused, ConfigError::ContractPaused);
        Ok(())
    }

    /// The module program passed to a forwarding call must be the stored one.
    pub fn require_module(&self, module_program: &Pubkey) -> Result<()> {
        require!(
            self.module_core != Pubkey::default() && self.module_core == *module_program,
            ConfigError::InvalidModule
        );
        Ok(())
    }

    /// Returns whether anything changed; granting a held role is a no-op.
    pub fn grant_role(&mut self, role: Role, identity: Pubkey) -> Result<bool> {
        require_keys_neq!(identity, Pubkey::default(), ConfigError::InvalidAddress);

        if let Some(member) = self.members.iter_mut().find(|m| m.identity == identity) {
            if member.holds(role) {
                return Ok(false);
            }
            member.roles |= role.bit();
            return Ok(true);
        }

        require!(
            self.members.len() < MAX_ROLE_MEMBERS,
            ConfigError::RoleTableFull
        );
        self.members.push(RoleAssignment {
            identity,
            roles: role.bit(),
        });
        Ok(true)
    }

    /// Returns whether anything changed. Identities left without roles are dropped.
    pub fn revoke_role(&mut self, role: Role, identity: &Pubkey) -> bool {
        let Some(member) = self
            .members
            .iter_mut()
            .find(|m| m.identity == *identity && m.holds(role))
        else {
            return false;
        };

        member.roles &= !role.bit();
        self.members.retain(|m| m.roles != 0);
        true
    }

    /// Hand Admin from `from` to `to`. The grant happens first so a full role
    /// table leaves everything untouched.
    pub fn transfer_admin(&mut self, from: &Pubkey, to: Pubkey) -> Result<()> {
        self.require_admin(from)?;
        self.grant_role(Role::Admin, to)?;
        if *from != to {
            self.revoke_role(Role::Admin, from);
        }
        Ok(())
    }

    pub fn set_module_core(&mut self, module_core: Pubkey) -> Result<()> {
        require_keys_neq!(module_core, Pubkey::default(), ConfigError::InvalidAddress);
        self.module_core = module_core;
        Ok(())
    }

    /// Pausing twice fails rather than silently succeeding.
    pub fn pause(&mut self) -> Result<()> {
        self.require_active()?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<()> {
        require!(self.paused, ConfigError::ContractNotPaused);
        self.paused = false;
        Ok(())
    }
}

/// A new series must expire strictly after `now`.
pub fn validate_expiry(expiry: i64, now: i64) -> Result<()> {
    require!(expiry > now, ConfigError::InvalidExpiry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_manager() -> (ProtocolConfig, Pubkey, Pubkey) {
        let admin = Pubkey::new_unique();
        let manager = Pubkey::new_unique();
        let mut config = ProtocolConfig::new(admin, 255);
        config.grant_role(Role::Manager, manager).unwrap();
        (config, admin, manager)
    }

    fn snapshot(config: &ProtocolConfig) -> Vec<u8> {
        let mut bytes = Vec::new();
        config.try_serialize(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn initializer_is_admin_but_not_manager() {
        let admin = Pubkey::new_unique();
        let config = ProtocolConfig::new(admin, 255);

        assert!(config.has_role(Role::Admin, &admin));
        assert!(!config.has_role(Role::Manager, &admin));
        assert!(!config.paused);
        assert_eq!(config.module_core, Pubkey::default());
    }

    #[test]
    fn admin_is_not_implicitly_manager() {
        let (config, admin, _) = config_with_manager();

        let err = config.require_manager(&admin).unwrap_err();

        assert_eq!(err, ConfigError::CallerNotManager.into());
    }

    #[test]
    fn manager_is_not_admin() {
        let (config, _, manager) = config_with_manager();

        let err = config.require_admin(&manager).unwrap_err();

        assert_eq!(err, ConfigError::CallerNotAdmin.into());
    }

    #[test]
    fn grant_and_revoke_manager() {
        let (mut config, admin, manager) = config_with_manager();
        assert!(config.has_role(Role::Manager, &manager));

        assert!(!config.grant_role(Role::Manager, manager).unwrap());
        assert!(config.revoke_role(Role::Manager, &manager));
        assert!(!config.has_role(Role::Manager, &manager));
        assert!(!config.revoke_role(Role::Manager, &manager));

        assert_eq!(config.members.len(), 1);
        assert!(config.has_role(Role::Admin, &admin));
    }

    #[test]
    fn admin_can_also_hold_manager() {
        let (mut config, admin, _) = config_with_manager();

        assert!(config.grant_role(Role::Manager, admin).unwrap());
        assert!(config.has_role(Role::Manager, &admin));
        assert!(config.has_role(Role::Admin, &admin));

        config.revoke_role(Role::Manager, &admin);
        assert!(config.has_role(Role::Admin, &admin));
    }

    #[test]
    fn role_table_is_bounded() {
        let mut config = ProtocolConfig::new(Pubkey::new_unique(), 255);
        for _ in 1..MAX_ROLE_MEMBERS {
            config.grant_role(Role::Manager, Pubkey::new_unique()).unwrap();
        }
        let before = snapshot(&config);

        let err = config
            .grant_role(Role::Manager, Pubkey::new_unique())
            .unwrap_err();

        assert_eq!(err, ConfigError::RoleTableFull.into());
        assert_eq!(snapshot(&config), before);
    }

    #[test]
    fn full_table_fits_account_space() {
        let mut config = ProtocolConfig::new(Pubkey::new_unique(), 255);
        config.set_module_core(Pubkey::new_unique()).unwrap();
        for _ in 1..MAX_ROLE_MEMBERS {
            config.grant_role(Role::Manager, Pubkey::new_unique()).unwrap();
        }

        assert_eq!(snapshot(&config).len(), ProtocolConfig::LEN);
    }

    #[test]
    fn zero_address_cannot_hold_roles() {
        let (mut config, _, _) = config_with_manager();
        let before = snapshot(&config);

        let err = config
            .grant_role(Role::Manager, Pubkey::default())
            .unwrap_err();

        assert_eq!(err, ConfigError::InvalidAddress.into());
        assert_eq!(snapshot(&config), before);
    }

    #[test]
    fn transfer_admin_moves_the_role() {
        let (mut config, admin, manager) = config_with_manager();
        let next = Pubkey::new_unique();

        config.transfer_admin(&admin, next).unwrap();

        assert!(config.has_role(Role::Admin, &next));
        assert!(!config.has_role(Role::Admin, &admin));
        assert!(config.has_role(Role::Manager, &manager));
    }

    #[test]
    fn transfer_admin_requires_admin() {
        let (mut config, _, manager) = config_with_manager();
        let before = snapshot(&config);

        let err = config
            .transfer_admin(&manager, Pubkey::new_unique())
            .unwrap_err();

        assert_eq!(err, ConfigError::CallerNotAdmin.into());
        assert_eq!(snapshot(&config), before);
    }

    #[test]
    fn transfer_admin_to_self_keeps_admin() {
        let (mut config, admin, _) = config_with_manager();

        config.transfer_admin(&admin, admin).unwrap();

        assert!(config.has_role(Role::Admin, &admin));
    }

    #[test]
    fn zero_module_core_is_rejected() {
        let (mut config, _, _) = config_with_manager();
        let module = Pubkey::new_unique();
        config.set_module_core(module).unwrap();

        let err = config.set_module_core(Pubkey::default()).unwrap_err();

        assert_eq!(err, ConfigError::InvalidAddress.into());
        assert_eq!(config.module_core, module);
    }

    #[test]
    fn unset_or_mismatched_module_is_rejected() {
        let (mut config, _, _) = config_with_manager();
        let module = Pubkey::new_unique();

        assert_eq!(
            config.require_module(&Pubkey::default()).unwrap_err(),
            ConfigError::InvalidModule.into()
        );

        config.set_module_core(module).unwrap();
        assert!(config.require_module(&module).is_ok());
        assert_eq!(
            config.require_module(&Pubkey::new_unique()).unwrap_err(),
            ConfigError::InvalidModule.into()
        );
    }

    #[test]
    fn pause_state_machine() {
        let (mut config, _, _) = config_with_manager();
        assert!(config.require_active().is_ok());

        config.pause().unwrap();
        assert!(config.paused);
        assert_eq!(
            config.require_active().unwrap_err(),
            ConfigError::ContractPaused.into()
        );

        config.unpause().unwrap();
        assert!(!config.paused);
        assert!(config.require_active().is_ok());
    }

    #[test]
    fn pausing_twice_fails_and_stays_paused() {
        let (mut config, _, _) = config_with_manager();
        config.pause().unwrap();

        let err = config.pause().unwrap_err();

        assert_eq!(err, ConfigError::ContractPaused.into());
        assert!(config.paused);
    }

    #[test]
    fn unpausing_while_active_fails() {
        let (mut config, _, _) = config_with_manager();

        let err = config.unpause().unwrap_err();

        assert_eq!(err, ConfigError::ContractNotPaused.into());
        assert!(!config.paused);
    }

    #[test]
    fn expiry_must_be_in_the_future() {
        assert!(validate_expiry(1_001, 1_000).is_ok());
        assert_eq!(
            validate_expiry(1_000, 1_000).unwrap_err(),
            ConfigError::InvalidExpiry.into()
        );
        assert_eq!(
            validate_expiry(0, 1_000).unwrap_err(),
            ConfigError::InvalidExpiry.into()
        );
    }
}
