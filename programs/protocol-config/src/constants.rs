pub const CONFIG_SEED: &[u8] = b"config";

/// Upper bound on identities holding a role, fixes the config account size
pub const MAX_ROLE_MEMBERS: usize = 16;
