pub const FACTORY_SEED: &[u8] = b"factory";
pub const PAIR_SEED: &[u8] = b"pair";
pub const REGISTRY_SEED: &[u8] = b"registry";
pub const INSTRUMENT_A_SEED: &[u8] = b"instrument_a";
pub const INSTRUMENT_B_SEED: &[u8] = b"instrument_b";
pub const DEPLOYED_SEED: &[u8] = b"deployed";

/// Largest page that still fits the 1024 byte return data limit
/// (two vectors of 32 byte keys plus their length prefixes).
pub const MAX_PAGE_SIZE: u32 = 15;
