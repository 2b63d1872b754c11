use anchor_lang::prelude::*;

use crate::constants::{INSTRUMENT_A_SEED, INSTRUMENT_B_SEED};

use super::InstrumentPairRecord;

/// Which side of an instrument pair a mint represents.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrumentKind {
    A,
    B,
}

impl InstrumentKind {
    pub fn seed(&self) -> &'static [u8] {
        match self {
            InstrumentKind::A => INSTRUMENT_A_SEED,
            InstrumentKind::B => INSTRUMENT_B_SEED,
        }
    }
}

/// The tuple that fixes where an instrument pair lives. The same key always
/// derives the same pair of addresses, so a second deployment attempt lands
/// on accounts that already exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeploymentKey {
    pub backing_asset: Pubkey,
    pub peg_asset: Pubkey,
    pub expiry: i64,
}

impl DeploymentKey {
    pub fn new(backing_asset: Pubkey, peg_asset: Pubkey, expiry: i64) -> Self {
        Self {
            backing_asset,
            peg_asset,
            expiry,
        }
    }

    /// Derive the instrument mint address for `kind`. Matches the seeds used by
    /// the `deploy_instrument_pair` account constraints.
    pub fn derive(&self, kind: InstrumentKind, program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                kind.seed(),
                self.backing_asset.as_ref(),
                self.peg_asset.as_ref(),
                &self.expiry.to_le_bytes(),
            ],
            program_id,
        )
    }

    pub fn record(
        &self,
        instrument_a: Pubkey,
        instrument_b: Pubkey,
        deployer: Pubkey,
        initial_rate: u64,
    ) -> InstrumentPairRecord {
        InstrumentPairRecord {
            backing_asset: self.backing_asset,
            peg_asset: self.peg_asset,
            expiry: self.expiry,
            instrument_a,
            instrument_b,
            deployer,
            initial_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_derives_same_address() {
        let key = DeploymentKey::new(Pubkey::new_unique(), Pubkey::new_unique(), 1_700_000_000);
        let again = DeploymentKey::new(key.backing_asset, key.peg_asset, key.expiry);

        assert_eq!(
            key.derive(InstrumentKind::A, &crate::ID),
            again.derive(InstrumentKind::A, &crate::ID)
        );
        assert_eq!(
            key.derive(InstrumentKind::B, &crate::ID),
            again.derive(InstrumentKind::B, &crate::ID)
        );
    }

    #[test]
    fn kinds_and_expiries_do_not_collide() {
        let backing = Pubkey::new_unique();
        let peg = Pubkey::new_unique();
        let first = DeploymentKey::new(backing, peg, 1_000);
        let second = DeploymentKey::new(backing, peg, 1_001);

        let (a1, _) = first.derive(InstrumentKind::A, &crate::ID);
        let (b1, _) = first.derive(InstrumentKind::B, &crate::ID);
        let (a2, _) = second.derive(InstrumentKind::A, &crate::ID);

        assert_ne!(a1, b1);
        assert_ne!(a1, a2);
    }

    #[test]
    fn swapping_backing_and_peg_changes_address() {
        let x = Pubkey::new_unique();
        let y = Pubkey::new_unique();

        let (forward, _) = DeploymentKey::new(x, y, 42).derive(InstrumentKind::A, &crate::ID);
        let (reverse, _) = DeploymentKey::new(y, x, 42).derive(InstrumentKind::A, &crate::ID);

        assert_ne!(forward, reverse);
    }

    #[test]
    fn record_carries_key_fields() {
        let key = DeploymentKey::new(Pubkey::new_unique(), Pubkey::new_unique(), 99);
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let deployer = Pubkey::new_unique();

        let record = key.record(a, b, deployer, 1_000_000_000);

        assert_eq!(record.backing_asset, key.backing_asset);
        assert_eq!(record.peg_asset, key.peg_asset);
        assert_eq!(record.expiry, 99);
        assert_eq!(record.instrument_a, a);
        assert_eq!(record.instrument_b, b);
        assert_eq!(record.deployer, deployer);
        assert_eq!(record.initial_rate, 1_000_000_000);
    }
}
