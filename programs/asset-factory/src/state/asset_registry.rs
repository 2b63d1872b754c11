use std::ops::Range;

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_lang::Discriminator;

use crate::constants::REGISTRY_SEED;
use crate::error::FactoryError;

/// One deployed instrument pair. Written once, never mutated.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InstrumentPairRecord {
    pub backing_asset: Pubkey,
    pub peg_asset: Pubkey,
    /// Unix timestamp after which the pair is no longer issuable
    pub expiry: i64,
    pub instrument_a: Pubkey,
    pub instrument_b: Pubkey,
    /// Mint authority of both instruments
    pub deployer: Pubkey,
    /// Exchange rate recorded at deployment
    pub initial_rate: u64,
}

impl InstrumentPairRecord {
    pub const LEN: usize = 32 + // backing_asset
        32 + // peg_asset
        8 + // expiry
        32 + // instrument_a
        32 + // instrument_b
        32 + // deployer
        8; // initial_rate
}

/// A window of the registry. Both vectors always have the requested length;
/// slots past the end of the registry hold `Pubkey::default()`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DeployedPage {
    pub instrument_a: Vec<Pubkey>,
    pub instrument_b: Vec<Pubkey>,
}

impl DeployedPage {
    pub fn empty(page_size: usize) -> Self {
        Self {
            instrument_a: vec![Pubkey::default(); page_size],
            instrument_b: vec![Pubkey::default(); page_size],
        }
    }
}

/// Fixed-size prefix of the registry account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryHeader {
    pub backing_asset: Pubkey,
    pub bump: u8,
    /// Number of records stored after the header
    pub len: u32,
}

/// Append-only list of instrument pairs for one backing asset, in deployment
/// order.
///
/// The account layout is the borsh encoding of this struct, so record `i`
/// always sits at `BASE_LEN + i * InstrumentPairRecord::LEN`. On-chain code
/// never deserializes the whole list: it reads the header, decodes single
/// record slots, and appends by writing the next slot and bumping the length
/// prefix. Off-chain readers can deserialize the account whole and use
/// [`AssetRegistry::deployed_pairs`].
#[account]
pub struct AssetRegistry {
    pub backing_asset: Pubkey,
    /// Bump seed for PDA derivation
    pub bump: u8,
    pub records: Vec<InstrumentPairRecord>,
}

impl AssetRegistry {
    const BACKING_OFFSET: usize = 8;
    const BUMP_OFFSET: usize = Self::BACKING_OFFSET + 32;
    const LEN_OFFSET: usize = Self::BUMP_OFFSET + 1;

    pub const BASE_LEN: usize = 8 + // discriminator
        32 + // backing_asset
        1 + // bump
        4; // records length prefix

    pub fn space_for(records: usize) -> usize {
        Self::BASE_LEN + records * InstrumentPairRecord::LEN
    }

    pub fn new(backing_asset: Pubkey, bump: u8) -> Self {
        Self {
            backing_asset,
            bump,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records `[page_index * page_size, page_index * page_size + page_size)`,
    /// back-filled with the sentinel address. Never fails, for any page size.
    pub fn deployed_pairs(&self, page_index: u32, page_size: u32) -> DeployedPage {
        let mut page = DeployedPage::empty(page_size as usize);

        let window = page_window(self.records.len(), page_index, page_size);
        for (slot, record) in self.records[window].iter().enumerate() {
            page.instrument_a[slot] = record.instrument_a;
            page.instrument_b[slot] = record.instrument_b;
        }

        page
    }

    /// Parse and validate the header of raw registry account data.
    pub fn header(data: &[u8]) -> Result<RegistryHeader> {
        require!(
            data.len() >= Self::BASE_LEN && data.starts_with(Self::DISCRIMINATOR),
            FactoryError::InvalidRegistry
        );

        let mut backing_asset = [0u8; 32];
        backing_asset.copy_from_slice(&data[Self::BACKING_OFFSET..Self::BUMP_OFFSET]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&data[Self::LEN_OFFSET..Self::BASE_LEN]);

        let header = RegistryHeader {
            backing_asset: Pubkey::new_from_array(backing_asset),
            bump: data[Self::BUMP_OFFSET],
            len: u32::from_le_bytes(len),
        };
        require!(
            data.len() >= Self::space_for(header.len as usize),
            FactoryError::InvalidRegistry
        );

        Ok(header)
    }

    /// Decode the record in slot `index` of raw registry account data.
    pub fn read_record(data: &[u8], index: usize) -> Result<InstrumentPairRecord> {
        let offset = Self::space_for(index);
        let slot = data
            .get(offset..offset + InstrumentPairRecord::LEN)
            .ok_or(FactoryError::InvalidRegistry)?;

        InstrumentPairRecord::deserialize(&mut &slot[..])
            .map_err(|_| anchor_lang::error::ErrorCode::AccountDidNotDeserialize.into())
    }

    /// Same window as [`AssetRegistry::deployed_pairs`], decoding only the
    /// slots inside it.
    pub fn page(data: &[u8], page_index: u32, page_size: u32) -> Result<DeployedPage> {
        let header = Self::header(data)?;
        let mut page = DeployedPage::empty(page_size as usize);

        let window = page_window(header.len as usize, page_index, page_size);
        for (slot, index) in window.enumerate() {
            let record = Self::read_record(data, index)?;
            page.instrument_a[slot] = record.instrument_a;
            page.instrument_b[slot] = record.instrument_b;
        }

        Ok(page)
    }

    /// Write `record` into slot `index` and set the length prefix to
    /// `index + 1`. The buffer must already be large enough.
    pub fn write_record(
        data: &mut [u8],
        index: usize,
        record: &InstrumentPairRecord,
    ) -> Result<()> {
        let offset = Self::space_for(index);
        let len = u32::try_from(index + 1).map_err(|_| FactoryError::MathOverflow)?;
        let mut slot = data
            .get_mut(offset..offset + InstrumentPairRecord::LEN)
            .ok_or(FactoryError::InvalidRegistry)?;

        record
            .serialize(&mut slot)
            .map_err(|_| anchor_lang::error::ErrorCode::AccountDidNotSerialize)?;
        data[Self::LEN_OFFSET..Self::BASE_LEN].copy_from_slice(&len.to_le_bytes());

        Ok(())
    }

    /// Create the empty registry PDA for `backing_asset`.
    pub fn create<'info>(
        info: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system: &AccountInfo<'info>,
        backing_asset: Pubkey,
        bump: u8,
    ) -> Result<()> {
        let space = Self::space_for(0);
        let lamports = Rent::get()?.minimum_balance(space);

        let bump_seed = [bump];
        let registry_seeds = &[REGISTRY_SEED, backing_asset.as_ref(), &bump_seed];
        let signer_seeds = &[&registry_seeds[..]];

        let create_accounts = system_program::CreateAccount {
            from: payer.clone(),
            to: info.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(system.clone(), create_accounts, signer_seeds);
        system_program::create_account(cpi_ctx, lamports, space as u64, &crate::ID)?;

        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        Self::new(backing_asset, bump).try_serialize(&mut writer)
    }

    /// Append `record` to the registry stored in `info`, growing the account
    /// by one slot and topping up rent first. Returns the new record count.
    #[allow(deprecated)]
    pub fn append<'info>(
        info: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system: &AccountInfo<'info>,
        record: &InstrumentPairRecord,
    ) -> Result<usize> {
        let index = Self::header(&info.try_borrow_data()?)?.len as usize;
        let required = Self::space_for(index + 1);

        if info.data_len() < required {
            let rent_due = Rent::get()?
                .minimum_balance(required)
                .saturating_sub(info.lamports());

            if rent_due > 0 {
                let transfer_accounts = system_program::Transfer {
                    from: payer.clone(),
                    to: info.clone(),
                };
                let cpi_ctx = CpiContext::new(system.clone(), transfer_accounts);
                system_program::transfer(cpi_ctx, rent_due)?;
            }

            info.realloc(required, false)?;
        }

        Self::write_record(&mut info.try_borrow_mut_data()?, index, record)?;
        Ok(index + 1)
    }
}

/// Indices of the records covered by a page, clamped to `count`.
fn page_window(count: usize, page_index: u32, page_size: u32) -> Range<usize> {
    let size = page_size as usize;
    let start = (page_index as usize).saturating_mul(size).min(count);
    let end = start.saturating_add(size).min(count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_PAGE_SIZE;
    use crate::state::{DeploymentKey, InstrumentKind};
    use proptest::prelude::*;

    fn record_for(backing: Pubkey, peg: Pubkey, expiry: i64) -> InstrumentPairRecord {
        let key = DeploymentKey::new(backing, peg, expiry);
        let (a, _) = key.derive(InstrumentKind::A, &crate::ID);
        let (b, _) = key.derive(InstrumentKind::B, &crate::ID);
        key.record(a, b, Pubkey::new_unique(), 1_000_000_000)
    }

    fn empty_account(backing: Pubkey) -> Vec<u8> {
        let mut data = Vec::new();
        AssetRegistry::new(backing, 255)
            .try_serialize(&mut data)
            .unwrap();
        data
    }

    /// Raw account data grown one slot per record, the way `append` grows it.
    fn account_with(count: usize) -> (Vec<u8>, Vec<InstrumentPairRecord>) {
        let backing = Pubkey::new_unique();
        let peg = Pubkey::new_unique();
        let mut data = empty_account(backing);
        let mut records = Vec::with_capacity(count);

        for index in 0..count {
            let record = record_for(backing, peg, 1_000 + index as i64);
            data.resize(AssetRegistry::space_for(index + 1), 0);
            AssetRegistry::write_record(&mut data, index, &record).unwrap();
            records.push(record);
        }

        (data, records)
    }

    #[test]
    fn fresh_account_has_empty_header() {
        let backing = Pubkey::new_unique();
        let data = empty_account(backing);

        let header = AssetRegistry::header(&data).unwrap();

        assert_eq!(data.len(), AssetRegistry::space_for(0));
        assert_eq!(header.backing_asset, backing);
        assert_eq!(header.bump, 255);
        assert_eq!(header.len, 0);
    }

    #[test]
    fn header_rejects_foreign_or_truncated_data() {
        let (mut data, _) = account_with(3);

        let truncated = &data[..AssetRegistry::space_for(2)];
        assert_eq!(
            AssetRegistry::header(truncated).unwrap_err(),
            FactoryError::InvalidRegistry.into()
        );

        data[0] ^= 0xff;
        assert_eq!(
            AssetRegistry::header(&data).unwrap_err(),
            FactoryError::InvalidRegistry.into()
        );
    }

    #[test]
    fn slot_writes_match_the_account_encoding() {
        let (data, records) = account_with(5);

        let restored = AssetRegistry::try_deserialize(&mut &data[..]).unwrap();

        assert_eq!(restored.records, records);
        let expiries: Vec<i64> = restored.records.iter().map(|r| r.expiry).collect();
        assert_eq!(expiries, vec![1_000, 1_001, 1_002, 1_003, 1_004]);
    }

    #[test]
    fn appending_leaves_earlier_slots_alone() {
        let (mut data, records) = account_with(250);
        let before = data.clone();
        let extra = record_for(Pubkey::new_unique(), Pubkey::new_unique(), 9_999);

        data.resize(AssetRegistry::space_for(251), 0);
        AssetRegistry::write_record(&mut data, 250, &extra).unwrap();

        let prefix = AssetRegistry::BASE_LEN;
        assert_eq!(data[prefix..before.len()], before[prefix..]);
        assert_eq!(AssetRegistry::header(&data).unwrap().len, 251);
        assert_eq!(AssetRegistry::read_record(&data, 250).unwrap(), extra);
        assert_eq!(AssetRegistry::read_record(&data, 0).unwrap(), records[0]);
    }

    #[test]
    fn write_past_the_account_end_fails() {
        let (mut data, _) = account_with(2);
        let record = record_for(Pubkey::new_unique(), Pubkey::new_unique(), 1);

        let err = AssetRegistry::write_record(&mut data, 2, &record).unwrap_err();

        assert_eq!(err, FactoryError::InvalidRegistry.into());
        assert_eq!(AssetRegistry::header(&data).unwrap().len, 2);
    }

    #[test]
    fn first_page_of_twenty_is_full() {
        let (data, records) = account_with(20);

        let page = AssetRegistry::page(&data, 0, 10).unwrap();

        assert_eq!(page.instrument_a.len(), 10);
        assert_eq!(page.instrument_b.len(), 10);
        for (slot, record) in records.iter().take(10).enumerate() {
            assert_eq!(page.instrument_a[slot], record.instrument_a);
            assert_eq!(page.instrument_b[slot], record.instrument_b);
        }
    }

    #[test]
    fn page_past_the_end_is_all_sentinel() {
        let (data, _) = account_with(20);

        let page = AssetRegistry::page(&data, 7, 10).unwrap();

        assert_eq!(page, DeployedPage::empty(10));
    }

    #[test]
    fn partial_page_is_back_filled() {
        let (data, records) = account_with(13);

        let page = AssetRegistry::page(&data, 1, 10).unwrap();

        assert_eq!(page.instrument_a.len(), 10);
        assert_eq!(page.instrument_a[2], records[12].instrument_a);
        assert!(page.instrument_a[3..].iter().all(|k| *k == Pubkey::default()));
        assert!(page.instrument_b[3..].iter().all(|k| *k == Pubkey::default()));
    }

    #[test]
    fn last_page_of_a_large_registry() {
        let (data, records) = account_with(230);

        let page = AssetRegistry::page(&data, 15, MAX_PAGE_SIZE).unwrap();

        // 15 * 15 = 225, so five records then sentinels
        for (slot, record) in records[225..].iter().enumerate() {
            assert_eq!(page.instrument_a[slot], record.instrument_a);
            assert_eq!(page.instrument_b[slot], record.instrument_b);
        }
        assert!(page.instrument_a[5..].iter().all(|k| *k == Pubkey::default()));
        assert!(page.instrument_b[5..].iter().all(|k| *k == Pubkey::default()));
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let (data, _) = account_with(2);

        let page = AssetRegistry::page(&data, u32::MAX, MAX_PAGE_SIZE).unwrap();

        assert_eq!(page, DeployedPage::empty(MAX_PAGE_SIZE as usize));
    }

    #[test]
    fn space_grows_one_record_at_a_time() {
        assert_eq!(
            AssetRegistry::space_for(1) - AssetRegistry::space_for(0),
            InstrumentPairRecord::LEN
        );
    }

    #[test]
    fn max_page_fits_return_data() {
        let page = DeployedPage::empty(MAX_PAGE_SIZE as usize);
        let mut bytes = Vec::new();
        page.serialize(&mut bytes).unwrap();

        assert!(bytes.len() <= 1024);
    }

    proptest! {
        #[test]
        fn windowed_page_matches_full_read(
            count in 0usize..60,
            page_index in 0u32..10,
            page_size in 0u32..=MAX_PAGE_SIZE,
        ) {
            let (data, _) = account_with(count);
            let registry = AssetRegistry::try_deserialize(&mut &data[..]).unwrap();

            let page = AssetRegistry::page(&data, page_index, page_size).unwrap();

            prop_assert_eq!(page, registry.deployed_pairs(page_index, page_size));
        }

        #[test]
        fn out_of_range_pages_are_all_sentinel(
            count in 0usize..40,
            page_size in 1u32..=MAX_PAGE_SIZE,
            extra in 0u32..8,
        ) {
            let (data, _) = account_with(count);
            let first_empty = (count as u32).div_ceil(page_size) + extra;

            let page = AssetRegistry::page(&data, first_empty, page_size).unwrap();

            prop_assert_eq!(page, DeployedPage::empty(page_size as usize));
        }

        #[test]
        fn in_range_first_page_is_all_deployed(
            count in 1usize..40,
            page_size in 1u32..=MAX_PAGE_SIZE,
        ) {
            let (data, records) = account_with(count);
            let size = (page_size as usize).min(count);

            let page = AssetRegistry::page(&data, 0, size as u32).unwrap();

            prop_assert_eq!(page.instrument_a.len(), size);
            for (slot, record) in records.iter().take(size).enumerate() {
                prop_assert_eq!(page.instrument_a[slot], record.instrument_a);
                prop_assert_eq!(page.instrument_b[slot], record.instrument_b);
            }
        }
    }
}
