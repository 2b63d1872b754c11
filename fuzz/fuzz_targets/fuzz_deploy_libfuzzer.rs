#![no_main]

use arbitrary::Arbitrary;
use asset_factory::error::FactoryError;
use asset_factory::state::DeployedPage;
use asset_factory::MAX_PAGE_SIZE;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

/// Fuzzable input for repeated instrument pair deployment
#[derive(Debug, Clone, Arbitrary)]
struct DeployFuzzInput {
    /// Expiries to deploy, duplicates included on purpose
    expiries: Vec<u16>,
    /// How many times each expiry is deployed in a row
    repeats: u8,
    /// Backing mint decimals (for setup)
    decimals: u8,
    initial_rate: u64,
    page_index: u8,
    page_size: u8,
}

/// Execute a single fuzz iteration of deploy + query
async fn fuzz_deploy_once(input: DeployFuzzInput) -> FuzzResult<()> {
    let expiries: Vec<i64> = input
        .expiries
        .iter()
        .take(12)
        .map(|e| 1_700_000_000 + *e as i64)
        .collect();
    let repeats = (input.repeats % 4) as usize + 1;
    let decimals = input.decimals % 10;

    let mut env = setup_program_test().await;
    let context = &mut env.context;

    let factory = setup_factory(context).await?;
    let backing = setup_mint(context, decimals).await?;
    let peg = setup_mint(context, 6).await?;
    let pair = register_pair(context, &factory, &backing.mint, &peg.mint).await?;

    // ========================================
    // DEPLOY EVERY EXPIRY `repeats` TIMES
    // ========================================

    let mut expected_order: Vec<i64> = Vec::new();
    let mut events = 0usize;

    for expiry in &expiries {
        for _ in 0..repeats {
            let logs = deploy_instrument_pair(context, &factory, &pair, *expiry, input.initial_rate)
                .await?
                .map_err(|e| format!("deploy failed for expiry {}: {:?}", expiry, e))?;
            events += count_events(&logs);
        }
        if !expected_order.contains(expiry) {
            expected_order.push(*expiry);
        }
    }

    // PROPERTY 1: IDEMPOTENCY
    // One event and one record per distinct deployment key
    assert_eq!(
        events,
        expected_order.len(),
        "Expected one AssetDeployed event per distinct expiry, got {} for {:?}",
        events,
        expiries
    );

    let registry = get_registry_state(context, &pair.registry).await?;
    assert_eq!(registry.backing_asset, backing.mint);
    assert_eq!(registry.len(), expected_order.len());

    // PROPERTY 2: INSERTION ORDER
    let recorded: Vec<i64> = registry.records.iter().map(|r| r.expiry).collect();
    assert_eq!(recorded, expected_order, "Registry order must follow first deployment");

    // PROPERTY 3: DETERMINISTIC ADDRESSES + MEMBERSHIP
    for record in &registry.records {
        let (instrument_a, instrument_b) =
            derive_instrument_pair(&backing.mint, &peg.mint, record.expiry);
        assert_eq!(record.instrument_a, instrument_a);
        assert_eq!(record.instrument_b, instrument_b);
        assert_eq!(record.initial_rate, input.initial_rate);
        assert!(is_deployed(context, &instrument_a).await?);
        assert!(is_deployed(context, &instrument_b).await?);
    }
    assert!(!is_deployed(context, &Pubkey::new_unique()).await?);
    assert!(!is_deployed(context, &backing.mint).await?);

    // PROPERTY 4: GATED DEPLOYMENTS LEAVE THE REGISTRY UNTOUCHED
    let registry_before = get_account_data(context, &pair.registry).await?;
    let payer = context.payer.pubkey();

    let swapped = deploy_instruction(
        &factory.owner.pubkey(),
        &peg.mint,
        &backing.mint,
        &factory.owner.pubkey(),
        &payer,
        1_700_000_000,
        input.initial_rate,
    );
    let err = send_instruction(context, swapped, &[&factory.owner])
        .await?
        .expect_err("deploy for an unregistered pair must fail");
    assert_eq!(error_code(&err), Some(FactoryError::UnrecognizedPair.into()));

    let stranger = Keypair::new();
    let unauthorized = deploy_instruction(
        &stranger.pubkey(),
        &backing.mint,
        &peg.mint,
        &stranger.pubkey(),
        &payer,
        1_600_000_000,
        input.initial_rate,
    );
    let err = send_instruction(context, unauthorized, &[&stranger])
        .await?
        .expect_err("deploy by a non-owner must fail");
    assert_eq!(error_code(&err), Some(FactoryError::CallerNotOwner.into()));

    assert_eq!(get_account_data(context, &pair.registry).await?, registry_before);

    // ========================================
    // PAGINATION
    // ========================================

    let page_index = (input.page_index % 4) as u32;
    let page_size = (input.page_size as u32) % (MAX_PAGE_SIZE + 4);

    if page_size > MAX_PAGE_SIZE {
        // PROPERTY 5: OVERSIZED PAGES ARE REJECTED
        assert!(
            get_deployed_pairs(context, &backing.mint, page_index, page_size)
                .await
                .is_err(),
            "Page size {} above the maximum must fail",
            page_size
        );
        println!(
            "✓ PASS [OVERSIZED_PAGE] - page_size={}, code={}",
            page_size,
            u32::from(FactoryError::PageSizeTooLarge)
        );
        return Ok(());
    }

    let page = get_deployed_pairs(context, &backing.mint, page_index, page_size).await?;

    // PROPERTY 6: PAGE MATCHES THE REGISTRY WINDOW, SENTINEL BACK-FILLED
    let mut expected = DeployedPage::empty(page_size as usize);
    let start = (page_index * page_size) as usize;
    for (slot, record) in registry
        .records
        .iter()
        .skip(start)
        .take(page_size as usize)
        .enumerate()
    {
        expected.instrument_a[slot] = record.instrument_a;
        expected.instrument_b[slot] = record.instrument_b;
    }
    assert_eq!(page, expected);

    // PROPERTY 7: UNKNOWN BACKING ASSET PAGES ARE ALL SENTINEL
    let unknown = get_deployed_pairs(context, &peg.mint, 0, page_size).await?;
    assert_eq!(unknown, DeployedPage::empty(page_size as usize));

    println!(
        "✓ PASS [DEPLOY] - distinct={}, repeats={}, events={}, page=({}, {})",
        expected_order.len(),
        repeats,
        events,
        page_index,
        page_size
    );

    Ok(())
}

fuzz_target!(|input: DeployFuzzInput| {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_deploy_once(input.clone()).await {
            panic!("Deploy fuzz iteration failed: {}\nInput: {:?}", e, input);
        }
    });
});
