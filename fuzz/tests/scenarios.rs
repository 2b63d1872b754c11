//! Fixed end-to-end scenarios against the built programs.
//!
//! These load the SBF artifacts, so they are ignored by default. Run them
//! with `anchor build` followed by
//! `SBF_OUT_DIR=$PWD/target/deploy cargo test -p swap-assets-fuzz -- --ignored`
//! from the workspace root.

use asset_factory::error::FactoryError;
use asset_factory::state::DeployedPage;
use asset_factory::MAX_PAGE_SIZE;
use fuzz_helpers::*;
use module_core::error::ModuleError;
use module_core::state::ModuleCoreState;
use protocol_config::error::ConfigError;
use protocol_config::state::Role;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

const EXPIRY: i64 = 1_800_000_000;
const RATE: u64 = 1_000_000_000;

struct DeployFixture {
    env: FuzzTestEnv,
    factory: FactoryAccounts,
    pair: PairAccounts,
}

async fn deploy_fixture() -> FuzzResult<DeployFixture> {
    let mut env = setup_program_test().await;
    let context = &mut env.context;

    let factory = setup_factory(context).await?;
    let backing = setup_mint(context, 9).await?;
    let peg = setup_mint(context, 6).await?;
    let pair = register_pair(context, &factory, &backing.mint, &peg.mint).await?;

    Ok(DeployFixture { env, factory, pair })
}

/// Deploys `expiry` and returns the number of `AssetDeployed` events
async fn deploy(fixture: &mut DeployFixture, expiry: i64) -> FuzzResult<usize> {
    let logs = deploy_instrument_pair(
        &mut fixture.env.context,
        &fixture.factory,
        &fixture.pair,
        expiry,
        RATE,
    )
    .await?
    .map_err(|e| format!("deploy failed for expiry {}: {:?}", expiry, e))?;

    Ok(count_events(&logs))
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn hundred_identical_deploys_emit_one_event() -> FuzzResult<()> {
    let mut fixture = deploy_fixture().await?;

    let mut events = 0;
    for _ in 0..100 {
        events += deploy(&mut fixture, EXPIRY).await?;
    }

    assert_eq!(events, 1);
    let registry = get_registry_state(&mut fixture.env.context, &fixture.pair.registry).await?;
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.records[0].expiry, EXPIRY);

    println!("✓ PASS [IDEMPOTENT] - deploys=100, events={}", events);
    Ok(())
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn twenty_deploys_page_by_ten() -> FuzzResult<()> {
    let mut fixture = deploy_fixture().await?;
    for offset in 0..20 {
        assert_eq!(deploy(&mut fixture, EXPIRY + offset).await?, 1);
    }

    let context = &mut fixture.env.context;
    let backing = fixture.pair.backing_mint;
    let registry = get_registry_state(context, &fixture.pair.registry).await?;
    assert_eq!(registry.len(), 20);

    // First page: ten live pairs in deployment order
    let first = get_deployed_pairs(context, &backing, 0, 10).await?;
    for (slot, record) in registry.records.iter().take(10).enumerate() {
        assert_eq!(first.instrument_a[slot], record.instrument_a);
        assert_eq!(first.instrument_b[slot], record.instrument_b);
        assert_ne!(first.instrument_a[slot], Pubkey::default());
    }

    // Second page: the other ten
    let second = get_deployed_pairs(context, &backing, 1, 10).await?;
    assert_eq!(second, registry.deployed_pairs(1, 10));
    assert!(second.instrument_a.iter().all(|k| *k != Pubkey::default()));

    // Far past the end: sentinel everywhere
    let past_end = get_deployed_pairs(context, &backing, 7, 10).await?;
    assert_eq!(past_end, DeployedPage::empty(10));

    assert!(
        get_deployed_pairs(context, &backing, 0, MAX_PAGE_SIZE + 1)
            .await
            .is_err(),
        "page size {} must fail with {}",
        MAX_PAGE_SIZE + 1,
        u32::from(FactoryError::PageSizeTooLarge)
    );

    println!("✓ PASS [PAGINATION] - records=20, pages=(0,10) (1,10) (7,10)");
    Ok(())
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn large_registry_keeps_accepting_deploys() -> FuzzResult<()> {
    const RECORDS: i64 = 240;

    let mut fixture = deploy_fixture().await?;
    for offset in 0..RECORDS {
        assert_eq!(deploy(&mut fixture, EXPIRY + offset).await?, 1);
    }

    // Repeats of early and late keys stay no-ops
    assert_eq!(deploy(&mut fixture, EXPIRY).await?, 0);
    assert_eq!(deploy(&mut fixture, EXPIRY + RECORDS - 1).await?, 0);

    // And new keys still land
    assert_eq!(deploy(&mut fixture, EXPIRY + RECORDS).await?, 1);

    let context = &mut fixture.env.context;
    let backing = fixture.pair.backing_mint;
    let registry = get_registry_state(context, &fixture.pair.registry).await?;
    assert_eq!(registry.len(), RECORDS as usize + 1);

    let last_index = registry.len() as u32 / MAX_PAGE_SIZE;
    for page_index in [0, last_index / 2, last_index, last_index + 1] {
        let page = get_deployed_pairs(context, &backing, page_index, MAX_PAGE_SIZE).await?;
        assert_eq!(page, registry.deployed_pairs(page_index, MAX_PAGE_SIZE));
    }

    let last = registry.records.last().ok_or("registry is empty")?;
    assert!(is_deployed(context, &last.instrument_b).await?);

    println!("✓ PASS [LARGE_REGISTRY] - records={}", registry.len());
    Ok(())
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn transfer_admin_moves_role_management() -> FuzzResult<()> {
    let mut env = setup_program_test().await;
    let context = &mut env.context;
    let config = setup_config(context).await?;
    let next_admin = Keypair::new();
    let identity = Pubkey::new_unique();

    // Only the Admin can hand the role over
    let err = send_instruction(
        context,
        transfer_admin_ix(&config.manager.pubkey(), &next_admin.pubkey()),
        &[&config.manager],
    )
    .await?
    .expect_err("transfer by a non-admin must fail");
    assert_eq!(error_code(&err), Some(ConfigError::CallerNotAdmin.into()));

    process_instruction(
        context,
        transfer_admin_ix(&config.admin.pubkey(), &next_admin.pubkey()),
        &[&config.admin],
    )
    .await?;
    assert!(has_role(context, Role::Admin, &next_admin.pubkey()).await?);
    assert!(!has_role(context, Role::Admin, &config.admin.pubkey()).await?);

    let err = send_instruction(
        context,
        grant_manager_ix(&config.admin.pubkey(), &identity),
        &[&config.admin],
    )
    .await?
    .expect_err("the previous admin must lose role management");
    assert_eq!(error_code(&err), Some(ConfigError::CallerNotAdmin.into()));

    process_instruction(
        context,
        grant_manager_ix(&next_admin.pubkey(), &identity),
        &[&next_admin],
    )
    .await?;
    assert!(has_role(context, Role::Manager, &identity).await?);

    let err = send_instruction(
        context,
        transfer_admin_ix(&next_admin.pubkey(), &Pubkey::default()),
        &[&next_admin],
    )
    .await?
    .expect_err("the zero address cannot become admin");
    assert_eq!(error_code(&err), Some(ConfigError::InvalidAddress.into()));

    println!("✓ PASS [TRANSFER_ADMIN]");
    Ok(())
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn initialize_module_checks_role_then_pause_then_module() -> FuzzResult<()> {
    let mut env = setup_program_test().await;
    let context = &mut env.context;
    let config = setup_config(context).await?;
    let peg = setup_mint(context, 6).await?.mint;
    let backing = setup_mint(context, 9).await?.mint;
    let payer = context.payer.pubkey();
    let stranger = Keypair::new();
    let manager = config.manager.pubkey();

    let attempt = |caller: &Pubkey, program: &Pubkey| {
        initialize_module_ix(caller, program, &peg, &backing, &payer, 100)
    };

    let err = send_instruction(context, attempt(&stranger.pubkey(), &module_core::id()), &[&stranger])
        .await?
        .expect_err("non-manager must be rejected");
    assert_eq!(error_code(&err), Some(ConfigError::CallerNotManager.into()));

    process_instruction(context, pause_ix(&manager), &[&config.manager]).await?;

    // While paused a non-manager still sees the role failure first
    let err = send_instruction(context, attempt(&stranger.pubkey(), &module_core::id()), &[&stranger])
        .await?
        .expect_err("non-manager must be rejected while paused");
    assert_eq!(error_code(&err), Some(ConfigError::CallerNotManager.into()));

    let err = send_instruction(context, attempt(&manager, &module_core::id()), &[&config.manager])
        .await?
        .expect_err("paused config must block module creation");
    assert_eq!(error_code(&err), Some(ConfigError::ContractPaused.into()));

    process_instruction(context, unpause_ix(&manager), &[&config.manager]).await?;

    let err = send_instruction(context, attempt(&manager, &asset_factory::id()), &[&config.manager])
        .await?
        .expect_err("a foreign module program must be rejected");
    assert_eq!(error_code(&err), Some(ConfigError::InvalidModule.into()));

    let module = derive_module_pda(&peg, &backing).0;
    assert!(context.banks_client.get_account(module).await?.is_none());

    process_instruction(context, attempt(&manager, &module_core::id()), &[&config.manager]).await?;
    assert_eq!(get_module_state(context, &module).await?.lv_fee, 100);

    println!("✓ PASS [INITIALIZE_MODULE]");
    Ok(())
}

#[tokio::test]
#[ignore = "needs the SBF builds from `anchor build`"]
async fn module_core_only_accepts_the_config_pda() -> FuzzResult<()> {
    let mut env = setup_program_test().await;
    let context = &mut env.context;
    let payer = context.payer.pubkey();

    let err = send_instruction(
        context,
        module_core_initialize_ix(&payer, &Pubkey::new_unique()),
        &[],
    )
    .await?
    .expect_err("an arbitrary config authority must be rejected");
    assert_eq!(error_code(&err), Some(ModuleError::Unauthorized.into()));

    process_instruction(
        context,
        module_core_initialize_ix(&payer, &derive_config_pda().0),
        &[],
    )
    .await?;

    println!("✓ PASS [MODULE_CORE_AUTHORITY]");
    Ok(())
}

#[test]
fn pinned_config_authority_is_the_config_pda() {
    assert_eq!(module_core::PROTOCOL_CONFIG_PROGRAM_ID, protocol_config::id());
    assert_eq!(
        module_core::PROTOCOL_CONFIG_SEED,
        protocol_config::CONFIG_SEED
    );
    assert_eq!(
        ModuleCoreState::expected_config_authority(),
        derive_config_pda().0
    );
}
