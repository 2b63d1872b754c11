use std::sync::atomic::{AtomicU32, Ordering};

use anchor_lang::AccountDeserialize;
use anchor_lang::AnchorDeserialize;
use anchor_lang::InstructionData;
use anchor_lang::ToAccountMetas;
use asset_factory::state::{AssetRegistry, DeployedPage, DeploymentKey, InstrumentKind};
use module_core::state::ModuleState;
use protocol_config::state::{ProtocolConfig, Role};
use solana_program_test::*;
use solana_sdk::{
    clock::Clock,
    compute_budget::ComputeBudgetInstruction,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::instruction as token_instruction;

// Re-export for convenience
pub use solana_program_test::ProgramTestContext;

pub type FuzzResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Program outcome of a processed transaction: its logs on success.
pub type TxResult = std::result::Result<Vec<String>, TransactionError>;

/// Test environment with all three programs loaded
pub struct FuzzTestEnv {
    pub context: ProgramTestContext,
}

/// Factory state PDA and its owner
pub struct FactoryAccounts {
    pub factory: Pubkey,
    pub owner: Keypair,
}

/// An SPL token mint used as backing or peg asset
pub struct MintAccounts {
    pub mint: Pubkey,
    pub mint_authority: Keypair,
    pub decimals: u8,
}

/// A registered (backing, peg) pair
#[derive(Debug, Clone)]
pub struct PairAccounts {
    pub backing_mint: Pubkey,
    pub peg_mint: Pubkey,
    pub pair: Pubkey,
    pub registry: Pubkey,
}

/// Protocol config with a Manager and the module core wired to it
pub struct ConfigAccounts {
    pub config: Pubkey,
    pub module_core_state: Pubkey,
    pub admin: Keypair,
    pub manager: Keypair,
}

// ============================================================================
// Core Setup Functions
// ============================================================================

/// Creates the program test environment with the factory, config and module
/// programs loaded from their built artifacts
pub async fn setup_program_test() -> FuzzTestEnv {
    let mut program_test = ProgramTest::new("asset_factory", asset_factory::id(), None);
    program_test.add_program("protocol_config", protocol_config::id(), None);
    program_test.add_program("module_core", module_core::id(), None);

    let context = program_test.start_with_context().await;

    FuzzTestEnv { context }
}

static TX_NONCE: AtomicU32 = AtomicU32::new(0);

/// Identical instructions signed against the same blockhash would collapse
/// into one signature, so every transaction carries a distinct compute limit.
fn unique_budget_ix() -> Instruction {
    let nonce = TX_NONCE.fetch_add(1, Ordering::Relaxed) % 100_000;
    ComputeBudgetInstruction::set_compute_unit_limit(1_000_000 + nonce)
}

/// Sends `ix` paid by the context payer. Transport failures are returned as
/// `Err`, program failures as `Ok(Err(..))`.
pub async fn send_instruction(
    context: &mut ProgramTestContext,
    ix: Instruction,
    signers: &[&Keypair],
) -> FuzzResult<TxResult> {
    let mut all_signers: Vec<&Keypair> = vec![&context.payer];
    all_signers.extend_from_slice(signers);

    let tx = Transaction::new_signed_with_payer(
        &[unique_budget_ix(), ix],
        Some(&context.payer.pubkey()),
        &all_signers,
        context.last_blockhash,
    );

    let outcome = context
        .banks_client
        .process_transaction_with_metadata(tx)
        .await?;

    Ok(outcome.result.map(|_| {
        outcome
            .metadata
            .map(|metadata| metadata.log_messages)
            .unwrap_or_default()
    }))
}

/// Like `send_instruction` but any program failure is an error.
pub async fn process_instruction(
    context: &mut ProgramTestContext,
    ix: Instruction,
    signers: &[&Keypair],
) -> FuzzResult<Vec<String>> {
    Ok(send_instruction(context, ix, signers).await??)
}

/// Simulates `ix` and returns its return data, padded back to `len` bytes
/// since the runtime drops trailing zeroes.
pub async fn simulate_return_data(
    context: &mut ProgramTestContext,
    ix: Instruction,
    len: usize,
) -> FuzzResult<Vec<u8>> {
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    let simulation = context.banks_client.simulate_transaction(tx).await?;
    if let Some(result) = simulation.result {
        result?;
    }

    let mut data = simulation
        .simulation_details
        .and_then(|details| details.return_data)
        .map(|return_data| return_data.data)
        .unwrap_or_default();
    if data.len() < len {
        data.resize(len, 0);
    }

    Ok(data)
}

/// Anchor custom error code of a failed transaction, if any
pub fn error_code(err: &TransactionError) -> Option<u32> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

/// Number of `emit!` events in a transaction's logs
pub fn count_events(logs: &[String]) -> usize {
    logs.iter()
        .filter(|line| line.starts_with("Program data: "))
        .count()
}

/// Funds `account` with 1 SOL from the context payer
pub async fn fund_account(context: &mut ProgramTestContext, account: &Pubkey) -> FuzzResult<()> {
    let rent = context.banks_client.get_rent().await?;
    let lamports = rent.minimum_balance(0) + 1_000_000_000; // 1 SOL

    let ix = solana_sdk::system_instruction::transfer(&context.payer.pubkey(), account, lamports);
    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(())
}

/// Current cluster time as seen by the programs
pub async fn unix_timestamp(context: &mut ProgramTestContext) -> FuzzResult<i64> {
    let clock = context.banks_client.get_sysvar::<Clock>().await?;
    Ok(clock.unix_timestamp)
}

// ============================================================================
// Asset Factory
// ============================================================================

/// Initializes the factory with a fresh owner
pub async fn setup_factory(context: &mut ProgramTestContext) -> FuzzResult<FactoryAccounts> {
    let owner = Keypair::new();
    let (factory, _) = derive_factory_pda();

    let accounts = asset_factory::accounts::Initialize {
        factory,
        owner: owner.pubkey(),
        payer: context.payer.pubkey(),
        system_program: solana_sdk::system_program::ID,
    };

    let ix = Instruction {
        program_id: asset_factory::id(),
        accounts: accounts.to_account_metas(None),
        data: asset_factory::instruction::Initialize {}.data(),
    };

    process_instruction(context, ix, &[&owner]).await?;

    Ok(FactoryAccounts { factory, owner })
}

/// Creates a new SPL token mint
pub async fn setup_mint(context: &mut ProgramTestContext, decimals: u8) -> FuzzResult<MintAccounts> {
    let mint_authority = Keypair::new();
    let mint_keypair = Keypair::new();
    let mint = mint_keypair.pubkey();

    let rent = context.banks_client.get_rent().await?;
    let mint_len = 82; // Size of Mint account in SPL Token program
    let mint_rent = rent.minimum_balance(mint_len);

    let create_account_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &mint,
        mint_rent,
        mint_len as u64,
        &spl_token::id(),
    );

    let init_mint_ix = token_instruction::initialize_mint(
        &spl_token::id(),
        &mint,
        &mint_authority.pubkey(),
        None,
        decimals,
    )?;

    let tx = Transaction::new_signed_with_payer(
        &[create_account_ix, init_mint_ix],
        Some(&context.payer.pubkey()),
        &[&context.payer, &mint_keypair],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(MintAccounts {
        mint,
        mint_authority,
        decimals,
    })
}

/// Registers (backing, peg) with the factory
pub async fn register_pair(
    context: &mut ProgramTestContext,
    factory: &FactoryAccounts,
    backing_mint: &Pubkey,
    peg_mint: &Pubkey,
) -> FuzzResult<PairAccounts> {
    let (pair, _) = derive_pair_pda(backing_mint, peg_mint);
    let (registry, _) = derive_registry_pda(backing_mint);

    let accounts = asset_factory::accounts::RegisterPair {
        factory: factory.factory,
        owner: factory.owner.pubkey(),
        backing_mint: *backing_mint,
        peg_mint: *peg_mint,
        pair,
        registry,
        payer: context.payer.pubkey(),
        system_program: solana_sdk::system_program::ID,
    };

    let ix = Instruction {
        program_id: asset_factory::id(),
        accounts: accounts.to_account_metas(None),
        data: asset_factory::instruction::RegisterPair {}.data(),
    };

    process_instruction(context, ix, &[&factory.owner]).await?;

    Ok(PairAccounts {
        backing_mint: *backing_mint,
        peg_mint: *peg_mint,
        pair,
        registry,
    })
}

/// Builds a `deploy_instrument_pair` instruction signed by `owner`
pub fn deploy_instruction(
    owner: &Pubkey,
    backing_mint: &Pubkey,
    peg_mint: &Pubkey,
    deployer: &Pubkey,
    payer: &Pubkey,
    expiry: i64,
    initial_rate: u64,
) -> Instruction {
    let key = DeploymentKey::new(*backing_mint, *peg_mint, expiry);
    let (instrument_a, _) = key.derive(InstrumentKind::A, &asset_factory::id());
    let (instrument_b, _) = key.derive(InstrumentKind::B, &asset_factory::id());

    let accounts = asset_factory::accounts::DeployInstrumentPair {
        factory: derive_factory_pda().0,
        owner: *owner,
        backing_mint: *backing_mint,
        peg_mint: *peg_mint,
        deployer: *deployer,
        pair: derive_pair_pda(backing_mint, peg_mint).0,
        registry: derive_registry_pda(backing_mint).0,
        instrument_a,
        instrument_b,
        instrument_a_marker: derive_marker_pda(&instrument_a).0,
        instrument_b_marker: derive_marker_pda(&instrument_b).0,
        payer: *payer,
        token_program: spl_token::id(),
        system_program: solana_sdk::system_program::ID,
    };

    Instruction {
        program_id: asset_factory::id(),
        accounts: accounts.to_account_metas(None),
        data: asset_factory::instruction::DeployInstrumentPair {
            expiry,
            initial_rate,
        }
        .data(),
    }
}

/// Deploys (or re-deploys) the instrument pair for `expiry` as the factory owner
pub async fn deploy_instrument_pair(
    context: &mut ProgramTestContext,
    factory: &FactoryAccounts,
    pair: &PairAccounts,
    expiry: i64,
    initial_rate: u64,
) -> FuzzResult<TxResult> {
    let payer = context.payer.pubkey();
    let ix = deploy_instruction(
        &factory.owner.pubkey(),
        &pair.backing_mint,
        &pair.peg_mint,
        &factory.owner.pubkey(),
        &payer,
        expiry,
        initial_rate,
    );

    send_instruction(context, ix, &[&factory.owner]).await
}

/// Queries `is_deployed` for `address`
pub async fn is_deployed(context: &mut ProgramTestContext, address: &Pubkey) -> FuzzResult<bool> {
    let accounts = asset_factory::accounts::IsDeployed {
        marker: derive_marker_pda(address).0,
    };

    let ix = Instruction {
        program_id: asset_factory::id(),
        accounts: accounts.to_account_metas(None),
        data: asset_factory::instruction::IsDeployed { address: *address }.data(),
    };

    let data = simulate_return_data(context, ix, 1).await?;
    Ok(data[0] != 0)
}

/// Queries one page of deployed instrument pairs for `backing_asset`
pub async fn get_deployed_pairs(
    context: &mut ProgramTestContext,
    backing_asset: &Pubkey,
    page_index: u32,
    page_size: u32,
) -> FuzzResult<DeployedPage> {
    let accounts = asset_factory::accounts::GetDeployedPairs {
        registry: derive_registry_pda(backing_asset).0,
    };

    let ix = Instruction {
        program_id: asset_factory::id(),
        accounts: accounts.to_account_metas(None),
        data: asset_factory::instruction::GetDeployedPairs {
            backing_asset: *backing_asset,
            page_index,
            page_size,
        }
        .data(),
    };

    // Two length-prefixed vectors of keys
    let len = 2 * (4 + 32 * page_size as usize);
    let data = simulate_return_data(context, ix, len).await?;
    let page = DeployedPage::deserialize(&mut data.as_slice())?;

    Ok(page)
}

// ============================================================================
// Protocol Config
// ============================================================================

/// Initializes the config hub and the module core, grants Manager and points
/// the config at the module core program
pub async fn setup_config(context: &mut ProgramTestContext) -> FuzzResult<ConfigAccounts> {
    let admin = Keypair::new();
    let manager = Keypair::new();
    let (config, _) = derive_config_pda();
    let (module_core_state, _) = derive_module_core_state_pda();

    fund_account(context, &admin.pubkey()).await?;

    let accounts = protocol_config::accounts::Initialize {
        config,
        admin: admin.pubkey(),
        system_program: solana_sdk::system_program::ID,
    };
    let ix = Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data: protocol_config::instruction::Initialize {}.data(),
    };
    process_instruction(context, ix, &[&admin]).await?;

    let ix = module_core_initialize_ix(&context.payer.pubkey(), &config);
    process_instruction(context, ix, &[]).await?;

    process_instruction(context, grant_manager_ix(&admin.pubkey(), &manager.pubkey()), &[&admin])
        .await?;
    process_instruction(
        context,
        set_module_core_ix(&manager.pubkey(), &module_core::id()),
        &[&manager],
    )
    .await?;

    Ok(ConfigAccounts {
        config,
        module_core_state,
        admin,
        manager,
    })
}

/// Initializes the module for (peg, backing) through the config hub
pub async fn setup_module(
    context: &mut ProgramTestContext,
    config: &ConfigAccounts,
    peg_mint: &Pubkey,
    backing_mint: &Pubkey,
    lv_fee: u16,
) -> FuzzResult<Pubkey> {
    let (module, _) = derive_module_pda(peg_mint, backing_mint);

    let ix = initialize_module_ix(
        &config.manager.pubkey(),
        &module_core::id(),
        peg_mint,
        backing_mint,
        &context.payer.pubkey(),
        lv_fee,
    );
    process_instruction(context, ix, &[&config.manager]).await?;

    Ok(module)
}

/// Builds module core `initialize` naming `config_authority`
pub fn module_core_initialize_ix(payer: &Pubkey, config_authority: &Pubkey) -> Instruction {
    let accounts = module_core::accounts::Initialize {
        module_core_state: derive_module_core_state_pda().0,
        payer: *payer,
        system_program: solana_sdk::system_program::ID,
    };

    Instruction {
        program_id: module_core::id(),
        accounts: accounts.to_account_metas(None),
        data: module_core::instruction::Initialize {
            config_authority: *config_authority,
        }
        .data(),
    }
}

/// Builds `initialize_module` for (peg, backing), forwarded to `module_program`
pub fn initialize_module_ix(
    manager: &Pubkey,
    module_program: &Pubkey,
    peg_mint: &Pubkey,
    backing_mint: &Pubkey,
    payer: &Pubkey,
    lv_fee: u16,
) -> Instruction {
    let accounts = protocol_config::accounts::InitializeModule {
        config: derive_config_pda().0,
        manager: *manager,
        module_program: *module_program,
        module_core_state: derive_module_core_state_pda().0,
        peg_mint: *peg_mint,
        backing_mint: *backing_mint,
        module: derive_module_pda(peg_mint, backing_mint).0,
        payer: *payer,
        system_program: solana_sdk::system_program::ID,
    };

    Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data: protocol_config::instruction::InitializeModule {
            lv_fee,
            lv_amm_wa_deposit_threshold: 0,
            lv_amm_ct_deposit_threshold: 0,
        }
        .data(),
    }
}

fn update_roles_ix(admin: &Pubkey, data: Vec<u8>) -> Instruction {
    let accounts = protocol_config::accounts::UpdateRoles {
        config: derive_config_pda().0,
        admin: *admin,
    };

    Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data,
    }
}

pub fn grant_manager_ix(admin: &Pubkey, identity: &Pubkey) -> Instruction {
    update_roles_ix(
        admin,
        protocol_config::instruction::GrantManager {
            identity: *identity,
        }
        .data(),
    )
}

pub fn revoke_manager_ix(admin: &Pubkey, identity: &Pubkey) -> Instruction {
    update_roles_ix(
        admin,
        protocol_config::instruction::RevokeManager {
            identity: *identity,
        }
        .data(),
    )
}

pub fn transfer_admin_ix(admin: &Pubkey, new_admin: &Pubkey) -> Instruction {
    let accounts = protocol_config::accounts::TransferAdmin {
        config: derive_config_pda().0,
        admin: *admin,
    };

    Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data: protocol_config::instruction::TransferAdmin {
            new_admin: *new_admin,
        }
        .data(),
    }
}

fn manage_config_ix(manager: &Pubkey, data: Vec<u8>) -> Instruction {
    let accounts = protocol_config::accounts::ManageConfig {
        config: derive_config_pda().0,
        manager: *manager,
    };

    Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data,
    }
}

pub fn set_module_core_ix(manager: &Pubkey, module_core: &Pubkey) -> Instruction {
    manage_config_ix(
        manager,
        protocol_config::instruction::SetModuleCore {
            module_core: *module_core,
        }
        .data(),
    )
}

pub fn pause_ix(manager: &Pubkey) -> Instruction {
    manage_config_ix(manager, protocol_config::instruction::Pause {}.data())
}

pub fn unpause_ix(manager: &Pubkey) -> Instruction {
    manage_config_ix(manager, protocol_config::instruction::Unpause {}.data())
}

pub fn issue_new_series_ix(
    manager: &Pubkey,
    module_program: &Pubkey,
    module: &Pubkey,
    expiry: i64,
    exchange_rate: u64,
    cap: u64,
) -> Instruction {
    let accounts = protocol_config::accounts::IssueNewSeries {
        config: derive_config_pda().0,
        manager: *manager,
        module_program: *module_program,
        module_core_state: derive_module_core_state_pda().0,
        module: *module,
    };

    Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data: protocol_config::instruction::IssueNewSeries {
            expiry,
            exchange_rate,
            cap,
        }
        .data(),
    }
}

fn update_fee_rate_accounts(
    manager: &Pubkey,
    module_program: &Pubkey,
    module: &Pubkey,
) -> protocol_config::accounts::UpdateFeeRate {
    protocol_config::accounts::UpdateFeeRate {
        config: derive_config_pda().0,
        manager: *manager,
        module_program: *module_program,
        module_core_state: derive_module_core_state_pda().0,
        module: *module,
    }
}

pub fn update_repurchase_fee_rate_ix(
    manager: &Pubkey,
    module_program: &Pubkey,
    module: &Pubkey,
    rate: u16,
) -> Instruction {
    Instruction {
        program_id: protocol_config::id(),
        accounts: update_fee_rate_accounts(manager, module_program, module).to_account_metas(None),
        data: protocol_config::instruction::UpdateRepurchaseFeeRate { rate }.data(),
    }
}

pub fn update_early_redemption_fee_rate_ix(
    manager: &Pubkey,
    module_program: &Pubkey,
    module: &Pubkey,
    rate: u16,
) -> Instruction {
    Instruction {
        program_id: protocol_config::id(),
        accounts: update_fee_rate_accounts(manager, module_program, module).to_account_metas(None),
        data: protocol_config::instruction::UpdateEarlyRedemptionFeeRate { rate }.data(),
    }
}

/// Queries `has_role` for `identity`
pub async fn has_role(
    context: &mut ProgramTestContext,
    role: Role,
    identity: &Pubkey,
) -> FuzzResult<bool> {
    let accounts = protocol_config::accounts::ReadConfig {
        config: derive_config_pda().0,
    };

    let ix = Instruction {
        program_id: protocol_config::id(),
        accounts: accounts.to_account_metas(None),
        data: protocol_config::instruction::HasRole {
            role,
            identity: *identity,
        }
        .data(),
    };

    let data = simulate_return_data(context, ix, 1).await?;
    Ok(data[0] != 0)
}

// ============================================================================
// PDA Derivation Helpers
// ============================================================================

pub fn derive_factory_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[asset_factory::FACTORY_SEED], &asset_factory::id())
}

pub fn derive_pair_pda(backing_mint: &Pubkey, peg_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            asset_factory::PAIR_SEED,
            backing_mint.as_ref(),
            peg_mint.as_ref(),
        ],
        &asset_factory::id(),
    )
}

pub fn derive_registry_pda(backing_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[asset_factory::REGISTRY_SEED, backing_mint.as_ref()],
        &asset_factory::id(),
    )
}

/// Both instrument mints for one deployment key
pub fn derive_instrument_pair(backing_mint: &Pubkey, peg_mint: &Pubkey, expiry: i64) -> (Pubkey, Pubkey) {
    let key = DeploymentKey::new(*backing_mint, *peg_mint, expiry);
    let (instrument_a, _) = key.derive(InstrumentKind::A, &asset_factory::id());
    let (instrument_b, _) = key.derive(InstrumentKind::B, &asset_factory::id());
    (instrument_a, instrument_b)
}

pub fn derive_marker_pda(instrument: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[asset_factory::DEPLOYED_SEED, instrument.as_ref()],
        &asset_factory::id(),
    )
}

pub fn derive_config_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[protocol_config::CONFIG_SEED], &protocol_config::id())
}

pub fn derive_module_core_state_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[module_core::MODULE_CORE_SEED], &module_core::id())
}

pub fn derive_module_pda(peg_mint: &Pubkey, backing_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[module_core::MODULE_SEED, peg_mint.as_ref(), backing_mint.as_ref()],
        &module_core::id(),
    )
}

// ============================================================================
// Account State Verification Helpers
// ============================================================================

/// Raw account bytes, used to prove failed calls leave state untouched
pub async fn get_account_data(context: &mut ProgramTestContext, address: &Pubkey) -> FuzzResult<Vec<u8>> {
    let account = context
        .banks_client
        .get_account(*address)
        .await?
        .ok_or("Account not found")?;

    Ok(account.data)
}

pub async fn get_registry_state(
    context: &mut ProgramTestContext,
    registry: &Pubkey,
) -> FuzzResult<AssetRegistry> {
    let data = get_account_data(context, registry).await?;
    let registry = AssetRegistry::try_deserialize(&mut data.as_ref())?;
    Ok(registry)
}

pub async fn get_config_state(
    context: &mut ProgramTestContext,
    config: &Pubkey,
) -> FuzzResult<ProtocolConfig> {
    let data = get_account_data(context, config).await?;
    let config = ProtocolConfig::try_deserialize(&mut data.as_ref())?;
    Ok(config)
}

pub async fn get_module_state(
    context: &mut ProgramTestContext,
    module: &Pubkey,
) -> FuzzResult<ModuleState> {
    let data = get_account_data(context, module).await?;
    let module = ModuleState::try_deserialize(&mut data.as_ref())?;
    Ok(module)
}
