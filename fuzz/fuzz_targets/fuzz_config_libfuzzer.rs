#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use module_core::error::ModuleError;
use module_core::{MAX_EARLY_REDEMPTION_FEE_BPS, MAX_REPURCHASE_FEE_BPS};
use protocol_config::error::ConfigError;
use protocol_config::state::Role;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

/// Which of the three test identities signs an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
enum Caller {
    Admin,
    Manager,
    Stranger,
}

#[derive(Debug, Clone, Arbitrary)]
enum ConfigOp {
    GrantManager { caller: Caller, target: Caller },
    RevokeManager { caller: Caller, target: Caller },
    TransferAdmin { caller: Caller, target: Caller },
    SetModuleCore { caller: Caller, zero: bool },
    Pause { caller: Caller },
    Unpause { caller: Caller },
    /// Creates a module for a fresh (peg, backing) pair
    InitializeModule { caller: Caller, wrong_module: bool, lv_fee: u16 },
    IssueNewSeries { caller: Caller, expiry_offset: i16, exchange_rate: u8 },
    UpdateRepurchaseFeeRate { caller: Caller, rate: u16 },
    UpdateEarlyRedemptionFeeRate { caller: Caller, rate: u16 },
    /// Fee update naming a program other than the configured module core
    UpdateFeeViaWrongModule { caller: Caller, rate: u16 },
}

/// Fuzzable input: a sequence of config operations from mixed callers
#[derive(Debug, Clone, Arbitrary)]
struct ConfigFuzzInput {
    ops: Vec<ConfigOp>,
}

/// Independent mirror of the role table and pause flag
struct Model {
    admin: Caller,
    managers: [bool; 3],
    paused: bool,
}

impl Model {
    fn is_admin(&self, caller: Caller) -> bool {
        self.admin == caller
    }

    fn is_manager(&self, caller: Caller) -> bool {
        self.managers[caller as usize]
    }

    /// Expected custom error code for `op`, applying it to the model when it succeeds
    fn apply(&mut self, op: &ConfigOp) -> Option<u32> {
        let manager_gate = |model: &Model, caller: Caller| {
            (!model.is_manager(caller)).then(|| u32::from(ConfigError::CallerNotManager))
        };

        match *op {
            ConfigOp::GrantManager { caller, target } => {
                if !self.is_admin(caller) {
                    return Some(ConfigError::CallerNotAdmin.into());
                }
                self.managers[target as usize] = true;
                None
            }
            ConfigOp::RevokeManager { caller, target } => {
                if !self.is_admin(caller) {
                    return Some(ConfigError::CallerNotAdmin.into());
                }
                self.managers[target as usize] = false;
                None
            }
            ConfigOp::TransferAdmin { caller, target } => {
                if !self.is_admin(caller) {
                    return Some(ConfigError::CallerNotAdmin.into());
                }
                self.admin = target;
                None
            }
            ConfigOp::SetModuleCore { caller, zero } => manager_gate(self, caller)
                .or_else(|| zero.then(|| ConfigError::InvalidAddress.into())),
            ConfigOp::Pause { caller } => manager_gate(self, caller).or_else(|| {
                if self.paused {
                    return Some(ConfigError::ContractPaused.into());
                }
                self.paused = true;
                None
            }),
            ConfigOp::Unpause { caller } => manager_gate(self, caller).or_else(|| {
                if !self.paused {
                    return Some(ConfigError::ContractNotPaused.into());
                }
                self.paused = false;
                None
            }),
            ConfigOp::InitializeModule {
                caller,
                wrong_module,
                lv_fee,
            } => manager_gate(self, caller)
                .or_else(|| self.paused.then(|| ConfigError::ContractPaused.into()))
                .or_else(|| wrong_module.then(|| ConfigError::InvalidModule.into()))
                .or_else(|| {
                    (lv_fee > MAX_EARLY_REDEMPTION_FEE_BPS).then(|| ModuleError::InvalidFees.into())
                }),
            ConfigOp::IssueNewSeries {
                caller,
                expiry_offset,
                exchange_rate,
            } => manager_gate(self, caller)
                .or_else(|| self.paused.then(|| ConfigError::ContractPaused.into()))
                .or_else(|| (expiry_offset <= 0).then(|| ConfigError::InvalidExpiry.into()))
                .or_else(|| (exchange_rate == 0).then(|| ModuleError::InvalidExchangeRate.into())),
            ConfigOp::UpdateRepurchaseFeeRate { caller, rate } => manager_gate(self, caller)
                .or_else(|| (rate > MAX_REPURCHASE_FEE_BPS).then(|| ModuleError::InvalidFees.into())),
            ConfigOp::UpdateEarlyRedemptionFeeRate { caller, rate } => manager_gate(self, caller)
                .or_else(|| {
                    (rate > MAX_EARLY_REDEMPTION_FEE_BPS).then(|| ModuleError::InvalidFees.into())
                }),
            ConfigOp::UpdateFeeViaWrongModule { caller, .. } => {
                manager_gate(self, caller).or(Some(ConfigError::InvalidModule.into()))
            }
        }
    }
}

/// Offsets are whole minutes from `now`
fn series_expiry(now: i64, offset: i16) -> i64 {
    now + offset as i64 * 60
}

struct Identities {
    admin: Keypair,
    manager: Keypair,
    stranger: Keypair,
}

impl Identities {
    fn get(&self, caller: Caller) -> &Keypair {
        match caller {
            Caller::Admin => &self.admin,
            Caller::Manager => &self.manager,
            Caller::Stranger => &self.stranger,
        }
    }
}

/// A program that is deployed but is not the configured module core
fn wrong_module_program() -> Pubkey {
    asset_factory::id()
}

fn module_program(wrong_module: bool) -> Pubkey {
    if wrong_module {
        wrong_module_program()
    } else {
        module_core::id()
    }
}

fn build_instruction(
    op: &ConfigOp,
    identities: &Identities,
    module: &Pubkey,
    fresh_pair: Option<(Pubkey, Pubkey)>,
    payer: &Pubkey,
    now: i64,
) -> (Instruction, Caller) {
    let key = |caller: Caller| identities.get(caller).pubkey();
    let module_core = module_core::id();

    match *op {
        ConfigOp::GrantManager { caller, target } => {
            (grant_manager_ix(&key(caller), &key(target)), caller)
        }
        ConfigOp::RevokeManager { caller, target } => {
            (revoke_manager_ix(&key(caller), &key(target)), caller)
        }
        ConfigOp::TransferAdmin { caller, target } => {
            (transfer_admin_ix(&key(caller), &key(target)), caller)
        }
        ConfigOp::SetModuleCore { caller, zero } => {
            let module_core = if zero {
                Pubkey::default()
            } else {
                module_core::id()
            };
            (set_module_core_ix(&key(caller), &module_core), caller)
        }
        ConfigOp::Pause { caller } => (pause_ix(&key(caller)), caller),
        ConfigOp::Unpause { caller } => (unpause_ix(&key(caller)), caller),
        ConfigOp::InitializeModule {
            caller,
            wrong_module,
            lv_fee,
        } => {
            let (peg, backing) = fresh_pair.unwrap_or_default();
            (
                initialize_module_ix(
                    &key(caller),
                    &module_program(wrong_module),
                    &peg,
                    &backing,
                    payer,
                    lv_fee,
                ),
                caller,
            )
        }
        ConfigOp::IssueNewSeries {
            caller,
            expiry_offset,
            exchange_rate,
        } => (
            issue_new_series_ix(
                &key(caller),
                &module_core,
                module,
                series_expiry(now, expiry_offset),
                exchange_rate as u64,
                1_000,
            ),
            caller,
        ),
        ConfigOp::UpdateRepurchaseFeeRate { caller, rate } => {
            (update_repurchase_fee_rate_ix(&key(caller), &module_core, module, rate), caller)
        }
        ConfigOp::UpdateEarlyRedemptionFeeRate { caller, rate } => (
            update_early_redemption_fee_rate_ix(&key(caller), &module_core, module, rate),
            caller,
        ),
        ConfigOp::UpdateFeeViaWrongModule { caller, rate } => (
            update_repurchase_fee_rate_ix(&key(caller), &wrong_module_program(), module, rate),
            caller,
        ),
    }
}

/// Execute a single fuzz iteration over a sequence of config operations
async fn fuzz_config_once(input: ConfigFuzzInput) -> FuzzResult<()> {
    let mut env = setup_program_test().await;
    let context = &mut env.context;

    let config = setup_config(context).await?;
    let backing = setup_mint(context, 9).await?;
    let peg = setup_mint(context, 6).await?;
    let module = setup_module(context, &config, &peg.mint, &backing.mint, 100).await?;

    let identities = Identities {
        admin: config.admin.insecure_clone(),
        manager: config.manager.insecure_clone(),
        stranger: Keypair::new(),
    };
    let mut model = Model {
        admin: Caller::Admin,
        managers: [false, true, false],
        paused: false,
    };

    // PROPERTY 0: INITIAL ROLES
    // The initializer is Admin without being Manager
    assert!(has_role(context, Role::Admin, &config.admin.pubkey()).await?);
    assert!(!has_role(context, Role::Manager, &config.admin.pubkey()).await?);

    for op in input.ops.iter().take(24) {
        let now = unix_timestamp(context).await?;
        let config_before = get_account_data(context, &config.config).await?;
        let module_before = get_module_state(context, &module).await?;

        let fresh_pair = match op {
            ConfigOp::InitializeModule { .. } => Some((
                setup_mint(context, 6).await?.mint,
                setup_mint(context, 9).await?.mint,
            )),
            _ => None,
        };
        let fresh_module = fresh_pair.map(|(peg, backing)| derive_module_pda(&peg, &backing).0);

        let expected = model.apply(op);
        let payer = context.payer.pubkey();
        let (ix, caller) = build_instruction(op, &identities, &module, fresh_pair, &payer, now);
        let result = send_instruction(context, ix, &[identities.get(caller)]).await?;

        match (&result, expected) {
            (Ok(_), None) => {}
            (Err(err), Some(code)) => {
                // PROPERTY 1: THE EXPECTED ERROR, NOT JUST ANY ERROR
                assert_eq!(
                    error_code(err),
                    Some(code),
                    "Wrong failure for {:?}: {:?}",
                    op,
                    err
                );

                // PROPERTY 2: FAILED CALLS LEAVE STATE UNTOUCHED
                assert_eq!(get_account_data(context, &config.config).await?, config_before);
                let module_after = get_module_state(context, &module).await?;
                assert_eq!(module_after.series_count, module_before.series_count);
                assert_eq!(module_after.repurchase_fee_rate, module_before.repurchase_fee_rate);
                assert_eq!(
                    module_after.early_redemption_fee_rate,
                    module_before.early_redemption_fee_rate
                );
                if let Some(fresh_module) = fresh_module {
                    assert!(
                        context.banks_client.get_account(fresh_module).await?.is_none(),
                        "Rejected {:?} still created the module",
                        op
                    );
                }
            }
            (Ok(_), Some(code)) => panic!("{:?} succeeded, expected error {}", op, code),
            (Err(err), None) => panic!("{:?} failed unexpectedly: {:?}", op, err),
        }

        // PROPERTY 3: ON-CHAIN STATE TRACKS THE MODEL
        let state = get_config_state(context, &config.config).await?;
        assert_eq!(state.paused, model.paused);
        assert_eq!(state.module_core, module_core::id());
        for caller in [Caller::Admin, Caller::Manager, Caller::Stranger] {
            let identity = identities.get(caller).pubkey();
            assert_eq!(state.has_role(Role::Manager, &identity), model.is_manager(caller));
            assert_eq!(state.has_role(Role::Admin, &identity), model.is_admin(caller));
        }

        // PROPERTY 4: FORWARDED CALLS LAND IN THE MODULE
        if result.is_ok() {
            let module_after = get_module_state(context, &module).await?;
            match *op {
                ConfigOp::IssueNewSeries { expiry_offset, .. } => {
                    assert_eq!(module_after.series_count, module_before.series_count + 1);
                    let series = module_after
                        .current_series
                        .ok_or("series missing after issuance")?;
                    assert_eq!(series.expiry, series_expiry(now, expiry_offset));
                }
                ConfigOp::UpdateRepurchaseFeeRate { rate, .. } => {
                    assert_eq!(module_after.repurchase_fee_rate, rate);
                }
                ConfigOp::UpdateEarlyRedemptionFeeRate { rate, .. } => {
                    assert_eq!(module_after.early_redemption_fee_rate, rate);
                }
                ConfigOp::InitializeModule { lv_fee, .. } => {
                    let created = fresh_module.ok_or("module address missing")?;
                    let created = get_module_state(context, &created).await?;
                    assert_eq!(created.lv_fee, lv_fee);
                    assert_eq!(created.series_count, 0);
                }
                _ => {}
            }
        }
    }

    println!(
        "✓ PASS [CONFIG] - ops={}, admin={:?}, paused={}, managers={:?}",
        input.ops.len().min(24),
        model.admin,
        model.paused,
        model.managers
    );

    Ok(())
}

fuzz_target!(|input: ConfigFuzzInput| {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_config_once(input.clone()).await {
            panic!("Config fuzz iteration failed: {}\nInput: {:?}", e, input);
        }
    });
});
