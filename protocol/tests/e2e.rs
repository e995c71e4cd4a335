//! End-to-end tests for the Tessera vault.
//!
//! Every test builds a fresh [`Vault`] over the in-memory custodian, a
//! scripted strategy, and a manual clock, then drives it only through the
//! public surface a host would use. Custody balances are checked alongside
//! the ledger so that value conservation is verified across both sides.

use chrono::{Duration, TimeZone, Utc};

use tessera_protocol::config::DEFAULT_HARVEST_COOLDOWN;
use tessera_protocol::memory::{InMemoryCustodian, ManualClock, ScriptedStrategy};
use tessera_protocol::{
    AccountId, AssetCustodian, FeeConfig, HarvestLog, InflationGuard, Vault, VaultConfig,
    VaultError,
};

type SimVault = Vault<InMemoryCustodian, ScriptedStrategy, ManualClock>;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn account(name: &str) -> AccountId {
    AccountId::new(format!("tessera:{name}"))
}

fn treasury() -> AccountId {
    account("treasury")
}

/// Builds a vault with a 10% fee and the default cooldown under `guard`.
fn setup(guard: InflationGuard) -> (SimVault, InMemoryCustodian, ManualClock) {
    let custodian = InMemoryCustodian::new();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());
    let fees = FeeConfig::new(1_000, treasury(), DEFAULT_HARVEST_COOLDOWN).unwrap();
    let vault = Vault::new(
        VaultConfig { guard, fees },
        custodian.clone(),
        ScriptedStrategy::new(custodian.clone()),
        clock.clone(),
    )
    .unwrap();
    (vault, custodian, clock)
}

/// Funds a wallet and approves the vault for all of it.
fn fund(custodian: &InMemoryCustodian, who: &AccountId, amount: u64) {
    custodian.fund(who, amount).unwrap();
    custodian.approve(who, amount);
}

// ---------------------------------------------------------------------------
// 1. Bootstrap
// ---------------------------------------------------------------------------

#[test]
fn bootstrap_issuance_is_deterministic() {
    let (mut vault, custodian, _clock) = setup(InflationGuard::virtual_offset(6));
    let (alice, bob) = (account("alice"), account("bob"));
    fund(&custodian, &alice, 100);
    fund(&custodian, &bob, 100);

    let first = vault.deposit(&alice, 100, &alice).unwrap();
    assert_eq!(first, 100_000_000);
    assert_eq!(vault.total_assets(), 100);
    assert_eq!(vault.total_supply(), 100_000_000);

    let second = vault.deposit(&bob, 100, &bob).unwrap();
    assert_eq!(second, 100_000_000);
}

// ---------------------------------------------------------------------------
// 2. Full Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn deposit_harvest_redeem_lifecycle() {
    let (mut vault, custodian, clock) = setup(InflationGuard::default());
    let (alice, bob) = (account("alice"), account("bob"));
    fund(&custodian, &alice, 60_000);
    fund(&custodian, &bob, 40_000);
    let minted = custodian.total_supply();

    vault.deposit(&alice, 60_000, &alice).unwrap();
    vault.deposit(&bob, 40_000, &bob).unwrap();

    let mut log = HarvestLog::new();
    vault.strategy_mut().push_yield(1_000).push_yield(2_000).push_yield(500);
    for _ in 0..3 {
        let supply = vault.total_supply();
        let record = vault.harvest().unwrap();
        assert_eq!(vault.total_supply(), supply);
        log.append(record);
        clock.advance(Duration::hours(12));
    }

    assert_eq!(log.len(), 3);
    assert_eq!(log.total_yield(), 3_500);
    assert_eq!(log.total_fees(), 350);
    assert_eq!(vault.total_assets(), 100_000 + 3_150);
    assert_eq!(custodian.balance_of(&treasury()), 350);
    assert_eq!(custodian.vault_balance(), vault.total_assets());

    let alice_out = vault.redeem(vault.balance_of(&alice), &alice, &alice).unwrap();
    let bob_out = vault.redeem(vault.balance_of(&bob), &bob, &bob).unwrap();

    // 60/40 split of the reinvested yield, less rounding.
    assert!(alice_out > 60_000 && alice_out <= 60_000 + 1_890);
    assert!(bob_out > 40_000 && bob_out <= 40_000 + 1_260);
    assert!(alice_out + bob_out <= 103_150);
    assert!(103_150 - (alice_out + bob_out) <= 2);

    assert_eq!(vault.total_supply(), 0);
    assert_eq!(vault.total_assets(), 103_150 - alice_out - bob_out);
    assert_eq!(custodian.vault_balance(), vault.total_assets());
    assert_eq!(custodian.total_supply(), minted + 3_500);
}

// ---------------------------------------------------------------------------
// 3. Rollback Is Exact
// ---------------------------------------------------------------------------

#[test]
fn failed_push_leaves_ledger_byte_identical() {
    let (mut vault, custodian, _clock) = setup(InflationGuard::default());
    let alice = account("alice");
    fund(&custodian, &alice, 10_000);
    vault.deposit(&alice, 10_000, &alice).unwrap();

    let snapshot = bincode::serialize(vault.ledger()).unwrap();
    let epoch = vault.ledger().epoch();

    custodian.fail_next_push("receiver sanctioned");
    let err = vault.withdraw(2_500, &account("carol"), &alice).unwrap_err();
    assert!(matches!(err, VaultError::Custody(_)));
    assert_eq!(bincode::serialize(vault.ledger()).unwrap(), snapshot);
    assert_eq!(vault.ledger().epoch(), epoch);

    custodian.fail_next_push("receiver sanctioned");
    let shares = vault.balance_of(&alice);
    assert!(vault.redeem(shares, &alice, &alice).is_err());
    assert_eq!(bincode::serialize(vault.ledger()).unwrap(), snapshot);
}

#[test]
fn failed_fee_push_leaves_state_byte_identical() {
    let (mut vault, custodian, _clock) = setup(InflationGuard::default());
    let alice = account("alice");
    fund(&custodian, &alice, 10_000);
    vault.deposit(&alice, 10_000, &alice).unwrap();
    vault.strategy_mut().push_yield(1_000);

    let ledger = bincode::serialize(vault.ledger()).unwrap();
    let accountant = bincode::serialize(vault.accountant()).unwrap();

    custodian.fail_next_push("treasury frozen");
    assert!(vault.harvest().is_err());
    assert_eq!(bincode::serialize(vault.ledger()).unwrap(), ledger);
    assert_eq!(bincode::serialize(vault.accountant()).unwrap(), accountant);
}

// ---------------------------------------------------------------------------
// 4. Inflation Attack
// ---------------------------------------------------------------------------

/// Attacker deposits 1, donates `donation` straight into custody, forces a
/// sync, then a victim deposits `victim_deposit`. Both exit afterwards.
/// Returns `(attacker_net, victim_out)`.
fn run_inflation_attack(guard: InflationGuard, donation: u64, victim_deposit: u64) -> (i128, u64) {
    let (mut vault, custodian, _clock) = setup(guard);
    let (attacker, victim) = (account("attacker"), account("victim"));
    fund(&custodian, &attacker, 1 + donation);
    fund(&custodian, &victim, victim_deposit);

    vault.deposit(&attacker, 1, &attacker).unwrap();
    custodian.donate(&attacker, donation).unwrap();
    vault.sync().unwrap();

    let victim_shares = vault.deposit(&victim, victim_deposit, &victim).unwrap();
    assert!(victim_shares > 0);

    let victim_out = vault.redeem(victim_shares, &victim, &victim).unwrap();
    let attacker_shares = vault.balance_of(&attacker);
    let attacker_out = vault.redeem(attacker_shares, &attacker, &attacker).unwrap();

    let attacker_net = attacker_out as i128 - (1 + donation) as i128;
    (attacker_net, victim_out)
}

#[test]
fn inflation_attack_unprofitable_with_virtual_offset() {
    let (attacker_net, victim_out) =
        run_inflation_attack(InflationGuard::virtual_offset(6), 1_000_000, 1_000_000);
    assert!(attacker_net < 0);
    assert!(victim_out >= 1_000_000 - 1);
}

#[test]
fn inflation_attack_unprofitable_with_dead_shares() {
    let (attacker_net, victim_out) =
        run_inflation_attack(InflationGuard::dead_shares(6), 1_000_000, 1_000_000);
    assert!(attacker_net < 0);
    assert!(victim_out >= 1_000_000 - 1);
}

#[test]
fn small_donation_costs_victim_at_most_rounding() {
    // 1 * 1e6 shares, then 1_000 donated: the victim's 1_000 still gets
    // 1_996_007 shares and redeems 999.
    let (attacker_net, victim_out) =
        run_inflation_attack(InflationGuard::virtual_offset(6), 1_000, 1_000);
    assert_eq!(victim_out, 999);
    assert!(attacker_net < 0);
}

#[test]
fn weak_virtual_offset_refused_at_construction() {
    let custodian = InMemoryCustodian::new();
    let fees = FeeConfig::new(1_000, treasury(), DEFAULT_HARVEST_COOLDOWN).unwrap();
    for offset in [0u8, 3, 5] {
        let result = Vault::new(
            VaultConfig {
                guard: InflationGuard::virtual_offset(offset),
                fees: fees.clone(),
            },
            custodian.clone(),
            ScriptedStrategy::new(custodian.clone()),
            ManualClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
        );
        assert!(
            matches!(result, Err(VaultError::InvalidDecimalsOffset { .. })),
            "offset {offset}"
        );
    }
}

#[test]
fn large_donation_still_loses_money() {
    for guard in [InflationGuard::virtual_offset(6), InflationGuard::dead_shares(6)] {
        let (attacker_net, victim_out) = run_inflation_attack(guard, 1_000_000_000, 10_000);
        assert!(attacker_net < 0, "{guard:?}");
        // Whatever the victim loses to rounding, the attacker burns at
        // least a thousand times more to cause it.
        let victim_loss = (10_000 - victim_out) as i128;
        assert!(-attacker_net > victim_loss * 1_000, "{guard:?}: {victim_out}");
    }
}

// ---------------------------------------------------------------------------
// 5. Cooldown Across Time
// ---------------------------------------------------------------------------

#[test]
fn harvest_respects_clock() {
    let (mut vault, custodian, clock) = setup(InflationGuard::default());
    let alice = account("alice");
    fund(&custodian, &alice, 1_000);
    vault.deposit(&alice, 1_000, &alice).unwrap();
    vault.strategy_mut().push_yield(10).push_yield(10);

    vault.harvest().unwrap();
    let ready_at = vault.accountant().ready_at().unwrap().unwrap();
    assert_eq!(ready_at, clock_now(&clock) + Duration::hours(12));

    clock.advance(Duration::hours(6));
    assert!(matches!(
        vault.harvest(),
        Err(VaultError::CooldownActive { ready_at: r }) if r == ready_at
    ));

    clock.set(ready_at);
    assert_eq!(vault.harvest().unwrap().sequence, 2);
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<Utc> {
    use tessera_protocol::Clock;
    clock.now()
}

// ---------------------------------------------------------------------------
// 6. Pause
// ---------------------------------------------------------------------------

#[test]
fn paused_vault_serves_previews_only() {
    let (mut vault, custodian, _clock) = setup(InflationGuard::default());
    let alice = account("alice");
    fund(&custodian, &alice, 1_000);
    vault.deposit(&alice, 500, &alice).unwrap();

    vault.pause();
    let preview = vault.preview_redeem(vault.balance_of(&alice)).unwrap();
    assert_eq!(preview, 500);
    assert!(matches!(
        vault.withdraw(1, &alice, &alice),
        Err(VaultError::Paused)
    ));

    vault.unpause();
    assert_eq!(vault.redeem(vault.balance_of(&alice), &alice, &alice).unwrap(), 500);
}
