//! # Scenarios
//!
//! Each scenario builds fresh in-memory collaborators, drives a [`Vault`]
//! through a fixed script, and returns a serializable report. Scenarios are
//! deterministic: the clock starts at a fixed instant and only moves by whole
//! cooldowns.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use tessera_protocol::memory::{InMemoryCustodian, ManualClock, RateStrategy, ScriptedStrategy};
use tessera_protocol::{
    AccountId, HarvestLog, HarvestRecord, InflationGuard, Vault, VaultConfig, VaultError,
    YieldStrategy,
};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

fn genesis() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn account(name: &str) -> AccountId {
    AccountId::new(format!("tessera:{name}"))
}

struct Harness<S> {
    vault: Vault<InMemoryCustodian, S, ManualClock>,
    custodian: InMemoryCustodian,
    clock: ManualClock,
    period: chrono::Duration,
}

impl<S: YieldStrategy> Harness<S> {
    fn new(
        config: VaultConfig,
        make_strategy: impl FnOnce(InMemoryCustodian) -> S,
    ) -> Result<Self> {
        let custodian = InMemoryCustodian::new();
        let clock = ManualClock::new(genesis());
        let period = chrono::Duration::from_std(config.fees.cooldown)
            .context("cooldown does not fit a calendar duration")?;
        let strategy = make_strategy(custodian.clone());
        let vault = Vault::new(config, custodian.clone(), strategy, clock.clone())
            .context("invalid vault configuration")?;
        Ok(Self {
            vault,
            custodian,
            clock,
            period,
        })
    }

    /// Mints `amount` into `who`'s wallet and approves the vault for it.
    fn fund(&self, who: &AccountId, amount: u64) -> Result<()> {
        self.custodian
            .fund(who, amount)
            .with_context(|| format!("funding {who}"))?;
        self.custodian.approve(who, self.custodian.allowance(who).saturating_add(amount));
        Ok(())
    }

    fn next_period(&self) {
        self.clock.advance(self.period);
    }
}

// ---------------------------------------------------------------------------
// bootstrap
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BootstrapReport {
    pub guard: InflationGuard,
    pub first_deposit: u64,
    pub first_shares: u64,
    pub second_deposit: u64,
    pub second_shares: u64,
    pub total_assets: u64,
    pub total_supply: u64,
    pub price_per_share: u128,
}

/// Two consecutive deposits into an empty vault.
pub fn bootstrap(config: VaultConfig, first: u64, second: u64) -> Result<BootstrapReport> {
    let mut h = Harness::new(config, ScriptedStrategy::new)?;
    let (alice, bob) = (account("alice"), account("bob"));
    h.fund(&alice, first)?;
    h.fund(&bob, second)?;

    let first_shares = h.vault.deposit(&alice, first, &alice)?;
    let second_shares = h.vault.deposit(&bob, second, &bob)?;
    info!(first_shares, second_shares, "bootstrap complete");

    Ok(BootstrapReport {
        guard: *h.vault.ledger().guard(),
        first_deposit: first,
        first_shares,
        second_deposit: second,
        second_shares,
        total_assets: h.vault.total_assets(),
        total_supply: h.vault.total_supply(),
        price_per_share: h.vault.price_per_share()?,
    })
}

// ---------------------------------------------------------------------------
// attack
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AttackReport {
    pub guard: InflationGuard,
    pub attacker_deposit: u64,
    pub donation: u64,
    pub attacker_shares: u64,
    pub victim_deposit: u64,
    /// `true` if the vault refused the victim's deposit outright.
    pub victim_rejected: bool,
    pub victim_shares: u64,
    pub victim_redeemed: u64,
    pub victim_loss: u64,
    pub attacker_redeemed: u64,
    pub attacker_net: i128,
}

/// Deposit, donate, sync, let the victim deposit, then both exit.
pub fn attack(
    config: VaultConfig,
    attacker_deposit: u64,
    donation: u64,
    victim_deposit: u64,
) -> Result<AttackReport> {
    let mut h = Harness::new(config, ScriptedStrategy::new)?;
    let (attacker, victim) = (account("attacker"), account("victim"));
    let attacker_cost = attacker_deposit
        .checked_add(donation)
        .context("attacker budget overflows")?;
    h.fund(&attacker, attacker_cost)?;
    h.fund(&victim, victim_deposit)?;

    let attacker_shares = h.vault.deposit(&attacker, attacker_deposit, &attacker)?;
    h.custodian.donate(&attacker, donation)?;
    let inflated = h.vault.sync()?;
    info!(attacker_shares, total_assets = inflated, "donation realized");

    let (victim_rejected, victim_shares, victim_redeemed) =
        match h.vault.deposit(&victim, victim_deposit, &victim) {
            Ok(shares) => (false, shares, h.vault.redeem(shares, &victim, &victim)?),
            Err(VaultError::ZeroShares { .. }) => (true, 0, victim_deposit),
            Err(err) => return Err(err.into()),
        };

    let attacker_redeemed = h.vault.redeem(attacker_shares, &attacker, &attacker)?;
    let attacker_net = attacker_redeemed as i128 - attacker_cost as i128;
    info!(victim_redeemed, attacker_redeemed, attacker_net, "attack settled");

    Ok(AttackReport {
        guard: *h.vault.ledger().guard(),
        attacker_deposit,
        donation,
        attacker_shares,
        victim_deposit,
        victim_rejected,
        victim_shares,
        victim_redeemed,
        victim_loss: victim_deposit.saturating_sub(victim_redeemed),
        attacker_redeemed,
        attacker_net,
    })
}

// ---------------------------------------------------------------------------
// compound
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CompoundReport {
    pub principal: u64,
    pub rate_bps: u16,
    pub periods: u32,
    pub compounded_value: u64,
    pub compounded_fees: u64,
    pub terminal_value: u64,
    pub terminal_fees: u64,
    pub advantage: i128,
}

/// Harvests a rate strategy every period, and separately harvests the
/// simple-interest total once at the end, from the same principal.
pub fn compound(
    config: VaultConfig,
    principal: u64,
    rate_bps: u16,
    periods: u32,
) -> Result<CompoundReport> {
    let saver = account("saver");

    let mut compounding = Harness::new(config.clone(), |c| RateStrategy::new(c, rate_bps))?;
    compounding.fund(&saver, principal)?;
    compounding.vault.deposit(&saver, principal, &saver)?;
    for _ in 0..periods {
        match compounding.vault.harvest() {
            Ok(_) | Err(VaultError::NoYield) => {}
            Err(err) => return Err(err.into()),
        }
        compounding.next_period();
    }
    let compounded_value = compounding
        .vault
        .convert_to_assets(compounding.vault.balance_of(&saver))?;

    let mut terminal = Harness::new(config, ScriptedStrategy::new)?;
    terminal.fund(&saver, principal)?;
    terminal.vault.deposit(&saver, principal, &saver)?;
    let simple = u64::try_from(principal as u128 * rate_bps as u128 / 10_000 * periods as u128)
        .context("simple interest overflows u64")?;
    terminal.vault.strategy_mut().push_yield(simple);
    match terminal.vault.harvest() {
        Ok(_) | Err(VaultError::NoYield) => {}
        Err(err) => return Err(err.into()),
    }
    let terminal_value = terminal
        .vault
        .convert_to_assets(terminal.vault.balance_of(&saver))?;

    info!(compounded_value, terminal_value, "compounding compared");

    Ok(CompoundReport {
        principal,
        rate_bps,
        periods,
        compounded_value,
        compounded_fees: compounding.vault.accountant().cumulative_fees(),
        terminal_value,
        terminal_fees: terminal.vault.accountant().cumulative_fees(),
        advantage: compounded_value as i128 - terminal_value as i128,
    })
}

// ---------------------------------------------------------------------------
// lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PositionReport {
    pub account: AccountId,
    pub deposited: u64,
    pub shares: u64,
    pub redeemed: u64,
    pub gain: i128,
}

#[derive(Debug, Serialize)]
pub struct LifecycleReport {
    pub positions: Vec<PositionReport>,
    pub harvests: Vec<HarvestRecord>,
    pub total_yield: u128,
    pub total_fees: u128,
    pub treasury_balance: u64,
    pub residual_assets: u64,
    pub residual_supply: u64,
}

/// Deposits from several accounts, `harvests` periodic harvests, then every
/// depositor redeems everything.
pub fn lifecycle(
    config: VaultConfig,
    depositors: u32,
    deposit: u64,
    rate_bps: u16,
    harvests: u32,
) -> Result<LifecycleReport> {
    let treasury = config.fees.fee_recipient.clone();
    let mut h = Harness::new(config, |c| RateStrategy::new(c, rate_bps))?;

    let mut positions = Vec::new();
    for i in 0..depositors {
        let who = account(&format!("depositor-{i}"));
        let amount = deposit
            .checked_mul(u64::from(i) + 1)
            .context("deposit amount overflows")?;
        h.fund(&who, amount)?;
        let shares = h.vault.deposit(&who, amount, &who)?;
        positions.push(PositionReport {
            account: who,
            deposited: amount,
            shares,
            redeemed: 0,
            gain: 0,
        });
    }

    let mut log = HarvestLog::new();
    for _ in 0..harvests {
        match h.vault.harvest() {
            Ok(record) => log.append(record),
            Err(VaultError::NoYield) => {}
            Err(err) => return Err(err.into()),
        }
        h.next_period();
    }

    for position in &mut positions {
        position.redeemed = h
            .vault
            .redeem(position.shares, &position.account, &position.account)?;
        position.gain = position.redeemed as i128 - position.deposited as i128;
    }

    Ok(LifecycleReport {
        positions,
        total_yield: log.total_yield(),
        total_fees: log.total_fees(),
        harvests: log.records().to_vec(),
        treasury_balance: h.custodian.balance_of(&treasury),
        residual_assets: h.vault.total_assets(),
        residual_supply: h.vault.total_supply(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_protocol::config::{DEFAULT_HARVEST_COOLDOWN, DEFAULT_PERFORMANCE_FEE_BPS};
    use tessera_protocol::FeeConfig;

    fn config(guard: InflationGuard) -> VaultConfig {
        let fees = FeeConfig::new(
            DEFAULT_PERFORMANCE_FEE_BPS,
            AccountId::new("tessera:treasury"),
            DEFAULT_HARVEST_COOLDOWN,
        )
        .unwrap();
        VaultConfig { guard, fees }
    }

    #[test]
    fn bootstrap_report_matches_documented_issuance() {
        let report = bootstrap(config(InflationGuard::virtual_offset(6)), 100, 100).unwrap();
        assert_eq!(report.first_shares, 100_000_000);
        assert_eq!(report.second_shares, 100_000_000);
        assert_eq!(report.total_assets, 200);
    }

    #[test]
    fn attack_loses_money_under_both_guards() {
        for guard in [InflationGuard::virtual_offset(6), InflationGuard::dead_shares(6)] {
            let report = attack(config(guard), 1, 1_000_000, 1_000_000).unwrap();
            assert!(report.attacker_net < 0);
            assert!(report.victim_loss <= 1);
        }
    }

    #[test]
    fn compounding_never_loses_to_terminal() {
        let report = compound(config(InflationGuard::default()), 1_000_000_000, 100, 30).unwrap();
        assert!(report.advantage >= 0);
        assert!(report.compounded_value > 1_000_000_000);
    }

    #[test]
    fn lifecycle_pays_everyone_and_the_treasury() {
        let report = lifecycle(config(InflationGuard::default()), 3, 1_000_000, 50, 4).unwrap();
        assert_eq!(report.positions.len(), 3);
        assert_eq!(report.harvests.len(), 4);
        assert!(report.positions.iter().all(|p| p.gain > 0));
        assert_eq!(report.treasury_balance as u128, report.total_fees);
        assert_eq!(report.residual_supply, 0);
    }
}
