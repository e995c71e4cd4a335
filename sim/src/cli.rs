//! # CLI Interface
//!
//! Command-line arguments for `tessera-sim`, via `clap` derive. Every
//! scenario runs against in-memory collaborators and prints one JSON report
//! to stdout.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Tessera vault simulator.
///
/// Runs scripted scenarios against the share-accounting core with an
/// in-memory custodian, strategy, and clock.
#[derive(Parser, Debug)]
#[command(
    name = "tessera-sim",
    about = "Tessera vault accounting simulator",
    version,
    propagate_version = true
)]
pub struct TesseraSimCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Scenario to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Vault configuration file (JSON). Defaults apply when omitted.
    #[arg(long, short = 'c', global = true, env = "TESSERA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "TESSERA_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(
        long,
        global = true,
        env = "TESSERA_LOG",
        default_value = "tessera_sim=info,tessera_protocol=warn"
    )]
    pub log_level: String,
}

/// Scenarios.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Two deposits into an empty vault: shows bootstrap issuance.
    Bootstrap(BootstrapArgs),
    /// First-depositor inflation attack against the chosen guard.
    Attack(AttackArgs),
    /// Harvest every period versus one harvest at the end.
    Compound(CompoundArgs),
    /// Deposits, periodic harvests, and full exits.
    Lifecycle(LifecycleArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for `bootstrap`.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Assets deposited into the empty vault.
    #[arg(long, default_value_t = 100)]
    pub first: u64,

    /// Assets deposited right after.
    #[arg(long, default_value_t = 100)]
    pub second: u64,
}

/// Inflation guard selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GuardPolicy {
    /// Virtual assets and shares in every conversion.
    VirtualOffset,
    /// Shares minted to a locked sink at construction.
    DeadShares,
}

/// Arguments for `attack`.
#[derive(Args, Debug)]
pub struct AttackArgs {
    /// Guard under test. Overrides the guard in `--config`.
    #[arg(long, value_enum, default_value_t = GuardPolicy::VirtualOffset)]
    pub policy: GuardPolicy,

    /// Decimals offset for the guard. The virtual-offset policy accepts 6 to 12.
    #[arg(long, env = "TESSERA_DECIMALS_OFFSET", default_value_t = 6)]
    pub decimals_offset: u8,

    /// The attacker's initial deposit.
    #[arg(long, default_value_t = 1)]
    pub attacker_deposit: u64,

    /// Assets the attacker transfers straight into custody.
    #[arg(long, default_value_t = 1_000_000)]
    pub donation: u64,

    /// The victim's deposit.
    #[arg(long, default_value_t = 1_000_000)]
    pub victim_deposit: u64,
}

/// Arguments for `compound`.
#[derive(Args, Debug)]
pub struct CompoundArgs {
    /// Assets deposited before the first period.
    #[arg(long, default_value_t = 1_000_000_000)]
    pub principal: u64,

    /// Strategy yield per period, in basis points of custody.
    #[arg(long, default_value_t = 100)]
    pub rate_bps: u16,

    /// Number of periods, each one cooldown long.
    #[arg(long, default_value_t = 30)]
    pub periods: u32,
}

/// Arguments for `lifecycle`.
#[derive(Args, Debug)]
pub struct LifecycleArgs {
    /// Number of depositors.
    #[arg(long, default_value_t = 3)]
    pub depositors: u32,

    /// Assets each depositor puts in. Depositor `i` deposits `(i + 1)` times
    /// this amount.
    #[arg(long, default_value_t = 1_000_000)]
    pub deposit: u64,

    /// Strategy yield per harvest, in basis points of custody.
    #[arg(long, default_value_t = 50)]
    pub rate_bps: u16,

    /// Number of harvests before everyone exits.
    #[arg(long, default_value_t = 5)]
    pub harvests: u32,
}
